//! Outbound result events

use serde::{Deserialize, Serialize};

use crate::domain::payload::Payload;

/// Emitted when a payload was built and uploaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PayloadUpdated {
    pub success: bool,
    pub payload: Payload,
}

/// Emitted when any stage of a build fails
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorMessage {
    /// Which service reported the failure
    pub source: String,
    /// Short, human readable summary
    pub message: String,
    /// Captured build output or error text
    pub details: String,
}
