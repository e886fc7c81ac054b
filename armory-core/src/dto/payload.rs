//! Payload DTOs

use serde::{Deserialize, Serialize};

/// Partial payload update sent once the artifact is uploaded
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdatePayload {
    pub built: bool,
}
