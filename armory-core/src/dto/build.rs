//! Build request DTOs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Inbound event asking a worker to build a payload
///
/// Every worker sees every request; only the worker whose language matches
/// `language_name` acts on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BuildRequested {
    pub id: Uuid,
    pub payload_id: i32,
    pub language_name: String,
}

/// Request to claim a pending build for a worker
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ClaimBuildRequest {
    pub worker_id: String,
}
