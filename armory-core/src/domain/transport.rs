//! Transport domain types

use serde::{Deserialize, Serialize};

/// A configured transport instance a payload initially talks over
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Transport {
    pub id: i32,
    pub name: String,
    /// Transport type identifier handed to the agent as its initial transport
    pub transport_type: String,
    /// Opaque settings blob, passed through to the build tooling untouched
    #[serde(default)]
    pub configuration: serde_json::Value,
}
