//! Payload domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single requested build
///
/// Structure shared between the platform (persists) and the build worker (reads, flips `built`).
/// Foreign keys reference the lookup records in [`crate::domain::agent`] and
/// [`crate::domain::transport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Payload {
    pub id: i32,
    pub name: String,
    /// Key material embedded in the agent
    pub key: String,
    /// Beacon interval in seconds
    pub beacon_interval: i32,
    pub jitter: i32,
    #[serde(default)]
    pub expiration_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub debug: bool,
    /// Token authorizing the artifact upload for this payload
    pub build_token: String,
    #[serde(default)]
    pub built: bool,
    pub agent_type_id: i32,
    pub agent_type_configuration_id: i32,
    pub agent_type_operating_system_id: i32,
    pub agent_type_version_id: i32,
    pub agent_type_architecture_id: i32,
    pub agent_transport_type_id: i32,
    pub transport_id: i32,
}
