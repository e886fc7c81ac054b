//! Agent type domain types

use serde::{Deserialize, Serialize};

/// A supported target platform/language combination for the agent binary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AgentType {
    pub id: i32,
    /// Also the name of the agent's directory under the agents root
    pub name: String,
    /// Command template; the build config path is appended as the last argument
    pub build_command: String,
    /// Where the build tool deposits its output, relative to the agent directory
    pub build_location: String,
}

/// The transport module embedded into an agent, built before the agent itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AgentTransportType {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub transport_type_guid: Option<String>,
    pub build_command: String,
    pub build_location: String,
    #[serde(default)]
    pub configuration: Option<serde_json::Value>,
}

/// Configuration profile of an agent type (e.g. "Debug", "Release")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AgentTypeConfiguration {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AgentTypeOperatingSystem {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AgentTypeVersion {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AgentTypeArchitecture {
    pub id: i32,
    pub name: String,
}
