//! Build configuration handed to external build tooling

use serde::{Deserialize, Serialize};

/// Instruction set written to a JSON file and passed to both build commands
///
/// Created fresh for each build. `transport_module` is only set once the
/// transport build has produced an artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BuildConfig {
    pub beacon_interval: i32,
    pub jitter: i32,
    pub payload_name: String,
    pub payload_key: String,
    /// ISO-8601 expiration, omitted when the payload never expires
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
    pub operating_system: String,
    pub version: String,
    pub architecture: String,
    pub configuration: String,
    pub initial_transport_type: String,
    pub transport_configuration: serde_json::Value,
    pub debug: bool,
    /// Base64-encoded transport module
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport_module: Option<String>,
}

impl BuildConfig {
    /// Whether this config may be handed to the agent build
    pub fn has_transport_module(&self) -> bool {
        self.transport_module
            .as_deref()
            .is_some_and(|module| !module.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> BuildConfig {
        BuildConfig {
            beacon_interval: 5,
            jitter: 10,
            payload_name: "beacon1".to_string(),
            payload_key: "key".to_string(),
            expiration_date: None,
            operating_system: "Windows".to_string(),
            version: "10".to_string(),
            architecture: "x64".to_string(),
            configuration: "Release".to_string(),
            initial_transport_type: "HTTP".to_string(),
            transport_configuration: serde_json::json!({"Url": "http://c2.local"}),
            debug: false,
            transport_module: None,
        }
    }

    #[test]
    fn test_optional_fields_are_omitted() {
        let json = serde_json::to_string(&config()).unwrap();
        assert!(json.contains("\"PayloadName\":\"beacon1\""));
        assert!(!json.contains("ExpirationDate"));
        assert!(!json.contains("TransportModule"));
    }

    #[test]
    fn test_has_transport_module() {
        let mut config = config();
        assert!(!config.has_transport_module());

        config.transport_module = Some(String::new());
        assert!(!config.has_transport_module());

        config.transport_module = Some("TVo=".to_string());
        assert!(config.has_transport_module());
    }
}
