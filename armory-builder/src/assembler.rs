//! Build config assembly
//!
//! Turns a payload and its already-resolved lookup records into the
//! [`BuildConfig`] handed to the build tooling. No I/O happens here.

use armory_core::domain::agent::{
    AgentTypeArchitecture, AgentTypeConfiguration, AgentTypeOperatingSystem, AgentTypeVersion,
};
use armory_core::domain::build::BuildConfig;
use armory_core::domain::payload::Payload;
use armory_core::domain::transport::Transport;
use chrono::SecondsFormat;

/// Lookup records a payload's foreign keys point at
#[derive(Debug, Clone)]
pub struct BuildLookups {
    pub operating_system: AgentTypeOperatingSystem,
    pub version: AgentTypeVersion,
    pub architecture: AgentTypeArchitecture,
    pub configuration: AgentTypeConfiguration,
    pub transport: Transport,
}

/// Assembles the initial build config, without a transport module
pub fn assemble(payload: &Payload, lookups: &BuildLookups) -> BuildConfig {
    BuildConfig {
        beacon_interval: payload.beacon_interval,
        jitter: payload.jitter,
        payload_name: payload.name.clone(),
        payload_key: payload.key.clone(),
        expiration_date: payload
            .expiration_date
            .map(|date| date.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        operating_system: lookups.operating_system.name.clone(),
        version: lookups.version.name.clone(),
        architecture: lookups.architecture.name.clone(),
        configuration: lookups.configuration.name.clone(),
        initial_transport_type: lookups.transport.transport_type.clone(),
        transport_configuration: lookups.transport.configuration.clone(),
        debug: payload.debug,
        transport_module: None,
    }
}
