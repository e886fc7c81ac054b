//! Payloads repository
//!
//! Read access to a payload and every lookup record it references, plus the
//! one write the worker performs: flagging the payload as built.

use anyhow::{Context, Result};
use armory_client::PlatformClient;
use armory_core::domain::agent::{
    AgentTransportType, AgentType, AgentTypeArchitecture, AgentTypeConfiguration,
    AgentTypeOperatingSystem, AgentTypeVersion,
};
use armory_core::domain::payload::Payload;
use armory_core::domain::transport::Transport;
use async_trait::async_trait;
use std::sync::Arc;

/// Repository trait for payload storage
#[async_trait]
pub trait PayloadRepository: Send + Sync {
    async fn get_payload(&self, id: i32) -> Result<Payload>;

    async fn get_agent_type(&self, id: i32) -> Result<AgentType>;

    async fn get_agent_transport_type(&self, id: i32) -> Result<AgentTransportType>;

    async fn get_configuration(&self, id: i32) -> Result<AgentTypeConfiguration>;

    async fn get_operating_system(&self, id: i32) -> Result<AgentTypeOperatingSystem>;

    async fn get_version(&self, id: i32) -> Result<AgentTypeVersion>;

    async fn get_architecture(&self, id: i32) -> Result<AgentTypeArchitecture>;

    async fn get_transport(&self, id: i32) -> Result<Transport>;

    /// Flags the payload as built and returns the updated record
    async fn mark_built(&self, id: i32) -> Result<Payload>;
}

/// HTTP implementation of PayloadRepository
pub struct HttpPayloadRepository {
    client: Arc<PlatformClient>,
}

impl HttpPayloadRepository {
    pub fn new(client: Arc<PlatformClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PayloadRepository for HttpPayloadRepository {
    async fn get_payload(&self, id: i32) -> Result<Payload> {
        self.client
            .get_payload(id)
            .await
            .with_context(|| format!("Failed to fetch payload {}", id))
    }

    async fn get_agent_type(&self, id: i32) -> Result<AgentType> {
        self.client
            .get_agent_type(id)
            .await
            .with_context(|| format!("Failed to fetch agent type {}", id))
    }

    async fn get_agent_transport_type(&self, id: i32) -> Result<AgentTransportType> {
        self.client
            .get_agent_transport_type(id)
            .await
            .with_context(|| format!("Failed to fetch agent transport type {}", id))
    }

    async fn get_configuration(&self, id: i32) -> Result<AgentTypeConfiguration> {
        self.client
            .get_agent_type_configuration(id)
            .await
            .with_context(|| format!("Failed to fetch agent type configuration {}", id))
    }

    async fn get_operating_system(&self, id: i32) -> Result<AgentTypeOperatingSystem> {
        self.client
            .get_agent_type_operating_system(id)
            .await
            .with_context(|| format!("Failed to fetch agent type operating system {}", id))
    }

    async fn get_version(&self, id: i32) -> Result<AgentTypeVersion> {
        self.client
            .get_agent_type_version(id)
            .await
            .with_context(|| format!("Failed to fetch agent type version {}", id))
    }

    async fn get_architecture(&self, id: i32) -> Result<AgentTypeArchitecture> {
        self.client
            .get_agent_type_architecture(id)
            .await
            .with_context(|| format!("Failed to fetch agent type architecture {}", id))
    }

    async fn get_transport(&self, id: i32) -> Result<Transport> {
        self.client
            .get_transport(id)
            .await
            .with_context(|| format!("Failed to fetch transport {}", id))
    }

    async fn mark_built(&self, id: i32) -> Result<Payload> {
        self.client
            .mark_payload_built(id)
            .await
            .with_context(|| format!("Failed to mark payload {} as built", id))
    }
}
