//! Agent and transport catalog lookups

use armory_core::domain::agent::{
    AgentTransportType, AgentType, AgentTypeArchitecture, AgentTypeConfiguration,
    AgentTypeOperatingSystem, AgentTypeVersion,
};
use armory_core::domain::transport::Transport;
use serde::de::DeserializeOwned;

use crate::PlatformClient;
use crate::error::Result;

impl PlatformClient {
    // =============================================================================
    // Agent Catalog
    // =============================================================================

    pub async fn get_agent_type(&self, id: i32) -> Result<AgentType> {
        self.get_record("agent/type", id).await
    }

    pub async fn get_agent_transport_type(&self, id: i32) -> Result<AgentTransportType> {
        self.get_record("agent/transport", id).await
    }

    pub async fn get_agent_type_configuration(&self, id: i32) -> Result<AgentTypeConfiguration> {
        self.get_record("agent/configuration", id).await
    }

    pub async fn get_agent_type_operating_system(
        &self,
        id: i32,
    ) -> Result<AgentTypeOperatingSystem> {
        self.get_record("agent/os", id).await
    }

    pub async fn get_agent_type_version(&self, id: i32) -> Result<AgentTypeVersion> {
        self.get_record("agent/version", id).await
    }

    pub async fn get_agent_type_architecture(&self, id: i32) -> Result<AgentTypeArchitecture> {
        self.get_record("agent/architecture", id).await
    }

    // =============================================================================
    // Transports
    // =============================================================================

    pub async fn get_transport(&self, id: i32) -> Result<Transport> {
        self.get_record("transport", id).await
    }

    /// Fetch a single catalog record by its collection path and ID
    async fn get_record<T: DeserializeOwned>(&self, collection: &str, id: i32) -> Result<T> {
        let url = format!("{}/api/v1/{}/{}", self.base_url, collection, id);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }
}
