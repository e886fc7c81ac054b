//! Build request and result event endpoints

use armory_core::dto::build::{BuildRequested, ClaimBuildRequest};
use armory_core::dto::event::{ErrorMessage, PayloadUpdated};
use uuid::Uuid;

use crate::PlatformClient;
use crate::error::Result;

impl PlatformClient {
    // =============================================================================
    // Build Requests
    // =============================================================================

    /// List unclaimed build requests for a language
    pub async fn list_pending_builds(&self, language: &str) -> Result<Vec<BuildRequested>> {
        let url = format!("{}/api/v1/build/pending", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("language", language)])
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Claim a build request so no other worker picks it up
    ///
    /// Fails with a 409 [`crate::ClientError::ApiError`] if another worker got there first.
    pub async fn claim_build(&self, request_id: Uuid, worker_id: &str) -> Result<BuildRequested> {
        let url = format!("{}/api/v1/build/{}/claim", self.base_url, request_id);
        let response = self
            .client
            .post(&url)
            .json(&ClaimBuildRequest {
                worker_id: worker_id.to_string(),
            })
            .send()
            .await?;

        self.handle_response(response).await
    }

    // =============================================================================
    // Result Events
    // =============================================================================

    pub async fn publish_payload_updated(&self, event: &PayloadUpdated) -> Result<()> {
        let url = format!("{}/api/v1/events/payload-updated", self.base_url);
        let response = self.client.post(&url).json(event).send().await?;

        self.handle_empty_response(response).await
    }

    pub async fn publish_error(&self, event: &ErrorMessage) -> Result<()> {
        let url = format!("{}/api/v1/events/error", self.base_url);
        let response = self.client.post(&url).json(event).send().await?;

        self.handle_empty_response(response).await
    }

    // =============================================================================
    // Health
    // =============================================================================

    /// Check that the platform API is up and answering
    pub async fn health(&self) -> Result<()> {
        let url = format!("{}/api/v1/health", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_empty_response(response).await
    }
}
