//! Events repository
//!
//! Inbound build requests and outbound result events.

use anyhow::{Context, Result};
use armory_client::PlatformClient;
use armory_core::dto::build::BuildRequested;
use armory_core::dto::event::{ErrorMessage, PayloadUpdated};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// Repository trait for build requests and result events
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Fetches build requests no worker has claimed yet
    async fn pending_requests(&self, language: &str) -> Result<Vec<BuildRequested>>;

    /// Claims a build request for this worker
    async fn claim(&self, request_id: Uuid, worker_id: &str) -> Result<BuildRequested>;

    async fn publish_succeeded(&self, event: PayloadUpdated) -> Result<()>;

    async fn publish_failed(&self, event: ErrorMessage) -> Result<()>;
}

/// HTTP implementation of EventRepository
pub struct HttpEventRepository {
    client: Arc<PlatformClient>,
}

impl HttpEventRepository {
    pub fn new(client: Arc<PlatformClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EventRepository for HttpEventRepository {
    async fn pending_requests(&self, language: &str) -> Result<Vec<BuildRequested>> {
        self.client
            .list_pending_builds(language)
            .await
            .context("Failed to fetch pending build requests")
    }

    async fn claim(&self, request_id: Uuid, worker_id: &str) -> Result<BuildRequested> {
        self.client
            .claim_build(request_id, worker_id)
            .await
            .with_context(|| format!("Failed to claim build request {}", request_id))
    }

    async fn publish_succeeded(&self, event: PayloadUpdated) -> Result<()> {
        self.client
            .publish_payload_updated(&event)
            .await
            .context("Failed to publish payload update")
    }

    async fn publish_failed(&self, event: ErrorMessage) -> Result<()> {
        self.client
            .publish_error(&event)
            .await
            .context("Failed to publish build error")
    }
}
