//! Artifacts repository
//!
//! Delivers finished agent binaries to the platform's ingestion endpoint.

use anyhow::{Context, Result};
use armory_client::PlatformClient;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// Repository trait for artifact ingestion
#[async_trait]
pub trait ArtifactRepository: Send + Sync {
    /// Uploads the file at `path` for a payload, authenticated by its build token
    async fn upload(&self, payload_id: i32, build_token: &str, path: &Path) -> Result<()>;
}

/// HTTP implementation of ArtifactRepository
pub struct HttpArtifactRepository {
    client: Arc<PlatformClient>,
}

impl HttpArtifactRepository {
    pub fn new(client: Arc<PlatformClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ArtifactRepository for HttpArtifactRepository {
    async fn upload(&self, payload_id: i32, build_token: &str, path: &Path) -> Result<()> {
        self.client
            .upload_payload_file(payload_id, build_token, path)
            .await
            .with_context(|| {
                format!(
                    "Failed to upload {} for payload {}",
                    path.display(),
                    payload_id
                )
            })
    }
}
