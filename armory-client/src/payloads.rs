//! Payload-related API endpoints

use std::path::Path;

use armory_core::domain::payload::Payload;
use armory_core::dto::payload::UpdatePayload;
use reqwest::multipart::{Form, Part};
use tracing::debug;

use crate::PlatformClient;
use crate::error::{ClientError, Result};

/// Header the ingestion endpoint reads the payload's build token from
pub const BUILD_TOKEN_HEADER: &str = "build-token";

impl PlatformClient {
    /// Get a payload by ID
    pub async fn get_payload(&self, payload_id: i32) -> Result<Payload> {
        let url = format!("{}/api/v1/payload/{}", self.base_url, payload_id);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// Flag a payload as built
    ///
    /// # Returns
    /// The updated payload record
    pub async fn mark_payload_built(&self, payload_id: i32) -> Result<Payload> {
        let url = format!("{}/api/v1/payload/{}", self.base_url, payload_id);
        let response = self
            .client
            .patch(&url)
            .json(&UpdatePayload { built: true })
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Upload a built artifact for a payload
    ///
    /// # Arguments
    /// * `payload_id` - The payload the artifact belongs to
    /// * `build_token` - The payload's build token, proving the upload is authorized
    /// * `path` - Local path of the artifact
    ///
    /// # Example
    /// ```no_run
    /// # use armory_client::PlatformClient;
    /// # async fn example() -> anyhow::Result<()> {
    /// let client = PlatformClient::new("http://api:5000");
    /// client.upload_payload_file(42, "tok-123", "/opt/agents/build/agent.exe".as_ref()).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn upload_payload_file(
        &self,
        payload_id: i32,
        build_token: &str,
        path: &Path,
    ) -> Result<()> {
        let url = format!("{}/api/v1/payload/{}/file/", self.base_url, payload_id);

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ClientError::FileError {
                path: path.display().to_string(),
                source,
            })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "payload".to_string());

        debug!(
            "Uploading {} ({} bytes) to {}",
            file_name,
            bytes.len(),
            url
        );

        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name));
        let response = self
            .client
            .post(&url)
            .header(BUILD_TOKEN_HEADER, build_token)
            .multipart(form)
            .send()
            .await?;

        self.handle_empty_response(response).await
    }
}
