//! Armory HTTP Client
//!
//! A simple, type-safe HTTP client for the platform API the build worker reports to.
//!
//! The platform owns storage, the event bus and artifact ingestion; this crate
//! exposes each of those as plain async methods so the worker never deals with
//! URLs or status codes directly.
//!
//! # Example
//!
//! ```no_run
//! use armory_client::PlatformClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = PlatformClient::new("http://api:5000");
//!
//!     let payload = client.get_payload(42).await?;
//!     println!("Payload {} built: {}", payload.name, payload.built);
//!     Ok(())
//! }
//! ```

pub mod error;
mod builds;
mod catalog;
mod payloads;

// Re-export commonly used types
pub use error::{ClientError, Result};

use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the platform API
///
/// Methods are organized into logical groups:
/// - Payload reads, updates and artifact upload
/// - Agent/transport catalog lookups
/// - Build request polling, claiming and result events
#[derive(Debug, Clone)]
pub struct PlatformClient {
    /// Base URL of the platform API (e.g., "http://api:5000")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl PlatformClient {
    /// Create a new platform client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the platform API (e.g., "http://api:5000")
    ///
    /// # Example
    /// ```
    /// use armory_client::PlatformClient;
    ///
    /// let client = PlatformClient::new("http://api:5000");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new platform client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the platform API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response whose body is irrelevant
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(())
    }
}
