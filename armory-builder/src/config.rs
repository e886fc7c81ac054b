//! Worker configuration
//!
//! Defines all configurable parameters for the build worker: which language it
//! builds for, where the agent tooling lives, where finished artifacts go, and
//! how it talks to the platform.

use std::path::PathBuf;
use std::time::Duration;

/// Build worker configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Unique identifier for this worker instance
    pub worker_id: String,

    /// Language this worker builds agents for; requests for other languages are ignored
    pub language_name: String,

    /// Platform API base URL (e.g., "http://api:5000")
    pub platform_url: String,

    /// Root directory holding one subdirectory of build tooling per agent type
    pub agents_path: PathBuf,

    /// Directory finished artifacts are moved into before upload
    pub output_path: PathBuf,

    /// How often to poll the platform for new build requests
    pub poll_interval: Duration,

    /// Max parallel builds the worker runs
    pub max_parallel_builds: usize,

    /// Upper bound on a single build command; `None` waits indefinitely
    pub build_timeout: Option<Duration>,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(worker_id: String, language_name: String, platform_url: String) -> Self {
        let agents_path = PathBuf::from("/opt/armory/agents");
        Self {
            worker_id,
            language_name,
            platform_url,
            output_path: agents_path.join("build"),
            agents_path,
            poll_interval: Duration::from_secs(5),
            max_parallel_builds: 2,
            build_timeout: None,
        }
    }

    /// Sets the agents root, keeping the output directory inside it
    pub fn with_agents_path(mut self, agents_path: PathBuf) -> Self {
        self.output_path = agents_path.join("build");
        self.agents_path = agents_path;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.worker_id.is_empty() {
            anyhow::bail!("worker_id cannot be empty");
        }

        if self.language_name.trim().is_empty() {
            anyhow::bail!("language_name cannot be empty");
        }

        if !self.platform_url.starts_with("http://") && !self.platform_url.starts_with("https://")
        {
            anyhow::bail!("platform_url must start with http:// or https://");
        }

        if self.agents_path.as_os_str().is_empty() {
            anyhow::bail!("agents_path cannot be empty");
        }

        if self.poll_interval.as_secs() == 0 {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.max_parallel_builds == 0 {
            anyhow::bail!("max_parallel_builds must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            uuid::Uuid::new_v4().to_string(),
            "Rust".to_string(),
            "http://api:5000".to_string(),
        )
    }
}
