//! Armory Build Worker
//!
//! A stateless worker that turns payload build requests into agent binaries.
//!
//! Architecture:
//! - Configuration: Load settings from flags or environment
//! - Repositories: HTTP communication with the platform (payloads, artifacts, events)
//! - Services: Build pipeline, per-agent-type build locks, result notification
//! - Scheduler: Build request polling
//!
//! The worker polls the platform for build requests in its language, builds
//! the transport module and then the agent with external build tooling, and
//! uploads the finished agent.

mod assembler;
mod command;
mod config;
mod outcome;
mod repository;
mod scheduler;
mod service;
#[cfg(test)]
mod testing;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::command::ProcessCommandRunner;
use crate::config::Config;
use crate::repository::{HttpArtifactRepository, HttpEventRepository, HttpPayloadRepository};
use crate::scheduler::BuildPoller;
use crate::service::{BuildPipeline, PipelineSettings, ResultNotifier};
use armory_client::PlatformClient;

#[derive(Parser)]
#[command(name = "armory-builder")]
#[command(about = "Builds agent payloads for one language", long_about = None)]
struct Cli {
    /// Language this worker builds agents for
    #[arg(long, env = "LANGUAGE_NAME")]
    language_name: String,

    /// Unique identifier for this worker (random if unset)
    #[arg(long, env = "WORKER_ID")]
    worker_id: Option<String>,

    /// Platform API URL
    #[arg(long, env = "PLATFORM_URL", default_value = "http://api:5000")]
    platform_url: String,

    /// Directory holding one subdirectory of build tooling per agent type
    #[arg(long, env = "AGENTS_PATH", default_value = "/opt/armory/agents")]
    agents_path: PathBuf,

    /// Directory finished artifacts are staged in (default: {AGENTS_PATH}/build)
    #[arg(long, env = "BUILD_OUTPUT_PATH")]
    output_path: Option<PathBuf>,

    /// Seconds between polls for build requests
    #[arg(long, env = "POLL_INTERVAL", default_value_t = 5)]
    poll_interval: u64,

    /// Max builds running at once
    #[arg(long, env = "MAX_PARALLEL_BUILDS", default_value_t = 2)]
    max_parallel_builds: usize,

    /// Seconds a single build command may run (0 = no limit)
    #[arg(long, env = "BUILD_TIMEOUT", default_value_t = 0)]
    build_timeout: u64,
}

impl Cli {
    fn into_config(self) -> Config {
        let defaults = Config::default();
        let mut config = Config::new(
            self.worker_id.unwrap_or(defaults.worker_id),
            self.language_name,
            self.platform_url,
        )
        .with_agents_path(self.agents_path);

        if let Some(output_path) = self.output_path {
            config.output_path = output_path;
        }
        config.poll_interval = Duration::from_secs(self.poll_interval);
        config.max_parallel_builds = self.max_parallel_builds;
        config.build_timeout =
            (self.build_timeout > 0).then(|| Duration::from_secs(self.build_timeout));
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "armory_builder=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Armory build worker");

    let config = Cli::parse().into_config();
    config.validate()?;
    info!(
        "Loaded configuration: worker_id={}, language={}, platform_url={}, agents_path={}",
        config.worker_id,
        config.language_name,
        config.platform_url,
        config.agents_path.display()
    );

    let client = Arc::new(PlatformClient::new(config.platform_url.clone()));

    info!("Waiting for the platform API");
    wait_for_platform(&client).await?;
    info!("Platform API is up");

    let events = Arc::new(HttpEventRepository::new(Arc::clone(&client)));
    let pipeline = Arc::new(BuildPipeline::new(
        PipelineSettings::from(&config),
        Arc::new(HttpPayloadRepository::new(Arc::clone(&client))),
        Arc::new(HttpArtifactRepository::new(Arc::clone(&client))),
        Arc::new(ProcessCommandRunner::new(config.build_timeout)),
        ResultNotifier::new(events.clone(), &config.language_name),
    ));

    info!(
        "Poll interval: {:?}, max parallel builds: {}, build timeout: {:?}",
        config.poll_interval, config.max_parallel_builds, config.build_timeout
    );

    let poller = BuildPoller::new(config, events, pipeline);
    if let Err(e) = poller.run().await {
        error!("Poller error: {}", e);
        return Err(e);
    }

    Ok(())
}

/// Waits for the platform API with exponential backoff
///
/// The worker usually starts alongside the platform in a container
/// environment, before the API is accepting requests.
async fn wait_for_platform(client: &PlatformClient) -> Result<()> {
    const MAX_RETRIES: u32 = 10;
    const INITIAL_DELAY_MS: u64 = 500;
    const MAX_DELAY_MS: u64 = 30_000;

    let mut attempt = 0;
    let mut delay_ms = INITIAL_DELAY_MS;

    loop {
        attempt += 1;

        match client.health().await {
            Ok(()) => {
                if attempt > 1 {
                    info!("Platform answered after {} attempt(s)", attempt);
                }
                return Ok(());
            }
            Err(e) => {
                if attempt >= MAX_RETRIES {
                    error!("Platform did not answer after {} attempts", MAX_RETRIES);
                    return Err(anyhow::anyhow!("Platform API not reachable: {}", e));
                }

                warn!(
                    "Platform not ready (attempt {}/{}): {}",
                    attempt, MAX_RETRIES, e
                );
                warn!("Retrying in {} ms...", delay_ms);

                tokio::time::sleep(Duration::from_millis(delay_ms)).await;

                delay_ms = (delay_ms * 2).min(MAX_DELAY_MS);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let config = Cli::parse_from(["armory-builder", "--language-name", "Rust"]).into_config();

        assert_eq!(config.language_name, "Rust");
        assert_eq!(config.platform_url, "http://api:5000");
        assert_eq!(config.output_path, PathBuf::from("/opt/armory/agents/build"));
        assert!(config.build_timeout.is_none());
        assert!(!config.worker_id.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_overrides() {
        let config = Cli::parse_from([
            "armory-builder",
            "--language-name",
            "Rust",
            "--worker-id",
            "builder-1",
            "--agents-path",
            "/srv/agents",
            "--output-path",
            "/srv/out",
            "--build-timeout",
            "600",
            "--max-parallel-builds",
            "4",
        ])
        .into_config();

        assert_eq!(config.worker_id, "builder-1");
        assert_eq!(config.agents_path, PathBuf::from("/srv/agents"));
        assert_eq!(config.output_path, PathBuf::from("/srv/out"));
        assert_eq!(config.build_timeout, Some(Duration::from_secs(600)));
        assert_eq!(config.max_parallel_builds, 4);
    }
}
