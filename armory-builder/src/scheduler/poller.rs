//! Build request poller
//!
//! Polls the platform for pending build requests and runs them.
//! Each claimed request runs in its own task; failures of one build never stop the loop.

use anyhow::{Context, Result};
use armory_client::ClientError;
use armory_core::dto::build::BuildRequested;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::outcome::BuildOutcome;
use crate::repository::EventRepository;
use crate::service::BuildPipeline;

/// Poller that continuously picks up and runs build requests
pub struct BuildPoller {
    config: Config,
    events: Arc<dyn EventRepository>,
    pipeline: Arc<BuildPipeline>,
    semaphore: Arc<Semaphore>,
}

impl BuildPoller {
    pub fn new(
        config: Config,
        events: Arc<dyn EventRepository>,
        pipeline: Arc<BuildPipeline>,
    ) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.max_parallel_builds));
        Self {
            config,
            events,
            pipeline,
            semaphore,
        }
    }

    /// Starts the polling loop
    pub async fn run(&self) -> Result<()> {
        info!(
            "Starting build poller (interval: {:?})",
            self.config.poll_interval
        );

        let mut interval = time::interval(self.config.poll_interval);

        loop {
            interval.tick().await;

            debug!("Polling for build requests");

            match self.poll_once().await {
                Ok(started) => {
                    if started > 0 {
                        info!("Ran {} build(s) this cycle", started);
                    }
                }
                Err(e) => {
                    error!("Error during poll cycle: {:#}", e);
                }
            }
        }
    }

    /// Performs a single poll cycle
    ///
    /// # Returns
    /// The number of builds started
    async fn poll_once(&self) -> Result<usize> {
        let requests = self
            .events
            .pending_requests(&self.config.language_name)
            .await
            .context("Failed to fetch build requests")?;

        if requests.is_empty() {
            debug!("No build requests pending");
            return Ok(0);
        }

        let mut handles = Vec::new();

        for request in requests {
            if !self.pipeline.handles(&request) {
                debug!(
                    "Build {} is for {}, not ours",
                    request.id, request.language_name
                );
                continue;
            }

            let Ok(permit) = self.semaphore.clone().try_acquire_owned() else {
                debug!(
                    "Max parallel builds reached, leaving build {} for later",
                    request.id
                );
                continue;
            };

            match self
                .events
                .claim(request.id, &self.config.worker_id)
                .await
            {
                Ok(claimed) => handles.push(self.spawn_build(claimed, permit)),
                Err(e) if is_lost_claim(&e) => {
                    debug!("Build {} was claimed by another worker", request.id)
                }
                Err(e) => warn!("Could not claim build {}: {:#}", request.id, e),
            }
        }

        let started = handles.len();

        for handle in handles {
            if let Err(e) = handle.await {
                warn!("Build task panicked: {}", e);
            }
        }

        Ok(started)
    }

    /// Spawns a task running one build
    fn spawn_build(
        &self,
        request: BuildRequested,
        permit: OwnedSemaphorePermit,
    ) -> tokio::task::JoinHandle<()> {
        let pipeline = Arc::clone(&self.pipeline);

        tokio::spawn(async move {
            let _permit = permit;
            match pipeline.run(&request).await {
                Ok(Some(BuildOutcome::Succeeded { artifact, .. })) => {
                    info!("Build {} succeeded: {}", request.id, artifact.display())
                }
                Ok(Some(_)) => info!("Build {} failed, error reported", request.id),
                Ok(None) => {}
                Err(e) => error!("Build {} aborted: {:#}", request.id, e),
            }
        })
    }
}

/// Whether a claim failed because another worker claimed the request first
fn is_lost_claim(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<ClientError>()
        .is_some_and(ClientError::is_conflict)
}
