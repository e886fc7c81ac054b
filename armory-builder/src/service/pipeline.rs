//! Build pipeline
//!
//! Handles a single build request end to end:
//! - Resolving the payload and every record it references
//! - Building the transport module, then the agent with the transport embedded
//! - Staging and uploading the finished agent
//! - Reporting exactly one result event
//!
//! The pipeline keeps no state between runs; everything a run needs is
//! resolved from the request.

use anyhow::{Context, Result};
use armory_core::domain::agent::{AgentTransportType, AgentType};
use armory_core::domain::build::BuildConfig;
use armory_core::domain::payload::Payload;
use armory_core::dto::build::BuildRequested;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::{debug, error, info, warn};

use crate::assembler::{BuildLookups, assemble};
use crate::command::{BuildCommand, CommandRunner};
use crate::config::Config;
use crate::outcome::BuildOutcome;
use crate::repository::{ArtifactRepository, PayloadRepository};
use crate::service::locks::BuildLocks;
use crate::service::notifier::ResultNotifier;

/// Filesystem layout and identity a pipeline builds with
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub language_name: String,
    pub agents_path: PathBuf,
    pub output_path: PathBuf,
}

impl From<&Config> for PipelineSettings {
    fn from(config: &Config) -> Self {
        Self {
            language_name: config.language_name.clone(),
            agents_path: config.agents_path.clone(),
            output_path: config.output_path.clone(),
        }
    }
}

/// A payload with every record the build needs
struct ResolvedBuild {
    payload: Payload,
    agent_type: AgentType,
    transport_type: AgentTransportType,
    lookups: BuildLookups,
}

pub struct BuildPipeline {
    settings: PipelineSettings,
    payloads: Arc<dyn PayloadRepository>,
    artifacts: Arc<dyn ArtifactRepository>,
    runner: Arc<dyn CommandRunner>,
    notifier: ResultNotifier,
    locks: BuildLocks,
}

impl BuildPipeline {
    pub fn new(
        settings: PipelineSettings,
        payloads: Arc<dyn PayloadRepository>,
        artifacts: Arc<dyn ArtifactRepository>,
        runner: Arc<dyn CommandRunner>,
        notifier: ResultNotifier,
    ) -> Self {
        Self {
            settings,
            payloads,
            artifacts,
            runner,
            notifier,
            locks: BuildLocks::new(),
        }
    }

    /// Whether this worker is responsible for a request
    pub fn handles(&self, request: &BuildRequested) -> bool {
        request.language_name == self.settings.language_name
    }

    /// Runs a build request to its terminal outcome
    ///
    /// # Returns
    /// `None` if the request targets another language (nothing is read, run or reported),
    /// otherwise the outcome that was reported to the platform. `Err` means the
    /// payload could not be resolved or a build command could not be started;
    /// no event is published in that case.
    pub async fn run(&self, request: &BuildRequested) -> Result<Option<BuildOutcome>> {
        if !self.handles(request) {
            debug!(
                "Build {} is for {}, not {}",
                request.id, request.language_name, self.settings.language_name
            );
            return Ok(None);
        }

        info!(
            "Building payload {} for request {}",
            request.payload_id, request.id
        );

        let build = self.resolve(request.payload_id).await?;

        let _lease = self
            .locks
            .acquire(&self.settings.language_name, &build.agent_type.name)
            .await;

        let outcome = self.build(&build).await?;
        self.notifier.notify(&outcome).await;

        Ok(Some(outcome))
    }

    /// Loads the payload and every record it references
    async fn resolve(&self, payload_id: i32) -> Result<ResolvedBuild> {
        let payload = self.payloads.get_payload(payload_id).await?;

        let agent_type = self.payloads.get_agent_type(payload.agent_type_id).await?;
        let transport_type = self
            .payloads
            .get_agent_transport_type(payload.agent_transport_type_id)
            .await?;
        let lookups = BuildLookups {
            operating_system: self
                .payloads
                .get_operating_system(payload.agent_type_operating_system_id)
                .await?,
            version: self
                .payloads
                .get_version(payload.agent_type_version_id)
                .await?,
            architecture: self
                .payloads
                .get_architecture(payload.agent_type_architecture_id)
                .await?,
            configuration: self
                .payloads
                .get_configuration(payload.agent_type_configuration_id)
                .await?,
            transport: self.payloads.get_transport(payload.transport_id).await?,
        };

        Ok(ResolvedBuild {
            payload,
            agent_type,
            transport_type,
            lookups,
        })
    }

    /// Runs both build stages, then stages and uploads the agent
    ///
    /// Only a build command that cannot be started is returned as `Err`;
    /// every other failure becomes an outcome the platform is told about.
    async fn build(&self, build: &ResolvedBuild) -> Result<BuildOutcome> {
        let agent_name = build.agent_type.name.clone();
        let working_dir = self.settings.agents_path.join(&agent_name);

        let mut config = assemble(&build.payload, &build.lookups);
        let config_file = match write_config(&config) {
            Ok(file) => file,
            Err(e) => return Ok(environment_failed(agent_name, e)),
        };
        debug!("Wrote build config to {}", config_file.path().display());

        // Transport
        let transport_output = working_dir.join(&build.transport_type.build_location);
        if let Err(e) = remove_stale(&transport_output).await {
            return Ok(environment_failed(agent_name, e));
        }

        let command = match BuildCommand::from_template(
            &build.transport_type.build_command,
            config_file.path(),
        ) {
            Ok(command) => command,
            Err(e) => return Ok(environment_failed(agent_name, e)),
        };
        let result = self.runner.run(&working_dir, &command).await?;
        if !result.success() {
            error!(
                "Transport build for {} failed with exit code {}",
                agent_name, result.exit_code
            );
            keep_config(config_file);
            return Ok(BuildOutcome::TransportBuildFailed {
                agent_type: agent_name,
                result,
            });
        }

        let missing_reason = match read_encoded(&transport_output).await {
            Ok(module) => {
                config.transport_module = Some(module);
                format!("{} is empty", transport_output.display())
            }
            Err(e) => format!("{:#}", e),
        };
        if !config.has_transport_module() {
            warn!(
                "Transport build for {} left no usable output: {}",
                agent_name, missing_reason
            );
            return Ok(BuildOutcome::TransportOutputMissing {
                agent_type: agent_name,
                reason: missing_reason,
            });
        }

        // Agent
        if let Err(e) = rewrite_config(config_file.path(), &config).await {
            return Ok(environment_failed(agent_name, e));
        }

        let agent_output = working_dir.join(&build.agent_type.build_location);
        if let Err(e) = remove_stale(&agent_output).await {
            return Ok(environment_failed(agent_name, e));
        }

        let command = match BuildCommand::from_template(
            &build.agent_type.build_command,
            config_file.path(),
        ) {
            Ok(command) => command,
            Err(e) => return Ok(environment_failed(agent_name, e)),
        };
        let result = self.runner.run(&working_dir, &command).await?;
        if !result.success() {
            error!(
                "Agent build for {} failed with exit code {}",
                agent_name, result.exit_code
            );
            keep_config(config_file);
            return Ok(BuildOutcome::AgentBuildFailed {
                agent_type: agent_name,
                result,
            });
        }

        info!("Build of {} successful", agent_name);

        match self.stage_and_upload(build, &agent_output).await {
            Ok((payload, artifact)) => Ok(BuildOutcome::Succeeded { payload, artifact }),
            Err(e) => Ok(BuildOutcome::UploadFailed {
                agent_type: agent_name,
                error: format!("{:#}", e),
            }),
        }
    }

    /// Moves the agent into the output directory, uploads it and flags the payload as built
    async fn stage_and_upload(
        &self,
        build: &ResolvedBuild,
        agent_output: &Path,
    ) -> Result<(Payload, PathBuf)> {
        let file_name = staged_file_name(
            &build.agent_type.name,
            &build.lookups.configuration.name,
            &build.payload.name,
            Utc::now(),
            agent_output,
        );
        let destination = self.settings.output_path.join(file_name);

        tokio::fs::create_dir_all(&self.settings.output_path)
            .await
            .with_context(|| {
                format!(
                    "Failed to create output directory {}",
                    self.settings.output_path.display()
                )
            })?;

        info!(
            "Moving {} to {}",
            agent_output.display(),
            destination.display()
        );
        move_file(agent_output, &destination).await?;

        info!(
            "Uploading {} for payload {}",
            destination.display(),
            build.payload.id
        );
        self.artifacts
            .upload(build.payload.id, &build.payload.build_token, &destination)
            .await?;

        let payload = self.payloads.mark_built(build.payload.id).await?;
        Ok((payload, destination))
    }
}

/// Name of a staged artifact: `{agentType}_{configuration}_{payload}_{timestamp}{ext}`
///
/// The extension is taken from the build tool's raw output. Path separators
/// and `..` in the names are replaced so the artifact stays in the output directory.
pub fn staged_file_name(
    agent_type: &str,
    configuration: &str,
    payload_name: &str,
    built_at: DateTime<Utc>,
    raw_output: &Path,
) -> String {
    let extension = raw_output
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    format!(
        "{}_{}_{}_{}{}",
        file_name_component(agent_type),
        file_name_component(configuration),
        file_name_component(payload_name),
        built_at.format("%Y%m%d%H%M%S"),
        extension
    )
}

fn file_name_component(name: &str) -> String {
    name.replace(['/', '\\'], "_").replace("..", "_")
}

fn environment_failed(agent_type: String, error: anyhow::Error) -> BuildOutcome {
    error!("Build environment for {} failed: {:#}", agent_type, error);
    BuildOutcome::EnvironmentFailed {
        agent_type,
        error: format!("{:#}", error),
    }
}

fn write_config(config: &BuildConfig) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("armory-build-")
        .suffix(".json")
        .tempfile()
        .context("Failed to create build config file")?;

    serde_json::to_writer(&mut file, config).context("Failed to write build config")?;
    file.flush().context("Failed to write build config")?;

    Ok(file)
}

/// Replaces the config file contents; build tools expect a single JSON document
async fn rewrite_config(path: &Path, config: &BuildConfig) -> Result<()> {
    let json = serde_json::to_vec(config).context("Failed to serialize build config")?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to rewrite build config {}", path.display()))
}

/// Leaves a failed build's config on disk for inspection
fn keep_config(file: NamedTempFile) {
    match file.keep() {
        Ok((_, path)) => info!("Build config kept at {}", path.display()),
        Err(e) => warn!("Failed to keep build config: {}", e),
    }
}

/// Deletes output left behind by an earlier build
async fn remove_stale(path: &Path) -> Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            debug!("Removed stale artifact {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e)
            .with_context(|| format!("Failed to remove stale artifact {}", path.display())),
    }
}

/// Reads a build artifact and base64-encodes it
async fn read_encoded(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(BASE64.encode(bytes))
}

/// Moves a file, copying across filesystems when a rename is not possible
async fn move_file(from: &Path, to: &Path) -> Result<()> {
    match tokio::fs::rename(from, to).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            if tokio::fs::try_exists(from).await.unwrap_or(false) {
                Err(e).with_context(|| {
                    format!("Failed to move {} to {}", from.display(), to.display())
                })
            } else {
                Err(e).with_context(|| format!("Build output {} not found", from.display()))
            }
        }
        Err(e) => {
            debug!("Rename failed ({}), copying instead", e);
            tokio::fs::copy(from, to).await.with_context(|| {
                format!("Failed to copy {} to {}", from.display(), to.display())
            })?;
            tokio::fs::remove_file(from)
                .await
                .with_context(|| format!("Failed to remove {}", from.display()))
        }
    }
}
