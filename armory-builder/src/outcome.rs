//! Build outcomes
//!
//! These types only exist while a build request is being handled.
//! Each terminal outcome maps to exactly one event sent back to the platform.

use armory_core::domain::payload::Payload;
use armory_core::dto::event::{ErrorMessage, PayloadUpdated};
use std::path::PathBuf;

use crate::command::CommandResult;

/// How a build run ended
#[derive(Debug, Clone)]
pub enum BuildOutcome {
    /// The transport build command failed
    TransportBuildFailed {
        agent_type: String,
        result: CommandResult,
    },
    /// The transport build exited cleanly but left nothing usable behind
    TransportOutputMissing { agent_type: String, reason: String },
    /// The agent build command failed
    AgentBuildFailed {
        agent_type: String,
        result: CommandResult,
    },
    /// The build environment broke before or between the build commands
    EnvironmentFailed { agent_type: String, error: String },
    /// Moving, uploading or recording the finished artifact failed
    UploadFailed { agent_type: String, error: String },
    /// Artifact uploaded and payload flagged as built
    Succeeded { payload: Payload, artifact: PathBuf },
}

/// Event reporting a build outcome
#[derive(Debug, Clone, PartialEq)]
pub enum BuildEvent {
    Succeeded(PayloadUpdated),
    Failed(ErrorMessage),
}

impl BuildOutcome {
    /// Converts the outcome to the event reported to the platform
    ///
    /// # Arguments
    /// * `source` - Label identifying this worker in error events
    pub fn to_event(&self, source: &str) -> BuildEvent {
        let failed = |message: String, details: String| {
            BuildEvent::Failed(ErrorMessage {
                source: source.to_string(),
                message,
                details,
            })
        };

        match self {
            BuildOutcome::TransportBuildFailed { agent_type, result }
            | BuildOutcome::AgentBuildFailed { agent_type, result } => failed(
                format!("Error building {}", agent_type),
                format!("Stdout: {}\n Stderr: {}", result.stdout, result.stderr),
            ),
            BuildOutcome::TransportOutputMissing { agent_type, reason } => failed(
                format!("Error building {}", agent_type),
                format!(
                    "Tried to build an agent without a Base64 encoded transport string. \
                     Transport build must have failed: {}",
                    reason
                ),
            ),
            BuildOutcome::EnvironmentFailed { agent_type, error } => failed(
                format!("Error building {}", agent_type),
                error.clone(),
            ),
            BuildOutcome::UploadFailed { agent_type, error } => failed(
                format!("Error uploading {} payload to API", agent_type),
                error.clone(),
            ),
            BuildOutcome::Succeeded { payload, .. } => BuildEvent::Succeeded(PayloadUpdated {
                success: true,
                payload: payload.clone(),
            }),
        }
    }
}
