//! External build command execution
//!
//! Build commands are opaque to the worker: it only looks at their exit status
//! and captured output. Commands are exec'd as argument vectors, never through
//! a shell, so names and paths cannot inject extra commands.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::fmt;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Exit code reported for a command killed after exceeding its time limit
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// Outcome of a finished build command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0 && !self.timed_out
    }
}

/// A build command ready to execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl BuildCommand {
    /// Builds a command from a type's build command template
    ///
    /// The template is split on whitespace; the config file path is appended
    /// as the final argument.
    pub fn from_template(template: &str, config_path: &Path) -> Result<Self> {
        let mut parts = template.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| anyhow::anyhow!("Build command template is empty"))?;

        let mut args: Vec<String> = parts.collect();
        args.push(config_path.to_string_lossy().to_string());

        Ok(Self { program, args })
    }
}

impl fmt::Display for BuildCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Runs build commands
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs a command to completion inside `working_dir`
    ///
    /// A non-zero exit is reported through [`CommandResult`]; `Err` means the
    /// process could not be started at all.
    async fn run(&self, working_dir: &Path, command: &BuildCommand) -> Result<CommandResult>;
}

/// Runs commands as local child processes
pub struct ProcessCommandRunner {
    timeout: Option<Duration>,
}

impl ProcessCommandRunner {
    /// Creates a runner; `timeout` bounds each command, `None` waits forever
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl CommandRunner for ProcessCommandRunner {
    async fn run(&self, working_dir: &Path, command: &BuildCommand) -> Result<CommandResult> {
        info!(
            "Executing build command in {}: {}",
            working_dir.display(),
            command
        );

        let child = Command::new(&command.program)
            .args(&command.args)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to start build command '{}'", command.program))?;

        let output = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(output) => output,
                Err(_) => {
                    // Dropping the wait future drops the child, which kills it
                    warn!("Build command timed out after {:?}: {}", limit, command);
                    return Ok(CommandResult {
                        exit_code: TIMEOUT_EXIT_CODE,
                        stdout: String::new(),
                        stderr: format!("Build command timed out after {:?}", limit),
                        timed_out: true,
                    });
                }
            },
            None => child.wait_with_output().await,
        }
        .with_context(|| format!("Failed to wait for build command '{}'", command.program))?;

        let result = CommandResult {
            exit_code: output.status.code().unwrap_or(1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            timed_out: false,
        };

        debug!(
            "Build command finished: exit_code={}, stdout_len={}, stderr_len={}",
            result.exit_code,
            result.stdout.len(),
            result.stderr.len()
        );

        Ok(result)
    }
}
