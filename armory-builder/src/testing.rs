//! In-memory collaborators for tests

use anyhow::{Result, bail};
use armory_client::ClientError;
use armory_core::domain::agent::{
    AgentTransportType, AgentType, AgentTypeArchitecture, AgentTypeConfiguration,
    AgentTypeOperatingSystem, AgentTypeVersion,
};
use armory_core::domain::payload::Payload;
use armory_core::domain::transport::Transport;
use armory_core::dto::build::BuildRequested;
use armory_core::dto::event::{ErrorMessage, PayloadUpdated};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use uuid::Uuid;

use crate::command::{BuildCommand, CommandResult, CommandRunner, ProcessCommandRunner};
use crate::repository::{ArtifactRepository, EventRepository, PayloadRepository};

pub fn sample_payload() -> Payload {
    Payload {
        id: 42,
        name: "beacon1".to_string(),
        key: "k3y".to_string(),
        beacon_interval: 5,
        jitter: 10,
        expiration_date: None,
        debug: false,
        build_token: "tok-123".to_string(),
        built: false,
        agent_type_id: 1,
        agent_type_configuration_id: 2,
        agent_type_operating_system_id: 3,
        agent_type_version_id: 4,
        agent_type_architecture_id: 5,
        agent_transport_type_id: 6,
        transport_id: 7,
    }
}

pub fn build_request(language: &str) -> BuildRequested {
    BuildRequested {
        id: Uuid::new_v4(),
        payload_id: 42,
        language_name: language.to_string(),
    }
}

/// Payload storage holding a single payload and its lookups
pub struct InMemoryPayloadRepository {
    pub payload: Mutex<Payload>,
    pub agent_type: AgentType,
    pub transport_type: AgentTransportType,
    /// When false every transport lookup fails
    pub has_transport: bool,
    reads: AtomicUsize,
    built_marks: AtomicUsize,
}

impl InMemoryPayloadRepository {
    /// Agent type "windows-exe" (`sh agent.sh` -> out.exe) with transport
    /// type "http" (`sh transport.sh` -> transport.so)
    pub fn new() -> Self {
        Self {
            payload: Mutex::new(sample_payload()),
            agent_type: AgentType {
                id: 1,
                name: "windows-exe".to_string(),
                build_command: "sh agent.sh".to_string(),
                build_location: "out.exe".to_string(),
            },
            transport_type: AgentTransportType {
                id: 6,
                name: "http".to_string(),
                transport_type_guid: None,
                build_command: "sh transport.sh".to_string(),
                build_location: "transport.so".to_string(),
                configuration: None,
            },
            has_transport: true,
            reads: AtomicUsize::new(0),
            built_marks: AtomicUsize::new(0),
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn built_marks(&self) -> usize {
        self.built_marks.load(Ordering::SeqCst)
    }

    pub fn is_built(&self) -> bool {
        self.payload.lock().unwrap().built
    }

    fn read(&self) {
        self.reads.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl PayloadRepository for InMemoryPayloadRepository {
    async fn get_payload(&self, id: i32) -> Result<Payload> {
        self.read();
        let payload = self.payload.lock().unwrap().clone();
        if payload.id != id {
            bail!("payload {} not found", id);
        }
        Ok(payload)
    }

    async fn get_agent_type(&self, _id: i32) -> Result<AgentType> {
        self.read();
        Ok(self.agent_type.clone())
    }

    async fn get_agent_transport_type(&self, _id: i32) -> Result<AgentTransportType> {
        self.read();
        Ok(self.transport_type.clone())
    }

    async fn get_configuration(&self, id: i32) -> Result<AgentTypeConfiguration> {
        self.read();
        Ok(AgentTypeConfiguration {
            id,
            name: "Release".to_string(),
        })
    }

    async fn get_operating_system(&self, id: i32) -> Result<AgentTypeOperatingSystem> {
        self.read();
        Ok(AgentTypeOperatingSystem {
            id,
            name: "Windows".to_string(),
        })
    }

    async fn get_version(&self, id: i32) -> Result<AgentTypeVersion> {
        self.read();
        Ok(AgentTypeVersion {
            id,
            name: "10".to_string(),
        })
    }

    async fn get_architecture(&self, id: i32) -> Result<AgentTypeArchitecture> {
        self.read();
        Ok(AgentTypeArchitecture {
            id,
            name: "x64".to_string(),
        })
    }

    async fn get_transport(&self, id: i32) -> Result<Transport> {
        self.read();
        if !self.has_transport {
            bail!("transport {} not found", id);
        }
        Ok(Transport {
            id,
            name: "Default HTTP".to_string(),
            transport_type: "HTTP".to_string(),
            configuration: serde_json::json!({"Url": "https://c2.local"}),
        })
    }

    async fn mark_built(&self, _id: i32) -> Result<Payload> {
        self.built_marks.fetch_add(1, Ordering::SeqCst);
        let mut payload = self.payload.lock().unwrap();
        payload.built = true;
        Ok(payload.clone())
    }
}

/// A recorded artifact upload
#[derive(Debug, Clone)]
pub struct Upload {
    pub payload_id: i32,
    pub build_token: String,
    pub path: PathBuf,
    pub contents: Vec<u8>,
}

/// Artifact ingestion that records uploads, or rejects them all
#[derive(Default)]
pub struct RecordingArtifactRepository {
    pub reject: bool,
    uploads: Mutex<Vec<Upload>>,
}

impl RecordingArtifactRepository {
    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    pub fn uploads(&self) -> Vec<Upload> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArtifactRepository for RecordingArtifactRepository {
    async fn upload(&self, payload_id: i32, build_token: &str, path: &Path) -> Result<()> {
        if self.reject {
            bail!("API error (status 401): invalid build token");
        }
        let contents = std::fs::read(path)?;
        self.uploads.lock().unwrap().push(Upload {
            payload_id,
            build_token: build_token.to_string(),
            path: path.to_path_buf(),
            contents,
        });
        Ok(())
    }
}

/// Event bus that records everything published to it
#[derive(Default)]
pub struct RecordingEventRepository {
    pub pending: Mutex<Vec<BuildRequested>>,
    pub unavailable: bool,
    /// When true every claim is lost to another worker
    pub claims_taken: bool,
    claims: Mutex<Vec<(Uuid, String)>>,
    succeeded: Mutex<Vec<PayloadUpdated>>,
    failed: Mutex<Vec<ErrorMessage>>,
}

impl RecordingEventRepository {
    /// Every call fails as if the platform were down
    pub fn failing() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn with_pending(requests: Vec<BuildRequested>) -> Self {
        Self {
            pending: Mutex::new(requests),
            ..Self::default()
        }
    }

    /// Every claim answers 409 as if another worker got there first
    pub fn with_taken_claims(requests: Vec<BuildRequested>) -> Self {
        Self {
            claims_taken: true,
            ..Self::with_pending(requests)
        }
    }

    pub fn claims(&self) -> Vec<(Uuid, String)> {
        self.claims.lock().unwrap().clone()
    }

    pub fn succeeded(&self) -> Vec<PayloadUpdated> {
        self.succeeded.lock().unwrap().clone()
    }

    pub fn failed(&self) -> Vec<ErrorMessage> {
        self.failed.lock().unwrap().clone()
    }

    pub fn published(&self) -> usize {
        self.succeeded().len() + self.failed().len()
    }
}

#[async_trait]
impl EventRepository for RecordingEventRepository {
    async fn pending_requests(&self, _language: &str) -> Result<Vec<BuildRequested>> {
        if self.unavailable {
            bail!("platform unavailable");
        }
        Ok(self.pending.lock().unwrap().drain(..).collect())
    }

    async fn claim(&self, request_id: Uuid, worker_id: &str) -> Result<BuildRequested> {
        if self.unavailable {
            bail!("platform unavailable");
        }
        if self.claims_taken {
            let conflict = ClientError::api_error(409, "build already claimed");
            return Err(anyhow::Error::new(conflict)
                .context(format!("Failed to claim build request {}", request_id)));
        }
        self.claims
            .lock()
            .unwrap()
            .push((request_id, worker_id.to_string()));
        Ok(BuildRequested {
            id: request_id,
            payload_id: 42,
            language_name: "Rust".to_string(),
        })
    }

    async fn publish_succeeded(&self, event: PayloadUpdated) -> Result<()> {
        if self.unavailable {
            bail!("platform unavailable");
        }
        self.succeeded.lock().unwrap().push(event);
        Ok(())
    }

    async fn publish_failed(&self, event: ErrorMessage) -> Result<()> {
        if self.unavailable {
            bail!("platform unavailable");
        }
        self.failed.lock().unwrap().push(event);
        Ok(())
    }
}

/// Runs commands for real and remembers which ones ran
pub struct RecordingCommandRunner {
    inner: ProcessCommandRunner,
    commands: Mutex<Vec<BuildCommand>>,
}

impl RecordingCommandRunner {
    pub fn new() -> Self {
        Self::with_timeout(None)
    }

    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        Self {
            inner: ProcessCommandRunner::new(timeout),
            commands: Mutex::new(Vec::new()),
        }
    }

    pub fn commands(&self) -> Vec<BuildCommand> {
        self.commands.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for RecordingCommandRunner {
    async fn run(&self, working_dir: &Path, command: &BuildCommand) -> Result<CommandResult> {
        self.commands.lock().unwrap().push(command.clone());
        self.inner.run(working_dir, command).await
    }
}
