//! Build locks
//!
//! Builds for one agent type share a working directory and fixed output
//! paths, so two of them must never overlap. A lease is taken per
//! (language, agent type) before the first build command and released when
//! it is dropped, whichever way the run ends.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OwnedMutexGuard;
use tracing::debug;

type LockKey = (String, String);

/// Registry of per-agent-type build locks
#[derive(Clone, Default)]
pub struct BuildLocks {
    locks: Arc<Mutex<HashMap<LockKey, Arc<tokio::sync::Mutex<()>>>>>,
}

/// Exclusive right to build one agent type
pub struct BuildLease {
    _guard: OwnedMutexGuard<()>,
}

impl BuildLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other run holds the lease for this agent type
    pub async fn acquire(&self, language: &str, agent_type: &str) -> BuildLease {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks
                .entry((language.to_string(), agent_type.to_string()))
                .or_default()
                .clone()
        };

        debug!("Waiting for build lease on {}/{}", language, agent_type);
        let guard = lock.lock_owned().await;
        debug!("Acquired build lease on {}/{}", language, agent_type);

        BuildLease { _guard: guard }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_agent_type_is_serialized() {
        let locks = BuildLocks::new();
        let lease = locks.acquire("Rust", "windows-exe").await;

        let blocked = tokio::time::timeout(
            Duration::from_millis(50),
            locks.acquire("Rust", "windows-exe"),
        )
        .await;
        assert!(blocked.is_err());

        drop(lease);
        let acquired = tokio::time::timeout(
            Duration::from_millis(500),
            locks.acquire("Rust", "windows-exe"),
        )
        .await;
        assert!(acquired.is_ok());
    }

    #[tokio::test]
    async fn test_different_agent_types_run_concurrently() {
        let locks = BuildLocks::new();
        let _windows = locks.acquire("Rust", "windows-exe").await;

        let linux =
            tokio::time::timeout(Duration::from_millis(500), locks.acquire("Rust", "linux-elf"))
                .await;
        assert!(linux.is_ok());

        let other_language = tokio::time::timeout(
            Duration::from_millis(500),
            locks.acquire("Go", "windows-exe"),
        )
        .await;
        assert!(other_language.is_ok());
    }
}
