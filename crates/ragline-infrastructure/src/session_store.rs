//! Durable session store.
//!
//! Persists the per-client session identifier across process restarts.
//! If durable storage is unavailable the store degrades to a
//! process-lifetime identifier instead of failing; the backend then sees
//! this run as a fresh client, which is the documented degraded mode.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::warn;
use uuid::Uuid;

use ragline_core::error::{RaglineError, Result};
use ragline_core::session::SessionStore;

use crate::state_file::StateFile;

/// Session store backed by the client state file.
///
/// The identifier is resolved once and cached; later calls never touch
/// the filesystem.
pub struct PersistentSessionStore {
    cached: Mutex<Option<String>>,
    file: Arc<StateFile>,
}

impl PersistentSessionStore {
    /// Creates a store over the standard platform state file.
    pub fn new() -> Result<Self> {
        Ok(Self::with_state_file(StateFile::at_default_location()?))
    }

    /// Creates a store over an explicit state file (tests, custom layouts).
    pub fn with_state_file(file: StateFile) -> Self {
        Self {
            cached: Mutex::new(None),
            file: Arc::new(file),
        }
    }

    async fn resolve_from_disk(&self) -> Result<String> {
        let file = self.file.clone();
        let state = tokio::task::spawn_blocking(move || {
            file.update(|state| {
                if state.session_id.is_none() {
                    state.session_id = Some(Uuid::new_v4().to_string());
                }
            })
        })
        .await
        .map_err(|err| RaglineError::internal(format!("state file task failed: {err}")))??;

        state
            .session_id
            .ok_or_else(|| RaglineError::internal("session identifier missing after update"))
    }
}

#[async_trait::async_trait]
impl SessionStore for PersistentSessionStore {
    async fn get_or_create(&self) -> String {
        let mut cached = self.cached.lock().await;
        if let Some(id) = cached.as_ref() {
            return id.clone();
        }

        let id = match self.resolve_from_disk().await {
            Ok(id) => id,
            Err(err) => {
                // Degraded mode: identifier survives this process only.
                warn!(error = %err, "session storage unavailable, using process-lifetime identifier");
                Uuid::new_v4().to_string()
            }
        };
        *cached = Some(id.clone());
        id
    }

    async fn clear(&self) -> anyhow::Result<()> {
        let mut cached = self.cached.lock().await;
        *cached = None;

        let file = self.file.clone();
        tokio::task::spawn_blocking(move || {
            file.update(|state| {
                state.session_id = None;
            })
        })
        .await
        .map_err(|err| RaglineError::internal(format!("state file task failed: {err}")))??;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> PersistentSessionStore {
        PersistentSessionStore::with_state_file(StateFile::new(dir.path().join("state.toml")))
    }

    #[tokio::test]
    async fn mints_and_persists_on_first_run() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let id = store.get_or_create().await;
        assert!(Uuid::parse_str(&id).is_ok());

        let on_disk = StateFile::new(dir.path().join("state.toml"))
            .load()
            .unwrap()
            .unwrap();
        assert_eq!(on_disk.session_id.as_deref(), Some(id.as_str()));
    }

    #[tokio::test]
    async fn consecutive_calls_return_the_same_id() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let first = store.get_or_create().await;
        let second = store.get_or_create().await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn identifier_survives_a_new_store_over_the_same_file() {
        let dir = TempDir::new().unwrap();

        let first = store_in(&dir).get_or_create().await;
        let second = store_in(&dir).get_or_create().await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn clear_mints_a_fresh_identifier() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let first = store.get_or_create().await;
        store.clear().await.unwrap();
        let second = store.get_or_create().await;
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn unwritable_storage_degrades_to_process_lifetime_id() {
        // A state path whose parent is a file cannot be created.
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "a file, not a directory").unwrap();
        let store = PersistentSessionStore::with_state_file(StateFile::new(
            blocker.join("state.toml"),
        ));

        let first = store.get_or_create().await;
        let second = store.get_or_create().await;

        // Still a stable identifier within the process.
        assert!(Uuid::parse_str(&first).is_ok());
        assert_eq!(first, second);
    }
}
