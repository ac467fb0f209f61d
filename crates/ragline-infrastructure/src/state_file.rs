//! Atomic persistence for the client state document.
//!
//! The client persists exactly one small TOML document. Writes go through
//! a temporary file, an fsync, and an atomic rename, under an exclusive
//! file lock, so a crash mid-write can never leave a truncated document
//! behind and two processes of the same install cannot interleave updates.

use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use ragline_core::error::{RaglineError, Result};

use crate::paths::RaglinePaths;

/// Durable client-side state. One key: the session identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientState {
    /// Opaque identifier correlating this install's conversation turns.
    pub session_id: Option<String>,
}

/// Handle to the client state file.
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    /// Creates a handle for an explicit path (tests, custom layouts).
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Creates a handle at the standard platform location.
    pub fn at_default_location() -> Result<Self> {
        let path = RaglinePaths::state_file()
            .map_err(|err| RaglineError::config(err.to_string()))?;
        Ok(Self::new(path))
    }

    /// Loads the state document.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(ClientState))`: Successfully loaded and parsed
    /// - `Ok(None)`: File doesn't exist or is empty
    /// - `Err`: Failed to read or parse the file
    pub fn load(&self) -> Result<Option<ClientState>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        let state: ClientState = toml::from_str(&content)?;
        Ok(Some(state))
    }

    /// Saves the state document atomically.
    pub fn save(&self, state: &ClientState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let toml_string = toml::to_string_pretty(state)?;

        // Write to a temporary file in the same directory, then rename.
        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(toml_string.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }

    /// Performs a locked read-modify-write and returns the updated state.
    pub fn update<F>(&self, mutate: F) -> Result<ClientState>
    where
        F: FnOnce(&mut ClientState),
    {
        let _lock = FileLock::acquire(&self.path)?;

        let mut state = self.load()?.unwrap_or_default();
        mutate(&mut state);
        self.save(&state)?;

        Ok(state)
    }

    fn temp_path(&self) -> Result<PathBuf> {
        let parent = self.path.parent().ok_or_else(|| {
            RaglineError::storage(format!(
                "state path has no parent directory: {}",
                self.path.display()
            ))
        })?;
        let file_name = self.path.file_name().ok_or_else(|| {
            RaglineError::storage(format!(
                "state path has no file name: {}",
                self.path.display()
            ))
        })?;
        let tmp_name = format!(".{}.tmp", file_name.to_string_lossy());
        Ok(parent.join(tmp_name))
    }
}

/// A file lock guard that releases the lock when dropped.
struct FileLock {
    #[allow(dead_code)]
    file: File,
    lock_path: PathBuf,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self> {
        let lock_path = path.with_extension("lock");

        if let Some(parent) = lock_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        #[cfg(unix)]
        {
            use fs2::FileExt;
            file.lock_exclusive().map_err(|err| {
                RaglineError::storage(format!("failed to acquire state lock: {err}"))
            })?;
        }

        // Non-Unix platforms run without the advisory lock; the atomic
        // rename still protects against torn writes.

        Ok(FileLock { file, lock_path })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // Unlock is automatic when the file handle is dropped.
        let _ = fs::remove_file(&self.lock_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn state_file(dir: &TempDir) -> StateFile {
        StateFile::new(dir.path().join("state.toml"))
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let file = state_file(&dir);

        let state = ClientState {
            session_id: Some("abc-123".to_string()),
        };
        file.save(&state).unwrap();

        let loaded = file.load().unwrap().unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn load_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let file = state_file(&dir);
        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn load_empty_file_is_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.toml");
        fs::write(&path, "  \n").unwrap();
        let file = StateFile::new(path);
        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn update_creates_the_document_on_first_use() {
        let dir = TempDir::new().unwrap();
        let file = state_file(&dir);

        let state = file
            .update(|state| {
                state.session_id = Some("minted".to_string());
            })
            .unwrap();

        assert_eq!(state.session_id.as_deref(), Some("minted"));
        let reloaded = file.load().unwrap().unwrap();
        assert_eq!(reloaded.session_id.as_deref(), Some("minted"));
    }

    #[test]
    fn update_preserves_existing_values() {
        let dir = TempDir::new().unwrap();
        let file = state_file(&dir);
        file.save(&ClientState {
            session_id: Some("existing".to_string()),
        })
        .unwrap();

        let state = file.update(|_state| {}).unwrap();
        assert_eq!(state.session_id.as_deref(), Some("existing"));
    }

    #[test]
    fn no_temp_file_left_behind() {
        let dir = TempDir::new().unwrap();
        let file = state_file(&dir);
        file.save(&ClientState::default()).unwrap();

        assert!(dir.path().join("state.toml").exists());
        assert!(!dir.path().join(".state.toml.tmp").exists());
    }

    #[test]
    fn corrupt_document_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.toml");
        fs::write(&path, "session_id = [not valid").unwrap();
        let file = StateFile::new(path);
        assert!(file.load().is_err());
    }
}
