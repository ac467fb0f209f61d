//! Unified path management for ragline client files.
//!
//! All durable client files live under one platform config directory so
//! that an install can be inspected or wiped in one place.

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Unified path management for the ragline client.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/ragline/           # Config directory (XDG on Linux/macOS)
/// ├── config.toml              # Backend endpoint configuration
/// └── state.toml               # Persisted client state (session identifier)
/// ```
pub struct RaglinePaths;

impl RaglinePaths {
    /// Returns the ragline configuration directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to config directory (e.g., `~/.config/ragline/`)
    /// - `Err(PathError::ConfigDirNotFound)`: Could not determine directory
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join("ragline"))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Returns the path to the endpoint configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the path to the persisted client state file.
    pub fn state_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("state.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_dir_ends_with_app_name() {
        let config_dir = RaglinePaths::config_dir().unwrap();
        assert!(config_dir.ends_with("ragline"));
    }

    #[test]
    fn state_file_lives_under_config_dir() {
        let state_file = RaglinePaths::state_file().unwrap();
        assert!(state_file.ends_with("state.toml"));
        let config_dir = RaglinePaths::config_dir().unwrap();
        assert!(state_file.starts_with(&config_dir));
    }

    #[test]
    fn config_file_lives_under_config_dir() {
        let config_file = RaglinePaths::config_file().unwrap();
        assert!(config_file.ends_with("config.toml"));
        let config_dir = RaglinePaths::config_dir().unwrap();
        assert!(config_file.starts_with(&config_dir));
    }
}
