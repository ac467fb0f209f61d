//! Backend endpoint configuration.
//!
//! Configuration priority: config.toml under the platform config
//! directory > environment variables > built-in defaults.

use serde::{Deserialize, Serialize};
use tracing::warn;

use ragline_infrastructure::paths::RaglinePaths;

/// Base URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";

/// Environment variable overriding the backend base URL.
pub const BASE_URL_ENV: &str = "RAGLINE_BASE_URL";

/// Where and how to reach the QA backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the backend's versioned API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Optional per-request timeout in seconds.
    ///
    /// `None` means requests wait indefinitely; an in-flight operation
    /// then only ends when the backend answers or the connection drops.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: None,
        }
    }
}

/// Top-level layout of config.toml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigRoot {
    #[serde(default)]
    backend: Option<BackendConfig>,
}

impl BackendConfig {
    /// Loads configuration from config.toml, then applies the environment
    /// override, then falls back to defaults.
    ///
    /// Never fails: an unreadable or unparsable file is logged and
    /// ignored so a misconfigured client still reaches the default
    /// backend.
    pub fn load() -> Self {
        let mut config = Self::from_config_file().unwrap_or_default();
        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            if !base_url.trim().is_empty() {
                config.base_url = base_url;
            }
        }
        config
    }

    fn from_config_file() -> Option<Self> {
        let path = match RaglinePaths::config_file() {
            Ok(path) => path,
            Err(err) => {
                warn!(error = %err, "config directory unavailable, using defaults");
                return None;
            }
        };
        if !path.exists() {
            return None;
        }
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to read config.toml");
                return None;
            }
        };
        match toml::from_str::<ConfigRoot>(&content) {
            Ok(root) => root.backend,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to parse config.toml");
                None
            }
        }
    }
}
