//! Error types shared across the Ragline crates.

use thiserror::Error;

/// A shared error type for the Ragline client library.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait. Transport failures have
/// their own type ([`crate::transport::TransportError`]) because the
/// controllers collapse them instead of propagating them.
#[derive(Error, Debug)]
pub enum RaglineError {
    /// Durable client state could not be read or written
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RaglineError {
    /// Creates a Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is a Storage error
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    /// Check if this is a Config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

impl From<std::io::Error> for RaglineError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for RaglineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for RaglineError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for RaglineError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, RaglineError>`.
pub type Result<T> = std::result::Result<T, RaglineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_variant_context() {
        let err = RaglineError::storage("state file unwritable");
        assert_eq!(err.to_string(), "Storage error: state file unwritable");

        let err = RaglineError::config("missing base url");
        assert_eq!(err.to_string(), "Configuration error: missing base url");
    }

    #[test]
    fn io_conversion_keeps_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: RaglineError = io.into();
        assert!(err.to_string().contains("NotFound"));
    }

    #[test]
    fn toml_conversion_is_serialization() {
        let bad: std::result::Result<toml::Value, _> = toml::from_str("= not toml");
        let err: RaglineError = bad.unwrap_err().into();
        assert!(matches!(err, RaglineError::Serialization { .. }));
        assert!(err.to_string().contains("TOML"));
    }
}
