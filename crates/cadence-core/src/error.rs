//! Error types for the Cadence session core.

use thiserror::Error;

/// A shared error type for every Cadence crate.
///
/// Gateway, cache and configuration failures are all mapped into this enum so
/// that the session layer can log them uniformly and turn them into boolean
/// outcomes at its boundary.
#[derive(Error, Debug, Clone)]
pub enum CadenceError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (local cache, config files)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Persistence gateway error (remote tables)
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CadenceError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Gateway error
    pub fn gateway(message: impl Into<String>) -> Self {
        Self::Gateway(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a serialization error
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }

    /// Check if this is a gateway error
    pub fn is_gateway(&self) -> bool {
        matches!(self, Self::Gateway(_))
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for CadenceError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for CadenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for CadenceError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for CadenceError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for CadenceError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::Gateway(format!("HTTP {}: {}", status, err)),
            None => Self::Gateway(err.to_string()),
        }
    }
}

impl From<chrono::ParseError> for CadenceError {
    fn from(err: chrono::ParseError) -> Self {
        Self::Serialization {
            format: "RFC3339".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, CadenceError>`.
pub type Result<T> = std::result::Result<T, CadenceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = CadenceError::not_found("conversation", "c-1");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Entity not found: conversation 'c-1'");
    }

    #[test]
    fn test_json_error_maps_to_serialization() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: CadenceError = parse.unwrap_err().into();
        assert!(err.is_serialization());
        assert!(err.to_string().starts_with("Serialization error: JSON"));
    }

    #[test]
    fn test_io_error_keeps_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: CadenceError = io.into();
        assert!(err.to_string().contains("PermissionDenied"));
    }
}
