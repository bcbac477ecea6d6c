//! Error types for the Insight pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message shown to the user when a query cannot be answered.
///
/// Catalog misses and unexpected resolver failures read the same to the user.
pub const GENERIC_RESOLUTION_FAILURE: &str = "Could not process query. Please try again.";

/// Message left on the session when an in-flight query is cancelled.
pub const QUERY_CANCELLED: &str = "Query cancelled.";

/// A shared error type for the entire Insight workspace.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InsightError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Query text was empty or whitespace only
    #[error("Input rejected: {0}")]
    InputRejected(String),

    /// A submission is already being processed
    #[error("A query is already being processed")]
    Busy,

    /// Resolver failed for a reason other than a catalog miss
    #[error("Resolution failed: {0}")]
    Resolution(String),

    /// Resolver did not settle in time
    #[error("Resolution timed out after {after_ms} ms")]
    Timeout { after_ms: u64 },

    /// A dataset violates the catalog invariants
    #[error("Invalid dataset '{topic}': {reason}")]
    InvalidDataset { topic: String, reason: String },

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

impl InsightError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an InputRejected error
    pub fn input_rejected(message: impl Into<String>) -> Self {
        Self::InputRejected(message.into())
    }

    /// Creates a Resolution error
    pub fn resolution(message: impl Into<String>) -> Self {
        Self::Resolution(message.into())
    }

    /// Creates an InvalidDataset error
    pub fn invalid_dataset(topic: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDataset {
            topic: topic.into(),
            reason: reason.into(),
        }
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

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is an InputRejected error
    pub fn is_input_rejected(&self) -> bool {
        matches!(self, Self::InputRejected(_))
    }

    /// Check if this is a Busy error
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy)
    }

    /// Check if this is a Timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this is a serialization error
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }

    /// Returns the text stored as a session's last error.
    ///
    /// Catalog misses and unexpected resolver failures collapse into one
    /// generic message. Timeouts keep their own wording so the user knows
    /// a retry may help.
    pub fn user_message(&self) -> String {
        match self {
            Self::Timeout { .. } => {
                "The query took too long to process. Please try again.".to_string()
            }
            _ => GENERIC_RESOLUTION_FAILURE.to_string(),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for InsightError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for InsightError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for InsightError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for InsightError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from anyhow::Error (for resolvers built on anyhow)
impl From<anyhow::Error> for InsightError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Conversion from String (for error messages)
impl From<String> for InsightError {
    fn from(err: String) -> Self {
        Self::Internal(err)
    }
}

/// A type alias for `Result<T, InsightError>`.
pub type Result<T> = std::result::Result<T, InsightError>;
