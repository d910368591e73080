//! Error types for the staging writer
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use crate::stage::ResourceState;
use thiserror::Error;

/// The main error type for the staging writer
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Staging Errors
    // ============================================================================
    #[error("Staging {operation} failed for batch {batch}: {source}")]
    Storage {
        operation: &'static str,
        batch: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Staged resource for batch {batch} is {state} and cannot be written")]
    ResourceNotWritable { batch: String, state: ResourceState },

    // ============================================================================
    // Listener Errors
    // ============================================================================
    #[error("Listener '{listener}' failed at end of batch {batch}: {source}")]
    Listener {
        listener: String,
        batch: String,
        #[source]
        source: anyhow::Error,
    },
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Wrap a storage fault raised while working on a batch
    pub fn storage(
        operation: &'static str,
        batch: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Self::Storage {
            operation,
            batch: batch.into(),
            source,
        }
    }

    /// Wrap a listener fault raised during end-of-batch notification
    pub fn listener(
        listener: impl Into<String>,
        batch: impl Into<String>,
        source: anyhow::Error,
    ) -> Self {
        Self::Listener {
            listener: listener.into(),
            batch: batch.into(),
            source,
        }
    }

    /// Check if this error is retryable by the caller
    ///
    /// The writer never retries on its own; storage faults leave the batch
    /// resolvable, so a caller-driven retry is safe.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Storage { source, .. } => !matches!(
                source.kind(),
                std::io::ErrorKind::PermissionDenied | std::io::ErrorKind::InvalidInput
            ),
            Error::Listener { .. } => true,
            _ => false,
        }
    }
}

/// Result type alias for the staging writer
pub type Result<T> = std::result::Result<T, Error>;
