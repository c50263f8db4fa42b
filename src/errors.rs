// Copyright 2025 Cowboy AI, LLC.

//! Error types for catalog operations
//!
//! Transport failures and remote validation rejections are not distinguished
//! by the collection stores: both arrive as a single [`CatalogError`] carried
//! on a failure message.

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while talking to the remote catalog or building
/// the cache machinery
///
/// Errors serialize as `{ "kind": ..., "detail": ... }` so a cached
/// collection's last failure can be written out with the rest of its state.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum CatalogError {
    /// Network unreachable, connection refused, request timed out
    #[error("Transport error: {0}")]
    Transport(String),

    /// The remote answered with a non-2xx status
    #[error("Request failed with status {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// The response body's `message` field, or the canonical reason
        message: String,
    },

    /// The response body did not have the expected shape
    #[error("Decode error: {0}")]
    Decode(String),

    /// A request body could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// An operation tag table is incomplete or ambiguous
    #[error("Invalid operation tags: {0}")]
    InvalidTags(String),

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The persisted session could not be read
    #[error("Session error: {0}")]
    Session(String),
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            CatalogError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            CatalogError::Status {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            CatalogError::Transport(err.to_string())
        }
    }
}

impl CatalogError {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        CatalogError::Transport(msg.into())
    }

    /// Create a status error
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        CatalogError::Status {
            status,
            message: message.into(),
        }
    }

    /// Check if this is a transport error
    pub fn is_transport(&self) -> bool {
        matches!(self, CatalogError::Transport(_))
    }

    /// Check if the remote rejected the request
    pub fn is_status(&self) -> bool {
        matches!(self, CatalogError::Status { .. })
    }

    /// HTTP status code, when the remote answered
    pub fn status_code(&self) -> Option<u16> {
        match self {
            CatalogError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
