//! Error types for vyra.
//!
//! This module defines all error types used throughout the vyra crate,
//! providing detailed context for debugging and user-facing messages for
//! the HTTP API.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for vyra operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Request Errors ===
    /// A required field was missing or empty.
    #[error("{message}")]
    Validation {
        /// Message shown to the caller.
        message: String,
    },

    /// The trusted-contact list is full.
    #[error("Limite de {limit} pessoas de confiança atingido.")]
    Capacity {
        /// Maximum number of contacts allowed.
        limit: usize,
    },

    // === Storage Errors ===
    /// Failed to write a store document.
    #[error("failed to write store at {path}: {source}")]
    StoreWrite {
        /// Path of the document being written.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Server Errors ===
    /// The HTTP server failed to bind or serve.
    #[error("server error: {message}")]
    Server {
        /// Description of what went wrong.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for vyra operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new server error.
    #[must_use]
    pub fn server(message: impl Into<String>) -> Self {
        Self::Server {
            message: message.into(),
        }
    }

    /// Check if this error was caused by bad caller input.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Check if this error is the contact limit being reached.
    #[must_use]
    pub fn is_capacity(&self) -> bool {
        matches!(self, Self::Capacity { .. })
    }

    /// Check if this error should be reported to the caller as a bad request.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.is_validation() || self.is_capacity()
    }
}
