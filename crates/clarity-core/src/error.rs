//! Error types for Clarity.
//!
//! Errors are split by collaborator: the remote service adapter, the local
//! fallback encoder, and configuration loading. The enhancement client only
//! ever surfaces [`EncodeError`]; service failures stay inside it.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Clarity operations.
#[derive(Error, Debug)]
pub enum ClarityError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Remote enhancement service errors
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// Local fallback encoding errors
    #[error("Encoding error: {0}")]
    Encode(#[from] EncodeError),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Failures of the remote enhancement service and its adapter.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The requested path is not available (e.g. direct file upload)
    #[error("{0}")]
    Unsupported(String),

    /// No API credential could be resolved
    #[error("Enhancement API key not set: {0}")]
    MissingCredential(String),

    /// Transport failure or non-success HTTP status
    #[error("{message}")]
    Request {
        message: String,
        status_code: Option<u16>,
    },

    /// The processing endpoint answered with a status we don't handle
    #[error("Unknown API response status: {0}")]
    UnknownResponseStatus(String),

    /// The result endpoint answered with a status we don't handle
    #[error("Unknown polling status: {0}")]
    UnknownPollingStatus(String),

    /// The service reported completion without a result URL
    #[error("Service reported completion without a result_url")]
    MissingResultUrl,

    /// Polling exhausted its retry budget
    #[error("Max retries reached while polling job {job_id} ({attempts} attempts)")]
    MaxRetries { job_id: String, attempts: u32 },

    /// The caller cancelled the request or poll; `job_id` is unset when
    /// cancellation hit before the service issued a job
    #[error("Enhancement cancelled at attempt {attempt}")]
    Cancelled { job_id: Option<String>, attempt: u32 },
}

/// Errors from reading a source file or encoding/decoding data URLs.
#[derive(Error, Debug)]
pub enum EncodeError {
    /// The source file could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input is not a `data:<media>;base64,<payload>` URL
    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),

    /// Base64 payload is malformed
    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Convenience type alias for Clarity results.
pub type Result<T> = std::result::Result<T, ClarityError>;

/// Convenience type alias for service adapter results.
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
