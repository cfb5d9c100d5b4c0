//! Error types for Scribe operations.
//!
//! Each action boundary of the pipeline (crawl, generate, send feedback) has its
//! own error enum so callers can recover at that boundary without touching state
//! owned by the others. [`ScribeError`] wraps all of them for code that does not
//! care which boundary failed.
//!
//! # Example
//!
//! ```rust
//! use scribe_core::{GenerationError, GenerationErrorKind};
//!
//! let err = GenerationError::AuthInvalid;
//! assert_eq!(err.kind(), GenerationErrorKind::AuthInvalid);
//! ```

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Failure while discovering links on a target page.
///
/// Crawl failures are non-fatal: the caller reports the cause and continues
/// with an empty link set.
#[derive(Error, Debug)]
pub enum CrawlError {
    /// The input could not be parsed as an absolute URL with scheme and host.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Network errors, DNS failures, connection resets and body read errors.
    #[cfg(feature = "fetch")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Request exceeded the configured timeout.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// The server answered with a non-2xx status.
    #[error("{url} answered with HTTP status {status}")]
    Status { status: u16, url: String },
}

/// Classification of a [`GenerationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationErrorKind {
    AuthInvalid,
    ServiceUnavailable,
    Unknown,
}

/// Failure of the external completion service.
///
/// No variant is retried automatically; each generate action is a single attempt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The credential was rejected, or has not been verified for this session.
    #[error("Invalid API key. Enter a valid API key before generating text")]
    AuthInvalid,

    /// Transport failure, rate limiting or a server-side error.
    #[error("Generation service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Anything else, including malformed responses.
    #[error("Generation failed: {0}")]
    Unknown(String),
}

impl GenerationError {
    pub fn kind(&self) -> GenerationErrorKind {
        match self {
            GenerationError::AuthInvalid => GenerationErrorKind::AuthInvalid,
            GenerationError::ServiceUnavailable(_) => GenerationErrorKind::ServiceUnavailable,
            GenerationError::Unknown(_) => GenerationErrorKind::Unknown,
        }
    }
}

/// Failure while sending a feedback submission.
#[derive(Error, Debug)]
pub enum FeedbackError {
    /// No mail relay has been configured.
    #[error("Feedback delivery is not configured")]
    NotConfigured,

    /// Sender or receiver address could not be parsed.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// The message could not be assembled.
    #[error("Failed to build feedback message: {0}")]
    Build(String),

    /// The relay refused the connection, the login or the message.
    #[error("Failed to send feedback: {0}")]
    Transport(String),
}

/// Failure while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// User input outside the accepted ranges.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange { field: &'static str, min: u32, max: u32, value: u32 },

    #[error("Minimum word count {min} exceeds maximum word count {max}")]
    InvertedBounds { min: u32, max: u32 },
}

/// Umbrella error for the whole pipeline.
#[derive(Error, Debug)]
pub enum ScribeError {
    #[error(transparent)]
    Crawl(#[from] CrawlError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Feedback(#[from] FeedbackError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Input(#[from] InputError),
}

/// Result type alias for [`ScribeError`].
pub type Result<T> = std::result::Result<T, ScribeError>;
