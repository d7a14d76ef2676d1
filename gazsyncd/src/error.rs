//! Daemon error types.

use gazsync_domain::DomainError;
use gazsync_engine::ResolutionError;
use gazsync_portal::{FetchError, LoginError};
use gazsync_sinks::SinkWriteError;
use thiserror::Error;

/// Daemon-level errors. All of these abort the run.
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Login failed
    #[error("Login failed: {0}")]
    Login(#[from] LoginError),

    /// Consumption fetch failed
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Watermark resolution failed
    #[error("Watermark resolution failed: {0}")]
    Resolution(#[from] ResolutionError),

    /// A reading failed validation
    #[error("Invalid reading: {0}")]
    Domain(#[from] DomainError),

    /// Sink setup or query failed outside delivery
    #[error("Sink error: {0}")]
    Sink(#[from] SinkWriteError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Schedule flag could not be parsed
    #[error("Invalid schedule '{0}': expected HH:MM")]
    Schedule(String),
}

/// Result type for daemon operations.
pub type DaemonResult<T> = Result<T, DaemonError>;
