//! Engine errors.

use gazsync_sinks::SinkWriteError;
use thiserror::Error;

/// Errors from watermark resolution.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// Resume mode was requested but the sink holds no prior record.
    /// Falling back to fixed lookback is the caller's decision.
    #[error("No prior record in the time-series sink")]
    NoHistory,

    /// The sink query itself failed
    #[error("Sink query failed: {0}")]
    Sink(#[from] SinkWriteError),
}
