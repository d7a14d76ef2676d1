//! Gazsync Domain Layer
//!
//! Pure domain types with zero I/O dependencies.
//! Contains the reading model, noon-anchoring rules, and the sink-ready
//! record projection.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Public modules
pub mod error;
pub mod reading;
pub mod record;

// Re-export commonly used types
pub use error::DomainError;
pub use reading::{noon_utc, RawReading, Reading};
pub use record::{RecordFields, SinkRecord, MEASUREMENT};
