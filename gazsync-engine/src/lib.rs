//! Gazsync Engine
//!
//! The synchronization pipeline's decision logic:
//!
//! - **Watermark resolution**: which historical window to request, either a
//!   fixed day-count lookback or a resumption point from the sink
//! - **Record filtering**: strict watermark cut over noon-anchored instants
//! - **Delivery dispatch**: independent, partial-failure-tolerant writes to
//!   the time-series store and the message bus

#![warn(clippy::all)]

mod dispatch;
mod error;
mod filter;
mod watermark;

pub use dispatch::{DeliveryDispatcher, DeliveryReport};
pub use error::ResolutionError;
pub use filter::filter_readings;
pub use watermark::{day_label, resolve_fixed, resolve_fixed_now, resolve_from_sink, SyncWindow};
