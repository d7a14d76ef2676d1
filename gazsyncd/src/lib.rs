//! Gazsync Daemon Library
//!
//! Orchestrates one synchronization run:
//!
//! ```text
//! authenticate → resolve watermark → fetch → filter → deliver
//! ```
//!
//! and optionally repeats it once per day at a configured time. Runs never
//! overlap; the scheduler awaits the prior run before arming the next one.
//!
//! # Components
//!
//! - **Config**: environment-first configuration with a `.params` JSON
//!   file fallback
//! - **Cli**: lookback day-count, resume mode, verbosity, daily schedule
//! - **Pipeline**: the run orchestrator
//! - **Scheduler**: HH:MM parsing and next-occurrence timing

#![warn(clippy::all)]

pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod scheduler;

// Re-exports for convenience
pub use cli::Cli;
pub use config::{Config, InfluxConfig, MqttConfig, PortalConfig};
pub use error::{DaemonError, DaemonResult};
pub use pipeline::{run_once, RunOptions};
