//! Gazsync Delivery Sinks
//!
//! Defines the sink ports and their adapters:
//!
//! - **Sink ports**: `TimeSeriesSink` and `MessageBusSink` traits
//! - **InfluxDB adapter**: line-protocol writes and last-point queries over
//!   the InfluxDB 1.x HTTP API
//! - **MQTT adapter**: fire-and-forget QoS 0 publishing via rumqttc
//! - **In-memory sinks**: recording implementations for tests

#![warn(clippy::all)]

// Modules
mod error;
mod influx;
mod memory;
mod mqtt;
mod ports;

// Re-exports
pub use error::{BusPublishError, SinkWriteError};
pub use influx::{InfluxSettings, InfluxSink};
pub use memory::{MemoryBus, MemoryTimeSeriesSink};
pub use mqtt::MqttSink;
pub use ports::{MessageBusSink, TimeSeriesSink};
