//! Sink port definitions.
//!
//! Ports define the delivery interfaces. Adapters implement them for
//! specific backends (InfluxDB, MQTT, in-memory for tests).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use gazsync_domain::SinkRecord;

use crate::error::{BusPublishError, SinkWriteError};

/// Port for the time-series store.
///
/// Implementations:
/// - `InfluxSink` - InfluxDB 1.x over HTTP
/// - `MemoryTimeSeriesSink` - for testing
#[async_trait]
pub trait TimeSeriesSink: Send + Sync {
    /// Write a batch of points. Writing an empty batch is a no-op.
    ///
    /// Idempotence across runs relies on the store upserting by timestamp:
    /// rewriting a point at an existing time replaces it.
    async fn write_points(&self, records: &[SinkRecord]) -> Result<(), SinkWriteError>;

    /// Time of the most recent point of a measurement, if any.
    async fn last_point_time(
        &self,
        measurement: &str,
    ) -> Result<Option<DateTime<Utc>>, SinkWriteError>;
}

/// Port for the message bus.
///
/// Implementations:
/// - `MqttSink` - MQTT broker, QoS 0
/// - `MemoryBus` - for testing
#[async_trait]
pub trait MessageBusSink: Send + Sync {
    /// Publish one payload, fire-and-forget.
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), BusPublishError>;
}
