//! Delivery dispatch to the two sinks.

use tracing::{info, warn};

use gazsync_domain::SinkRecord;
use gazsync_sinks::{MessageBusSink, TimeSeriesSink};

/// Per-sink delivery counts, for observability only.
///
/// The report never drives control flow; a failed sink is logged and the
/// other sink is still attempted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Points handed to the time-series sink
    pub points_attempted: usize,
    /// Points the time-series sink accepted
    pub points_written: usize,
    /// Records handed to the message bus
    pub bus_attempted: usize,
    /// Records the bus accepted
    pub bus_published: usize,
}

/// Writes records to the time-series sink and publishes them to the message
/// bus, independently.
pub struct DeliveryDispatcher {
    /// Bus topic, `<configured prefix>json`
    topic: String,
}

impl DeliveryDispatcher {
    /// Create a dispatcher publishing under the given topic prefix.
    pub fn new(topic_prefix: &str) -> Self {
        Self {
            topic: format!("{}json", topic_prefix),
        }
    }

    /// The full bus topic.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Deliver a batch: one time-series write, then one bus publish per
    /// record. A failure on either side is logged and does not stop the
    /// other; the bus being absent is not an error.
    pub async fn deliver(
        &self,
        records: &[SinkRecord],
        time_series: &dyn TimeSeriesSink,
        bus: Option<&dyn MessageBusSink>,
    ) -> DeliveryReport {
        let mut report = DeliveryReport {
            points_attempted: records.len(),
            ..DeliveryReport::default()
        };

        info!(points = records.len(), "writing points to the time-series sink");
        match time_series.write_points(records).await {
            Ok(()) => report.points_written = records.len(),
            Err(e) => warn!(stage = "sink-write", error = %e, "time-series write failed"),
        }

        let Some(bus) = bus else {
            info!("message bus unavailable, skipping publish");
            return report;
        };

        info!(points = records.len(), topic = %self.topic, "publishing points to the message bus");
        for record in records {
            report.bus_attempted += 1;
            let payload = match serde_json::to_vec(record) {
                Ok(payload) => payload,
                Err(e) => {
                    warn!(stage = "bus-publish", error = %e, "record serialization failed");
                    continue;
                }
            };
            match bus.publish(&self.topic, &payload).await {
                Ok(()) => report.bus_published += 1,
                Err(e) => {
                    warn!(stage = "bus-publish", topic = %self.topic, error = %e, "publish failed")
                }
            }
        }

        report
    }
}

// =============================================================================
// Tests
// =============================================================================
