//! In-memory sink implementations.
//!
//! Used by tests without a running store or broker. Thread-safe via RwLock;
//! each sink can be armed to fail its next operation to exercise
//! partial-failure paths.

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use gazsync_domain::SinkRecord;

use crate::error::{BusPublishError, SinkWriteError};
use crate::ports::{MessageBusSink, TimeSeriesSink};

// =============================================================================
// Memory time-series sink
// =============================================================================

/// Recording time-series sink for tests.
#[derive(Default)]
pub struct MemoryTimeSeriesSink {
    points: RwLock<Vec<SinkRecord>>,
    fail_next: RwLock<bool>,
}

impl MemoryTimeSeriesSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the next write or query to fail.
    pub fn set_fail_next(&self, fail: bool) {
        *self.fail_next.write().unwrap() = fail;
    }

    /// All points written so far.
    pub fn points(&self) -> Vec<SinkRecord> {
        self.points.read().unwrap().clone()
    }

    /// Number of points written so far.
    pub fn point_count(&self) -> usize {
        self.points.read().unwrap().len()
    }

    fn should_fail(&self) -> bool {
        let mut fail_next = self.fail_next.write().unwrap();
        let fail = *fail_next;
        *fail_next = false; // one-shot
        fail
    }
}

#[async_trait]
impl TimeSeriesSink for MemoryTimeSeriesSink {
    async fn write_points(&self, records: &[SinkRecord]) -> Result<(), SinkWriteError> {
        if self.should_fail() {
            return Err(SinkWriteError::Request(
                "simulated write failure".to_string(),
            ));
        }
        self.points.write().unwrap().extend_from_slice(records);
        Ok(())
    }

    async fn last_point_time(
        &self,
        measurement: &str,
    ) -> Result<Option<DateTime<Utc>>, SinkWriteError> {
        if self.should_fail() {
            return Err(SinkWriteError::Request(
                "simulated query failure".to_string(),
            ));
        }
        let points = self.points.read().unwrap();
        Ok(points
            .iter()
            .filter(|p| p.measurement == measurement)
            .map(|p| p.time)
            .max())
    }
}

// =============================================================================
// Memory bus
// =============================================================================

/// Recording message bus for tests.
#[derive(Default)]
pub struct MemoryBus {
    messages: RwLock<Vec<(String, Vec<u8>)>>,
    fail_next: RwLock<bool>,
}

impl MemoryBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the next publish to fail.
    pub fn set_fail_next(&self, fail: bool) {
        *self.fail_next.write().unwrap() = fail;
    }

    /// All published messages as (topic, payload) pairs.
    pub fn messages(&self) -> Vec<(String, Vec<u8>)> {
        self.messages.read().unwrap().clone()
    }

    /// Number of published messages.
    pub fn message_count(&self) -> usize {
        self.messages.read().unwrap().len()
    }
}

#[async_trait]
impl MessageBusSink for MemoryBus {
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), BusPublishError> {
        let fail = {
            let mut fail_next = self.fail_next.write().unwrap();
            let fail = *fail_next;
            *fail_next = false;
            fail
        };
        if fail {
            return Err(BusPublishError::Publish(
                "simulated publish failure".to_string(),
            ));
        }
        self.messages
            .write()
            .unwrap()
            .push((topic.to_string(), payload.to_vec()));
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use gazsync_domain::{Reading, MEASUREMENT};

    fn record(d: u32) -> SinkRecord {
        let reading =
            Reading::new(NaiveDate::from_ymd_opt(2023, 1, d).unwrap(), 10.0, 8.5).unwrap();
        SinkRecord::from_reading(&reading)
    }

    #[tokio::test]
    async fn test_last_point_time_is_max() {
        let sink = MemoryTimeSeriesSink::new();
        sink.write_points(&[record(5), record(6)]).await.unwrap();

        let last = sink.last_point_time(MEASUREMENT).await.unwrap().unwrap();
        assert_eq!(last, record(6).time);
    }

    #[tokio::test]
    async fn test_last_point_time_empty() {
        let sink = MemoryTimeSeriesSink::new();
        assert_eq!(sink.last_point_time(MEASUREMENT).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_fail_next_is_one_shot() {
        let sink = MemoryTimeSeriesSink::new();
        sink.set_fail_next(true);

        assert!(sink.write_points(&[record(5)]).await.is_err());
        assert!(sink.write_points(&[record(5)]).await.is_ok());
        assert_eq!(sink.point_count(), 1);
    }
}
