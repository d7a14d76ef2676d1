//! Watermark and request-window resolution.

use chrono::{DateTime, Days, NaiveDate, Utc};

use gazsync_domain::{noon_utc, MEASUREMENT};
use gazsync_sinks::TimeSeriesSink;

use crate::error::ResolutionError;

/// The historical window to request from the portal.
///
/// Labels are `DD/MM/YYYY` for logs; the `NaiveDate` pair feeds the portal
/// query. The watermark is the noon-anchored instant at or before which
/// readings are considered already delivered.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncWindow {
    /// Readings at or before this instant are already delivered
    pub watermark: DateTime<Utc>,
    /// First day of the requested range
    pub start_date: NaiveDate,
    /// Last day of the requested range (today)
    pub end_date: NaiveDate,
    /// `start_date` formatted `DD/MM/YYYY`
    pub start_label: String,
    /// `end_date` formatted `DD/MM/YYYY`
    pub end_label: String,
}

/// Format a date as `DD/MM/YYYY`.
pub fn day_label(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Fixed-lookback resolution: `days_back` days before `today`.
pub fn resolve_fixed(days_back: u32, today: NaiveDate) -> SyncWindow {
    let start = today - Days::new(u64::from(days_back));
    SyncWindow {
        watermark: noon_utc(start),
        start_date: start,
        end_date: today,
        start_label: day_label(start),
        end_label: day_label(today),
    }
}

/// Fixed-lookback resolution from the current date.
pub fn resolve_fixed_now(days_back: u32) -> SyncWindow {
    resolve_fixed(days_back, Utc::now().date_naive())
}

/// Resume-mode resolution: continue from the most recent record in the sink.
///
/// Only the date component of the last record's timestamp matters; the
/// watermark is re-anchored at noon of that day, so the day of the last
/// record is never requested again.
pub async fn resolve_from_sink(
    sink: &dyn TimeSeriesSink,
    today: NaiveDate,
) -> Result<SyncWindow, ResolutionError> {
    let last = sink
        .last_point_time(MEASUREMENT)
        .await?
        .ok_or(ResolutionError::NoHistory)?;

    let start = last.date_naive();
    Ok(SyncWindow {
        watermark: noon_utc(start),
        start_date: start,
        end_date: today,
        start_label: day_label(start),
        end_label: day_label(today),
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use gazsync_domain::{Reading, SinkRecord};
    use gazsync_sinks::MemoryTimeSeriesSink;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_fixed_lookback() {
        let window = resolve_fixed(3, day(2023, 1, 10));

        assert_eq!(window.start_date, day(2023, 1, 7));
        assert_eq!(window.start_label, "07/01/2023");
        assert_eq!(window.end_label, "10/01/2023");
        assert_eq!(window.watermark, noon_utc(day(2023, 1, 7)));
    }

    #[test]
    fn test_fixed_lookback_crosses_month() {
        let window = resolve_fixed(5, day(2023, 3, 2));

        assert_eq!(window.start_date, day(2023, 2, 25));
        assert_eq!(window.start_label, "25/02/2023");
    }

    #[tokio::test]
    async fn test_resume_from_sink() {
        let sink = MemoryTimeSeriesSink::new();
        let reading = Reading::new(day(2023, 1, 5), 10.0, 8.5).unwrap();
        sink.write_points(&[SinkRecord::from_reading(&reading)])
            .await
            .unwrap();

        let window = resolve_from_sink(&sink, day(2023, 1, 10)).await.unwrap();

        assert_eq!(window.start_date, day(2023, 1, 5));
        assert_eq!(window.start_label, "05/01/2023");
        assert_eq!(window.watermark, noon_utc(day(2023, 1, 5)));
        assert_eq!(window.end_label, "10/01/2023");
    }

    #[tokio::test]
    async fn test_resume_is_idempotent() {
        let sink = MemoryTimeSeriesSink::new();
        let reading = Reading::new(day(2023, 1, 5), 10.0, 8.5).unwrap();
        sink.write_points(&[SinkRecord::from_reading(&reading)])
            .await
            .unwrap();

        let first = resolve_from_sink(&sink, day(2023, 1, 10)).await.unwrap();
        let second = resolve_from_sink(&sink, day(2023, 1, 10)).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_resume_with_empty_sink_fails() {
        let sink = MemoryTimeSeriesSink::new();

        let result = resolve_from_sink(&sink, day(2023, 1, 10)).await;
        assert!(matches!(result, Err(ResolutionError::NoHistory)));
    }
}
