//! Watermark filtering of raw readings.

use chrono::{DateTime, Utc};
use tracing::debug;

use gazsync_domain::{DomainError, RawReading, SinkRecord};

/// Turn raw portal readings into sink-ready records, dropping everything at
/// or before the watermark.
///
/// Inclusion is strict: a reading whose noon instant equals the watermark is
/// excluded, since the watermark day is assumed already delivered. Input
/// order is preserved; the portal returns readings chronologically.
///
/// A malformed entry fails the whole batch. The portal either returns a
/// consistent window or something is wrong enough that partial delivery
/// would hide it.
pub fn filter_readings(
    raw: Vec<RawReading>,
    watermark: DateTime<Utc>,
) -> Result<Vec<SinkRecord>, DomainError> {
    let mut records = Vec::with_capacity(raw.len());

    for entry in raw {
        let reading = entry.into_reading()?;
        let t = reading.noon_instant();
        debug!(
            energy_kwh = reading.energy_kwh,
            volume_m3 = reading.volume_m3,
            time = %t,
            "found value"
        );

        if t > watermark {
            records.push(SinkRecord::from_reading(&reading));
        } else {
            debug!(time = %t, watermark = %watermark, "at or before watermark, dropped");
        }
    }

    Ok(records)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use gazsync_domain::noon_utc;

    fn raw(date: &str, energy: f64, volume: f64) -> RawReading {
        RawReading {
            journee_gaziere: Some(date.to_string()),
            energie_consomme: Some(energy),
            volume_brut_consomme: Some(volume),
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_strict_watermark_cut() {
        // Reading dated exactly on the watermark day is excluded
        let readings = vec![raw("2023-01-05", 10.0, 8.5), raw("2023-01-06", 12.0, 9.0)];

        let records = filter_readings(readings, noon_utc(day(2023, 1, 5))).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].fields.value, 12.0);
        assert_eq!(records[0].fields.kwh, 12.0);
        assert_eq!(records[0].fields.mcube, 9.0);
        assert_eq!(
            serde_json::to_value(&records[0]).unwrap()["time"],
            "2023-01-06T12:00:00Z"
        );
    }

    #[test]
    fn test_all_readings_after_watermark() {
        let readings = vec![raw("2023-01-05", 10.0, 8.5), raw("2023-01-06", 12.0, 9.0)];

        let records = filter_readings(readings, noon_utc(day(2023, 1, 1))).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_order_is_preserved() {
        let readings = vec![
            raw("2023-01-04", 8.0, 7.0),
            raw("2023-01-05", 10.0, 8.5),
            raw("2023-01-06", 12.0, 9.0),
        ];

        let records = filter_readings(readings, noon_utc(day(2023, 1, 1))).unwrap();

        let times: Vec<String> = records
            .iter()
            .map(|r| serde_json::to_value(r).unwrap()["time"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            times,
            vec![
                "2023-01-04T12:00:00Z",
                "2023-01-05T12:00:00Z",
                "2023-01-06T12:00:00Z"
            ]
        );
    }

    #[test]
    fn test_malformed_entry_fails_batch() {
        let readings = vec![raw("2023-01-05", 10.0, 8.5), raw("not-a-date", 12.0, 9.0)];

        let err = filter_readings(readings, noon_utc(day(2023, 1, 1))).unwrap_err();
        assert_eq!(err, DomainError::InvalidDate("not-a-date".to_string()));
    }

    #[test]
    fn test_missing_field_fails_batch() {
        let readings = vec![RawReading {
            journee_gaziere: Some("2023-01-05".to_string()),
            energie_consomme: None,
            volume_brut_consomme: Some(8.5),
        }];

        let err = filter_readings(readings, noon_utc(day(2023, 1, 1))).unwrap_err();
        assert_eq!(err, DomainError::MissingField("energieConsomme"));
    }

    #[test]
    fn test_empty_input() {
        let records = filter_readings(vec![], noon_utc(day(2023, 1, 1))).unwrap();
        assert!(records.is_empty());
    }
}
