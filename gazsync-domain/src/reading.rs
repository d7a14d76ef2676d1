//! Daily consumption readings.
//!
//! The portal reports one reading per gas day (`journeeGaziere`). A reading
//! is anchored to noon UTC of its calendar day so that day-boundary shifts
//! around midnight (DST, timezone offsets) cannot move it across a day.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use crate::error::DomainError;

/// Anchor a calendar day at 12:00:00 UTC.
pub fn noon_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(12, 0, 0)
        .expect("12:00:00 is always a valid time")
        .and_utc()
}

// =============================================================================
// Raw reading (wire shape)
// =============================================================================

/// One entry of the portal's `releves` array, exactly as serialized.
///
/// Fields are optional at this stage; validation happens in
/// [`RawReading::into_reading`] so that a malformed entry surfaces as a
/// [`DomainError`] rather than a deserialization failure of the whole body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReading {
    /// Gas day, `YYYY-MM-DD`
    #[serde(default)]
    pub journee_gaziere: Option<String>,
    /// Energy consumed in kWh
    #[serde(default)]
    pub energie_consomme: Option<f64>,
    /// Raw volume consumed in cubic meters
    #[serde(default)]
    pub volume_brut_consomme: Option<f64>,
}

impl RawReading {
    /// Validate and convert into a [`Reading`].
    pub fn into_reading(self) -> Result<Reading, DomainError> {
        let date_str = self
            .journee_gaziere
            .ok_or(DomainError::MissingField("journeeGaziere"))?;
        let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
            .map_err(|_| DomainError::InvalidDate(date_str))?;
        let energy = self
            .energie_consomme
            .ok_or(DomainError::MissingField("energieConsomme"))?;
        let volume = self
            .volume_brut_consomme
            .ok_or(DomainError::MissingField("volumeBrutConsomme"))?;
        Reading::new(date, energy, volume)
    }
}

// =============================================================================
// Reading
// =============================================================================

/// One calendar day's validated gas usage. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    /// Gas day (no time-of-day component)
    pub date: NaiveDate,
    /// Energy consumed in kWh
    pub energy_kwh: f64,
    /// Volume consumed in cubic meters
    pub volume_m3: f64,
}

impl Reading {
    /// Create a reading, rejecting negative values.
    pub fn new(date: NaiveDate, energy_kwh: f64, volume_m3: f64) -> Result<Self, DomainError> {
        if energy_kwh < 0.0 {
            return Err(DomainError::NegativeEnergy(energy_kwh));
        }
        if volume_m3 < 0.0 {
            return Err(DomainError::NegativeVolume(volume_m3));
        }
        Ok(Self {
            date,
            energy_kwh,
            volume_m3,
        })
    }

    /// The reading's noon-anchored instant, used for watermark comparison.
    pub fn noon_instant(&self) -> DateTime<Utc> {
        noon_utc(self.date)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_noon_anchoring() {
        let t = noon_utc(day(2023, 1, 6));
        assert_eq!(t.to_rfc3339(), "2023-01-06T12:00:00+00:00");
    }

    #[test]
    fn test_reading_rejects_negative_energy() {
        let err = Reading::new(day(2023, 1, 6), -1.0, 9.0).unwrap_err();
        assert_eq!(err, DomainError::NegativeEnergy(-1.0));
    }

    #[test]
    fn test_reading_rejects_negative_volume() {
        let err = Reading::new(day(2023, 1, 6), 12.0, -0.5).unwrap_err();
        assert_eq!(err, DomainError::NegativeVolume(-0.5));
    }

    #[test]
    fn test_raw_reading_conversion() {
        let raw: RawReading = serde_json::from_str(
            r#"{"journeeGaziere":"2023-01-06","energieConsomme":12,"volumeBrutConsomme":9.0}"#,
        )
        .unwrap();

        let reading = raw.into_reading().unwrap();
        assert_eq!(reading.date, day(2023, 1, 6));
        assert_eq!(reading.energy_kwh, 12.0);
        assert_eq!(reading.volume_m3, 9.0);
    }

    #[test]
    fn test_raw_reading_bad_date_fails() {
        let raw = RawReading {
            journee_gaziere: Some("06/01/2023".to_string()),
            energie_consomme: Some(12.0),
            volume_brut_consomme: Some(9.0),
        };

        let err = raw.into_reading().unwrap_err();
        assert_eq!(err, DomainError::InvalidDate("06/01/2023".to_string()));
    }

    #[test]
    fn test_raw_reading_missing_field_fails() {
        let raw: RawReading =
            serde_json::from_str(r#"{"journeeGaziere":"2023-01-06","energieConsomme":12}"#)
                .unwrap();

        let err = raw.into_reading().unwrap_err();
        assert_eq!(err, DomainError::MissingField("volumeBrutConsomme"));
    }
}
