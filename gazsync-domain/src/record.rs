//! Sink-ready record projection.
//!
//! A [`SinkRecord`] is the delivery shape shared by both sinks: the
//! time-series store writes it as one point, the message bus publishes its
//! JSON serialization verbatim. The `value` and `kWh` fields carry the same
//! number; downstream dashboards predate the explicit `kWh` name and still
//! read `value`.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::reading::Reading;

/// Measurement/series name used in the time-series store.
pub const MEASUREMENT: &str = "Gazpar";

/// One delivery-ready point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SinkRecord {
    /// Destination series name
    pub measurement: String,
    /// Noon-anchored instant of the gas day
    #[serde(serialize_with = "serialize_rfc3339_z")]
    pub time: DateTime<Utc>,
    /// Point fields
    pub fields: RecordFields,
}

/// Field set of a point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordFields {
    /// Energy in kWh (compatibility name)
    pub value: f64,
    /// Energy in kWh
    #[serde(rename = "kWh")]
    pub kwh: f64,
    /// Volume in cubic meters
    pub mcube: f64,
}

impl SinkRecord {
    /// Project a validated reading into its delivery shape.
    pub fn from_reading(reading: &Reading) -> Self {
        Self {
            measurement: MEASUREMENT.to_string(),
            time: reading.noon_instant(),
            fields: RecordFields {
                value: reading.energy_kwh,
                kwh: reading.energy_kwh,
                mcube: reading.volume_m3,
            },
        }
    }
}

/// Serialize an instant as `YYYY-MM-DDTHH:MM:SSZ`.
///
/// `chrono`'s default RFC3339 output uses a `+00:00` offset; the store and
/// existing bus consumers expect the `Z` suffix.
fn serialize_rfc3339_z<S>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&time.format("%Y-%m-%dT%H:%M:%SZ").to_string())
}

// =============================================================================
// Tests
// =============================================================================
