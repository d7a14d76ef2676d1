//! InfluxDB 1.x adapter.
//!
//! Talks to the store's HTTP API directly: line protocol on `/write`,
//! InfluxQL on `/query`. Only the two operations the pipeline needs are
//! implemented.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tokio::time::timeout;
use tracing::debug;

use gazsync_domain::SinkRecord;

use crate::error::SinkWriteError;
use crate::ports::TimeSeriesSink;

/// Request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// Settings
// =============================================================================

/// Connection settings for the store.
#[derive(Debug, Clone)]
pub struct InfluxSettings {
    /// Store host name
    pub host: String,
    /// Store port
    pub port: u16,
    /// Database name
    pub database: String,
    /// Username
    pub username: String,
    /// Password
    pub password: String,
    /// Use HTTPS
    pub ssl: bool,
    /// Verify the TLS certificate
    pub verify_ssl: bool,
}

// =============================================================================
// Influx Sink
// =============================================================================

/// InfluxDB 1.x time-series sink.
pub struct InfluxSink {
    client: Client,
    base_url: String,
    database: String,
    username: String,
    password: String,
}

impl InfluxSink {
    /// Create a sink from connection settings.
    pub fn new(settings: InfluxSettings) -> Result<Self, SinkWriteError> {
        let mut builder = Client::builder();
        if !settings.verify_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let client = builder
            .build()
            .map_err(|e| SinkWriteError::Request(e.to_string()))?;

        let scheme = if settings.ssl { "https" } else { "http" };
        let base_url = format!("{}://{}:{}", scheme, settings.host, settings.port);

        Ok(Self {
            client,
            base_url,
            database: settings.database,
            username: settings.username,
            password: settings.password,
        })
    }
}

#[async_trait]
impl TimeSeriesSink for InfluxSink {
    async fn write_points(&self, records: &[SinkRecord]) -> Result<(), SinkWriteError> {
        if records.is_empty() {
            return Ok(());
        }

        let body = line_protocol(records);
        debug!(points = records.len(), "writing line protocol batch");

        let response = timeout(
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
            self.client
                .post(format!("{}/write", self.base_url))
                .query(&[("db", self.database.as_str()), ("precision", "s")])
                .basic_auth(&self.username, Some(&self.password))
                .body(body)
                .send(),
        )
        .await
        .map_err(|_| SinkWriteError::Timeout)?
        .map_err(|e| SinkWriteError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SinkWriteError::Server {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }

    async fn last_point_time(
        &self,
        measurement: &str,
    ) -> Result<Option<DateTime<Utc>>, SinkWriteError> {
        let query = format!(
            "SELECT * FROM \"{}\" ORDER BY time DESC LIMIT 1",
            measurement
        );

        let response = timeout(
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
            self.client
                .get(format!("{}/query", self.base_url))
                .query(&[("db", self.database.as_str()), ("q", query.as_str())])
                .basic_auth(&self.username, Some(&self.password))
                .send(),
        )
        .await
        .map_err(|_| SinkWriteError::Timeout)?
        .map_err(|e| SinkWriteError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SinkWriteError::Request(e.to_string()))?;

        if !status.is_success() {
            return Err(SinkWriteError::Server {
                status: status.as_u16(),
                body,
            });
        }

        parse_last_time(&body)
    }
}

/// Render records as InfluxDB line protocol, seconds precision.
fn line_protocol(records: &[SinkRecord]) -> String {
    records
        .iter()
        .map(|r| {
            format!(
                "{} value={},kWh={},mcube={} {}",
                r.measurement,
                r.fields.value,
                r.fields.kwh,
                r.fields.mcube,
                r.time.timestamp()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// =============================================================================
// Query response parsing
// =============================================================================

#[derive(Debug, Deserialize)]
struct QueryResponse {
    results: Vec<QueryResult>,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    #[serde(default)]
    series: Vec<Series>,
}

#[derive(Debug, Deserialize)]
struct Series {
    columns: Vec<String>,
    values: Vec<Vec<serde_json::Value>>,
}

/// Pull the `time` column of the first row out of a query response.
fn parse_last_time(body: &str) -> Result<Option<DateTime<Utc>>, SinkWriteError> {
    let response: QueryResponse = serde_json::from_str(body)
        .map_err(|e| SinkWriteError::MalformedResponse(e.to_string()))?;

    let Some(series) = response
        .results
        .into_iter()
        .flat_map(|r| r.series)
        .next()
    else {
        return Ok(None);
    };

    let time_idx = series
        .columns
        .iter()
        .position(|c| c == "time")
        .ok_or_else(|| SinkWriteError::MalformedResponse("no time column".to_string()))?;

    let Some(row) = series.values.first() else {
        return Ok(None);
    };

    let raw = row
        .get(time_idx)
        .and_then(|v| v.as_str())
        .ok_or_else(|| SinkWriteError::MalformedResponse("time is not a string".to_string()))?;

    let time = DateTime::parse_from_rfc3339(raw)
        .map_err(|e| SinkWriteError::MalformedResponse(format!("bad time '{}': {}", raw, e)))?;

    Ok(Some(time.with_timezone(&Utc)))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use gazsync_domain::Reading;

    fn record(d: u32, energy: f64, volume: f64) -> SinkRecord {
        let reading =
            Reading::new(NaiveDate::from_ymd_opt(2023, 1, d).unwrap(), energy, volume).unwrap();
        SinkRecord::from_reading(&reading)
    }

    #[test]
    fn test_line_protocol() {
        let lines = line_protocol(&[record(6, 12.0, 9.0)]);
        // 2023-01-06T12:00:00Z
        assert_eq!(lines, "Gazpar value=12,kWh=12,mcube=9 1673006400");
    }

    #[test]
    fn test_line_protocol_batch() {
        let lines = line_protocol(&[record(5, 10.0, 8.5), record(6, 12.0, 9.0)]);
        let rows: Vec<&str> = lines.split('\n').collect();

        assert_eq!(rows.len(), 2);
        assert!(rows[0].starts_with("Gazpar value=10,kWh=10,mcube=8.5 "));
        assert!(rows[1].starts_with("Gazpar value=12,kWh=12,mcube=9 "));
    }

    #[test]
    fn test_parse_last_time() {
        let body = r#"{
            "results": [{
                "statement_id": 0,
                "series": [{
                    "name": "Gazpar",
                    "columns": ["time", "kWh", "mcube", "value"],
                    "values": [["2023-01-05T12:00:00Z", 10, 8.5, 10]]
                }]
            }]
        }"#;

        let time = parse_last_time(body).unwrap().unwrap();
        assert_eq!(time.to_rfc3339(), "2023-01-05T12:00:00+00:00");
    }

    #[test]
    fn test_parse_last_time_empty_store() {
        let body = r#"{"results": [{"statement_id": 0}]}"#;
        assert_eq!(parse_last_time(body).unwrap(), None);
    }

    #[test]
    fn test_parse_last_time_malformed() {
        assert!(matches!(
            parse_last_time("not json"),
            Err(SinkWriteError::MalformedResponse(_))
        ));
    }
}
