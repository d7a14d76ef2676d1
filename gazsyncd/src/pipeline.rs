//! The synchronization run.
//!
//! One run is strictly sequential: authenticate, resolve the watermark,
//! fetch, filter, deliver. There is no retry anywhere; an external
//! orchestrator (systemd, cron, an automation platform) decides whether and
//! when to try again.

use chrono::Utc;
use tracing::{info, warn};

use gazsync_engine::{
    filter_readings, resolve_fixed, resolve_from_sink, DeliveryDispatcher, DeliveryReport,
};
use gazsync_portal::PortalClient;
use gazsync_sinks::{MessageBusSink, TimeSeriesSink};

use crate::config::Config;
use crate::error::DaemonResult;

/// Per-run options derived from the CLI.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Days back from today in fixed-lookback mode
    pub days_back: u32,
    /// Resume after the sink's most recent record instead.
    /// No automatic fallback: an empty sink aborts the run.
    pub resume_from_sink: bool,
}

/// Execute one synchronization run.
///
/// Sink delivery failures are non-fatal and only show up in the report;
/// everything else aborts the run with an error.
pub async fn run_once(
    config: &Config,
    options: &RunOptions,
    time_series: &dyn TimeSeriesSink,
    bus: Option<&dyn MessageBusSink>,
) -> DaemonResult<DeliveryReport> {
    let portal = PortalClient::new(
        &config.portal.username,
        &config.portal.password,
        &config.portal.pce,
    );

    info!(stage = "login", "authenticating against the portal");
    let session = portal.authenticate().await?;

    let today = Utc::now().date_naive();
    let window = if options.resume_from_sink {
        info!(
            stage = "resolve",
            host = %config.influx.host,
            "looking up the most recent stored record"
        );
        let window = resolve_from_sink(time_series, today).await?;
        info!(start = %window.start_label, "resuming after the last stored record");
        window
    } else {
        warn!(
            days = options.days_back,
            "the portal may not have data for all of the requested days"
        );
        resolve_fixed(options.days_back, today)
    };
    info!(
        start = %window.start_label,
        end = %window.end_label,
        watermark = %window.watermark,
        "requesting consumption window"
    );

    info!(stage = "fetch", "fetching readings");
    let raw = session
        .fetch_readings(window.start_date, window.end_date)
        .await?;
    info!(count = raw.len(), "portal returned readings");

    let records = filter_readings(raw, window.watermark)?;
    info!(count = records.len(), "readings newer than the watermark");

    let dispatcher = DeliveryDispatcher::new(&config.mqtt.topic);
    let report = dispatcher.deliver(&records, time_series, bus).await;
    info!(
        points_written = report.points_written,
        bus_published = report.bus_published,
        "run complete"
    );

    Ok(report)
}
