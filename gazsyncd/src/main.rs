//! Gazsync Daemon
//!
//! Pulls daily gas consumption readings from the GRDF portal and forwards
//! the new ones to InfluxDB and MQTT.
//!
//! # Usage
//!
//! ```bash
//! # One run, yesterday's reading
//! gazsyncd
//!
//! # Resume from the last stored record, every day at 06:30
//! gazsyncd --last --schedule 06:30
//! ```
//!
//! # Environment Variables
//!
//! Mandatory: `GRDF_USERNAME`, `GRDF_PASSWORD`, `GRDF_PCE`, `INFLUXDB_HOST`,
//! `INFLUXDB_DATABASE`, `INFLUXDB_USERNAME`, `INFLUXDB_PASSWORD`,
//! `MQTT_HOST`. Optional: `INFLUXDB_PORT`, `INFLUXDB_SSL`,
//! `INFLUXDB_VERIFY_SSL`, `MQTT_PORT`, `MQTT_KEEPALIVE`, `MQTT_TOPIC`.
//! When the mandatory set is incomplete, a `.params` JSON file is read from
//! the working directory or beside the executable.

use chrono::Local;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gazsync_sinks::{InfluxSink, MessageBusSink, MqttSink};
use gazsyncd::scheduler::{delay_until_next, parse_schedule};
use gazsyncd::{run_once, Cli, Config, RunOptions};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; --verbose lowers the default level to debug
    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    // Load configuration; incomplete configuration is fatal before any
    // network activity
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!(stage = "config", error = %e, "cannot start");
            return Err(e.into());
        }
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        pce = %config.portal.pce,
        "gazsyncd"
    );

    let influx = InfluxSink::new(config.influx.settings()).map_err(|e| {
        error!(stage = "sink-setup", host = %config.influx.host, error = %e, "cannot start");
        anyhow::anyhow!(e)
    })?;
    info!(host = %config.influx.host, "time-series sink configured");

    // An unreachable broker disables publishing for the whole process but
    // does not stop the run
    let bus = match MqttSink::connect(&config.mqtt.host, config.mqtt.port, config.mqtt.keepalive)
        .await
    {
        Ok(sink) => {
            info!(host = %config.mqtt.host, "connected to the message bus");
            Some(sink)
        }
        Err(e) => {
            error!(host = %config.mqtt.host, error = %e, "message bus unavailable, publishing disabled");
            None
        }
    };
    let bus_ref: Option<&dyn MessageBusSink> = bus.as_ref().map(|b| b as &dyn MessageBusSink);

    let options = RunOptions {
        days_back: cli.days,
        resume_from_sink: cli.last,
    };

    match cli.schedule {
        Some(spec) => {
            let at = parse_schedule(&spec).map_err(|e| {
                error!(stage = "config", error = %e, "cannot start");
                anyhow::anyhow!(e)
            })?;
            info!(schedule = %at, "running daily");

            loop {
                let wait = delay_until_next(Local::now().naive_local(), at);
                info!(seconds = wait.as_secs(), "next run scheduled");
                tokio::time::sleep(wait).await;

                // The loop awaits the run, so runs never overlap
                if let Err(e) = run_once(&config, &options, &influx, bus_ref).await {
                    error!(error = %e, "run failed");
                }
            }
        }
        None => {
            if let Err(e) = run_once(&config, &options, &influx, bus_ref).await {
                error!(error = %e, "run failed");
                return Err(e.into());
            }
        }
    }

    Ok(())
}
