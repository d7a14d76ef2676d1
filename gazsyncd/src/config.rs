//! Daemon configuration.
//!
//! Environment variables win when the full mandatory set is present;
//! otherwise a `.params` JSON file is read from the working directory or
//! beside the executable. An incomplete environment with no file is a fatal
//! startup error.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;

use gazsync_sinks::InfluxSettings;

use crate::error::{DaemonError, DaemonResult};

/// Fallback configuration file name
const PARAMS_FILE: &str = ".params";

/// Environment variables that must all be present for the environment to
/// take precedence over the file.
const MANDATORY_VARS: [&str; 8] = [
    "GRDF_USERNAME",
    "GRDF_PASSWORD",
    "GRDF_PCE",
    "INFLUXDB_HOST",
    "INFLUXDB_DATABASE",
    "INFLUXDB_USERNAME",
    "INFLUXDB_PASSWORD",
    "MQTT_HOST",
];

// =============================================================================
// Configuration
// =============================================================================

/// Daemon configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Portal credentials
    pub portal: PortalConfig,
    /// Time-series sink connection
    pub influx: InfluxConfig,
    /// Message bus connection
    pub mqtt: MqttConfig,
}

/// GRDF portal credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct PortalConfig {
    /// Account email
    pub username: String,
    /// Account password
    pub password: String,
    /// PCE (meter) identifier
    pub pce: String,
}

/// Time-series sink connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct InfluxConfig {
    /// Store host
    pub host: String,
    /// Store port
    #[serde(default = "default_influx_port")]
    pub port: u16,
    /// Database name
    #[serde(rename = "db")]
    pub database: String,
    /// Username
    pub username: String,
    /// Password
    pub password: String,
    /// Use HTTPS
    #[serde(default = "default_true")]
    pub ssl: bool,
    /// Verify the TLS certificate
    #[serde(default = "default_true")]
    pub verify_ssl: bool,
}

/// Message bus connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct MqttConfig {
    /// Broker host
    pub host: String,
    /// Broker port
    #[serde(default = "default_mqtt_port")]
    pub port: u16,
    /// Keepalive interval in seconds
    #[serde(default = "default_keepalive")]
    pub keepalive: u64,
    /// Topic prefix; records are published at `<topic>json`
    #[serde(default = "default_topic")]
    pub topic: String,
}

/// Shape of the `.params` file.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    grdf: PortalConfig,
    influx: InfluxConfig,
    mqtt: MqttConfig,
}

fn default_influx_port() -> u16 {
    8086
}

fn default_mqtt_port() -> u16 {
    1883
}

fn default_keepalive() -> u64 {
    60
}

fn default_topic() -> String {
    "gazpar/".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from the environment, falling back to `.params`.
    pub fn load() -> DaemonResult<Self> {
        // Load .env file if present (ignore errors)
        let _ = dotenvy::dotenv();

        let vars: HashMap<String, String> = env::vars().collect();
        let file = Self::params_text();
        Self::from_sources(&vars, file.as_deref())
    }

    /// Resolve precedence between the environment map and the file text.
    ///
    /// The environment wins only when every mandatory variable is present;
    /// a partial environment falls through to the file.
    pub fn from_sources(vars: &HashMap<String, String>, file: Option<&str>) -> DaemonResult<Self> {
        let missing: Vec<&str> = MANDATORY_VARS
            .iter()
            .copied()
            .filter(|v| !vars.contains_key(*v))
            .collect();

        if missing.is_empty() {
            return Self::from_env_map(vars);
        }

        match file {
            Some(text) => Self::from_json(text),
            None => Err(DaemonError::Config(format!(
                "missing environment variables [{}] and no {} file found",
                missing.join(", "),
                PARAMS_FILE
            ))),
        }
    }

    /// Parse a `.params` JSON document.
    pub fn from_json(text: &str) -> DaemonResult<Self> {
        let file: ConfigFile = serde_json::from_str(text)
            .map_err(|e| DaemonError::Config(format!("invalid {} file: {}", PARAMS_FILE, e)))?;
        Ok(Self {
            portal: file.grdf,
            influx: file.influx,
            mqtt: file.mqtt,
        })
    }

    fn from_env_map(vars: &HashMap<String, String>) -> DaemonResult<Self> {
        Ok(Self {
            portal: PortalConfig {
                username: required(vars, "GRDF_USERNAME")?,
                password: required(vars, "GRDF_PASSWORD")?,
                pce: required(vars, "GRDF_PCE")?,
            },
            influx: InfluxConfig {
                host: required(vars, "INFLUXDB_HOST")?,
                port: optional(vars, "INFLUXDB_PORT", default_influx_port())?,
                database: required(vars, "INFLUXDB_DATABASE")?,
                username: required(vars, "INFLUXDB_USERNAME")?,
                password: required(vars, "INFLUXDB_PASSWORD")?,
                ssl: optional_bool(vars, "INFLUXDB_SSL", true)?,
                verify_ssl: optional_bool(vars, "INFLUXDB_VERIFY_SSL", true)?,
            },
            mqtt: MqttConfig {
                host: required(vars, "MQTT_HOST")?,
                port: optional(vars, "MQTT_PORT", default_mqtt_port())?,
                keepalive: optional(vars, "MQTT_KEEPALIVE", default_keepalive())?,
                topic: vars
                    .get("MQTT_TOPIC")
                    .cloned()
                    .unwrap_or_else(default_topic),
            },
        })
    }

    /// Find the `.params` file in the working directory, then beside the
    /// executable.
    fn params_text() -> Option<String> {
        let mut candidates: Vec<PathBuf> = Vec::new();
        if let Ok(cwd) = env::current_dir() {
            candidates.push(cwd.join(PARAMS_FILE));
        }
        if let Some(exe_dir) = env::current_exe().ok().and_then(|p| p.parent().map(PathBuf::from)) {
            candidates.push(exe_dir.join(PARAMS_FILE));
        }

        candidates
            .into_iter()
            .find(|p| p.is_file())
            .and_then(|p| std::fs::read_to_string(p).ok())
    }
}

impl InfluxConfig {
    /// Convert into sink connection settings.
    pub fn settings(&self) -> InfluxSettings {
        InfluxSettings {
            host: self.host.clone(),
            port: self.port,
            database: self.database.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            ssl: self.ssl,
            verify_ssl: self.verify_ssl,
        }
    }
}

// =============================================================================
// Lookup helpers
// =============================================================================

fn required(vars: &HashMap<String, String>, key: &str) -> DaemonResult<String> {
    vars.get(key)
        .cloned()
        .ok_or_else(|| DaemonError::Config(format!("missing environment variable {}", key)))
}

fn optional<T: FromStr>(
    vars: &HashMap<String, String>,
    key: &str,
    default: T,
) -> DaemonResult<T> {
    match vars.get(key) {
        Some(value) => value
            .parse::<T>()
            .map_err(|_| DaemonError::Config(format!("invalid {} value: {}", key, value))),
        None => Ok(default),
    }
}

fn optional_bool(
    vars: &HashMap<String, String>,
    key: &str,
    default: bool,
) -> DaemonResult<bool> {
    match vars.get(key).map(|v| v.to_lowercase()) {
        None => Ok(default),
        Some(value) => match value.as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            other => Err(DaemonError::Config(format!(
                "invalid {} value: {}",
                key, other
            ))),
        },
    }
}

// =============================================================================
// Tests
// =============================================================================
