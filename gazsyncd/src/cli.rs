//! Command-line interface.

use clap::Parser;

/// Sync GRDF Gazpar consumption readings to InfluxDB and MQTT.
#[derive(Debug, Parser)]
#[command(name = "gazsyncd", version, about)]
pub struct Cli {
    /// Number of days back from today to request
    #[arg(short, long, default_value_t = 1)]
    pub days: u32,

    /// Resume after the most recent record already in the time-series store
    #[arg(short, long)]
    pub last: bool,

    /// More verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run every day at HH:MM instead of once
    #[arg(short, long, value_name = "HH:MM")]
    pub schedule: Option<String>,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["gazsyncd"]);

        assert_eq!(cli.days, 1);
        assert!(!cli.last);
        assert!(!cli.verbose);
        assert_eq!(cli.schedule, None);
    }

    #[test]
    fn test_all_flags() {
        let cli = Cli::parse_from(["gazsyncd", "-d", "7", "--last", "-v", "-s", "06:30"]);

        assert_eq!(cli.days, 7);
        assert!(cli.last);
        assert!(cli.verbose);
        assert_eq!(cli.schedule.as_deref(), Some("06:30"));
    }
}
