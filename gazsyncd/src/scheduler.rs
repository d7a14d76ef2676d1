//! Daily schedule timing.
//!
//! The daemon does not poll: it computes the delay until the next HH:MM
//! occurrence in local time and sleeps once. Overlap prevention beyond the
//! sequential loop is the supervisor's job.

use std::time::Duration;

use chrono::{NaiveDateTime, NaiveTime};

use crate::error::{DaemonError, DaemonResult};

/// Parse an `HH:MM` schedule flag.
pub fn parse_schedule(spec: &str) -> DaemonResult<NaiveTime> {
    NaiveTime::parse_from_str(spec, "%H:%M")
        .map_err(|_| DaemonError::Schedule(spec.to_string()))
}

/// Delay from `now` until the next occurrence of `at`.
///
/// If today's occurrence has already passed (or is exactly now), the next
/// one is tomorrow.
pub fn delay_until_next(now: NaiveDateTime, at: NaiveTime) -> Duration {
    let mut next = now.date().and_time(at);
    if next <= now {
        next += chrono::Duration::days(1);
    }
    (next - now).to_std().unwrap_or_default()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn now(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 1, 10)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_schedule() {
        assert_eq!(parse_schedule("06:30").unwrap(), at(6, 30));
        assert_eq!(parse_schedule("23:59").unwrap(), at(23, 59));
    }

    #[test]
    fn test_parse_schedule_rejects_garbage() {
        assert!(parse_schedule("6h30").is_err());
        assert!(parse_schedule("25:00").is_err());
        assert!(parse_schedule("").is_err());
    }

    #[test]
    fn test_delay_later_today() {
        let delay = delay_until_next(now(6, 0), at(6, 30));
        assert_eq!(delay, Duration::from_secs(30 * 60));
    }

    #[test]
    fn test_delay_rolls_to_tomorrow() {
        let delay = delay_until_next(now(7, 0), at(6, 30));
        assert_eq!(delay, Duration::from_secs((23 * 60 + 30) * 60));
    }

    #[test]
    fn test_exact_time_rolls_to_tomorrow() {
        let delay = delay_until_next(now(6, 30), at(6, 30));
        assert_eq!(delay, Duration::from_secs(24 * 60 * 60));
    }
}
