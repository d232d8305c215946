//! Usage-rate estimation over the odometer sample log.
//!
//! Converts a sparse, irregularly-sampled history of odometer readings into
//! a representative daily distance rate. A 90-day trailing window balances
//! responsiveness to changing driving habits against noise from single
//! widely-spaced readings; when the log is younger than 90 days the window
//! degrades to all available history instead of punting to the default.

use time::{Duration, OffsetDateTime};

use odo_types::OdometerSample;

/// Daily distance (km/day) assumed when the log cannot support an estimate.
///
/// The reminder scheduler uses the same constant when the computed rate is
/// exactly zero.
pub const DEFAULT_DAILY_RATE: f64 = 50.0;

/// Length of the trailing window considered representative.
pub const RATE_WINDOW_DAYS: i64 = 90;

/// Window endpoints closer together than this produce a rate of `0` —
/// too little elapsed time to say anything about daily usage.
pub const MIN_ELAPSED_DAYS: f64 = 0.5;

// Divisor guard; only reachable when MIN_ELAPSED_DAYS is configured to 0.
const ELAPSED_EPSILON_DAYS: f64 = 1e-6;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// A daily usage estimate and the sample window it was computed over.
///
/// `window_start`/`window_end` are `None` exactly when the log held fewer
/// than two samples and the default rate was returned. A degenerate window
/// (backward odometer, near-zero elapsed time) reports `rate == 0.0` with
/// the window populated — deliberately distinct from the
/// insufficient-data default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateEstimate {
    /// Estimated kilometers per day.
    pub rate: f64,
    /// Earliest sample of the window.
    pub window_start: Option<OdometerSample>,
    /// Most recent sample of the window.
    pub window_end: Option<OdometerSample>,
}

impl RateEstimate {
    fn insufficient_data() -> Self {
        Self {
            rate: DEFAULT_DAILY_RATE,
            window_start: None,
            window_end: None,
        }
    }
}

/// Estimate the daily usage rate from the sample log.
///
/// `samples` must be ordered oldest-first, as the log is persisted.
#[must_use]
pub fn estimate_daily_rate(samples: &[OdometerSample], now: OffsetDateTime) -> RateEstimate {
    if samples.len() < 2 {
        return RateEstimate::insufficient_data();
    }

    let latest = samples[samples.len() - 1];
    let candidates = &samples[..samples.len() - 1];

    // Earliest candidate still inside the trailing window; all history if
    // the log is younger than the window.
    let target = now - Duration::days(RATE_WINDOW_DAYS);
    let start = candidates
        .iter()
        .find(|s| s.date >= target)
        .copied()
        .unwrap_or(candidates[0]);

    let elapsed_days = (latest.date - start.date).as_seconds_f64() / SECONDS_PER_DAY;
    let delta_km = (latest.kilometers - start.kilometers) as f64;

    // A backward odometer or two readings from the same afternoon would
    // yield a division artifact, not a usage rate.
    let rate = if elapsed_days < MIN_ELAPSED_DAYS || delta_km < 0.0 {
        0.0
    } else {
        delta_km / elapsed_days.max(ELAPSED_EPSILON_DAYS)
    };

    RateEstimate {
        rate,
        window_start: Some(start),
        window_end: Some(latest),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn sample(date: OffsetDateTime, kilometers: i64) -> OdometerSample {
        OdometerSample { date, kilometers }
    }

    const NOW: OffsetDateTime = datetime!(2026-02-01 12:00 UTC);

    #[test]
    fn fewer_than_two_samples_returns_default_without_window() {
        let estimate = estimate_daily_rate(&[], NOW);
        assert_eq!(estimate.rate, DEFAULT_DAILY_RATE);
        assert!(estimate.window_start.is_none());
        assert!(estimate.window_end.is_none());

        let one = [sample(datetime!(2026-01-01 00:00 UTC), 10_000)];
        assert_eq!(estimate_daily_rate(&one, NOW), RateEstimate::insufficient_data());
    }

    #[test]
    fn two_samples_ten_days_apart() {
        let log = [
            sample(datetime!(2026-01-01 00:00 UTC), 10_000),
            sample(datetime!(2026-01-11 00:00 UTC), 10_500),
        ];

        let estimate = estimate_daily_rate(&log, NOW);
        assert_eq!(estimate.rate, 50.0);
        assert_eq!(estimate.window_start, Some(log[0]));
        assert_eq!(estimate.window_end, Some(log[1]));
    }

    #[test]
    fn window_start_prefers_samples_within_ninety_days() {
        let log = [
            sample(datetime!(2025-06-01 00:00 UTC), 5_000), // far outside the window
            sample(datetime!(2026-01-01 00:00 UTC), 10_000),
            sample(datetime!(2026-01-31 00:00 UTC), 11_500),
        ];

        let estimate = estimate_daily_rate(&log, NOW);
        // 1500 km over 30 days, not 6500 km over 244.
        assert_eq!(estimate.window_start, Some(log[1]));
        assert_eq!(estimate.rate, 50.0);
    }

    #[test]
    fn falls_back_to_oldest_candidate_when_log_is_old() {
        // Every candidate predates the window; degrade to all history
        // rather than returning the default constant.
        let log = [
            sample(datetime!(2025-01-01 00:00 UTC), 10_000),
            sample(datetime!(2025-03-02 00:00 UTC), 13_000),
        ];

        let estimate = estimate_daily_rate(&log, NOW);
        assert_eq!(estimate.window_start, Some(log[0]));
        assert_eq!(estimate.rate, 50.0); // 3000 km / 60 days
    }

    #[test]
    fn backward_odometer_yields_zero_not_default() {
        let log = [
            sample(datetime!(2026-01-01 00:00 UTC), 10_500),
            sample(datetime!(2026-01-11 00:00 UTC), 10_000),
        ];

        let estimate = estimate_daily_rate(&log, NOW);
        assert_eq!(estimate.rate, 0.0);
        assert!(estimate.window_start.is_some());
    }

    #[test]
    fn sub_threshold_elapsed_time_yields_zero() {
        let log = [
            sample(datetime!(2026-01-11 09:00 UTC), 10_000),
            sample(datetime!(2026-01-11 10:00 UTC), 10_040),
        ];

        let estimate = estimate_daily_rate(&log, NOW);
        assert_eq!(estimate.rate, 0.0);
    }
}
