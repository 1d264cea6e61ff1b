//! Maps real elapsed time onto the accelerated simulated calendar.

use chrono::{DateTime, Utc};

use crate::constants::{MAX_SIMULATION_YEARS, YEAR_DURATION_SECS};

/// Converts a wall-clock anchor plus "now" into a bounded simulated year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearClock {
    year_duration_secs: i64,
    max_years: u32,
}

impl Default for YearClock {
    fn default() -> Self {
        Self::new(YEAR_DURATION_SECS, MAX_SIMULATION_YEARS)
    }
}

impl YearClock {
    /// Durations below one second and a cap below year 1 are raised to those minimums.
    pub fn new(year_duration_secs: i64, max_years: u32) -> Self {
        Self {
            year_duration_secs: year_duration_secs.max(1),
            max_years: max_years.max(1),
        }
    }

    pub fn max_years(&self) -> u32 {
        self.max_years
    }

    pub fn year_duration_secs(&self) -> i64 {
        self.year_duration_secs
    }

    /// `min(1 + floor((now - started_at) / year_duration), max_years)`.
    ///
    /// A `now` earlier than the anchor counts as zero elapsed years, so the
    /// result is always in `1..=max_years` and non-decreasing in `now`.
    pub fn simulated_year(&self, year_started_at: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
        simulated_year(year_started_at, now, self.year_duration_secs, self.max_years)
    }

    /// True once the run has reached its last year.
    pub fn is_final_year(&self, year: u32) -> bool {
        year >= self.max_years
    }

    /// Wall-clock instant at which `year` begins for the given anchor.
    pub fn year_begins_at(&self, year_started_at: DateTime<Utc>, year: u32) -> DateTime<Utc> {
        let offset = i64::from(year.saturating_sub(1)) * self.year_duration_secs;
        year_started_at + chrono::Duration::seconds(offset)
    }
}

/// Free-function form of [`YearClock::simulated_year`].
pub fn simulated_year(
    year_started_at: DateTime<Utc>,
    now: DateTime<Utc>,
    year_duration_secs: i64,
    max_years: u32,
) -> u32 {
    let max_years = max_years.max(1);
    let elapsed_secs = (now - year_started_at).num_seconds().max(0);
    let years_elapsed = elapsed_secs / year_duration_secs.max(1);
    let year = 1 + years_elapsed;
    year.min(i64::from(max_years)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn anchor() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_first_day_is_year_one() {
        let clock = YearClock::default();
        assert_eq!(clock.simulated_year(anchor(), anchor()), 1);
        assert_eq!(
            clock.simulated_year(anchor(), anchor() + Duration::hours(23)),
            1
        );
    }

    #[test]
    fn test_each_real_day_is_one_year() {
        let clock = YearClock::default();
        assert_eq!(
            clock.simulated_year(anchor(), anchor() + Duration::hours(24)),
            2
        );
        assert_eq!(
            clock.simulated_year(anchor(), anchor() + Duration::days(4) + Duration::minutes(1)),
            5
        );
    }

    #[test]
    fn test_year_is_capped() {
        let clock = YearClock::new(YEAR_DURATION_SECS, 10);
        assert_eq!(
            clock.simulated_year(anchor(), anchor() + Duration::days(365)),
            10
        );
        assert!(clock.is_final_year(10));
        assert!(!clock.is_final_year(9));
    }

    #[test]
    fn test_now_before_anchor_is_year_one() {
        let clock = YearClock::default();
        assert_eq!(
            clock.simulated_year(anchor(), anchor() - Duration::days(3)),
            1
        );
    }

    #[test]
    fn test_year_begins_at() {
        let clock = YearClock::new(60, 5);
        assert_eq!(clock.year_begins_at(anchor(), 1), anchor());
        assert_eq!(
            clock.year_begins_at(anchor(), 3),
            anchor() + Duration::seconds(120)
        );
        assert_eq!(
            clock.simulated_year(anchor(), clock.year_begins_at(anchor(), 3)),
            3
        );
    }
}
