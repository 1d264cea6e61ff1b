//! Runtime knobs for a simulation deployment.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::year_clock::YearClock;
use crate::constants::{
    DEFAULT_STARTING_BALANCE, JITTER_TICK_SECS, MAX_SIMULATION_YEARS, YEAR_CHECK_SECS,
    YEAR_DURATION_SECS,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationSettings {
    pub year_duration_secs: i64,
    pub max_years: u32,
    pub starting_balance: Decimal,
    /// Reject buy/sell once the run has ended.
    pub reject_trades_after_end: bool,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            year_duration_secs: YEAR_DURATION_SECS,
            max_years: MAX_SIMULATION_YEARS,
            starting_balance: Decimal::from(DEFAULT_STARTING_BALANCE),
            reject_trades_after_end: true,
        }
    }
}

impl SimulationSettings {
    pub fn year_clock(&self) -> YearClock {
        YearClock::new(self.year_duration_secs, self.max_years)
    }
}

/// Periods of the two per-session timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickIntervals {
    pub jitter: Duration,
    pub year_check: Duration,
}

impl Default for TickIntervals {
    fn default() -> Self {
        Self {
            jitter: Duration::from_secs(JITTER_TICK_SECS),
            year_check: Duration::from_secs(YEAR_CHECK_SECS),
        }
    }
}
