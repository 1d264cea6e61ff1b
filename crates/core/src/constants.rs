/// Real seconds that make up one simulated year (1 real day = 1 simulated year)
pub const YEAR_DURATION_SECS: i64 = 24 * 60 * 60;

/// Last simulated year of a run. Reaching it ends the run.
pub const MAX_SIMULATION_YEARS: u32 = 10;

/// Virtual cash credited to a new or reset portfolio
pub const DEFAULT_STARTING_BALANCE: i64 = 100_000;

/// Interval between intraday jitter ticks
pub const JITTER_TICK_SECS: u64 = 10;

/// Interval between year-boundary checks
pub const YEAR_CHECK_SECS: u64 = 60;

/// Decimal precision for quantities, units and cost basis
pub const DECIMAL_PRECISION: u32 = 6;

/// Decimal precision for prices and cash
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

/// Baseline risk score reported for a portfolio without holdings
pub const BASELINE_RISK_SCORE: u8 = 20;
