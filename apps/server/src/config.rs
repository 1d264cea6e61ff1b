use std::{net::SocketAddr, str::FromStr, time::Duration};

use rust_decimal::Decimal;
use simvest_core::simulation::{SimulationSettings, TickIntervals};

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub catalog_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub simulation: SimulationSettings,
    pub intervals: TickIntervals,
}

/// Reads `key`, falling back to `default` when unset or unparseable.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid {}='{}'; using the default", key, raw);
            default
        }),
        Err(_) => default,
    }
}

/// `value` if strictly positive, otherwise `default` with a warning.
fn positive_or(key: &str, value: Decimal, default: Decimal) -> Decimal {
    if value > Decimal::ZERO {
        value
    } else {
        tracing::warn!("Ignoring non-positive {}={}; using {}", key, value, default);
        default
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let default_addr = SocketAddr::from(([0, 0, 0, 0], 8080));
        let listen_addr = env_or("SIMVEST_LISTEN_ADDR", default_addr);
        let db_path = std::env::var("SIMVEST_DB_PATH").unwrap_or_else(|_| "./db/simvest.db".into());
        let catalog_path = std::env::var("SIMVEST_CATALOG_PATH")
            .unwrap_or_else(|_| concat!(env!("CARGO_MANIFEST_DIR"), "/data/instruments.json").into());
        let cors_allow = std::env::var("SIMVEST_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = env_or("SIMVEST_REQUEST_TIMEOUT_MS", 30_000);

        let defaults = SimulationSettings::default();
        let simulation = SimulationSettings {
            year_duration_secs: env_or("SIMVEST_YEAR_DURATION_SECS", defaults.year_duration_secs)
                .max(1),
            max_years: env_or("SIMVEST_MAX_YEARS", defaults.max_years).max(1),
            starting_balance: positive_or(
                "SIMVEST_STARTING_BALANCE",
                env_or::<Decimal>("SIMVEST_STARTING_BALANCE", defaults.starting_balance),
                defaults.starting_balance,
            ),
            reject_trades_after_end: !env_or("SIMVEST_ALLOW_TRADES_AFTER_END", false),
        };

        let default_intervals = TickIntervals::default();
        let intervals = TickIntervals {
            jitter: Duration::from_secs(
                env_or("SIMVEST_JITTER_TICK_SECS", default_intervals.jitter.as_secs()).max(1),
            ),
            year_check: Duration::from_secs(
                env_or(
                    "SIMVEST_YEAR_CHECK_SECS",
                    default_intervals.year_check.as_secs(),
                )
                .max(1),
            ),
        };

        Self {
            listen_addr,
            db_path,
            catalog_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            simulation,
            intervals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_starting_balance_must_be_positive() {
        let key = "SIMVEST_STARTING_BALANCE";
        assert_eq!(positive_or(key, dec!(2500.50), dec!(100000)), dec!(2500.50));
        assert_eq!(positive_or(key, dec!(0), dec!(100000)), dec!(100000));
        assert_eq!(positive_or(key, dec!(-5000), dec!(100000)), dec!(100000));
    }
}
