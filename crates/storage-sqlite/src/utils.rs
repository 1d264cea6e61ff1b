//! Column conversion helpers shared by the repositories.
//!
//! Decimals and timestamps are stored as TEXT. Reads are tolerant: a
//! malformed value is logged and replaced rather than failing the whole query.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parses a TEXT decimal column, accepting scientific notation via f64.
pub(crate) fn parse_decimal(value: &str, field_name: &str) -> Decimal {
    if let Ok(d) = Decimal::from_str(value) {
        return d;
    }
    match f64::from_str(value).ok().and_then(Decimal::from_f64) {
        Some(d) => d,
        None => {
            log::error!(
                "Failed to parse {} '{}' as a decimal. Using 0.",
                field_name,
                value
            );
            Decimal::ZERO
        }
    }
}

pub(crate) fn parse_timestamp(value: &str, field_name: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|e| {
            log::error!("Failed to parse {} '{}': {}", field_name, value, e);
            DateTime::<Utc>::UNIX_EPOCH
        })
}

pub(crate) fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339()
}

/// Years are small; the INTEGER column is an `i32`.
pub(crate) fn year_to_db(year: u32) -> i32 {
    i32::try_from(year).unwrap_or(i32::MAX)
}

pub(crate) fn year_from_db(year: i32) -> u32 {
    u32::try_from(year).unwrap_or(1).max(1)
}
