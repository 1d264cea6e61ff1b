//! Market view models published to callers.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::instruments::{InstrumentKind, RiskCategory};

/// Live quote for one instrument as shown on the ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentQuote {
    pub instrument_id: String,
    pub symbol: String,
    pub kind: InstrumentKind,
    pub risk_category: RiskCategory,
    pub year: u32,
    pub base_price: Decimal,
    pub reference_price: Decimal,
    pub display_price: Decimal,
    pub change_from_base: Decimal,
    pub change_percent: Decimal,
    pub updated_at: DateTime<Utc>,
}

/// The committed yearly reference prices for one simulated year.
///
/// Published as a whole; readers never observe a partially rebuilt board.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReferenceBoard {
    pub year: u32,
    pub prices: HashMap<String, Decimal>,
}

impl ReferenceBoard {
    pub fn price(&self, instrument_id: &str) -> Option<Decimal> {
        self.prices.get(instrument_id).copied()
    }
}

/// One point of an instrument's reproducible yearly history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyPricePoint {
    pub year: u32,
    pub price: Decimal,
}

/// Lookup of the price a trade executes at.
pub trait PriceSource: Send + Sync {
    fn current_price(&self, instrument_id: &str) -> Option<Decimal>;
}

impl PriceSource for HashMap<String, Decimal> {
    fn current_price(&self, instrument_id: &str) -> Option<Decimal> {
        self.get(instrument_id).copied()
    }
}

impl PriceSource for ReferenceBoard {
    fn current_price(&self, instrument_id: &str) -> Option<Decimal> {
        self.price(instrument_id)
    }
}
