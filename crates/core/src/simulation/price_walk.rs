//! Deterministic yearly price path, memoized per (instrument, year).

use dashmap::DashMap;
use log::debug;
use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

use super::seeded_random::{base_seed, seeded_random};
use super::volatility::VolatilityTable;
use crate::constants::DISPLAY_DECIMAL_PRECISION;
use crate::instruments::{Instrument, RiskCategory};

/// Rounds a price to display precision, half away from zero.
pub fn round_price(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DISPLAY_DECIMAL_PRECISION, RoundingStrategy::MidpointAwayFromZero)
}

/// Converts an f64 price back to a rounded Decimal. Non-finite input maps to zero.
pub(crate) fn price_from_f64(value: f64) -> Decimal {
    Decimal::from_f64(value).map(round_price).unwrap_or(Decimal::ZERO)
}

/// Lowest price a walk may reach: `base * fraction`, rounded up to a cent.
pub fn floor_price(base_price: Decimal, floor_fraction: f64) -> Decimal {
    Decimal::from_f64(floor_fraction)
        .and_then(|fraction| base_price.checked_mul(fraction))
        .map(|floor| {
            floor.round_dp_with_strategy(DISPLAY_DECIMAL_PRECISION, RoundingStrategy::AwayFromZero)
        })
        .unwrap_or(Decimal::ZERO)
}

/// Append-only `(instrument_id, year) -> price` memo.
///
/// Entries are written once and never invalidated, except by `clear()` on simulation reset.
#[derive(Debug, Default)]
pub struct YearlyPriceCache {
    entries: DashMap<(String, u32), Decimal>,
}

impl YearlyPriceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, instrument_id: &str, year: u32) -> Option<Decimal> {
        self.entries
            .get(&(instrument_id.to_string(), year))
            .map(|entry| *entry)
    }

    /// Returns the cached value, computing and storing it on first access.
    pub fn get_or_insert_with(
        &self,
        instrument_id: &str,
        year: u32,
        compute: impl FnOnce() -> Decimal,
    ) -> Decimal {
        *self
            .entries
            .entry((instrument_id.to_string(), year))
            .or_insert_with(compute)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

/// Compounds seeded annual returns from year 1 up to a target year.
#[derive(Debug, Default)]
pub struct PriceWalk {
    table: VolatilityTable,
    cache: YearlyPriceCache,
}

impl PriceWalk {
    pub fn new(table: VolatilityTable) -> Self {
        Self {
            table,
            cache: YearlyPriceCache::new(),
        }
    }

    pub fn table(&self) -> &VolatilityTable {
        &self.table
    }

    pub fn cache(&self) -> &YearlyPriceCache {
        &self.cache
    }

    /// Yearly reference price of an instrument, cached per (id, year).
    ///
    /// Year 1 (and anything below) is the base price itself.
    pub fn yearly_price(
        &self,
        instrument_id: &str,
        base_price: Decimal,
        risk_category: RiskCategory,
        target_year: u32,
    ) -> Decimal {
        if target_year <= 1 {
            return base_price;
        }
        self.cache.get_or_insert_with(instrument_id, target_year, || {
            self.walk(instrument_id, base_price, risk_category, target_year)
        })
    }

    pub fn yearly_price_for(&self, instrument: &Instrument, target_year: u32) -> Decimal {
        self.yearly_price(
            &instrument.id,
            instrument.base_price,
            instrument.risk_category,
            target_year,
        )
    }

    /// Drops every memoized price. Called on simulation reset.
    pub fn clear(&self) {
        debug!("Clearing {} cached yearly prices", self.cache.len());
        self.cache.clear();
    }

    /// Uncached walk. Full precision throughout, rounded once at the end and
    /// clamped to the cent-rounded floor so rounding never dips below it.
    fn walk(
        &self,
        instrument_id: &str,
        base_price: Decimal,
        risk_category: RiskCategory,
        target_year: u32,
    ) -> Decimal {
        let base = base_price.to_f64().unwrap_or(0.0);
        if base <= 0.0 {
            return base_price;
        }

        let profile = self.table.profile(risk_category);
        let floor = base * self.table.floor_fraction();
        let seed_base = base_seed(instrument_id);

        let mut price = base;
        for year in 1..target_year {
            let roll = seeded_random(seed_base + u64::from(year));
            let annual_return = profile.annual_return(roll, self.table.bias_threshold());
            price = (price * (1.0 + annual_return)).max(floor);
        }

        price_from_f64(price).max(floor_price(base_price, self.table.floor_fraction()))
    }
}
