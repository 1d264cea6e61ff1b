use log::debug;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

use super::market_model::YearlyPricePoint;
use super::market_session::MarketSession;
use super::price_walk::PriceWalk;
use crate::errors::Result;
use crate::instruments::{Instrument, InstrumentKind, InstrumentRepositoryTrait};
use crate::trading::TradeError;

/// Catalog access plus deterministic yearly pricing.
pub struct MarketService {
    instrument_repository: Arc<dyn InstrumentRepositoryTrait>,
    price_walk: Arc<PriceWalk>,
}

impl MarketService {
    pub fn new(
        instrument_repository: Arc<dyn InstrumentRepositoryTrait>,
        price_walk: Arc<PriceWalk>,
    ) -> Self {
        Self {
            instrument_repository,
            price_walk,
        }
    }

    pub fn price_walk(&self) -> Arc<PriceWalk> {
        self.price_walk.clone()
    }

    pub fn list_instruments(&self, kind: Option<InstrumentKind>) -> Result<Vec<Instrument>> {
        self.instrument_repository.list_instruments(kind)
    }

    pub fn get_instrument(&self, instrument_id: &str) -> Result<Instrument> {
        self.instrument_repository
            .get_instrument(instrument_id)?
            .ok_or_else(|| TradeError::InstrumentNotFound(instrument_id.to_string()).into())
    }

    pub fn yearly_price(&self, instrument: &Instrument, year: u32) -> Decimal {
        self.price_walk.yearly_price_for(instrument, year)
    }

    /// Reference prices for years `1..=through_year`, with `through_year`
    /// clamped into `1..=max_years`.
    pub fn price_history(
        &self,
        instrument_id: &str,
        through_year: u32,
        max_years: u32,
    ) -> Result<Vec<YearlyPricePoint>> {
        let instrument = self.get_instrument(instrument_id)?;
        let last_year = through_year.clamp(1, max_years.max(1));
        Ok((1..=last_year)
            .map(|year| YearlyPricePoint {
                year,
                price: self.price_walk.yearly_price_for(&instrument, year),
            })
            .collect())
    }

    /// Reference price of every catalog instrument for `year`.
    pub fn reference_prices(&self, year: u32) -> Result<HashMap<String, Decimal>> {
        Ok(self
            .list_instruments(None)?
            .iter()
            .map(|i| (i.id.clone(), self.price_walk.yearly_price_for(i, year)))
            .collect())
    }

    pub fn create_session(&self, year: u32) -> Result<Arc<MarketSession>> {
        let instruments = self.list_instruments(None)?;
        debug!(
            "Opening market session at year {} over {} instruments",
            year,
            instruments.len()
        );
        Ok(Arc::new(MarketSession::new(
            instruments,
            self.price_walk.clone(),
            year,
        )))
    }

    pub fn clear_cache(&self) {
        self.price_walk.clear();
    }
}
