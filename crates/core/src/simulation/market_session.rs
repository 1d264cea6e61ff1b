use chrono::Utc;
use log::{debug, info};
use rand::Rng;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::jitter::{change_from_base, jittered_price};
use super::market_model::{InstrumentQuote, PriceSource, ReferenceBoard};
use super::price_walk::PriceWalk;
use crate::instruments::Instrument;

/// Board plus the quotes derived from it, swapped together.
struct SessionState {
    board: Arc<ReferenceBoard>,
    quotes: HashMap<String, InstrumentQuote>,
}

/// Live market state for one user session.
///
/// Holds the published yearly reference board and the latest jittered quotes
/// behind one lock. A jitter tick computes against a board snapshot without
/// holding the lock and commits only if that board is still the published
/// one, so quotes never lag behind a year change or a reset.
pub struct MarketSession {
    instruments: Vec<Instrument>,
    price_walk: Arc<PriceWalk>,
    state: RwLock<SessionState>,
}

impl MarketSession {
    pub fn new(instruments: Vec<Instrument>, price_walk: Arc<PriceWalk>, year: u32) -> Self {
        let board = Arc::new(build_board(&instruments, &price_walk, year));
        let quotes = unjittered_quotes(&instruments, &board);
        Self {
            instruments,
            price_walk,
            state: RwLock::new(SessionState { board, quotes }),
        }
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    fn read_state(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Snapshot of the committed reference board.
    pub fn reference_board(&self) -> Arc<ReferenceBoard> {
        self.read_state().board.clone()
    }

    pub fn year(&self) -> u32 {
        self.reference_board().year
    }

    /// Rebuilds and publishes the reference board for `year`.
    ///
    /// Returns `false` (and leaves quotes untouched) when already on that year.
    pub fn recompute_year(&self, year: u32) -> bool {
        if self.year() == year {
            return false;
        }

        let board = Arc::new(build_board(&self.instruments, &self.price_walk, year));
        let quotes = unjittered_quotes(&self.instruments, &board);
        let previous = {
            let mut state = self.write_state();
            if state.board.year == year {
                return false;
            }
            let previous = state.board.year;
            *state = SessionState { board, quotes };
            previous
        };
        info!(
            "Market session moved from year {} to year {} ({} instruments)",
            previous,
            year,
            self.instruments.len()
        );
        true
    }

    /// Re-derives every display price from the committed yearly reference.
    ///
    /// Returns `false` when the board changed mid-tick and the result was dropped.
    pub fn jitter_tick<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        let board = self.reference_board();
        let next: HashMap<String, InstrumentQuote> = self
            .instruments
            .iter()
            .filter_map(|instrument| {
                let reference = board.price(&instrument.id)?;
                let amplitude = self
                    .price_walk
                    .table()
                    .profile(instrument.risk_category)
                    .intraday_amplitude;
                let display = jittered_price(reference, amplitude, rng);
                Some((
                    instrument.id.clone(),
                    make_quote(instrument, board.year, reference, display),
                ))
            })
            .collect();

        let mut state = self.write_state();
        if !Arc::ptr_eq(&state.board, &board) {
            debug!(
                "Dropping jitter tick for year {}; board is now year {}",
                board.year, state.board.year
            );
            return false;
        }
        debug!("Jitter tick refreshed {} quotes for year {}", next.len(), board.year);
        state.quotes = next;
        true
    }

    /// Quotes in catalog order.
    pub fn quotes(&self) -> Vec<InstrumentQuote> {
        let state = self.read_state();
        self.instruments
            .iter()
            .filter_map(|i| state.quotes.get(&i.id).cloned())
            .collect()
    }

    pub fn quote(&self, instrument_id: &str) -> Option<InstrumentQuote> {
        self.read_state().quotes.get(instrument_id).cloned()
    }

    /// Current display prices keyed by instrument id.
    pub fn display_prices(&self) -> HashMap<String, Decimal> {
        self.read_state()
            .quotes
            .iter()
            .map(|(id, q)| (id.clone(), q.display_price))
            .collect()
    }
}

impl PriceSource for MarketSession {
    fn current_price(&self, instrument_id: &str) -> Option<Decimal> {
        let state = self.read_state();
        state
            .quotes
            .get(instrument_id)
            .map(|q| q.display_price)
            .or_else(|| state.board.price(instrument_id))
    }
}

fn unjittered_quotes(
    instruments: &[Instrument],
    board: &ReferenceBoard,
) -> HashMap<String, InstrumentQuote> {
    instruments
        .iter()
        .filter_map(|instrument| {
            let reference = board.price(&instrument.id)?;
            Some((
                instrument.id.clone(),
                make_quote(instrument, board.year, reference, reference),
            ))
        })
        .collect()
}

fn build_board(instruments: &[Instrument], price_walk: &PriceWalk, year: u32) -> ReferenceBoard {
    let prices = instruments
        .iter()
        .map(|i| (i.id.clone(), price_walk.yearly_price_for(i, year)))
        .collect();
    ReferenceBoard { year, prices }
}

fn make_quote(
    instrument: &Instrument,
    year: u32,
    reference_price: Decimal,
    display_price: Decimal,
) -> InstrumentQuote {
    let (change, percent) = change_from_base(display_price, instrument.base_price);
    InstrumentQuote {
        instrument_id: instrument.id.clone(),
        symbol: instrument.symbol.clone(),
        kind: instrument.kind(),
        risk_category: instrument.risk_category,
        year,
        base_price: instrument.base_price,
        reference_price,
        display_price,
        change_from_base: change,
        change_percent: percent,
        updated_at: Utc::now(),
    }
}
