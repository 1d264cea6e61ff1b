//! In-memory repositories and catalog fixtures shared by service tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::errors::{DatabaseError, Error, Result};
use crate::instruments::{
    Instrument, InstrumentDetails, InstrumentKind, InstrumentRepositoryTrait, RiskCategory,
};
use crate::portfolio::{
    Holding, NewPortfolio, Portfolio, PortfolioRepositoryTrait, SimulationReport,
};
use crate::trading::{HoldingChange, TradeCommit, Transaction};

pub(crate) const GARDEN_ID: &str = "3f2a9c1e-7b4d-4e8a-9c2f-1a2b3c4d5e6f";
pub(crate) const ROCKET_ID: &str = "0badf00d-2222-4000-8000-000000000002";
pub(crate) const INDEX_ID: &str = "a1b2c3d4-0000-4000-8000-000000000003";
pub(crate) const SMALLCAP_ID: &str = "5c0ffee0-1111-4000-8000-000000000004";

pub(crate) fn catalog() -> Vec<Instrument> {
    vec![
        Instrument {
            id: GARDEN_ID.to_string(),
            symbol: "GRDN".to_string(),
            name: "Garden Utilities".to_string(),
            base_price: dec!(100),
            risk_category: RiskCategory::Low,
            details: InstrumentDetails::Stock {
                sector: "Utilities".to_string(),
            },
        },
        Instrument {
            id: ROCKET_ID.to_string(),
            symbol: "RCKT".to_string(),
            name: "Rocket Robotics".to_string(),
            base_price: dec!(250),
            risk_category: RiskCategory::High,
            details: InstrumentDetails::Stock {
                sector: "Technology".to_string(),
            },
        },
        Instrument {
            id: INDEX_ID.to_string(),
            symbol: "IDX50".to_string(),
            name: "Nifty 50 Index Fund".to_string(),
            base_price: dec!(10),
            risk_category: RiskCategory::Index,
            details: InstrumentDetails::IndexFund {
                tracked_index: Some("NIFTY 50".to_string()),
                expense_ratio: Some(dec!(0.20)),
            },
        },
        Instrument {
            id: SMALLCAP_ID.to_string(),
            symbol: "SMLC".to_string(),
            name: "Emerging Small Cap Fund".to_string(),
            base_price: dec!(40),
            risk_category: RiskCategory::SmallCap,
            details: InstrumentDetails::MutualFund {
                fund_house: Some("Northwind AMC".to_string()),
                expense_ratio: Some(dec!(1.15)),
            },
        },
    ]
}

/// Base prices of the fixture catalog, usable as a flat `PriceSource`.
pub(crate) fn base_prices() -> HashMap<String, Decimal> {
    catalog()
        .into_iter()
        .map(|i| (i.id, i.base_price))
        .collect()
}

pub(crate) struct MockInstrumentRepository {
    instruments: Mutex<Vec<Instrument>>,
}

impl MockInstrumentRepository {
    pub(crate) fn new(instruments: Vec<Instrument>) -> Self {
        Self {
            instruments: Mutex::new(instruments),
        }
    }
}

#[async_trait]
impl InstrumentRepositoryTrait for MockInstrumentRepository {
    fn list_instruments(&self, kind: Option<InstrumentKind>) -> Result<Vec<Instrument>> {
        Ok(self
            .instruments
            .lock()
            .unwrap()
            .iter()
            .filter(|i| kind.map_or(true, |k| i.kind() == k))
            .cloned()
            .collect())
    }

    fn get_instrument(&self, id: &str) -> Result<Option<Instrument>> {
        Ok(self
            .instruments
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.id == id)
            .cloned())
    }

    async fn insert_missing(&self, instruments: Vec<Instrument>) -> Result<usize> {
        let mut existing = self.instruments.lock().unwrap();
        let mut inserted = 0;
        for instrument in instruments {
            if !existing.iter().any(|i| i.id == instrument.id) {
                existing.push(instrument);
                inserted += 1;
            }
        }
        Ok(inserted)
    }
}

#[derive(Default)]
struct PortfolioState {
    portfolios: HashMap<String, Portfolio>,
    holdings: Vec<Holding>,
    transactions: Vec<Transaction>,
    reports: HashMap<String, SimulationReport>,
}

#[derive(Clone, Default)]
pub(crate) struct InMemoryPortfolioRepository {
    state: Arc<Mutex<PortfolioState>>,
    fail_trades: Arc<AtomicBool>,
    concurrent_cash: Arc<Mutex<Option<Decimal>>>,
    stale_lookups: Arc<AtomicBool>,
}

impl InMemoryPortfolioRepository {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `apply_trade` fail without writing.
    pub(crate) fn fail_trades(&self) {
        self.fail_trades.store(true, Ordering::SeqCst);
    }

    /// Overwrites the stored cash right before the next `apply_trade`, as a
    /// competing request committing first would.
    pub(crate) fn change_cash_before_next_trade(&self, cash_balance: Decimal) {
        *self.concurrent_cash.lock().unwrap() = Some(cash_balance);
    }

    /// Makes the next `get_by_user` miss, as a read taken just before a
    /// concurrent create would.
    pub(crate) fn miss_next_lookup(&self) {
        self.stale_lookups.store(true, Ordering::SeqCst);
    }

    pub(crate) fn portfolio(&self, portfolio_id: &str) -> Portfolio {
        self.state.lock().unwrap().portfolios[portfolio_id].clone()
    }

    pub(crate) fn all_holdings(&self) -> Vec<Holding> {
        self.state.lock().unwrap().holdings.clone()
    }

    fn update<F>(&self, portfolio_id: &str, f: F) -> Result<Portfolio>
    where
        F: FnOnce(&mut Portfolio),
    {
        let mut state = self.state.lock().unwrap();
        let portfolio = state
            .portfolios
            .get_mut(portfolio_id)
            .ok_or_else(|| Error::Database(DatabaseError::NotFound(portfolio_id.to_string())))?;
        f(portfolio);
        portfolio.updated_at = Utc::now();
        Ok(portfolio.clone())
    }
}

#[async_trait]
impl PortfolioRepositoryTrait for InMemoryPortfolioRepository {
    fn get_by_user(&self, user_id: &str) -> Result<Option<Portfolio>> {
        if self.stale_lookups.swap(false, Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(self
            .state
            .lock()
            .unwrap()
            .portfolios
            .values()
            .find(|p| p.user_id == user_id)
            .cloned())
    }

    async fn create(&self, new_portfolio: NewPortfolio) -> Result<Portfolio> {
        let now = Utc::now();
        let portfolio = Portfolio {
            id: new_portfolio
                .id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            user_id: new_portfolio.user_id,
            cash_balance: new_portfolio.starting_balance,
            starting_balance: new_portfolio.starting_balance,
            simulated_year: 1,
            year_started_at: new_portfolio.year_started_at,
            ended_at: None,
            created_at: now,
            updated_at: now,
        };
        let mut state = self.state.lock().unwrap();
        if state.portfolios.values().any(|p| p.user_id == portfolio.user_id) {
            return Err(Error::Database(DatabaseError::UniqueViolation(format!(
                "portfolios.user_id {}",
                portfolio.user_id
            ))));
        }
        state
            .portfolios
            .insert(portfolio.id.clone(), portfolio.clone());
        Ok(portfolio)
    }

    async fn update_simulated_year(&self, portfolio_id: &str, year: u32) -> Result<Portfolio> {
        self.update(portfolio_id, |p| p.simulated_year = p.simulated_year.max(year))
    }

    async fn mark_ended(
        &self,
        portfolio_id: &str,
        ended_at: DateTime<Utc>,
        report: SimulationReport,
    ) -> Result<Portfolio> {
        self.state
            .lock()
            .unwrap()
            .reports
            .insert(portfolio_id.to_string(), report);
        self.update(portfolio_id, |p| p.ended_at = Some(ended_at))
    }

    async fn reset(
        &self,
        portfolio_id: &str,
        starting_balance: Decimal,
        year_started_at: DateTime<Utc>,
    ) -> Result<Portfolio> {
        {
            let mut state = self.state.lock().unwrap();
            state.holdings.retain(|h| h.portfolio_id != portfolio_id);
            state.transactions.retain(|t| t.portfolio_id != portfolio_id);
            state.reports.remove(portfolio_id);
        }
        self.update(portfolio_id, |p| {
            p.cash_balance = starting_balance;
            p.starting_balance = starting_balance;
            p.simulated_year = 1;
            p.year_started_at = year_started_at;
            p.ended_at = None;
        })
    }

    fn get_holdings(&self, portfolio_id: &str) -> Result<Vec<Holding>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .holdings
            .iter()
            .filter(|h| h.portfolio_id == portfolio_id)
            .cloned()
            .collect())
    }

    async fn apply_trade(&self, commit: TradeCommit) -> Result<()> {
        if self.fail_trades.load(Ordering::SeqCst) {
            return Err(Error::Database(DatabaseError::QueryFailed(
                "disk I/O error".to_string(),
            )));
        }
        let concurrent_cash = self.concurrent_cash.lock().unwrap().take();
        let mut state = self.state.lock().unwrap();
        let held = state
            .holdings
            .iter()
            .find(|h| {
                h.portfolio_id == commit.portfolio_id
                    && h.instrument_id == commit.transaction.instrument_id
            })
            .map(|h| h.quantity);
        let portfolio = state
            .portfolios
            .get_mut(&commit.portfolio_id)
            .ok_or_else(|| Error::Database(DatabaseError::NotFound(commit.portfolio_id.clone())))?;
        if let Some(cash) = concurrent_cash {
            portfolio.cash_balance = cash;
        }
        if portfolio.cash_balance != commit.expected.cash_balance
            || held != commit.expected.holding_quantity
        {
            return Err(Error::Database(DatabaseError::WriteConflict(
                commit.portfolio_id.clone(),
            )));
        }
        portfolio.cash_balance = commit.new_cash_balance;
        match &commit.holding_change {
            HoldingChange::Upsert(holding) => {
                if let Some(existing) = state.holdings.iter_mut().find(|h| h.id == holding.id) {
                    *existing = holding.clone();
                } else {
                    state.holdings.push(holding.clone());
                }
            }
            HoldingChange::Delete { holding_id } => {
                state.holdings.retain(|h| &h.id != holding_id);
            }
        }
        state.transactions.push(commit.transaction);
        Ok(())
    }

    fn list_transactions(&self, portfolio_id: &str) -> Result<Vec<Transaction>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .transactions
            .iter()
            .filter(|t| t.portfolio_id == portfolio_id)
            .cloned()
            .collect())
    }

    fn get_report(&self, portfolio_id: &str) -> Result<Option<SimulationReport>> {
        Ok(self.state.lock().unwrap().reports.get(portfolio_id).cloned())
    }
}
