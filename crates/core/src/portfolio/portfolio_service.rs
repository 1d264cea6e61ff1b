use async_trait::async_trait;
use log::{debug, info};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::portfolio_model::{Holding, NewPortfolio, Portfolio, PortfolioFacts, SimulationReport};
use super::portfolio_traits::{PortfolioRepositoryTrait, PortfolioServiceTrait};
use super::valuation::{calculate_portfolio_metrics, PortfolioMetrics};
use crate::errors::{DatabaseError, Error, Result};
use crate::events::{DomainEvent, DomainEventSink};
use crate::instruments::{Instrument, InstrumentKind};
use crate::simulation::{round_price, Clock, MarketService, PriceSource, SimulationSettings};
use crate::trading::{TradeError, Transaction};

/// Rejects blank user ids before any lookup.
pub(crate) fn require_user(user_id: &str) -> Result<&str> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err(TradeError::NotAuthenticated.into());
    }
    Ok(trimmed)
}

pub struct PortfolioService {
    portfolio_repository: Arc<dyn PortfolioRepositoryTrait>,
    market: Arc<MarketService>,
    event_sink: Arc<dyn DomainEventSink>,
    clock: Arc<dyn Clock>,
    settings: SimulationSettings,
}

impl PortfolioService {
    pub fn new(
        portfolio_repository: Arc<dyn PortfolioRepositoryTrait>,
        market: Arc<MarketService>,
        event_sink: Arc<dyn DomainEventSink>,
        clock: Arc<dyn Clock>,
        settings: SimulationSettings,
    ) -> Self {
        Self {
            portfolio_repository,
            market,
            event_sink,
            clock,
            settings,
        }
    }

    fn instrument_map(&self) -> Result<HashMap<String, Instrument>> {
        Ok(self
            .market
            .list_instruments(None)?
            .into_iter()
            .map(|i| (i.id.clone(), i))
            .collect())
    }

    fn metrics_for(&self, portfolio: &Portfolio, prices: &dyn PriceSource) -> Result<PortfolioMetrics> {
        let holdings = self.portfolio_repository.get_holdings(&portfolio.id)?;
        let instruments = self.instrument_map()?;
        Ok(calculate_portfolio_metrics(
            &holdings,
            &instruments,
            prices,
            portfolio.cash_balance,
        ))
    }

    /// Values the portfolio at the final year's reference prices.
    fn build_report(&self, portfolio: &Portfolio) -> Result<SimulationReport> {
        let final_prices = self.market.reference_prices(portfolio.simulated_year)?;
        let metrics = self.metrics_for(portfolio, &final_prices)?;
        let transactions = self.portfolio_repository.list_transactions(&portfolio.id)?;
        let gain = metrics.total_value - portfolio.starting_balance;
        let total_return_percent = if portfolio.starting_balance > Decimal::ZERO {
            round_price(gain / portfolio.starting_balance * Decimal::ONE_HUNDRED)
        } else {
            Decimal::ZERO
        };

        Ok(SimulationReport {
            portfolio_id: portfolio.id.clone(),
            final_year: portfolio.simulated_year,
            starting_balance: portfolio.starting_balance,
            final_value: metrics.total_value,
            total_return_percent,
            metrics,
            transactions,
            generated_at: self.clock.now(),
        })
    }
}

#[async_trait]
impl PortfolioServiceTrait for PortfolioService {
    async fn get_or_create_portfolio(&self, user_id: &str) -> Result<Portfolio> {
        let user_id = require_user(user_id)?;
        if let Some(existing) = self.portfolio_repository.get_by_user(user_id)? {
            return Ok(existing);
        }

        let created = self
            .portfolio_repository
            .create(NewPortfolio {
                id: None,
                user_id: user_id.to_string(),
                starting_balance: self.settings.starting_balance,
                year_started_at: self.clock.now(),
            })
            .await;
        let portfolio = match created {
            Ok(portfolio) => portfolio,
            // A concurrent first visit won the insert.
            Err(Error::Database(DatabaseError::UniqueViolation(_))) => {
                if let Some(existing) = self.portfolio_repository.get_by_user(user_id)? {
                    debug!("Portfolio for user {} was created concurrently", user_id);
                    return Ok(existing);
                }
                return Err(Error::Unexpected(format!(
                    "Portfolio for user {} conflicted on create but cannot be read",
                    user_id
                )));
            }
            Err(e) => return Err(e),
        };
        info!(
            "Created portfolio {} for user {} with {} starting cash",
            portfolio.id, user_id, portfolio.starting_balance
        );
        Ok(portfolio)
    }

    fn get_portfolio(&self, user_id: &str) -> Result<Portfolio> {
        let user_id = require_user(user_id)?;
        self.portfolio_repository
            .get_by_user(user_id)?
            .ok_or_else(|| TradeError::NotAuthenticated.into())
    }

    async fn sync_simulated_year(&self, user_id: &str) -> Result<Portfolio> {
        let mut portfolio = self.get_portfolio(user_id)?;
        if portfolio.is_ended() {
            return Ok(portfolio);
        }

        let year_clock = self.settings.year_clock();
        let current_year = year_clock.simulated_year(portfolio.year_started_at, self.clock.now());
        if current_year > portfolio.simulated_year {
            let from_year = portfolio.simulated_year;
            portfolio = self
                .portfolio_repository
                .update_simulated_year(&portfolio.id, current_year)
                .await?;
            info!(
                "Portfolio {} advanced from year {} to year {}",
                portfolio.id, from_year, portfolio.simulated_year
            );
            self.event_sink.emit(DomainEvent::year_advanced(
                &portfolio.id,
                from_year,
                portfolio.simulated_year,
            ));
        } else {
            debug!(
                "Portfolio {} still in year {}",
                portfolio.id, portfolio.simulated_year
            );
        }

        if year_clock.is_final_year(portfolio.simulated_year) {
            let report = self.build_report(&portfolio)?;
            let final_value = report.final_value;
            portfolio = self
                .portfolio_repository
                .mark_ended(&portfolio.id, self.clock.now(), report)
                .await?;
            info!(
                "Simulation for portfolio {} ended in year {} with final value {}",
                portfolio.id, portfolio.simulated_year, final_value
            );
            self.event_sink
                .emit(DomainEvent::simulation_ended(&portfolio.id, final_value));
        }

        Ok(portfolio)
    }

    async fn reset_portfolio(&self, user_id: &str) -> Result<Portfolio> {
        let portfolio = self.get_portfolio(user_id)?;
        let reset = self
            .portfolio_repository
            .reset(&portfolio.id, self.settings.starting_balance, self.clock.now())
            .await?;
        self.market.clear_cache();
        info!("Portfolio {} reset to year 1", reset.id);
        self.event_sink.emit(DomainEvent::portfolio_reset(&reset.id));
        Ok(reset)
    }

    fn get_holdings(&self, user_id: &str) -> Result<Vec<Holding>> {
        let portfolio = self.get_portfolio(user_id)?;
        self.portfolio_repository.get_holdings(&portfolio.id)
    }

    fn get_metrics(&self, user_id: &str, prices: &dyn PriceSource) -> Result<PortfolioMetrics> {
        let portfolio = self.get_portfolio(user_id)?;
        self.metrics_for(&portfolio, prices)
    }

    fn get_facts(&self, user_id: &str, prices: &dyn PriceSource) -> Result<PortfolioFacts> {
        let portfolio = self.get_portfolio(user_id)?;
        let holdings = self.portfolio_repository.get_holdings(&portfolio.id)?;
        let instruments = self.instrument_map()?;
        let metrics =
            calculate_portfolio_metrics(&holdings, &instruments, prices, portfolio.cash_balance);

        let held: Vec<&Instrument> = holdings
            .iter()
            .filter_map(|h| instruments.get(&h.instrument_id))
            .collect();
        let sector_count = held
            .iter()
            .filter_map(|i| i.sector())
            .collect::<HashSet<_>>()
            .len();
        let category_count = held
            .iter()
            .filter(|i| i.kind() != InstrumentKind::Stock)
            .map(|i| i.risk_category)
            .collect::<HashSet<_>>()
            .len();
        let transaction_count = self
            .portfolio_repository
            .list_transactions(&portfolio.id)?
            .len();

        Ok(PortfolioFacts {
            portfolio_id: portfolio.id,
            simulated_year: portfolio.simulated_year,
            holdings_count: holdings.len(),
            holdings,
            total_value: metrics.total_value,
            sector_count,
            category_count,
            transaction_count,
        })
    }

    fn get_report(&self, user_id: &str) -> Result<Option<SimulationReport>> {
        let portfolio = self.get_portfolio(user_id)?;
        self.portfolio_repository.get_report(&portfolio.id)
    }

    fn list_transactions(&self, user_id: &str) -> Result<Vec<Transaction>> {
        let portfolio = self.get_portfolio(user_id)?;
        self.portfolio_repository.list_transactions(&portfolio.id)
    }
}
