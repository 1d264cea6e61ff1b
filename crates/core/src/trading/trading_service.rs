use async_trait::async_trait;
use log::{debug, info, warn};
use std::sync::Arc;

use super::trade_executor::{plan_buy, plan_sell, TradeContext};
use super::trading_errors::TradeError;
use super::trading_model::{TradeCommit, TradeReceipt, TradeSize, TradeType};
use super::trading_traits::TradeServiceTrait;
use crate::errors::Result;
use crate::events::{DomainEvent, DomainEventSink};
use crate::portfolio::{require_user, PortfolioRepositoryTrait};
use crate::simulation::{Clock, MarketService, PriceSource, SimulationSettings};

/// Plans per trade before a persistent write conflict is returned.
const MAX_TRADE_ATTEMPTS: usize = 3;

pub struct TradeService {
    portfolio_repository: Arc<dyn PortfolioRepositoryTrait>,
    market: Arc<MarketService>,
    event_sink: Arc<dyn DomainEventSink>,
    clock: Arc<dyn Clock>,
    settings: SimulationSettings,
}

impl TradeService {
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

    async fn execute(
        &self,
        trade_type: TradeType,
        user_id: &str,
        instrument_id: &str,
        size: TradeSize,
        prices: &dyn PriceSource,
    ) -> Result<TradeReceipt> {
        let user_id = require_user(user_id)?;
        let mut attempt = 1;
        let commit = loop {
            match self
                .plan_and_apply(trade_type, user_id, instrument_id, size, prices)
                .await
            {
                Err(e) if e.is_write_conflict() && attempt < MAX_TRADE_ATTEMPTS => {
                    warn!(
                        "Retrying {} for user {} after write conflict (attempt {}): {}",
                        trade_type.as_str(),
                        user_id,
                        attempt,
                        e
                    );
                    attempt += 1;
                }
                result => break result?,
            }
        };

        info!(
            "{} {} of {} for {} (cash now {})",
            trade_type.as_str(),
            commit.transaction.quantity,
            commit.transaction.instrument_id,
            commit.transaction.total_amount,
            commit.new_cash_balance
        );
        self.event_sink.emit(DomainEvent::trade_executed(
            &commit.portfolio_id,
            user_id,
            &commit.transaction.instrument_id,
            trade_type,
            &commit.transaction.id,
        ));

        Ok(TradeReceipt::from(commit))
    }

    /// Reads current state, validates, and applies one commit planned from it.
    async fn plan_and_apply(
        &self,
        trade_type: TradeType,
        user_id: &str,
        instrument_id: &str,
        size: TradeSize,
        prices: &dyn PriceSource,
    ) -> Result<TradeCommit> {
        let portfolio = self
            .portfolio_repository
            .get_by_user(user_id)?
            .ok_or(TradeError::NotAuthenticated)?;
        if portfolio.is_ended() && self.settings.reject_trades_after_end {
            return Err(TradeError::SimulationEnded.into());
        }

        let instrument = self.market.get_instrument(instrument_id)?;
        let price = prices.current_price(&instrument.id).ok_or_else(|| {
            TradeError::InvalidTrade(format!("No live price for {}", instrument.symbol))
        })?;
        let holdings = self.portfolio_repository.get_holdings(&portfolio.id)?;
        let holding = holdings.iter().find(|h| h.instrument_id == instrument.id);

        let now = self.clock.now();
        let simulated_year = self
            .settings
            .year_clock()
            .simulated_year(portfolio.year_started_at, now)
            .max(portfolio.simulated_year);

        let ctx = TradeContext {
            portfolio: &portfolio,
            instrument: &instrument,
            holding,
            price,
            simulated_year,
            now,
        };
        let commit = match trade_type {
            TradeType::Buy => plan_buy(&ctx, size)?,
            TradeType::Sell => plan_sell(&ctx, size)?,
        };
        debug!(
            "Applying {} of {} {} at {} for portfolio {}",
            trade_type.as_str(),
            commit.transaction.quantity,
            instrument.symbol,
            price,
            portfolio.id
        );

        self.portfolio_repository.apply_trade(commit.clone()).await?;
        Ok(commit)
    }
}

#[async_trait]
impl TradeServiceTrait for TradeService {
    async fn buy(
        &self,
        user_id: &str,
        instrument_id: &str,
        size: TradeSize,
        prices: &dyn PriceSource,
    ) -> Result<TradeReceipt> {
        self.execute(TradeType::Buy, user_id, instrument_id, size, prices)
            .await
    }

    async fn sell(
        &self,
        user_id: &str,
        instrument_id: &str,
        size: TradeSize,
        prices: &dyn PriceSource,
    ) -> Result<TradeReceipt> {
        self.execute(TradeType::Sell, user_id, instrument_id, size, prices)
            .await
    }
}
