use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::{debug, info, warn};
use std::sync::Arc;

use super::market_service::MarketService;
use super::market_session::MarketSession;
use super::simulation_settings::TickIntervals;
use super::ticker::{TickTarget, Ticker};
use crate::errors::Result;
use crate::portfolio::{require_user, Portfolio, PortfolioServiceTrait};

/// Tick handler bound to one user's session.
pub struct SessionDriver {
    user_id: String,
    session: Arc<MarketSession>,
    portfolio_service: Arc<dyn PortfolioServiceTrait>,
}

impl SessionDriver {
    pub fn new(
        user_id: String,
        session: Arc<MarketSession>,
        portfolio_service: Arc<dyn PortfolioServiceTrait>,
    ) -> Self {
        Self {
            user_id,
            session,
            portfolio_service,
        }
    }
}

#[async_trait]
impl TickTarget for SessionDriver {
    async fn on_jitter_tick(&self) {
        self.session.jitter_tick(&mut rand::thread_rng());
    }

    async fn on_year_check(&self) {
        match self
            .portfolio_service
            .sync_simulated_year(&self.user_id)
            .await
        {
            Ok(portfolio) => {
                self.session.recompute_year(portfolio.simulated_year);
            }
            Err(e) => warn!("Year check failed for user {}: {}", self.user_id, e),
        }
    }
}

struct ActiveSession {
    session: Arc<MarketSession>,
    ticker: Ticker,
}

/// Owns one market session and its timers per signed-in user.
pub struct SessionManager {
    market: Arc<MarketService>,
    portfolio_service: Arc<dyn PortfolioServiceTrait>,
    intervals: TickIntervals,
    sessions: DashMap<String, ActiveSession>,
}

impl SessionManager {
    pub fn new(
        market: Arc<MarketService>,
        portfolio_service: Arc<dyn PortfolioServiceTrait>,
        intervals: TickIntervals,
    ) -> Self {
        Self {
            market,
            portfolio_service,
            intervals,
            sessions: DashMap::new(),
        }
    }

    /// Returns the user's session, starting it (and the portfolio) on first use.
    pub async fn open(&self, user_id: &str) -> Result<Arc<MarketSession>> {
        let user_id = require_user(user_id)?;
        if let Some(session) = self.get(user_id) {
            return Ok(session);
        }

        self.portfolio_service.get_or_create_portfolio(user_id).await?;
        let portfolio = self.portfolio_service.sync_simulated_year(user_id).await?;
        let session = self.market.create_session(portfolio.simulated_year)?;

        match self.sessions.entry(user_id.to_string()) {
            Entry::Occupied(existing) => Ok(existing.get().session.clone()),
            Entry::Vacant(slot) => {
                let driver = SessionDriver::new(
                    user_id.to_string(),
                    session.clone(),
                    self.portfolio_service.clone(),
                );
                let ticker = Ticker::spawn(Arc::new(driver), self.intervals);
                slot.insert(ActiveSession {
                    session: session.clone(),
                    ticker,
                });
                info!(
                    "Opened session for user {} at year {}",
                    user_id, portfolio.simulated_year
                );
                Ok(session)
            }
        }
    }

    pub fn get(&self, user_id: &str) -> Option<Arc<MarketSession>> {
        self.sessions
            .get(user_id)
            .map(|active| active.session.clone())
    }

    /// Resets the user's portfolio and moves an open session back to year 1.
    pub async fn reset(&self, user_id: &str) -> Result<Portfolio> {
        let portfolio = self.portfolio_service.reset_portfolio(user_id).await?;
        if let Some(session) = self.get(user_id) {
            session.recompute_year(portfolio.simulated_year);
        }
        Ok(portfolio)
    }

    /// Stops the user's timers. Returns `false` when no session was open.
    pub async fn close(&self, user_id: &str) -> bool {
        match self.sessions.remove(user_id) {
            Some((_, active)) => {
                active.ticker.shutdown().await;
                debug!("Closed session for user {}", user_id);
                true
            }
            None => false,
        }
    }

    pub async fn close_all(&self) {
        let users: Vec<String> = self.sessions.iter().map(|e| e.key().clone()).collect();
        for user_id in &users {
            self.close(user_id).await;
        }
        info!("Closed {} sessions", users.len());
    }

    pub fn open_count(&self) -> usize {
        self.sessions.len()
    }
}
