use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::portfolio_model::{Holding, NewPortfolio, Portfolio, PortfolioFacts, SimulationReport};
use super::valuation::PortfolioMetrics;
use crate::errors::Result;
use crate::simulation::PriceSource;
use crate::trading::{TradeCommit, Transaction};

/// Persistence for portfolios, holdings, the transaction log and reports.
#[async_trait]
pub trait PortfolioRepositoryTrait: Send + Sync {
    fn get_by_user(&self, user_id: &str) -> Result<Option<Portfolio>>;

    async fn create(&self, new_portfolio: NewPortfolio) -> Result<Portfolio>;

    /// Raises the persisted year to `year`. A lower value leaves it unchanged.
    async fn update_simulated_year(&self, portfolio_id: &str, year: u32) -> Result<Portfolio>;

    /// Stores the terminal report and sets `ended_at` in one transaction.
    async fn mark_ended(
        &self,
        portfolio_id: &str,
        ended_at: DateTime<Utc>,
        report: SimulationReport,
    ) -> Result<Portfolio>;

    /// Restores cash, clears holdings, transactions and report, restarts at year 1.
    async fn reset(
        &self,
        portfolio_id: &str,
        starting_balance: Decimal,
        year_started_at: DateTime<Utc>,
    ) -> Result<Portfolio>;

    fn get_holdings(&self, portfolio_id: &str) -> Result<Vec<Holding>>;

    /// Writes cash, the holding change and the transaction atomically.
    async fn apply_trade(&self, commit: TradeCommit) -> Result<()>;

    /// Oldest first.
    fn list_transactions(&self, portfolio_id: &str) -> Result<Vec<Transaction>>;

    fn get_report(&self, portfolio_id: &str) -> Result<Option<SimulationReport>>;
}

#[async_trait]
pub trait PortfolioServiceTrait: Send + Sync {
    async fn get_or_create_portfolio(&self, user_id: &str) -> Result<Portfolio>;

    /// `NotAuthenticated` when the user is blank or has no portfolio.
    fn get_portfolio(&self, user_id: &str) -> Result<Portfolio>;

    /// Recomputes the year from the wall clock and persists it when it advanced.
    /// Ends the run on first reaching the final year.
    async fn sync_simulated_year(&self, user_id: &str) -> Result<Portfolio>;

    async fn reset_portfolio(&self, user_id: &str) -> Result<Portfolio>;

    fn get_holdings(&self, user_id: &str) -> Result<Vec<Holding>>;

    fn get_metrics(&self, user_id: &str, prices: &dyn PriceSource) -> Result<PortfolioMetrics>;

    fn get_facts(&self, user_id: &str, prices: &dyn PriceSource) -> Result<PortfolioFacts>;

    fn get_report(&self, user_id: &str) -> Result<Option<SimulationReport>>;

    fn list_transactions(&self, user_id: &str) -> Result<Vec<Transaction>>;
}
