//! Portfolio domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::valuation::PortfolioMetrics;
use crate::trading::Transaction;

/// One user's simulated trading account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: String,
    pub user_id: String,
    pub cash_balance: Decimal,
    pub starting_balance: Decimal,
    /// Last persisted simulated year. Never decreases within a run.
    pub simulated_year: u32,
    /// Wall-clock anchor of year 1.
    pub year_started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Portfolio {
    pub fn is_ended(&self) -> bool {
        self.ended_at.is_some()
    }
}

/// Input model for creating a portfolio.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPortfolio {
    pub id: Option<String>,
    pub user_id: String,
    pub starting_balance: Decimal,
    pub year_started_at: DateTime<Utc>,
}

/// Position in a single instrument. Exists only while `quantity > 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub id: String,
    pub portfolio_id: String,
    pub instrument_id: String,
    pub quantity: Decimal,
    /// Weighted mean cost per unit.
    pub average_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Terminal snapshot produced when a run reaches its final year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationReport {
    pub portfolio_id: String,
    pub final_year: u32,
    pub starting_balance: Decimal,
    pub final_value: Decimal,
    pub total_return_percent: Decimal,
    pub metrics: PortfolioMetrics,
    pub transactions: Vec<Transaction>,
    pub generated_at: DateTime<Utc>,
}

/// Aggregates handed to challenge and badge tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioFacts {
    pub portfolio_id: String,
    pub simulated_year: u32,
    pub holdings: Vec<Holding>,
    pub holdings_count: usize,
    pub total_value: Decimal,
    /// Distinct sectors across stock holdings.
    pub sector_count: usize,
    /// Distinct risk categories across fund holdings.
    pub category_count: usize,
    pub transaction_count: usize,
}
