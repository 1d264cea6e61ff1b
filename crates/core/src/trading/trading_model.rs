use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::portfolio::Holding;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeType {
    Buy,
    Sell,
}

impl TradeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "BUY" => Some(Self::Buy),
            "SELL" => Some(Self::Sell),
            _ => None,
        }
    }
}

/// How much to trade.
///
/// `Quantity` is whole shares for stocks and units for funds. `Amount` is a
/// cash value converted to fund units at the current NAV. `All` closes the
/// position and is only valid on a sell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TradeSize {
    Quantity(Decimal),
    Amount(Decimal),
    All,
}

/// Immutable audit record of one executed trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub portfolio_id: String,
    pub instrument_id: String,
    pub trade_type: TradeType,
    pub quantity: Decimal,
    pub price_per_unit: Decimal,
    pub total_amount: Decimal,
    pub simulated_year: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HoldingChange {
    Upsert(Holding),
    Delete { holding_id: String },
}

/// Stored state a commit was planned against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommitPrecondition {
    pub cash_balance: Decimal,
    /// Quantity held in the traded instrument, `None` when no position existed.
    pub holding_quantity: Option<Decimal>,
}

/// Everything a validated trade writes, applied by the repository in one transaction.
///
/// The repository refuses the commit with `DatabaseError::WriteConflict` when
/// the stored cash or position no longer matches `expected`.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeCommit {
    pub portfolio_id: String,
    pub expected: CommitPrecondition,
    pub new_cash_balance: Decimal,
    pub holding_change: HoldingChange,
    pub transaction: Transaction,
}

impl TradeCommit {
    /// The holding as it stands after the trade, `None` once closed.
    pub fn resulting_holding(&self) -> Option<&Holding> {
        match &self.holding_change {
            HoldingChange::Upsert(holding) => Some(holding),
            HoldingChange::Delete { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeReceipt {
    pub transaction: Transaction,
    pub cash_balance: Decimal,
    pub holding: Option<Holding>,
}

impl From<TradeCommit> for TradeReceipt {
    fn from(commit: TradeCommit) -> Self {
        let holding = commit.resulting_holding().cloned();
        Self {
            transaction: commit.transaction,
            cash_balance: commit.new_cash_balance,
            holding,
        }
    }
}
