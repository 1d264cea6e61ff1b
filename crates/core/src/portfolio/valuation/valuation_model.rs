//! Portfolio valuation domain models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::instruments::{InstrumentKind, RiskCategory};

/// Valuation of one holding at the current price.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PositionValuation {
    pub holding_id: String,
    pub instrument_id: String,
    pub symbol: Option<String>,
    pub kind: Option<InstrumentKind>,
    pub risk_category: Option<RiskCategory>,
    pub quantity: Decimal,
    pub average_price: Decimal,
    pub current_price: Decimal,
    pub current_value: Decimal,
    pub invested_value: Decimal,
    pub profit_loss: Decimal,
    pub profit_loss_percent: Decimal,
    /// Share of total holdings value, in percent.
    pub weight_percent: Decimal,
}

/// Portfolio-level value, P&L and risk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioMetrics {
    pub cash_balance: Decimal,
    pub holdings_value: Decimal,
    pub total_value: Decimal,
    pub total_invested: Decimal,
    pub unrealized_pl: Decimal,
    pub unrealized_pl_percent: Decimal,
    /// 0 to 100, higher is riskier.
    pub risk_score: u8,
    pub positions: Vec<PositionValuation>,
}
