//! Domain event types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::trading::TradeType;

/// Facts about committed simulation state changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// A buy or sell was committed.
    TradeExecuted {
        portfolio_id: String,
        user_id: String,
        instrument_id: String,
        trade_type: TradeType,
        transaction_id: String,
    },

    /// The persisted simulated year moved forward.
    SimulatedYearAdvanced {
        portfolio_id: String,
        from_year: u32,
        to_year: u32,
    },

    /// The run reached its final year and a report was stored.
    SimulationEnded {
        portfolio_id: String,
        final_value: Decimal,
    },

    /// Holdings and history were wiped and the run restarted at year 1.
    PortfolioReset { portfolio_id: String },
}

impl DomainEvent {
    pub fn trade_executed(
        portfolio_id: &str,
        user_id: &str,
        instrument_id: &str,
        trade_type: TradeType,
        transaction_id: &str,
    ) -> Self {
        Self::TradeExecuted {
            portfolio_id: portfolio_id.to_string(),
            user_id: user_id.to_string(),
            instrument_id: instrument_id.to_string(),
            trade_type,
            transaction_id: transaction_id.to_string(),
        }
    }

    pub fn year_advanced(portfolio_id: &str, from_year: u32, to_year: u32) -> Self {
        Self::SimulatedYearAdvanced {
            portfolio_id: portfolio_id.to_string(),
            from_year,
            to_year,
        }
    }

    pub fn simulation_ended(portfolio_id: &str, final_value: Decimal) -> Self {
        Self::SimulationEnded {
            portfolio_id: portfolio_id.to_string(),
            final_value,
        }
    }

    pub fn portfolio_reset(portfolio_id: &str) -> Self {
        Self::PortfolioReset {
            portfolio_id: portfolio_id.to_string(),
        }
    }

    /// The portfolio this event concerns.
    pub fn portfolio_id(&self) -> &str {
        match self {
            Self::TradeExecuted { portfolio_id, .. }
            | Self::SimulatedYearAdvanced { portfolio_id, .. }
            | Self::SimulationEnded { portfolio_id, .. }
            | Self::PortfolioReset { portfolio_id } => portfolio_id,
        }
    }
}
