use rust_decimal::Decimal;
use thiserror::Error;

/// Reasons a trade is rejected. A rejected trade never mutates cash or holdings.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TradeError {
    #[error("Insufficient funds: trade costs {required} but only {available} is available")]
    InsufficientFunds {
        required: Decimal,
        available: Decimal,
    },

    #[error("Insufficient position: tried to sell {requested} but only {held} is held")]
    InsufficientPosition { requested: Decimal, held: Decimal },

    #[error("Instrument not found: {0}")]
    InstrumentNotFound(String),

    #[error("No portfolio for the current user. Sign in to trade.")]
    NotAuthenticated,

    #[error("Invalid trade: {0}")]
    InvalidTrade(String),

    #[error("The simulation has ended. Reset the portfolio to trade again.")]
    SimulationEnded,
}

impl TradeError {
    /// Stable code for clients.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::InsufficientPosition { .. } => "INSUFFICIENT_POSITION",
            Self::InstrumentNotFound(_) => "INSTRUMENT_NOT_FOUND",
            Self::NotAuthenticated => "NOT_AUTHENTICATED",
            Self::InvalidTrade(_) => "INVALID_TRADE",
            Self::SimulationEnded => "SIMULATION_ENDED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_messages_are_readable() {
        let err = TradeError::InsufficientFunds {
            required: dec!(1500.00),
            available: dec!(900),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient funds: trade costs 1500.00 but only 900 is available"
        );
        assert_eq!(err.kind(), "INSUFFICIENT_FUNDS");
        assert_eq!(TradeError::SimulationEnded.kind(), "SIMULATION_ENDED");
    }
}
