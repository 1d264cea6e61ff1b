mod risk;
mod valuation_calculator;
mod valuation_model;

pub use risk::{risk_score, RiskInput};
pub use valuation_calculator::calculate_portfolio_metrics;
pub use valuation_model::*;
