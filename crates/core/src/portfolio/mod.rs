//! Portfolio state, valuation and the simulation run lifecycle.

mod portfolio_model;
mod portfolio_service;
mod portfolio_traits;
pub mod valuation;


pub use portfolio_model::*;
pub(crate) use portfolio_service::require_user;
pub use portfolio_service::PortfolioService;
pub use portfolio_traits::{PortfolioRepositoryTrait, PortfolioServiceTrait};
pub use valuation::{calculate_portfolio_metrics, risk_score, PortfolioMetrics, PositionValuation};
