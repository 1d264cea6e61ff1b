//! Buy/sell validation and execution.

mod trade_executor;
mod trading_errors;
mod trading_model;
mod trading_service;
mod trading_traits;


pub use trade_executor::{plan_buy, plan_sell, TradeContext};
pub use trading_errors::TradeError;
pub use trading_model::*;
pub use trading_service::TradeService;
pub use trading_traits::TradeServiceTrait;
