//! SQLite storage for portfolios, holdings, the trade log and terminal reports.

mod model;
mod repository;

pub use model::{HoldingDB, PortfolioDB, SimulationReportDB, TransactionDB};
pub use repository::PortfolioRepository;
