//! SQLite storage implementation for Simvest.
//!
//! This crate is the only place Diesel appears. It implements the repository
//! traits defined in `simvest-core`:
//! - connection pooling and the single-writer actor
//! - embedded Diesel migrations
//! - instrument catalog and portfolio repositories
//!
//! ```text
//!        core (domain, traits)
//!                  │
//!                  ▼
//!          storage-sqlite (this crate)
//!                  │
//!                  ▼
//!              SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;

pub mod instruments;
pub mod portfolio;

mod utils;

#[cfg(test)]
mod test_fixtures;

pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};
pub use errors::{IntoCore, StorageError};
pub use instruments::InstrumentRepository;
pub use portfolio::PortfolioRepository;

pub use simvest_core::errors::{DatabaseError, Error, Result};
