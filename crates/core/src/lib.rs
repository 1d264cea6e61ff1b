//! Simvest Core - simulation engine, domain entities, services, and traits.
//!
//! This crate contains the market simulation and portfolio logic for Simvest.
//! It is database-agnostic and defines traits that are implemented
//! by the `storage-sqlite` crate.

pub mod constants;
pub mod errors;
pub mod events;
pub mod instruments;
pub mod portfolio;
pub mod simulation;
pub mod trading;

#[cfg(test)]
mod test_support;

// Re-export common types from the instrument and simulation modules
pub use instruments::*;
pub use simulation::{Clock, ManualClock, SystemClock};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
