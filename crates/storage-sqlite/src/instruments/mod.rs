//! SQLite storage implementation for the instrument catalog.

mod model;
mod repository;

pub use model::InstrumentDB;
pub use repository::InstrumentRepository;
