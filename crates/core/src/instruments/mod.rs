//! Instruments module - catalog models and repository traits.

mod instruments_model;
mod instruments_traits;

pub use instruments_model::*;
pub use instruments_traits::InstrumentRepositoryTrait;
