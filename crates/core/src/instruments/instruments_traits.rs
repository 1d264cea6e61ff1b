//! Instrument catalog repository trait.

use async_trait::async_trait;

use super::instruments_model::{Instrument, InstrumentKind};
use crate::errors::Result;

/// Read access to the instrument catalog, plus bulk seeding.
///
/// The catalog is read-only to the engine: `base_price` never changes once an
/// instrument exists.
#[async_trait]
pub trait InstrumentRepositoryTrait: Send + Sync {
    /// Lists instruments, optionally restricted to one kind.
    fn list_instruments(&self, kind: Option<InstrumentKind>) -> Result<Vec<Instrument>>;

    /// Retrieves one instrument. Returns `Ok(None)` for unknown ids.
    fn get_instrument(&self, instrument_id: &str) -> Result<Option<Instrument>>;

    /// Inserts catalog rows that do not exist yet. Existing rows are left untouched.
    ///
    /// Returns the number of inserted instruments.
    async fn insert_missing(&self, instruments: Vec<Instrument>) -> Result<usize>;
}
