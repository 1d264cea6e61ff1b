use async_trait::async_trait;
use diesel::prelude::*;
use std::sync::Arc;

use super::model::InstrumentDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::instruments;
use simvest_core::errors::Result;
use simvest_core::instruments::{Instrument, InstrumentKind, InstrumentRepositoryTrait};

pub struct InstrumentRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl InstrumentRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl InstrumentRepositoryTrait for InstrumentRepository {
    fn list_instruments(&self, kind: Option<InstrumentKind>) -> Result<Vec<Instrument>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = instruments::table.into_boxed();
        if let Some(kind) = kind {
            query = query.filter(instruments::kind.eq(kind.as_db_str()));
        }
        let rows = query
            .order(instruments::symbol.asc())
            .select(InstrumentDB::as_select())
            .load::<InstrumentDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Instrument::from).collect())
    }

    fn get_instrument(&self, instrument_id: &str) -> Result<Option<Instrument>> {
        let mut conn = get_connection(&self.pool)?;
        let row = instruments::table
            .find(instrument_id)
            .select(InstrumentDB::as_select())
            .first::<InstrumentDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(Instrument::from))
    }

    async fn insert_missing(&self, catalog: Vec<Instrument>) -> Result<usize> {
        let rows = catalog
            .into_iter()
            .map(InstrumentDB::try_from)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StorageError::from)?;

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let mut inserted = 0;
                for row in &rows {
                    inserted += diesel::insert_or_ignore_into(instruments::table)
                        .values(row)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                Ok(inserted)
            })
            .await
    }
}
