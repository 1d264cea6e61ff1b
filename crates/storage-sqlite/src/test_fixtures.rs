//! Temp-file databases and a small catalog for repository tests.

use rust_decimal_macros::dec;
use std::sync::Arc;
use tempfile::TempDir;

use crate::db::{create_pool, run_migrations, spawn_writer, DbPool, WriteHandle};
use simvest_core::instruments::{Instrument, InstrumentDetails, RiskCategory};

pub(crate) const GARDEN_ID: &str = "3f2a9c1e-7b4d-4e8a-9c2f-1a2b3c4d5e6f";
pub(crate) const ROCKET_ID: &str = "0badf00d-2222-4000-8000-000000000002";
pub(crate) const INDEX_ID: &str = "a1b2c3d4-0000-4000-8000-000000000003";

/// Migrated database in a temp dir. Keep the `TempDir` alive for the test.
/// Must run inside a Tokio runtime for the writer task.
pub(crate) fn setup_db() -> (Arc<DbPool>, WriteHandle, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = dir.path().join("test.db");
    let pool = create_pool(&db_path.to_string_lossy()).expect("Failed to create pool");
    run_migrations(&pool).expect("Failed to run migrations");
    let writer = spawn_writer((*pool).clone());
    (pool, writer, dir)
}

pub(crate) fn sample_catalog() -> Vec<Instrument> {
    vec![
        Instrument {
            id: GARDEN_ID.to_string(),
            symbol: "GRDN".to_string(),
            name: "Garden Utilities".to_string(),
            base_price: dec!(100),
            risk_category: RiskCategory::Low,
            details: InstrumentDetails::Stock {
                sector: "Utilities".to_string(),
            },
        },
        Instrument {
            id: ROCKET_ID.to_string(),
            symbol: "RCKT".to_string(),
            name: "Rocket Robotics".to_string(),
            base_price: dec!(250),
            risk_category: RiskCategory::High,
            details: InstrumentDetails::Stock {
                sector: "Technology".to_string(),
            },
        },
        Instrument {
            id: INDEX_ID.to_string(),
            symbol: "IDX50".to_string(),
            name: "Nifty 50 Index Fund".to_string(),
            base_price: dec!(10),
            risk_category: RiskCategory::Index,
            details: InstrumentDetails::IndexFund {
                tracked_index: Some("NIFTY 50".to_string()),
                expense_ratio: Some(dec!(0.20)),
            },
        },
    ]
}
