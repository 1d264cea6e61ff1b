//! Database models for portfolio state.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::utils::{format_timestamp, parse_decimal, parse_timestamp, year_from_db, year_to_db};
use simvest_core::portfolio::{Holding, Portfolio, SimulationReport};
use simvest_core::trading::{TradeType, Transaction};

#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::portfolios)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct PortfolioDB {
    pub id: String,
    pub user_id: String,
    pub cash_balance: String,
    pub starting_balance: String,
    pub simulated_year: i32,
    pub year_started_at: String,
    pub ended_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<PortfolioDB> for Portfolio {
    fn from(db: PortfolioDB) -> Self {
        Self {
            cash_balance: parse_decimal(&db.cash_balance, "cash_balance"),
            starting_balance: parse_decimal(&db.starting_balance, "starting_balance"),
            simulated_year: year_from_db(db.simulated_year),
            year_started_at: parse_timestamp(&db.year_started_at, "year_started_at"),
            ended_at: db
                .ended_at
                .as_deref()
                .map(|s| parse_timestamp(s, "ended_at")),
            created_at: parse_timestamp(&db.created_at, "created_at"),
            updated_at: parse_timestamp(&db.updated_at, "updated_at"),
            id: db.id,
            user_id: db.user_id,
        }
    }
}

#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::holdings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct HoldingDB {
    pub id: String,
    pub portfolio_id: String,
    pub instrument_id: String,
    pub quantity: String,
    pub average_price: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<HoldingDB> for Holding {
    fn from(db: HoldingDB) -> Self {
        Self {
            quantity: parse_decimal(&db.quantity, "quantity"),
            average_price: parse_decimal(&db.average_price, "average_price"),
            created_at: parse_timestamp(&db.created_at, "created_at"),
            updated_at: parse_timestamp(&db.updated_at, "updated_at"),
            id: db.id,
            portfolio_id: db.portfolio_id,
            instrument_id: db.instrument_id,
        }
    }
}

impl From<Holding> for HoldingDB {
    fn from(domain: Holding) -> Self {
        Self {
            quantity: domain.quantity.to_string(),
            average_price: domain.average_price.to_string(),
            created_at: format_timestamp(domain.created_at),
            updated_at: format_timestamp(domain.updated_at),
            id: domain.id,
            portfolio_id: domain.portfolio_id,
            instrument_id: domain.instrument_id,
        }
    }
}

/// Trade log row. `seq_no` orders a portfolio's transactions by commit order.
#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TransactionDB {
    pub id: String,
    pub portfolio_id: String,
    pub instrument_id: String,
    pub trade_type: String,
    pub quantity: String,
    pub price_per_unit: String,
    pub total_amount: String,
    pub simulated_year: i32,
    pub seq_no: i32,
    pub created_at: String,
}

impl TransactionDB {
    pub fn from_domain(domain: Transaction, seq_no: i32) -> Self {
        Self {
            trade_type: domain.trade_type.as_str().to_string(),
            quantity: domain.quantity.to_string(),
            price_per_unit: domain.price_per_unit.to_string(),
            total_amount: domain.total_amount.to_string(),
            simulated_year: year_to_db(domain.simulated_year),
            created_at: format_timestamp(domain.created_at),
            id: domain.id,
            portfolio_id: domain.portfolio_id,
            instrument_id: domain.instrument_id,
            seq_no,
        }
    }
}

impl From<TransactionDB> for Transaction {
    fn from(db: TransactionDB) -> Self {
        let trade_type = TradeType::from_db_str(&db.trade_type).unwrap_or_else(|| {
            log::error!("Unknown trade type '{}' on transaction {}", db.trade_type, db.id);
            TradeType::Buy
        });
        Self {
            trade_type,
            quantity: parse_decimal(&db.quantity, "quantity"),
            price_per_unit: parse_decimal(&db.price_per_unit, "price_per_unit"),
            total_amount: parse_decimal(&db.total_amount, "total_amount"),
            simulated_year: year_from_db(db.simulated_year),
            created_at: parse_timestamp(&db.created_at, "created_at"),
            id: db.id,
            portfolio_id: db.portfolio_id,
            instrument_id: db.instrument_id,
        }
    }
}

/// Terminal report. Summary columns are queryable; `report_json` holds the full snapshot.
#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::simulation_reports)]
#[diesel(primary_key(portfolio_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SimulationReportDB {
    pub portfolio_id: String,
    pub final_year: i32,
    pub final_value: String,
    pub total_return_percent: String,
    pub report_json: String,
    pub generated_at: String,
}

impl TryFrom<&SimulationReport> for SimulationReportDB {
    type Error = serde_json::Error;

    fn try_from(report: &SimulationReport) -> Result<Self, Self::Error> {
        Ok(Self {
            portfolio_id: report.portfolio_id.clone(),
            final_year: year_to_db(report.final_year),
            final_value: report.final_value.to_string(),
            total_return_percent: report.total_return_percent.to_string(),
            report_json: serde_json::to_string(report)?,
            generated_at: format_timestamp(report.generated_at),
        })
    }
}

impl TryFrom<SimulationReportDB> for SimulationReport {
    type Error = serde_json::Error;

    fn try_from(db: SimulationReportDB) -> Result<Self, Self::Error> {
        serde_json::from_str(&db.report_json)
    }
}
