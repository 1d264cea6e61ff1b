use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use super::model::{HoldingDB, PortfolioDB, SimulationReportDB, TransactionDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{holdings, portfolios, simulation_reports, transactions};
use crate::utils::{format_timestamp, parse_decimal, year_from_db, year_to_db};
use simvest_core::errors::{DatabaseError, Error, Result};
use simvest_core::portfolio::{
    Holding, NewPortfolio, Portfolio, PortfolioRepositoryTrait, SimulationReport,
};
use simvest_core::trading::{HoldingChange, TradeCommit, Transaction};

pub struct PortfolioRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl PortfolioRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

fn load_portfolio(conn: &mut SqliteConnection, portfolio_id: &str) -> Result<PortfolioDB> {
    portfolios::table
        .find(portfolio_id)
        .select(PortfolioDB::as_select())
        .first::<PortfolioDB>(conn)
        .optional()
        .map_err(StorageError::from)?
        .ok_or_else(|| {
            Error::Database(DatabaseError::NotFound(format!(
                "portfolio {}",
                portfolio_id
            )))
        })
}

fn next_seq_no(conn: &mut SqliteConnection, portfolio_id: &str) -> Result<i32> {
    let current: Option<i32> = transactions::table
        .filter(transactions::portfolio_id.eq(portfolio_id))
        .select(diesel::dsl::max(transactions::seq_no))
        .first(conn)
        .map_err(StorageError::from)?;
    Ok(current.unwrap_or(0) + 1)
}

#[async_trait]
impl PortfolioRepositoryTrait for PortfolioRepository {
    fn get_by_user(&self, user_id: &str) -> Result<Option<Portfolio>> {
        let mut conn = get_connection(&self.pool)?;
        let row = portfolios::table
            .filter(portfolios::user_id.eq(user_id))
            .select(PortfolioDB::as_select())
            .first::<PortfolioDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(Portfolio::from))
    }

    async fn create(&self, new_portfolio: NewPortfolio) -> Result<Portfolio> {
        let now = format_timestamp(Utc::now());
        let row = PortfolioDB {
            id: new_portfolio
                .id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            user_id: new_portfolio.user_id,
            cash_balance: new_portfolio.starting_balance.to_string(),
            starting_balance: new_portfolio.starting_balance.to_string(),
            simulated_year: 1,
            year_started_at: format_timestamp(new_portfolio.year_started_at),
            ended_at: None,
            created_at: now.clone(),
            updated_at: now,
        };

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Portfolio> {
                diesel::insert_into(portfolios::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(row.into())
            })
            .await
    }

    async fn update_simulated_year(&self, portfolio_id: &str, year: u32) -> Result<Portfolio> {
        let portfolio_id = portfolio_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Portfolio> {
                let mut row = load_portfolio(conn, &portfolio_id)?;
                if year_from_db(row.simulated_year) >= year {
                    return Ok(row.into());
                }
                row.simulated_year = year_to_db(year);
                row.updated_at = format_timestamp(Utc::now());
                diesel::update(portfolios::table.find(&portfolio_id))
                    .set((
                        portfolios::simulated_year.eq(row.simulated_year),
                        portfolios::updated_at.eq(&row.updated_at),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(row.into())
            })
            .await
    }

    async fn mark_ended(
        &self,
        portfolio_id: &str,
        ended_at: DateTime<Utc>,
        report: SimulationReport,
    ) -> Result<Portfolio> {
        let portfolio_id = portfolio_id.to_string();
        let report_row = SimulationReportDB::try_from(&report).map_err(StorageError::from)?;

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Portfolio> {
                let mut row = load_portfolio(conn, &portfolio_id)?;
                diesel::replace_into(simulation_reports::table)
                    .values(&report_row)
                    .execute(conn)
                    .map_err(StorageError::from)?;

                row.ended_at = Some(format_timestamp(ended_at));
                row.updated_at = format_timestamp(Utc::now());
                diesel::update(portfolios::table.find(&portfolio_id))
                    .set((
                        portfolios::ended_at.eq(row.ended_at.clone()),
                        portfolios::updated_at.eq(&row.updated_at),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(row.into())
            })
            .await
    }

    async fn reset(
        &self,
        portfolio_id: &str,
        starting_balance: Decimal,
        year_started_at: DateTime<Utc>,
    ) -> Result<Portfolio> {
        let portfolio_id = portfolio_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Portfolio> {
                let mut row = load_portfolio(conn, &portfolio_id)?;

                diesel::delete(holdings::table.filter(holdings::portfolio_id.eq(&portfolio_id)))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                diesel::delete(
                    transactions::table.filter(transactions::portfolio_id.eq(&portfolio_id)),
                )
                .execute(conn)
                .map_err(StorageError::from)?;
                diesel::delete(simulation_reports::table.find(&portfolio_id))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                row.cash_balance = starting_balance.to_string();
                row.starting_balance = starting_balance.to_string();
                row.simulated_year = 1;
                row.year_started_at = format_timestamp(year_started_at);
                row.ended_at = None;
                row.updated_at = format_timestamp(Utc::now());
                diesel::update(portfolios::table.find(&portfolio_id))
                    .set(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(row.into())
            })
            .await
    }

    fn get_holdings(&self, portfolio_id: &str) -> Result<Vec<Holding>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = holdings::table
            .filter(holdings::portfolio_id.eq(portfolio_id))
            .order(holdings::created_at.asc())
            .select(HoldingDB::as_select())
            .load::<HoldingDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Holding::from).collect())
    }

    async fn apply_trade(&self, commit: TradeCommit) -> Result<()> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                let stored = load_portfolio(conn, &commit.portfolio_id)?;
                let held = holdings::table
                    .filter(holdings::portfolio_id.eq(&commit.portfolio_id))
                    .filter(holdings::instrument_id.eq(&commit.transaction.instrument_id))
                    .select(holdings::quantity)
                    .first::<String>(conn)
                    .optional()
                    .map_err(StorageError::from)?
                    .map(|q| parse_decimal(&q, "quantity"));
                if parse_decimal(&stored.cash_balance, "cash_balance")
                    != commit.expected.cash_balance
                    || held != commit.expected.holding_quantity
                {
                    return Err(Error::Database(DatabaseError::WriteConflict(format!(
                        "portfolio {} changed since the trade was planned",
                        commit.portfolio_id
                    ))));
                }

                diesel::update(portfolios::table.find(&commit.portfolio_id))
                    .set((
                        portfolios::cash_balance.eq(commit.new_cash_balance.to_string()),
                        portfolios::updated_at.eq(format_timestamp(commit.transaction.created_at)),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                match commit.holding_change {
                    HoldingChange::Upsert(holding) => {
                        let row = HoldingDB::from(holding);
                        diesel::insert_into(holdings::table)
                            .values(&row)
                            .on_conflict(holdings::id)
                            .do_update()
                            .set(&row)
                            .execute(conn)
                            .map_err(StorageError::from)?;
                    }
                    HoldingChange::Delete { holding_id } => {
                        diesel::delete(holdings::table.find(&holding_id))
                            .execute(conn)
                            .map_err(StorageError::from)?;
                    }
                }

                let seq_no = next_seq_no(conn, &commit.portfolio_id)?;
                diesel::insert_into(transactions::table)
                    .values(&TransactionDB::from_domain(commit.transaction, seq_no))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    fn list_transactions(&self, portfolio_id: &str) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = transactions::table
            .filter(transactions::portfolio_id.eq(portfolio_id))
            .order(transactions::seq_no.asc())
            .select(TransactionDB::as_select())
            .load::<TransactionDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Transaction::from).collect())
    }

    fn get_report(&self, portfolio_id: &str) -> Result<Option<SimulationReport>> {
        let mut conn = get_connection(&self.pool)?;
        let row = simulation_reports::table
            .find(portfolio_id)
            .select(SimulationReportDB::as_select())
            .first::<SimulationReportDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        match row {
            Some(row) => Ok(Some(
                SimulationReport::try_from(row).map_err(StorageError::from)?,
            )),
            None => Ok(None),
        }
    }
}
