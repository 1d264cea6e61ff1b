use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use simvest_core::{
    events::DomainEventSink,
    instruments::{Instrument, InstrumentRepositoryTrait},
    portfolio::{PortfolioService, PortfolioServiceTrait},
    simulation::{MarketService, PriceWalk, SessionManager, SystemClock},
    trading::{TradeService, TradeServiceTrait},
    Clock,
};
use simvest_storage_sqlite::{db, InstrumentRepository, PortfolioRepository};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::{config::Config, domain_events::LoggingDomainEventSink};

pub struct AppState {
    pub market: Arc<MarketService>,
    pub portfolio_service: Arc<dyn PortfolioServiceTrait>,
    pub trade_service: Arc<dyn TradeServiceTrait>,
    pub sessions: Arc<SessionManager>,
    /// Last year a run can reach; bounds price history requests.
    pub max_years: u32,
    pub db_path: String,
}

pub fn init_tracing() {
    let log_format = std::env::var("SIMVEST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    // `try_init` so repeated calls (tests) are harmless.
    let result = if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .try_init()
    };
    if let Err(e) = result {
        tracing::debug!("Tracing already initialised: {}", e);
    }
}

/// Inserts catalog entries from the JSON file that are not in the database yet.
pub async fn seed_catalog(
    repository: &dyn InstrumentRepositoryTrait,
    catalog_path: &str,
) -> anyhow::Result<usize> {
    if !Path::new(catalog_path).exists() {
        let existing = repository.list_instruments(None)?.len();
        if existing == 0 {
            tracing::warn!(
                "Catalog file {} not found and the instrument table is empty",
                catalog_path
            );
        }
        return Ok(0);
    }

    let raw = tokio::fs::read_to_string(catalog_path)
        .await
        .with_context(|| format!("Failed to read catalog {}", catalog_path))?;
    let instruments: Vec<Instrument> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse catalog {}", catalog_path))?;
    let total = instruments.len();
    let inserted = repository.insert_missing(instruments).await?;
    if inserted > 0 {
        tracing::info!("Seeded {} of {} catalog instruments", inserted, total);
    }
    Ok(inserted)
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone());

    let instrument_repository = Arc::new(InstrumentRepository::new(pool.clone(), writer.clone()));
    seed_catalog(instrument_repository.as_ref(), &config.catalog_path).await?;

    let market = Arc::new(MarketService::new(
        instrument_repository,
        Arc::new(PriceWalk::default()),
    ));

    let domain_event_sink = Arc::new(LoggingDomainEventSink::new());
    domain_event_sink.start_worker();
    let event_sink: Arc<dyn DomainEventSink> = domain_event_sink;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let portfolio_repository = Arc::new(PortfolioRepository::new(pool.clone(), writer.clone()));
    let portfolio_service: Arc<dyn PortfolioServiceTrait> = Arc::new(PortfolioService::new(
        portfolio_repository.clone(),
        market.clone(),
        event_sink.clone(),
        clock.clone(),
        config.simulation.clone(),
    ));
    let trade_service: Arc<dyn TradeServiceTrait> = Arc::new(TradeService::new(
        portfolio_repository,
        market.clone(),
        event_sink,
        clock,
        config.simulation.clone(),
    ));

    let sessions = Arc::new(SessionManager::new(
        market.clone(),
        portfolio_service.clone(),
        config.intervals,
    ));

    Ok(Arc::new(AppState {
        market,
        portfolio_service,
        trade_service,
        sessions,
        max_years: config.simulation.max_years,
        db_path,
    }))
}
