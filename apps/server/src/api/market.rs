use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use simvest_core::{
    instruments::{Instrument, InstrumentKind},
    simulation::{InstrumentQuote, YearlyPricePoint},
};

use super::CurrentUser;
use crate::{error::ApiResult, main_lib::AppState};

#[derive(Deserialize)]
struct InstrumentsQuery {
    kind: Option<InstrumentKind>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryQuery {
    through_year: Option<u32>,
}

/// Catalog entry with the caller's current quote.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InstrumentListing {
    #[serde(flatten)]
    instrument: Instrument,
    quote: Option<InstrumentQuote>,
}

async fn list_instruments(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    Query(q): Query<InstrumentsQuery>,
) -> ApiResult<Json<Vec<InstrumentListing>>> {
    let session = state.sessions.open(&user_id).await?;
    let listings = state
        .market
        .list_instruments(q.kind)?
        .into_iter()
        .map(|instrument| InstrumentListing {
            quote: session.quote(&instrument.id),
            instrument,
        })
        .collect();
    Ok(Json(listings))
}

async fn price_history(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    Query(q): Query<HistoryQuery>,
) -> ApiResult<Json<Vec<YearlyPricePoint>>> {
    let through_year = match q.through_year {
        Some(year) => year,
        None => state.sessions.open(&user_id).await?.year(),
    };
    Ok(Json(state.market.price_history(
        &id,
        through_year,
        state.max_years,
    )?))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/instruments", get(list_instruments))
        .route("/instruments/{id}/history", get(price_history))
}
