use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use simvest_core::trading::{TradeReceipt, TradeSize, Transaction};

use super::CurrentUser;
use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

/// `size` is `{"quantity": n}`, `{"amount": cash}` or `"all"`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TradeRequest {
    instrument_id: String,
    size: TradeSize,
}

impl TradeRequest {
    fn validate(&self) -> ApiResult<()> {
        if self.instrument_id.trim().is_empty() {
            return Err(ApiError::BadRequest("instrumentId is required".to_string()));
        }
        Ok(())
    }
}

async fn list_trades(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
) -> ApiResult<Json<Vec<Transaction>>> {
    Ok(Json(state.portfolio_service.list_transactions(&user_id)?))
}

async fn buy(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    Json(request): Json<TradeRequest>,
) -> ApiResult<Json<TradeReceipt>> {
    request.validate()?;
    let session = state.sessions.open(&user_id).await?;
    let receipt = state
        .trade_service
        .buy(&user_id, &request.instrument_id, request.size, session.as_ref())
        .await?;
    Ok(Json(receipt))
}

async fn sell(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    Json(request): Json<TradeRequest>,
) -> ApiResult<Json<TradeReceipt>> {
    request.validate()?;
    let session = state.sessions.open(&user_id).await?;
    let receipt = state
        .trade_service
        .sell(&user_id, &request.instrument_id, request.size, session.as_ref())
        .await?;
    Ok(Json(receipt))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/trades", get(list_trades))
        .route("/trades/buy", post(buy))
        .route("/trades/sell", post(sell))
}
