use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use simvest_core::portfolio::{Portfolio, PortfolioFacts, PortfolioMetrics, SimulationReport};

use super::CurrentUser;
use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

async fn get_portfolio(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
) -> ApiResult<Json<Portfolio>> {
    state.sessions.open(&user_id).await?;
    Ok(Json(state.portfolio_service.get_portfolio(&user_id)?))
}

async fn get_metrics(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
) -> ApiResult<Json<PortfolioMetrics>> {
    let session = state.sessions.open(&user_id).await?;
    let metrics = state
        .portfolio_service
        .get_metrics(&user_id, session.as_ref())?;
    Ok(Json(metrics))
}

async fn get_facts(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
) -> ApiResult<Json<PortfolioFacts>> {
    let session = state.sessions.open(&user_id).await?;
    Ok(Json(
        state.portfolio_service.get_facts(&user_id, session.as_ref())?,
    ))
}

async fn get_report(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
) -> ApiResult<Json<SimulationReport>> {
    state
        .portfolio_service
        .get_report(&user_id)?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

async fn reset_portfolio(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
) -> ApiResult<Json<Portfolio>> {
    Ok(Json(state.sessions.reset(&user_id).await?))
}

async fn close_session(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
) -> StatusCode {
    state.sessions.close(&user_id).await;
    StatusCode::NO_CONTENT
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/portfolio", get(get_portfolio))
        .route("/portfolio/metrics", get(get_metrics))
        .route("/portfolio/facts", get(get_facts))
        .route("/portfolio/report", get(get_report))
        .route("/portfolio/reset", post(reset_portfolio))
        .route("/session", delete(close_session))
}
