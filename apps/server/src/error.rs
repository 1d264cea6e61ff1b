use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use simvest_core::errors::{DatabaseError, Error as CoreError};
use simvest_core::trading::TradeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("Not Found")]
    NotFound,
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

impl From<TradeError> for ApiError {
    fn from(err: TradeError) -> Self {
        ApiError::Core(CoreError::Trade(err))
    }
}

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

fn trade_status(err: &TradeError) -> StatusCode {
    match err {
        TradeError::NotAuthenticated => StatusCode::UNAUTHORIZED,
        TradeError::InstrumentNotFound(_) => StatusCode::NOT_FOUND,
        TradeError::InsufficientFunds { .. }
        | TradeError::InsufficientPosition { .. }
        | TradeError::InvalidTrade(_) => StatusCode::UNPROCESSABLE_ENTITY,
        TradeError::SimulationEnded => StatusCode::CONFLICT,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::Core(CoreError::Trade(e)) => (trade_status(e), e.kind().to_string()),
            ApiError::Core(CoreError::Validation(_)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR".to_string())
            }
            ApiError::Core(CoreError::Database(DatabaseError::WriteConflict(e))) => {
                tracing::warn!("Trade gave up after repeated write conflicts: {}", e);
                (StatusCode::CONFLICT, "WRITE_CONFLICT".to_string())
            }
            ApiError::Core(e) => {
                tracing::error!("Request failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR".to_string(),
                )
            }
            ApiError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND".to_string()),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST".to_string()),
            ApiError::Anyhow(e) => {
                tracing::error!("Request failed: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR".to_string(),
                )
            }
        };
        let body = Json(ErrorBody {
            code,
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
