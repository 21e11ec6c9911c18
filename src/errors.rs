use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::evaluation::EvaluationError;
use crate::price_feed::PriceFeedError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unprocessable: {0}")]
    Unprocessable(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            AppError::Upstream(msg) => {
                tracing::warn!(error = %msg, "Upstream request failed");
                (StatusCode::BAD_GATEWAY, msg.clone())
            }
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".into()),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".into())
            }
        };

        (
            status,
            Json(ErrorBody {
                success: false,
                error: message,
            }),
        )
            .into_response()
    }
}

impl From<EvaluationError> for AppError {
    fn from(e: EvaluationError) -> Self {
        AppError::BadRequest(e.to_string())
    }
}

impl From<PriceFeedError> for AppError {
    fn from(e: PriceFeedError) -> Self {
        match e {
            PriceFeedError::InvalidSymbol(_) => AppError::BadRequest(e.to_string()),
            other => AppError::Upstream(other.to_string()),
        }
    }
}
