pub mod analytics;
pub mod config;
pub mod evaluate;
pub mod health;
pub mod metrics;
pub mod plans;
pub mod prices;
pub mod trades;
pub mod ws;

use axum::Json;
use serde::Serialize;

use crate::errors::AppError;

/// Envelope for every JSON API response.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;

pub fn ok<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse {
        success: true,
        data: Some(data),
        error: None,
    }))
}
