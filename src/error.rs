use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("Winning numbers missing for draw {0}")]
    EvaluationSourceMissing(i32),

    #[error("External fetch failed: {0}")]
    ExternalFetchFailed(String),

    #[error("Draw not found: {0}")]
    DrawNotFound(String),

    #[error("Invalid parameters: {}", .0.join("; "))]
    InvalidParam(Vec<String>),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No synced draw available")]
    NoSyncedDraw,

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl AppError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        AppError::InvalidParam(vec![msg.into()])
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status_code, error_code, message) = match self {
            AppError::GenerationFailed(msg) => {
                log::warn!("Generation failed: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "GENERATION_FAILED",
                    msg.clone(),
                )
            }
            AppError::EvaluationSourceMissing(draw_no) => (
                StatusCode::NOT_FOUND,
                "EVALUATION_SOURCE_MISSING",
                format!("Winning numbers for draw {draw_no} are not synced"),
            ),
            AppError::ExternalFetchFailed(msg) => {
                log::error!("External fetch failed: {msg}");
                (StatusCode::BAD_GATEWAY, "EXTERNAL_FETCH_FAILED", msg.clone())
            }
            AppError::DrawNotFound(msg) => (StatusCode::NOT_FOUND, "DRAW_NOT_FOUND", msg.clone()),
            AppError::InvalidParam(errors) => {
                log::warn!("Invalid parameters: {errors:?}");
                (StatusCode::BAD_REQUEST, "INVALID_PARAM", errors.join("; "))
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::NoSyncedDraw => (
                StatusCode::SERVICE_UNAVAILABLE,
                "NO_SYNCED_DRAW",
                "No synced draw available yet".to_string(),
            ),
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "Database error".to_string(),
                )
            }
            _ => {
                log::error!("Internal error: {self}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        HttpResponse::build(status_code).json(json!({
            "success": false,
            "error": {
                "code": error_code,
                "message": message
            }
        }))
    }
}
