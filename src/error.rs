use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use diesel::result::Error as DieselError;
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

// Errors surfaced by the API handlers
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("No game in progress")]
    NoActiveGame,
    #[error("Malformed import file: {0}")]
    MalformedImport(serde_json::Error),
    #[error("Database error")]
    Database(#[from] DieselError),
    #[error("Connection pool error")]
    Pool(#[from] r2d2::Error),
    #[error("Session error: {0}")]
    Session(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::NoActiveGame => (StatusCode::CONFLICT, self.to_string()),
            ApiError::MalformedImport(e) => (
                StatusCode::BAD_REQUEST,
                format!("Malformed import file: {}", e),
            ),
            ApiError::Database(e) => {
                log::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Database error: {}", e),
                )
            }
            ApiError::Pool(e) => {
                log::error!("Connection pool error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Database error: {}", e),
                )
            }
            ApiError::Session(e) => {
                log::error!("Session error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Session error: {}", e),
                )
            }
        };

        let body = json!({
            "error": message,
            "status": status.as_u16()
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<tower_sessions::session::Error> for ApiError {
    fn from(err: tower_sessions::session::Error) -> Self {
        ApiError::Session(err.to_string())
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(err: ValidationErrors) -> Self {
        ApiError::Validation(err.to_string())
    }
}
