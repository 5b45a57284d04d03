use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::services::availability::BookingRejection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    User,
    Item,
    Booking,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Entity::User => "user",
            Entity::Item => "item",
            Entity::Booking => "booking",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("store error: {0:#}")]
    Store(#[from] anyhow::Error),

    #[error("{0} {1} not found")]
    NotFound(Entity, i64),

    #[error(transparent)]
    InvalidRequest(#[from] BookingRejection),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("booking {0} has already been decided")]
    InvalidState(i64),

    #[error("Unknown state: {0}")]
    UnknownState(String),

    #[error("conflict: {0}")]
    Conflict(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(..) => StatusCode::NOT_FOUND,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::InvalidState(_) => StatusCode::BAD_REQUEST,
            AppError::UnknownState(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match &self {
            AppError::Store(e) => {
                tracing::error!(error = %format!("{e:#}"), "store failure");
                "internal error".to_string()
            }
            other => other.to_string(),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}
