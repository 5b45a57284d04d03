use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::errors::AppError;

pub const SHARER_HEADER: &str = "x-sharer-user-id";

/// The acting user, taken from the `X-Sharer-User-Id` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharerId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for SharerId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(SHARER_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Validation("missing X-Sharer-User-Id header".to_string()))?;

        match raw.trim().parse::<i64>() {
            Ok(id) if id > 0 => Ok(SharerId(id)),
            _ => Err(AppError::Validation(format!(
                "invalid X-Sharer-User-Id header: {raw}"
            ))),
        }
    }
}
