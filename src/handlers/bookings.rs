use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::errors::AppError;
use crate::handlers::auth::SharerId;
use crate::handlers::extract::{ApiJson, ApiPath, ApiQuery};
use crate::models::BookingView;
use crate::services::query::BookingState;
use crate::state::AppState;

// POST /bookings
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub item_id: Option<i64>,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl BookingRequest {
    /// Field presence and "not in the past" checks. Window ordering is left
    /// to the booking service.
    fn validate(&self, now: NaiveDateTime) -> Result<(i64, NaiveDateTime, NaiveDateTime), AppError> {
        let item_id = match self.item_id {
            Some(id) if id > 0 => id,
            Some(id) => return Err(AppError::Validation(format!("invalid itemId: {id}"))),
            None => return Err(AppError::Validation("itemId is required".to_string())),
        };
        let start = self
            .start
            .ok_or_else(|| AppError::Validation("start is required".to_string()))?;
        let end = self
            .end
            .ok_or_else(|| AppError::Validation("end is required".to_string()))?;

        if start < now {
            return Err(AppError::Validation("start must not be in the past".to_string()));
        }
        if end <= now {
            return Err(AppError::Validation("end must be in the future".to_string()));
        }
        Ok((item_id, start, end))
    }
}

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    SharerId(booker_id): SharerId,
    ApiJson(body): ApiJson<BookingRequest>,
) -> Result<Json<BookingView>, AppError> {
    let (item_id, start, end) = body.validate(state.clock.now())?;

    let booking = state.bookings.create(booker_id, item_id, start, end).await?;
    Ok(Json(state.bookings.view(booking).await?))
}

// PATCH /bookings/:id?approved=
#[derive(Debug, Deserialize)]
pub struct DecideParams {
    pub approved: bool,
}

pub async fn decide_booking(
    State(state): State<Arc<AppState>>,
    SharerId(owner_id): SharerId,
    ApiPath(booking_id): ApiPath<i64>,
    ApiQuery(params): ApiQuery<DecideParams>,
) -> Result<Json<BookingView>, AppError> {
    let booking = state
        .bookings
        .decide(booking_id, params.approved, owner_id)
        .await?;
    Ok(Json(state.bookings.view(booking).await?))
}

// GET /bookings/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    SharerId(user_id): SharerId,
    ApiPath(booking_id): ApiPath<i64>,
) -> Result<Json<BookingView>, AppError> {
    let booking = state.bookings.get_by_id(booking_id, user_id).await?;
    Ok(Json(state.bookings.view(booking).await?))
}

// GET /bookings?state= and GET /bookings/owner?state=
#[derive(Debug, Deserialize)]
pub struct StateParams {
    pub state: Option<String>,
}

impl StateParams {
    fn token(&self) -> &str {
        self.state.as_deref().unwrap_or(BookingState::All.as_str())
    }
}

pub async fn list_booker_bookings(
    State(state): State<Arc<AppState>>,
    SharerId(booker_id): SharerId,
    ApiQuery(params): ApiQuery<StateParams>,
) -> Result<Json<Vec<BookingView>>, AppError> {
    let bookings = state
        .booking_queries
        .list_by_booker(booker_id, params.token())
        .await?;
    Ok(Json(state.bookings.views(bookings).await?))
}

pub async fn list_owner_bookings(
    State(state): State<Arc<AppState>>,
    SharerId(owner_id): SharerId,
    ApiQuery(params): ApiQuery<StateParams>,
) -> Result<Json<Vec<BookingView>>, AppError> {
    let bookings = state
        .booking_queries
        .list_by_owner(owner_id, params.token())
        .await?;
    Ok(Json(state.bookings.views(bookings).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn request(start: &str, end: &str) -> BookingRequest {
        BookingRequest {
            item_id: Some(1),
            start: Some(dt(start)),
            end: Some(dt(end)),
        }
    }

    #[test]
    fn test_request_deserializes_camel_case() {
        let body: BookingRequest = serde_json::from_str(
            r#"{"itemId":3,"start":"2025-06-01T10:00:00","end":"2025-06-01T12:00:00"}"#,
        )
        .unwrap();
        assert_eq!(body.item_id, Some(3));
        assert_eq!(body.start, Some(dt("2025-06-01 10:00")));
    }

    #[test]
    fn test_start_may_be_now() {
        let now = dt("2025-06-01 10:00");
        let validated = request("2025-06-01 10:00", "2025-06-01 12:00").validate(now);
        assert_eq!(validated.unwrap(), (1, now, dt("2025-06-01 12:00")));
    }

    #[test]
    fn test_past_start_rejected() {
        let now = dt("2025-06-01 10:00");
        let err = request("2025-06-01 09:00", "2025-06-01 12:00")
            .validate(now)
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_inverted_window_passes_to_service() {
        let now = dt("2025-06-01 08:00");
        assert!(request("2025-06-01 12:00", "2025-06-01 10:00").validate(now).is_ok());
    }

    #[test]
    fn test_missing_fields_rejected() {
        let now = dt("2025-06-01 08:00");
        let body = BookingRequest {
            item_id: None,
            start: None,
            end: None,
        };
        assert!(matches!(body.validate(now), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_state_defaults_to_all() {
        let params = StateParams { state: None };
        assert_eq!(params.token(), "ALL");

        let params = StateParams {
            state: Some("future".to_string()),
        };
        assert_eq!(params.token(), "future");
    }
}
