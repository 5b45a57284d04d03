use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::errors::AppError;
use crate::handlers::extract::{ApiJson, ApiPath};
use crate::models::{NewUser, User, UserPatch};
use crate::state::AppState;

// POST /users
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = state
        .users
        .create(NewUser {
            name: body.name.unwrap_or_default(),
            email: body.email.unwrap_or_default(),
        })
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

// GET /users
pub async fn list_users(State(state): State<Arc<AppState>>) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(state.users.list().await?))
}

// GET /users/:id
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<User>, AppError> {
    Ok(Json(state.users.get(id).await?))
}

// PATCH /users/:id
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<UserPatch>,
) -> Result<Json<User>, AppError> {
    Ok(Json(state.users.update(id, patch).await?))
}

// DELETE /users/:id
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, AppError> {
    state.users.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
