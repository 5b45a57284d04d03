use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::errors::AppError;
use crate::handlers::auth::SharerId;
use crate::handlers::extract::{ApiJson, ApiPath, ApiQuery};
use crate::models::{CommentView, ItemPatch, ItemView, NewItem};
use crate::state::AppState;

// POST /items
#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub available: Option<bool>,
}

pub async fn create_item(
    State(state): State<Arc<AppState>>,
    SharerId(owner_id): SharerId,
    ApiJson(body): ApiJson<CreateItemRequest>,
) -> Result<(StatusCode, Json<ItemView>), AppError> {
    let name = body
        .name
        .ok_or_else(|| AppError::Validation("name is required".to_string()))?;
    let available = body
        .available
        .ok_or_else(|| AppError::Validation("available is required".to_string()))?;

    let item = state
        .items
        .create(NewItem {
            owner_id,
            name,
            description: body.description,
            available,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

// GET /items/:id
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    requester: Option<SharerId>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ItemView>, AppError> {
    let item = state.items.get(id, requester.map(|SharerId(user_id)| user_id)).await?;
    Ok(Json(item))
}

// GET /items
pub async fn list_items(
    State(state): State<Arc<AppState>>,
    SharerId(owner_id): SharerId,
) -> Result<Json<Vec<ItemView>>, AppError> {
    Ok(Json(state.items.list_by_owner(owner_id).await?))
}

// PATCH /items/:id
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    SharerId(owner_id): SharerId,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<ItemPatch>,
) -> Result<Json<ItemView>, AppError> {
    Ok(Json(state.items.update(id, patch, owner_id).await?))
}

// DELETE /items/:id
pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, AppError> {
    state.items.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /items/search?text=
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub text: String,
}

pub async fn search_items(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> Result<Json<Vec<ItemView>>, AppError> {
    Ok(Json(state.items.search(&params.text).await?))
}

// POST /items/:id/comment
#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub text: Option<String>,
}

pub async fn add_comment(
    State(state): State<Arc<AppState>>,
    SharerId(author_id): SharerId,
    ApiPath(item_id): ApiPath<i64>,
    ApiJson(body): ApiJson<CommentRequest>,
) -> Result<Json<CommentView>, AppError> {
    let text = body.text.unwrap_or_default();
    Ok(Json(state.items.add_comment(item_id, author_id, text).await?))
}
