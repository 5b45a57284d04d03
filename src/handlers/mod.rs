pub mod auth;
pub mod bookings;
pub mod extract;
pub mod health;
pub mod items;
pub mod users;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/users", post(users::create_user).get(users::list_users))
        .route(
            "/users/:id",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        .route("/items", post(items::create_item).get(items::list_items))
        .route("/items/search", get(items::search_items))
        .route(
            "/items/:id",
            get(items::get_item)
                .patch(items::update_item)
                .delete(items::delete_item),
        )
        .route("/items/:id/comment", post(items::add_comment))
        .route(
            "/bookings",
            post(bookings::create_booking).get(bookings::list_booker_bookings),
        )
        .route("/bookings/owner", get(bookings::list_owner_bookings))
        .route(
            "/bookings/:id",
            get(bookings::get_booking).patch(bookings::decide_booking),
        )
        .with_state(state)
}
