use std::sync::Arc;

use rusqlite::Connection;

use crate::db::SqliteStore;
use crate::services::booking::BookingService;
use crate::services::clock::Clock;
use crate::services::items::ItemService;
use crate::services::query::BookingQueries;
use crate::services::users::UserService;

pub struct AppState {
    pub clock: Arc<dyn Clock>,
    pub bookings: BookingService,
    pub booking_queries: BookingQueries,
    pub items: ItemService,
    pub users: UserService,
}

impl AppState {
    pub fn new(conn: Connection, clock: Arc<dyn Clock>) -> Self {
        let store = Arc::new(SqliteStore::new(conn));
        Self {
            bookings: BookingService::new(store.clone(), store.clone(), store.clone()),
            booking_queries: BookingQueries::new(store.clone(), store.clone(), clock.clone()),
            items: ItemService::new(
                store.clone(),
                store.clone(),
                store.clone(),
                store.clone(),
                clock.clone(),
            ),
            users: UserService::new(store),
            clock,
        }
    }
}
