use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use async_trait::async_trait;
use rusqlite::Connection;

use crate::db::queries;
use crate::models::{
    Booking, BookingStatus, CommentView, Item, NewBooking, NewComment, NewItem, NewUser, User,
};
use crate::services::ports::{BookingFilter, BookingStore, CommentStore, ItemCatalog, UserDirectory};

/// SQLite-backed implementation of every store port.
///
/// The connection lock is taken for exactly one query at a time and is never
/// held across an await point.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> anyhow::Result<T>) -> anyhow::Result<T> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow!("database connection lock poisoned"))?;
        f(&conn)
    }
}

#[async_trait]
impl UserDirectory for SqliteStore {
    async fn get_user(&self, id: i64) -> anyhow::Result<Option<User>> {
        self.with_conn(|conn| queries::get_user(conn, id))
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        self.with_conn(|conn| queries::find_user_by_email(conn, email))
    }

    async fn create_user(&self, user: NewUser) -> anyhow::Result<User> {
        self.with_conn(|conn| queries::insert_user(conn, &user))
    }

    async fn list_users(&self) -> anyhow::Result<Vec<User>> {
        self.with_conn(queries::list_users)
    }

    async fn update_user(&self, user: &User) -> anyhow::Result<bool> {
        self.with_conn(|conn| queries::update_user(conn, user))
    }

    async fn delete_user(&self, id: i64) -> anyhow::Result<bool> {
        self.with_conn(|conn| queries::delete_user(conn, id))
    }
}

#[async_trait]
impl ItemCatalog for SqliteStore {
    async fn get_item(&self, id: i64) -> anyhow::Result<Option<Item>> {
        self.with_conn(|conn| queries::get_item(conn, id))
    }

    async fn create_item(&self, item: NewItem) -> anyhow::Result<Item> {
        self.with_conn(|conn| queries::insert_item(conn, &item))
    }

    async fn items_by_owner(&self, owner_id: i64) -> anyhow::Result<Vec<Item>> {
        self.with_conn(|conn| queries::get_items_by_owner(conn, owner_id))
    }

    async fn search(&self, text: &str) -> anyhow::Result<Vec<Item>> {
        self.with_conn(|conn| queries::search_items(conn, text))
    }

    async fn update_item(&self, item: &Item) -> anyhow::Result<bool> {
        self.with_conn(|conn| queries::update_item(conn, item))
    }

    async fn delete_item(&self, id: i64) -> anyhow::Result<bool> {
        self.with_conn(|conn| queries::delete_item(conn, id))
    }
}

#[async_trait]
impl BookingStore for SqliteStore {
    async fn save(&self, booking: NewBooking) -> anyhow::Result<Booking> {
        self.with_conn(|conn| queries::insert_booking(conn, &booking))
    }

    async fn get(&self, id: i64) -> anyhow::Result<Option<Booking>> {
        self.with_conn(|conn| queries::get_booking_by_id(conn, id))
    }

    async fn update_status_if_waiting(
        &self,
        id: i64,
        status: BookingStatus,
    ) -> anyhow::Result<bool> {
        self.with_conn(|conn| queries::update_status_if_waiting(conn, id, status))
    }

    async fn query_by_booker(
        &self,
        booker_id: i64,
        filter: BookingFilter<'_>,
    ) -> anyhow::Result<Vec<Booking>> {
        let bookings = self.with_conn(|conn| queries::get_bookings_by_booker(conn, booker_id))?;
        Ok(bookings.into_iter().filter(|b| filter(b)).collect())
    }

    async fn query_by_owner(
        &self,
        owner_id: i64,
        filter: BookingFilter<'_>,
    ) -> anyhow::Result<Vec<Booking>> {
        let bookings = self.with_conn(|conn| queries::get_bookings_by_owner(conn, owner_id))?;
        Ok(bookings.into_iter().filter(|b| filter(b)).collect())
    }

    async fn query_by_item(
        &self,
        item_id: i64,
        filter: BookingFilter<'_>,
    ) -> anyhow::Result<Vec<Booking>> {
        let bookings = self.with_conn(|conn| queries::get_bookings_by_item(conn, item_id))?;
        Ok(bookings.into_iter().filter(|b| filter(b)).collect())
    }
}

#[async_trait]
impl CommentStore for SqliteStore {
    async fn save_comment(&self, comment: NewComment) -> anyhow::Result<i64> {
        self.with_conn(|conn| queries::insert_comment(conn, &comment))
    }

    async fn comments_for_item(&self, item_id: i64) -> anyhow::Result<Vec<CommentView>> {
        self.with_conn(|conn| queries::get_comments_for_item(conn, item_id))
    }
}
