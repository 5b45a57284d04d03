//! Collaborator interfaces the booking core and the catalog services depend on.
//!
//! Every method is a single store round trip. Implementations must not hold
//! in-process locks between calls.

use async_trait::async_trait;

use crate::models::{
    Booking, BookingStatus, CommentView, Item, NewBooking, NewComment, NewItem, NewUser, User,
};

/// Predicate applied by the store when selecting bookings.
pub type BookingFilter<'a> = &'a (dyn Fn(&Booking) -> bool + Send + Sync);

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn get_user(&self, id: i64) -> anyhow::Result<Option<User>>;

    async fn user_exists(&self, id: i64) -> anyhow::Result<bool> {
        Ok(self.get_user(id).await?.is_some())
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn create_user(&self, user: NewUser) -> anyhow::Result<User>;
    async fn list_users(&self) -> anyhow::Result<Vec<User>>;
    async fn update_user(&self, user: &User) -> anyhow::Result<bool>;
    async fn delete_user(&self, id: i64) -> anyhow::Result<bool>;
}

#[async_trait]
pub trait ItemCatalog: Send + Sync {
    async fn get_item(&self, id: i64) -> anyhow::Result<Option<Item>>;
    async fn create_item(&self, item: NewItem) -> anyhow::Result<Item>;
    async fn items_by_owner(&self, owner_id: i64) -> anyhow::Result<Vec<Item>>;
    async fn search(&self, text: &str) -> anyhow::Result<Vec<Item>>;
    async fn update_item(&self, item: &Item) -> anyhow::Result<bool>;
    async fn delete_item(&self, id: i64) -> anyhow::Result<bool>;
}

#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn save(&self, booking: NewBooking) -> anyhow::Result<Booking>;
    async fn get(&self, id: i64) -> anyhow::Result<Option<Booking>>;

    /// Sets `status` only if the booking is still WAITING, atomically.
    /// Returns false when nothing was updated.
    async fn update_status_if_waiting(&self, id: i64, status: BookingStatus)
        -> anyhow::Result<bool>;

    async fn query_by_booker(
        &self,
        booker_id: i64,
        filter: BookingFilter<'_>,
    ) -> anyhow::Result<Vec<Booking>>;

    /// Bookings on any item owned by `owner_id`.
    async fn query_by_owner(
        &self,
        owner_id: i64,
        filter: BookingFilter<'_>,
    ) -> anyhow::Result<Vec<Booking>>;

    async fn query_by_item(
        &self,
        item_id: i64,
        filter: BookingFilter<'_>,
    ) -> anyhow::Result<Vec<Booking>>;
}

#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn save_comment(&self, comment: NewComment) -> anyhow::Result<i64>;
    async fn comments_for_item(&self, item_id: i64) -> anyhow::Result<Vec<CommentView>>;
}
