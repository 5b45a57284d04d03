use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::db::{self, SqliteStore};
use crate::models::{Booking, BookingStatus, Item, NewBooking, NewItem, NewUser, User};
use crate::services::booking::BookingService;
use crate::services::clock::FixedClock;
use crate::services::items::ItemService;
use crate::services::ports::{BookingStore, ItemCatalog, UserDirectory};
use crate::services::query::BookingQueries;
use crate::services::summary::SummaryResolver;
use crate::services::users::UserService;

pub fn dt(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
}

/// In-memory store plus a fixed clock for service tests.
pub struct Fixture {
    pub store: Arc<SqliteStore>,
    pub clock: Arc<FixedClock>,
}

impl Fixture {
    pub fn new(now: &str) -> Self {
        let conn = db::init_db(":memory:").unwrap();
        Self {
            store: Arc::new(SqliteStore::new(conn)),
            clock: Arc::new(FixedClock::new(dt(now))),
        }
    }

    pub fn bookings(&self) -> BookingService {
        BookingService::new(self.store.clone(), self.store.clone(), self.store.clone())
    }

    pub fn queries(&self) -> BookingQueries {
        BookingQueries::new(self.store.clone(), self.store.clone(), self.clock.clone())
    }

    pub fn summaries(&self) -> SummaryResolver {
        SummaryResolver::new(self.store.clone(), self.clock.clone())
    }

    pub fn items(&self) -> ItemService {
        ItemService::new(
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
            self.clock.clone(),
        )
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.store.clone())
    }

    pub async fn user(&self, name: &str, email: &str) -> User {
        self.store
            .create_user(NewUser {
                name: name.to_string(),
                email: email.to_string(),
            })
            .await
            .unwrap()
    }

    pub async fn item(&self, owner_id: i64, name: &str, available: bool) -> Item {
        self.store
            .create_item(NewItem {
                owner_id,
                name: name.to_string(),
                description: Some(format!("{name} for rent")),
                available,
            })
            .await
            .unwrap()
    }

    /// Owner "Owner", booker "Booker" and an available item "Drill".
    pub async fn owner_booker_item(&self) -> (User, User, Item) {
        let owner = self.user("Owner", "owner@example.com").await;
        let booker = self.user("Booker", "booker@example.com").await;
        let item = self.item(owner.id, "Drill", true).await;
        (owner, booker, item)
    }

    /// Inserts a booking directly, bypassing creation checks.
    pub async fn booking(
        &self,
        item: &Item,
        booker: &User,
        start: &str,
        end: &str,
        status: BookingStatus,
    ) -> Booking {
        self.store
            .save(NewBooking {
                start: dt(start),
                end: dt(end),
                item_id: item.id,
                booker_id: booker.id,
                status,
            })
            .await
            .unwrap()
    }
}
