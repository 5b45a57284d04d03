use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::errors::{AppError, Entity};
use crate::models::{
    BookerSummary, Booking, BookingStatus, BookingView, Item, ItemSummary, NewBooking, User,
};
use crate::services::availability;
use crate::services::ports::{BookingStore, ItemCatalog, UserDirectory};

/// Booking lifecycle: creation, the single WAITING -> APPROVED/REJECTED
/// decision, and authorized reads.
pub struct BookingService {
    users: Arc<dyn UserDirectory>,
    items: Arc<dyn ItemCatalog>,
    bookings: Arc<dyn BookingStore>,
}

impl BookingService {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        items: Arc<dyn ItemCatalog>,
        bookings: Arc<dyn BookingStore>,
    ) -> Self {
        Self {
            users,
            items,
            bookings,
        }
    }

    pub async fn create(
        &self,
        booker_id: i64,
        item_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Booking, AppError> {
        if !self.users.user_exists(booker_id).await? {
            return Err(AppError::NotFound(Entity::User, booker_id));
        }
        let item = self.require_item(item_id).await?;

        if let Err(rejection) = availability::validate(&item, booker_id, start, end) {
            tracing::warn!(booker_id, item_id, reason = %rejection, "booking request rejected");
            return Err(rejection.into());
        }

        let booking = self
            .bookings
            .save(NewBooking {
                start,
                end,
                item_id,
                booker_id,
                status: BookingStatus::Waiting,
            })
            .await?;

        tracing::info!(booking_id = booking.id, booker_id, item_id, "booking created");
        Ok(booking)
    }

    pub async fn decide(
        &self,
        booking_id: i64,
        approve: bool,
        acting_user_id: i64,
    ) -> Result<Booking, AppError> {
        let booking = self.require_booking(booking_id).await?;
        let item = self.require_item(booking.item_id).await?;

        if item.owner_id != acting_user_id {
            return Err(AppError::Forbidden(
                "only the item owner can approve or reject a booking".to_string(),
            ));
        }
        if booking.status.is_terminal() {
            return Err(AppError::InvalidState(booking_id));
        }

        let status = if approve {
            BookingStatus::Approved
        } else {
            BookingStatus::Rejected
        };

        if !self.bookings.update_status_if_waiting(booking_id, status).await? {
            // Another decision landed between the read and the conditional update.
            tracing::warn!(booking_id, "booking decided concurrently");
            return Err(AppError::InvalidState(booking_id));
        }

        tracing::info!(booking_id, status = status.as_str(), "booking decided");
        Ok(Booking { status, ..booking })
    }

    pub async fn get_by_id(
        &self,
        booking_id: i64,
        requesting_user_id: i64,
    ) -> Result<Booking, AppError> {
        let booking = self.require_booking(booking_id).await?;
        if booking.booker_id == requesting_user_id {
            return Ok(booking);
        }

        let item = self.require_item(booking.item_id).await?;
        if item.owner_id != requesting_user_id {
            return Err(AppError::Forbidden(
                "only the booker or the item owner can view a booking".to_string(),
            ));
        }
        Ok(booking)
    }

    pub async fn view(&self, booking: Booking) -> Result<BookingView, AppError> {
        let item = self.require_item(booking.item_id).await?;
        let booker = self.require_user(booking.booker_id).await?;
        Ok(to_view(booking, &item, &booker))
    }

    /// Resolves item and booker names, keeping the input order.
    pub async fn views(&self, bookings: Vec<Booking>) -> Result<Vec<BookingView>, AppError> {
        let mut items: HashMap<i64, Item> = HashMap::new();
        let mut users: HashMap<i64, User> = HashMap::new();
        let mut views = Vec::with_capacity(bookings.len());

        for booking in bookings {
            if !items.contains_key(&booking.item_id) {
                let item = self.require_item(booking.item_id).await?;
                items.insert(item.id, item);
            }
            if !users.contains_key(&booking.booker_id) {
                let user = self.require_user(booking.booker_id).await?;
                users.insert(user.id, user);
            }

            let item = &items[&booking.item_id];
            let booker = &users[&booking.booker_id];
            views.push(to_view(booking, item, booker));
        }

        Ok(views)
    }

    async fn require_booking(&self, booking_id: i64) -> Result<Booking, AppError> {
        self.bookings
            .get(booking_id)
            .await?
            .ok_or(AppError::NotFound(Entity::Booking, booking_id))
    }

    async fn require_item(&self, item_id: i64) -> Result<Item, AppError> {
        self.items
            .get_item(item_id)
            .await?
            .ok_or(AppError::NotFound(Entity::Item, item_id))
    }

    async fn require_user(&self, user_id: i64) -> Result<User, AppError> {
        self.users
            .get_user(user_id)
            .await?
            .ok_or(AppError::NotFound(Entity::User, user_id))
    }
}

fn to_view(booking: Booking, item: &Item, booker: &User) -> BookingView {
    BookingView {
        id: booking.id,
        start: booking.start,
        end: booking.end,
        status: booking.status,
        item: ItemSummary {
            id: item.id,
            name: item.name.clone(),
        },
        booker: BookerSummary {
            id: booker.id,
            name: booker.name.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::availability::BookingRejection;
    use crate::services::test_support::{dt, Fixture};

    #[tokio::test]
    async fn test_create_starts_waiting() {
        let fx = Fixture::new("2025-06-01 08:00");
        let (owner, booker, item) = fx.owner_booker_item().await;

        let booking = fx
            .bookings()
            .create(booker.id, item.id, dt("2025-06-01 10:00"), dt("2025-06-01 12:00"))
            .await
            .unwrap();

        assert_eq!(booking.status, BookingStatus::Waiting);
        assert_eq!(booking.booker_id, booker.id);
        assert_eq!(booking.item_id, item.id);
        assert_ne!(booking.booker_id, owner.id);
        assert!(booking.end > booking.start);
    }

    #[tokio::test]
    async fn test_create_unknown_booker_or_item() {
        let fx = Fixture::new("2025-06-01 08:00");
        let (_, booker, item) = fx.owner_booker_item().await;
        let service = fx.bookings();

        let err = service
            .create(999, item.id, dt("2025-06-01 10:00"), dt("2025-06-01 12:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(Entity::User, 999)));

        let err = service
            .create(booker.id, 999, dt("2025-06-01 10:00"), dt("2025-06-01 12:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(Entity::Item, 999)));
    }

    #[tokio::test]
    async fn test_create_rejects_bad_window() {
        let fx = Fixture::new("2025-06-01 08:00");
        let (_, booker, item) = fx.owner_booker_item().await;

        let err = fx
            .bookings()
            .create(booker.id, item.id, dt("2025-06-01 12:00"), dt("2025-06-01 12:00"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::InvalidRequest(BookingRejection::InvalidWindow)
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_self_booking() {
        let fx = Fixture::new("2025-06-01 08:00");
        let (owner, _, item) = fx.owner_booker_item().await;

        let err = fx
            .bookings()
            .create(owner.id, item.id, dt("2025-06-01 12:00"), dt("2025-06-01 10:00"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::InvalidRequest(BookingRejection::SelfBooking)
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_unavailable_item() {
        let fx = Fixture::new("2025-06-01 08:00");
        let owner = fx.user("Owner", "owner@example.com").await;
        let booker = fx.user("Booker", "booker@example.com").await;
        let item = fx.item(owner.id, "Kayak", false).await;

        let err = fx
            .bookings()
            .create(booker.id, item.id, dt("2025-06-01 10:00"), dt("2025-06-01 12:00"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::InvalidRequest(BookingRejection::NotAvailable(_))
        ));
    }

    #[tokio::test]
    async fn test_decide_scenario() {
        let fx = Fixture::new("2025-06-01 08:00");
        let (owner, booker, item) = fx.owner_booker_item().await;
        let service = fx.bookings();
        let booking = service
            .create(booker.id, item.id, dt("2025-06-01 10:00"), dt("2025-06-01 12:00"))
            .await
            .unwrap();

        let approved = service.decide(booking.id, true, owner.id).await.unwrap();
        assert_eq!(approved.status, BookingStatus::Approved);

        let err = service.decide(booking.id, false, owner.id).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState(id) if id == booking.id));

        let err = service.decide(booking.id, true, booker.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let stored = service.get_by_id(booking.id, owner.id).await.unwrap();
        assert_eq!(stored.status, BookingStatus::Approved);
    }

    #[tokio::test]
    async fn test_decide_forbidden_before_state_check() {
        let fx = Fixture::new("2025-06-01 08:00");
        let (owner, booker, item) = fx.owner_booker_item().await;
        let stranger = fx.user("Stranger", "stranger@example.com").await;
        let service = fx.bookings();
        let booking = service
            .create(booker.id, item.id, dt("2025-06-01 10:00"), dt("2025-06-01 12:00"))
            .await
            .unwrap();

        let err = service.decide(booking.id, true, stranger.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        service.decide(booking.id, false, owner.id).await.unwrap();
        let err = service.decide(booking.id, true, stranger.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_reject_is_terminal() {
        let fx = Fixture::new("2025-06-01 08:00");
        let (owner, booker, item) = fx.owner_booker_item().await;
        let service = fx.bookings();
        let booking = service
            .create(booker.id, item.id, dt("2025-06-01 10:00"), dt("2025-06-01 12:00"))
            .await
            .unwrap();

        let rejected = service.decide(booking.id, false, owner.id).await.unwrap();
        assert_eq!(rejected.status, BookingStatus::Rejected);

        let err = service.decide(booking.id, true, owner.id).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_decide_missing_booking() {
        let fx = Fixture::new("2025-06-01 08:00");
        let (owner, _, _) = fx.owner_booker_item().await;

        let err = fx.bookings().decide(404, true, owner.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(Entity::Booking, 404)));
    }

    #[tokio::test]
    async fn test_concurrent_decisions_let_one_win() {
        let fx = Fixture::new("2025-06-01 08:00");
        let (owner, booker, item) = fx.owner_booker_item().await;
        let service = Arc::new(fx.bookings());
        let booking = service
            .create(booker.id, item.id, dt("2025-06-01 10:00"), dt("2025-06-01 12:00"))
            .await
            .unwrap();

        let (booking_id, owner_id) = (booking.id, owner.id);
        let mut handles = vec![];
        for approve in [true, false, true, false] {
            let service = Arc::clone(&service);
            handles.push(tokio::spawn(async move {
                service.decide(booking_id, approve, owner_id).await
            }));
        }

        let mut wins = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => wins += 1,
                Err(AppError::InvalidState(_)) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(wins, 1);
    }

    #[tokio::test]
    async fn test_get_by_id_visibility() {
        let fx = Fixture::new("2025-06-01 08:00");
        let (owner, booker, item) = fx.owner_booker_item().await;
        let stranger = fx.user("Stranger", "stranger@example.com").await;
        let service = fx.bookings();
        let booking = service
            .create(booker.id, item.id, dt("2025-06-01 10:00"), dt("2025-06-01 12:00"))
            .await
            .unwrap();

        assert_eq!(service.get_by_id(booking.id, booker.id).await.unwrap(), booking);
        assert_eq!(service.get_by_id(booking.id, owner.id).await.unwrap(), booking);

        let err = service.get_by_id(booking.id, stranger.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let err = service.get_by_id(booking.id + 1, owner.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(Entity::Booking, _)));
    }

    #[tokio::test]
    async fn test_view_resolves_names() {
        let fx = Fixture::new("2025-06-01 08:00");
        let (_, booker, item) = fx.owner_booker_item().await;
        let service = fx.bookings();
        let booking = service
            .create(booker.id, item.id, dt("2025-06-01 10:00"), dt("2025-06-01 12:00"))
            .await
            .unwrap();

        let view = service.view(booking).await.unwrap();
        assert_eq!(view.item.name, "Drill");
        assert_eq!(view.booker.name, "Booker");
        assert_eq!(view.status, BookingStatus::Waiting);
    }
}
