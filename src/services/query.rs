use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::errors::{AppError, Entity};
use crate::models::{Booking, BookingStatus};
use crate::services::clock::Clock;
use crate::services::ports::{BookingStore, UserDirectory};

/// The six list filters. Time buckets (`Current`, `Past`, `Future`) and
/// status buckets (`Waiting`, `Rejected`) are independent of each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BookingState {
    #[default]
    All,
    Current,
    Past,
    Future,
    Waiting,
    Rejected,
}

impl BookingState {
    pub const VALUES: [BookingState; 6] = [
        BookingState::All,
        BookingState::Current,
        BookingState::Past,
        BookingState::Future,
        BookingState::Waiting,
        BookingState::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingState::All => "ALL",
            BookingState::Current => "CURRENT",
            BookingState::Past => "PAST",
            BookingState::Future => "FUTURE",
            BookingState::Waiting => "WAITING",
            BookingState::Rejected => "REJECTED",
        }
    }

    pub fn matches(&self, booking: &Booking, now: NaiveDateTime) -> bool {
        match self {
            BookingState::All => true,
            BookingState::Current => booking.start <= now && now <= booking.end,
            BookingState::Past => booking.end < now,
            BookingState::Future => booking.start > now,
            BookingState::Waiting => booking.status == BookingStatus::Waiting,
            BookingState::Rejected => booking.status == BookingStatus::Rejected,
        }
    }
}

impl FromStr for BookingState {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookingState::VALUES
            .into_iter()
            .find(|state| state.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| AppError::UnknownState(s.to_string()))
    }
}

/// Lists a booker's or an owner's bookings by state, newest start first.
pub struct BookingQueries {
    users: Arc<dyn UserDirectory>,
    bookings: Arc<dyn BookingStore>,
    clock: Arc<dyn Clock>,
}

impl BookingQueries {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        bookings: Arc<dyn BookingStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            bookings,
            clock,
        }
    }

    /// `state` is decoded only after the booker is known to exist.
    pub async fn list_by_booker(
        &self,
        booker_id: i64,
        state: &str,
    ) -> Result<Vec<Booking>, AppError> {
        self.require_user(booker_id).await?;
        let state: BookingState = state.parse()?;
        let now = self.clock.now();
        let filter = move |b: &Booking| state.matches(b, now);

        let mut bookings = self.bookings.query_by_booker(booker_id, &filter).await?;
        sort_newest_first(&mut bookings);
        Ok(bookings)
    }

    pub async fn list_by_owner(
        &self,
        owner_id: i64,
        state: &str,
    ) -> Result<Vec<Booking>, AppError> {
        self.require_user(owner_id).await?;
        let state: BookingState = state.parse()?;
        let now = self.clock.now();
        let filter = move |b: &Booking| state.matches(b, now);

        let mut bookings = self.bookings.query_by_owner(owner_id, &filter).await?;
        sort_newest_first(&mut bookings);
        Ok(bookings)
    }

    async fn require_user(&self, user_id: i64) -> Result<(), AppError> {
        if !self.users.user_exists(user_id).await? {
            return Err(AppError::NotFound(Entity::User, user_id));
        }
        Ok(())
    }
}

fn sort_newest_first(bookings: &mut [Booking]) {
    bookings.sort_by(|a, b| b.start.cmp(&a.start));
}
