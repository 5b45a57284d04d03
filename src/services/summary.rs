use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::models::{Booking, BookingStatus};
use crate::services::clock::Clock;
use crate::services::ports::BookingStore;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingSummary {
    pub last: Option<Booking>,
    pub next: Option<Booking>,
}

/// Picks the last finished and next upcoming approved booking.
pub fn summarize(bookings: &[Booking], now: NaiveDateTime) -> BookingSummary {
    let approved = || {
        bookings
            .iter()
            .filter(|b| b.status == BookingStatus::Approved)
    };

    BookingSummary {
        last: approved().filter(|b| b.end < now).max_by_key(|b| b.end).cloned(),
        next: approved().filter(|b| b.start > now).min_by_key(|b| b.start).cloned(),
    }
}

pub struct SummaryResolver {
    bookings: Arc<dyn BookingStore>,
    clock: Arc<dyn Clock>,
}

impl SummaryResolver {
    pub fn new(bookings: Arc<dyn BookingStore>, clock: Arc<dyn Clock>) -> Self {
        Self { bookings, clock }
    }

    pub async fn last_and_next(&self, item_id: i64) -> anyhow::Result<BookingSummary> {
        let now = self.clock.now();
        let approved = self
            .bookings
            .query_by_item(item_id, &|b: &Booking| b.status == BookingStatus::Approved)
            .await?;
        Ok(summarize(&approved, now))
    }
}
