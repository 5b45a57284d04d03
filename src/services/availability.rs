use chrono::NaiveDateTime;

use crate::models::Item;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookingRejection {
    #[error("item {0} is not available for booking")]
    NotAvailable(i64),

    #[error("owner cannot book their own item")]
    SelfBooking,

    #[error("booking end must be after its start")]
    InvalidWindow,
}

/// Checks that `booker_id` may reserve `item` for `[start, end]`.
///
/// Checks run in a fixed order: availability, then ownership, then the window.
/// Whether `start` lies in the future is left to request validation.
pub fn validate(
    item: &Item,
    booker_id: i64,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<(), BookingRejection> {
    if !item.available {
        return Err(BookingRejection::NotAvailable(item.id));
    }
    if item.owner_id == booker_id {
        return Err(BookingRejection::SelfBooking);
    }
    if end <= start {
        return Err(BookingRejection::InvalidWindow);
    }
    Ok(())
}
