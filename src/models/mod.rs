pub mod booking;
pub mod comment;
pub mod item;
pub mod user;

pub use booking::{BookerSummary, Booking, BookingStatus, BookingView, ItemSummary, NewBooking};
pub use comment::{CommentView, NewComment};
pub use item::{BookingInfo, Item, ItemPatch, ItemView, NewItem};
pub use user::{NewUser, User, UserPatch};
