pub mod availability;
pub mod booking;
pub mod clock;
pub mod items;
pub mod ports;
pub mod query;
pub mod summary;
pub mod users;

#[cfg(test)]
pub(crate) mod test_support;
