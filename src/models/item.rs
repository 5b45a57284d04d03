use serde::{Deserialize, Serialize};

use crate::models::CommentView;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub available: bool,
}

#[derive(Debug, Clone)]
pub struct NewItem {
    pub owner_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub available: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub available: Option<bool>,
}

/// The `{id, bookerId}` pair shown as an item's last or next booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingInfo {
    pub id: i64,
    pub booker_id: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub available: bool,
    pub last_booking: Option<BookingInfo>,
    pub next_booking: Option<BookingInfo>,
    pub comments: Vec<CommentView>,
}

impl ItemView {
    pub fn bare(item: Item) -> Self {
        Self {
            id: item.id,
            name: item.name,
            description: item.description,
            available: item.available,
            last_booking: None,
            next_booking: None,
            comments: vec![],
        }
    }
}
