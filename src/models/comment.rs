use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct NewComment {
    pub item_id: i64,
    pub author_id: i64,
    pub text: String,
    pub created: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: i64,
    pub text: String,
    pub author_name: String,
    pub created: NaiveDateTime,
}
