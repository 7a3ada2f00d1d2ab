use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Feedback {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub username: String,
}

pub struct NewFeedback {
    pub title: String,
    pub content: String,
    pub username: String,
}
