//! Persistence for users and their feedback.
//!
//! Handlers only see the [`Store`] trait. [`postgres::PgStore`] is the real
//! backend; the in-memory store backs the test suite.

pub mod postgres;

#[cfg(test)]
pub mod memory;

use futures::future::BoxFuture;
use thiserror::Error;

use crate::models::feedback::{Feedback, NewFeedback};
use crate::models::user::{NewUser, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
}

impl std::fmt::Display for UniqueField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UniqueField::Username => f.write_str("username"),
            UniqueField::Email => f.write_str("email"),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} is already taken")]
    Conflict(UniqueField),

    #[error("no user named {0:?}")]
    MissingUser(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

pub trait Store: Send + Sync {
    fn find_user<'a>(&'a self, username: &'a str) -> BoxFuture<'a, StoreResult<Option<User>>>;

    /// Fails with [`StoreError::Conflict`] when the username or email exists.
    fn insert_user(&self, user: NewUser) -> BoxFuture<'_, StoreResult<User>>;

    /// Removes the user and, by cascade, all of their feedback.
    fn delete_user<'a>(&'a self, username: &'a str) -> BoxFuture<'a, StoreResult<bool>>;

    fn feedback_for<'a>(&'a self, username: &'a str) -> BoxFuture<'a, StoreResult<Vec<Feedback>>>;

    fn find_feedback(&self, id: i32) -> BoxFuture<'_, StoreResult<Option<Feedback>>>;

    fn insert_feedback(&self, feedback: NewFeedback) -> BoxFuture<'_, StoreResult<Feedback>>;

    fn update_feedback(
        &self,
        id: i32,
        title: String,
        content: String,
    ) -> BoxFuture<'_, StoreResult<Option<Feedback>>>;

    fn delete_feedback(&self, id: i32) -> BoxFuture<'_, StoreResult<bool>>;
}
