// src/models/user.rs
use serde::Serialize;
use sqlx::FromRow;

use crate::services::auth::PasswordHash;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub password: PasswordHash,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

pub struct NewUser {
    pub username: String,
    pub password: PasswordHash,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// What pages get to see of a user.
#[derive(Debug, Serialize)]
pub struct Profile {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&User> for Profile {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}
