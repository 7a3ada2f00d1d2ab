use futures::future::{BoxFuture, FutureExt};
use sqlx::migrate::MigrateError;
use sqlx::PgPool;

use super::{Store, StoreError, StoreResult, UniqueField};
use crate::models::feedback::{Feedback, NewFeedback};
use crate::models::user::{NewUser, User};

const SELECT_USER: &str =
    "SELECT id, username, password, email, first_name, last_name FROM users WHERE username = $1";
const INSERT_USER: &str = "INSERT INTO users (username, password, email, first_name, last_name)
     VALUES ($1, $2, $3, $4, $5)
     RETURNING id, username, password, email, first_name, last_name";
const SELECT_FEEDBACK_FOR: &str =
    "SELECT id, title, content, username FROM feedback WHERE username = $1 ORDER BY id";
const SELECT_FEEDBACK: &str = "SELECT id, title, content, username FROM feedback WHERE id = $1";
const INSERT_FEEDBACK: &str = "INSERT INTO feedback (title, content, username)
     VALUES ($1, $2, $3)
     RETURNING id, title, content, username";
const UPDATE_FEEDBACK: &str = "UPDATE feedback SET title = $2, content = $3 WHERE id = $1
     RETURNING id, title, content, username";

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    /// Drops every table, then recreates the schema from scratch.
    pub async fn reset(&self) -> Result<(), MigrateError> {
        sqlx::query("DROP TABLE IF EXISTS feedback, users, _sqlx_migrations")
            .execute(&self.pool)
            .await?;
        self.migrate().await
    }
}

fn classify(err: sqlx::Error, username: &str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let field = match db_err.constraint() {
                Some(name) if name.contains("email") => UniqueField::Email,
                _ => UniqueField::Username,
            };
            return StoreError::Conflict(field);
        }
        if db_err.is_foreign_key_violation() {
            return StoreError::MissingUser(username.to_string());
        }
    }
    StoreError::Database(err)
}

impl Store for PgStore {
    fn find_user<'a>(&'a self, username: &'a str) -> BoxFuture<'a, StoreResult<Option<User>>> {
        async move {
            let user = sqlx::query_as::<_, User>(SELECT_USER)
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;
            Ok(user)
        }
        .boxed()
    }

    fn insert_user(&self, user: NewUser) -> BoxFuture<'_, StoreResult<User>> {
        async move {
            let inserted = sqlx::query_as::<_, User>(INSERT_USER)
                .bind(&user.username)
                .bind(&user.password)
                .bind(&user.email)
                .bind(&user.first_name)
                .bind(&user.last_name)
                .fetch_one(&self.pool)
                .await;
            inserted.map_err(|e| classify(e, &user.username))
        }
        .boxed()
    }

    fn delete_user<'a>(&'a self, username: &'a str) -> BoxFuture<'a, StoreResult<bool>> {
        async move {
            let result = sqlx::query("DELETE FROM users WHERE username = $1")
                .bind(username)
                .execute(&self.pool)
                .await?;
            Ok(result.rows_affected() > 0)
        }
        .boxed()
    }

    fn feedback_for<'a>(&'a self, username: &'a str) -> BoxFuture<'a, StoreResult<Vec<Feedback>>> {
        async move {
            let rows = sqlx::query_as::<_, Feedback>(SELECT_FEEDBACK_FOR)
                .bind(username)
                .fetch_all(&self.pool)
                .await?;
            Ok(rows)
        }
        .boxed()
    }

    fn find_feedback(&self, id: i32) -> BoxFuture<'_, StoreResult<Option<Feedback>>> {
        async move {
            let row = sqlx::query_as::<_, Feedback>(SELECT_FEEDBACK)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }
        .boxed()
    }

    fn insert_feedback(&self, feedback: NewFeedback) -> BoxFuture<'_, StoreResult<Feedback>> {
        async move {
            let inserted = sqlx::query_as::<_, Feedback>(INSERT_FEEDBACK)
                .bind(&feedback.title)
                .bind(&feedback.content)
                .bind(&feedback.username)
                .fetch_one(&self.pool)
                .await;
            inserted.map_err(|e| classify(e, &feedback.username))
        }
        .boxed()
    }

    fn update_feedback(
        &self,
        id: i32,
        title: String,
        content: String,
    ) -> BoxFuture<'_, StoreResult<Option<Feedback>>> {
        async move {
            let row = sqlx::query_as::<_, Feedback>(UPDATE_FEEDBACK)
                .bind(id)
                .bind(title)
                .bind(content)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }
        .boxed()
    }

    fn delete_feedback(&self, id: i32) -> BoxFuture<'_, StoreResult<bool>> {
        async move {
            let result = sqlx::query("DELETE FROM feedback WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;
            Ok(result.rows_affected() > 0)
        }
        .boxed()
    }
}
