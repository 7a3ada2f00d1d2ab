use futures::future::{BoxFuture, FutureExt};
use tokio::sync::Mutex;

use super::{Store, StoreError, StoreResult, UniqueField};
use crate::models::feedback::{Feedback, NewFeedback};
use crate::models::user::{NewUser, User};

/// Mirrors the PostgreSQL schema's constraints: unique username/email,
/// feedback must reference an existing user, cascade on user delete.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    feedback: Vec<Feedback>,
    next_user_id: i32,
    next_feedback_id: i32,
}

impl MemoryStore {
    pub async fn user_count(&self) -> usize {
        self.tables.lock().await.users.len()
    }

    pub async fn feedback_count(&self) -> usize {
        self.tables.lock().await.feedback.len()
    }
}

impl Store for MemoryStore {
    fn find_user<'a>(&'a self, username: &'a str) -> BoxFuture<'a, StoreResult<Option<User>>> {
        async move {
            let tables = self.tables.lock().await;
            Ok(tables.users.iter().find(|u| u.username == username).cloned())
        }
        .boxed()
    }

    fn insert_user(&self, user: NewUser) -> BoxFuture<'_, StoreResult<User>> {
        async move {
            let mut tables = self.tables.lock().await;
            if tables.users.iter().any(|u| u.username == user.username) {
                return Err(StoreError::Conflict(UniqueField::Username));
            }
            if tables.users.iter().any(|u| u.email == user.email) {
                return Err(StoreError::Conflict(UniqueField::Email));
            }

            tables.next_user_id += 1;
            let user = User {
                id: tables.next_user_id,
                username: user.username,
                password: user.password,
                email: user.email,
                first_name: user.first_name,
                last_name: user.last_name,
            };
            tables.users.push(user.clone());
            Ok(user)
        }
        .boxed()
    }

    fn delete_user<'a>(&'a self, username: &'a str) -> BoxFuture<'a, StoreResult<bool>> {
        async move {
            let mut tables = self.tables.lock().await;
            let before = tables.users.len();
            tables.users.retain(|u| u.username != username);
            let removed = tables.users.len() != before;
            if removed {
                tables.feedback.retain(|f| f.username != username);
            }
            Ok(removed)
        }
        .boxed()
    }

    fn feedback_for<'a>(&'a self, username: &'a str) -> BoxFuture<'a, StoreResult<Vec<Feedback>>> {
        async move {
            let tables = self.tables.lock().await;
            Ok(tables
                .feedback
                .iter()
                .filter(|f| f.username == username)
                .cloned()
                .collect())
        }
        .boxed()
    }

    fn find_feedback(&self, id: i32) -> BoxFuture<'_, StoreResult<Option<Feedback>>> {
        async move {
            let tables = self.tables.lock().await;
            Ok(tables.feedback.iter().find(|f| f.id == id).cloned())
        }
        .boxed()
    }

    fn insert_feedback(&self, feedback: NewFeedback) -> BoxFuture<'_, StoreResult<Feedback>> {
        async move {
            let mut tables = self.tables.lock().await;
            if !tables.users.iter().any(|u| u.username == feedback.username) {
                return Err(StoreError::MissingUser(feedback.username));
            }

            tables.next_feedback_id += 1;
            let row = Feedback {
                id: tables.next_feedback_id,
                title: feedback.title,
                content: feedback.content,
                username: feedback.username,
            };
            tables.feedback.push(row.clone());
            Ok(row)
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
            let mut tables = self.tables.lock().await;
            Ok(tables.feedback.iter_mut().find(|f| f.id == id).map(|row| {
                row.title = title;
                row.content = content;
                row.clone()
            }))
        }
        .boxed()
    }

    fn delete_feedback(&self, id: i32) -> BoxFuture<'_, StoreResult<bool>> {
        async move {
            let mut tables = self.tables.lock().await;
            let before = tables.feedback.len();
            tables.feedback.retain(|f| f.id != id);
            Ok(tables.feedback.len() != before)
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::AuthService;

    async fn new_user(auth: &AuthService, username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.into(),
            password: auth.hash_password("secret1").await.unwrap(),
            email: email.into(),
            first_name: "First".into(),
            last_name: "Last".into(),
        }
    }

    fn note(username: &str, title: &str) -> NewFeedback {
        NewFeedback {
            title: title.into(),
            content: "body".into(),
            username: username.into(),
        }
    }

    #[tokio::test]
    async fn unique_columns_are_enforced() {
        let auth = AuthService::new(4);
        let store = MemoryStore::default();
        store.insert_user(new_user(&auth, "alice", "a@x.com").await).await.unwrap();

        let err = store
            .insert_user(new_user(&auth, "alice", "other@x.com").await)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(UniqueField::Username)));

        let err = store
            .insert_user(new_user(&auth, "alicia", "a@x.com").await)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(UniqueField::Email)));

        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn feedback_requires_an_owner() {
        let store = MemoryStore::default();
        let err = store.insert_feedback(note("ghost", "hello")).await.unwrap_err();
        assert!(matches!(err, StoreError::MissingUser(name) if name == "ghost"));
    }

    #[tokio::test]
    async fn deleting_a_user_cascades_to_their_feedback_only() {
        let auth = AuthService::new(4);
        let store = MemoryStore::default();
        store.insert_user(new_user(&auth, "alice", "a@x.com").await).await.unwrap();
        store.insert_user(new_user(&auth, "bob", "b@x.com").await).await.unwrap();
        store.insert_feedback(note("alice", "one")).await.unwrap();
        store.insert_feedback(note("alice", "two")).await.unwrap();
        let kept = store.insert_feedback(note("bob", "three")).await.unwrap();

        assert!(store.delete_user("alice").await.unwrap());
        assert!(!store.delete_user("alice").await.unwrap());

        assert!(store.find_user("alice").await.unwrap().is_none());
        assert!(store.feedback_for("alice").await.unwrap().is_empty());
        assert_eq!(store.feedback_for("bob").await.unwrap(), vec![kept]);
    }

    #[tokio::test]
    async fn update_and_delete_touch_a_single_row() {
        let auth = AuthService::new(4);
        let store = MemoryStore::default();
        store.insert_user(new_user(&auth, "alice", "a@x.com").await).await.unwrap();
        let first = store.insert_feedback(note("alice", "one")).await.unwrap();
        let second = store.insert_feedback(note("alice", "two")).await.unwrap();

        let updated = store
            .update_feedback(first.id, "uno".into(), "changed".into())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "uno");
        assert_eq!(store.find_feedback(second.id).await.unwrap(), Some(second.clone()));
        assert!(store.update_feedback(99, "x".into(), "y".into()).await.unwrap().is_none());

        assert!(store.delete_feedback(first.id).await.unwrap());
        assert_eq!(store.feedback_for("alice").await.unwrap(), vec![second]);
        assert!(!store.delete_feedback(first.id).await.unwrap());
    }
}
