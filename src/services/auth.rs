use bcrypt::{hash, verify};
use tracing::warn;

use crate::error::AppError;
use crate::models::user::User;
use crate::store::Store;

/// A salted bcrypt hash. Opaque outside this module: it can be stored and
/// compared against a candidate password, never turned back into one.
#[derive(Clone, PartialEq, Eq, sqlx::Type)]
#[sqlx(transparent)]
pub struct PasswordHash(String);

impl PasswordHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

#[derive(Clone)]
pub struct AuthService {
    cost: u32,
}

impl AuthService {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub async fn hash_password(&self, password: &str) -> Result<PasswordHash, AppError> {
        let password = password.to_owned();
        let cost = self.cost;
        let hashed = tokio::task::spawn_blocking(move || hash(password, cost)).await??;
        Ok(PasswordHash(hashed))
    }

    pub async fn verify_password(&self, password: &str, hashed: &PasswordHash) -> Result<bool, AppError> {
        let password = password.to_owned();
        let hashed = hashed.as_str().to_owned();
        let matched = tokio::task::spawn_blocking(move || verify(password, &hashed)).await?;
        Ok(matched.unwrap_or_else(|e| {
            warn!("Stored password hash could not be checked: {}", e);
            false
        }))
    }

    /// Returns the user only when both the username exists and the password
    /// matches. Callers cannot tell the two failures apart.
    pub async fn authenticate(
        &self,
        store: &dyn Store,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, AppError> {
        let Some(user) = store.find_user(username).await? else {
            return Ok(None);
        };

        if self.verify_password(password, &user.password).await? {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::NewUser;
    use crate::store::memory::MemoryStore;

    fn service() -> AuthService {
        AuthService::new(4)
    }

    async fn store_with_alice(auth: &AuthService) -> MemoryStore {
        let store = MemoryStore::default();
        store
            .insert_user(NewUser {
                username: "alice".into(),
                password: auth.hash_password("secret1").await.unwrap(),
                email: "a@x.com".into(),
                first_name: "Alice".into(),
                last_name: "A".into(),
            })
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn hashes_are_salted_and_not_plaintext() {
        let auth = service();
        let first = auth.hash_password("secret1").await.unwrap();
        let second = auth.hash_password("secret1").await.unwrap();

        assert_ne!(first.as_str(), "secret1");
        assert!(first.as_str().starts_with("$2"));
        assert_ne!(first, second);
        assert!(auth.verify_password("secret1", &first).await.unwrap());
        assert!(!auth.verify_password("secret2", &first).await.unwrap());
    }

    #[tokio::test]
    async fn malformed_hash_never_matches() {
        let auth = service();
        let bogus = PasswordHash("not-a-bcrypt-hash".into());
        assert!(!auth.verify_password("anything", &bogus).await.unwrap());
    }

    #[tokio::test]
    async fn authenticate_accepts_only_matching_credentials() {
        let auth = service();
        let store = store_with_alice(&auth).await;

        let user = auth.authenticate(&store, "alice", "secret1").await.unwrap();
        assert_eq!(user.map(|u| u.username).as_deref(), Some("alice"));

        assert!(auth.authenticate(&store, "alice", "wrong-pass").await.unwrap().is_none());
        assert!(auth.authenticate(&store, "bob", "secret1").await.unwrap().is_none());
    }

    #[test]
    fn debug_output_hides_the_hash() {
        let hashed = PasswordHash("$2b$04$abcdefghijklmnopqrstuv".into());
        assert_eq!(format!("{:?}", hashed), "PasswordHash(..)");
    }
}
