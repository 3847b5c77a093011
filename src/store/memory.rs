use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{
    ChirpRecord, ChirpStore, RefreshTokenRecord, RefreshTokenStore, StoreError, UserRecord,
    UserStore,
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, UserRecord>,
    refresh_tokens: HashMap<String, RefreshTokenRecord>,
    // Insertion order doubles as creation order
    chirps: Vec<ChirpRecord>,
}

/// Process-local store. The lock is never held across an await point.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
    }
}

impl Tables {
    fn email_taken(&self, email: &str, except: Option<Uuid>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn create_user(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> Result<UserRecord, StoreError> {
        let mut tables = self.lock()?;
        if tables.email_taken(email, None) {
            return Err(StoreError::UniqueViolation("users_email_key".to_string()));
        }

        let now = Utc::now();
        let user = UserRecord {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
            is_chirpy_red: false,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let tables = self.lock()?;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn update_user(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<Option<UserRecord>, StoreError> {
        let mut tables = self.lock()?;
        if !tables.users.contains_key(&id) {
            return Ok(None);
        }
        if tables.email_taken(email, Some(id)) {
            return Err(StoreError::UniqueViolation("users_email_key".to_string()));
        }

        Ok(tables.users.get_mut(&id).map(|user| {
            user.email = email.to_string();
            user.hashed_password = hashed_password.to_string();
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn upgrade_to_chirpy_red(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        let mut tables = self.lock()?;
        Ok(tables.users.get_mut(&id).map(|user| {
            user.is_chirpy_red = true;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn delete_all_users(&self) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        tables.users.clear();
        tables.refresh_tokens.clear();
        tables.chirps.clear();
        Ok(())
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryStore {
    async fn insert(&self, record: &RefreshTokenRecord) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        if !tables.users.contains_key(&record.user_id) {
            return Err(StoreError::Backend(format!(
                "refresh token references unknown user {}",
                record.user_id
            )));
        }
        if tables.refresh_tokens.contains_key(&record.token_hash) {
            return Err(StoreError::UniqueViolation("refresh_tokens_pkey".to_string()));
        }
        tables
            .refresh_tokens
            .insert(record.token_hash.clone(), record.clone());
        Ok(())
    }

    async fn find_by_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshTokenRecord>, StoreError> {
        let tables = self.lock()?;
        Ok(tables.refresh_tokens.get(token_hash).cloned())
    }

    async fn mark_revoked(
        &self,
        token_hash: &str,
        when: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut tables = self.lock()?;
        match tables.refresh_tokens.get_mut(token_hash) {
            None => Ok(false),
            Some(record) => {
                if record.revoked_at.is_none() {
                    record.revoked_at = Some(when);
                    record.updated_at = when;
                }
                Ok(true)
            }
        }
    }
}

#[async_trait]
impl ChirpStore for InMemoryStore {
    async fn create_chirp(&self, body: &str, user_id: Uuid) -> Result<ChirpRecord, StoreError> {
        let mut tables = self.lock()?;
        if !tables.users.contains_key(&user_id) {
            return Err(StoreError::Backend(format!(
                "chirp references unknown user {}",
                user_id
            )));
        }

        let now = Utc::now();
        let chirp = ChirpRecord {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            body: body.to_string(),
            user_id,
        };
        tables.chirps.push(chirp.clone());
        Ok(chirp)
    }

    async fn list_chirps(&self) -> Result<Vec<ChirpRecord>, StoreError> {
        Ok(self.lock()?.chirps.clone())
    }

    async fn get_chirp(&self, id: Uuid) -> Result<Option<ChirpRecord>, StoreError> {
        let tables = self.lock()?;
        Ok(tables.chirps.iter().find(|c| c.id == id).cloned())
    }

    async fn delete_chirp(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.lock()?;
        let before = tables.chirps.len();
        tables.chirps.retain(|c| c.id != id);
        Ok(tables.chirps.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token_record(user_id: Uuid, token_hash: &str) -> RefreshTokenRecord {
        let now = Utc::now();
        RefreshTokenRecord {
            token_hash: token_hash.to_string(),
            user_id,
            created_at: now,
            updated_at: now,
            expires_at: now + Duration::days(60),
            revoked_at: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let store = InMemoryStore::new();
        store.create_user("a@b.com", "hash").await.unwrap();

        let result = store.create_user("a@b.com", "other").await;
        assert!(matches!(result, Err(StoreError::UniqueViolation(_))));
    }

    #[tokio::test]
    async fn test_update_user_keeps_id_and_created_at() {
        let store = InMemoryStore::new();
        let user = store.create_user("a@b.com", "hash").await.unwrap();

        let updated = store
            .update_user(user.id, "new@b.com", "newhash")
            .await
            .unwrap()
            .expect("user should exist");

        assert_eq!(updated.id, user.id);
        assert_eq!(updated.created_at, user.created_at);
        assert_eq!(updated.email, "new@b.com");
        assert_eq!(updated.hashed_password, "newhash");
        assert!(store.get_user_by_email("a@b.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_user_returns_none() {
        let store = InMemoryStore::new();
        let result = store.update_user(Uuid::new_v4(), "a@b.com", "hash").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_update_missing_user_to_taken_email_returns_none() {
        let store = InMemoryStore::new();
        store.create_user("taken@b.com", "hash").await.unwrap();

        let result = store
            .update_user(Uuid::new_v4(), "taken@b.com", "hash")
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_mark_revoked_keeps_first_revocation_time() {
        let store = InMemoryStore::new();
        let user = store.create_user("a@b.com", "hash").await.unwrap();
        store.insert(&token_record(user.id, "digest")).await.unwrap();

        let first = Utc::now();
        assert!(store.mark_revoked("digest", first).await.unwrap());
        assert!(store
            .mark_revoked("digest", first + Duration::hours(1))
            .await
            .unwrap());

        let record = store.find_by_token("digest").await.unwrap().unwrap();
        assert_eq!(record.revoked_at, Some(first));
        assert_eq!(record.updated_at, first);
    }

    #[tokio::test]
    async fn test_mark_revoked_unknown_token() {
        let store = InMemoryStore::new();
        assert!(!store.mark_revoked("missing", Utc::now()).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_all_users_cascades() {
        let store = InMemoryStore::new();
        let user = store.create_user("a@b.com", "hash").await.unwrap();
        store.insert(&token_record(user.id, "digest")).await.unwrap();
        store.create_chirp("hello", user.id).await.unwrap();

        store.delete_all_users().await.unwrap();

        assert!(store.find_by_token("digest").await.unwrap().is_none());
        assert!(store.list_chirps().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_chirps_are_listed_oldest_first() {
        let store = InMemoryStore::new();
        let user = store.create_user("a@b.com", "hash").await.unwrap();
        let first = store.create_chirp("first", user.id).await.unwrap();
        let second = store.create_chirp("second", user.id).await.unwrap();

        let ids: Vec<Uuid> = store.list_chirps().await.unwrap().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);

        assert!(store.delete_chirp(first.id).await.unwrap());
        assert!(!store.delete_chirp(first.id).await.unwrap());
        assert!(store.get_chirp(first.id).await.unwrap().is_none());
    }
}
