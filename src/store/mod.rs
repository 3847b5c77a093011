/// Persistence Layer
///
/// Record types and the CRUD-shaped store contracts consumed by the auth core
/// and the route handlers. Two backends implement every contract:
/// - `PgStore`: PostgreSQL through sqlx (production)
/// - `InMemoryStore`: mutex-guarded maps (tests, `storage = "memory"`)

mod memory;
mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

/// Errors surfaced by any store backend
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("duplicate entry: {0}")]
    UniqueViolation(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
                StoreError::UniqueViolation(
                    db_err
                        .constraint()
                        .map(str::to_string)
                        .unwrap_or_else(|| db_err.message().to_string()),
                )
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(err.to_string())
            }
            _ => StoreError::Backend(err.to_string()),
        }
    }
}

/// An account row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    pub hashed_password: String,
    pub is_chirpy_red: bool,
}

/// A persisted refresh token. Only the SHA-256 digest of the token is kept.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefreshTokenRecord {
    pub token_hash: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ChirpRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub body: String,
    pub user_id: Uuid,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `StoreError::UniqueViolation` if the email is taken
    async fn create_user(&self, email: &str, hashed_password: &str)
        -> Result<UserRecord, StoreError>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Returns `None` if no user has this id
    async fn update_user(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<Option<UserRecord>, StoreError>;

    async fn upgrade_to_chirpy_red(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError>;

    /// Removes every user along with their chirps and refresh tokens
    async fn delete_all_users(&self) -> Result<(), StoreError>;
}

#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    async fn insert(&self, record: &RefreshTokenRecord) -> Result<(), StoreError>;

    async fn find_by_token(&self, token_hash: &str)
        -> Result<Option<RefreshTokenRecord>, StoreError>;

    /// Sets `revoked_at` unless it is already set.
    /// Returns `false` if no record matches.
    async fn mark_revoked(&self, token_hash: &str, when: DateTime<Utc>)
        -> Result<bool, StoreError>;
}

#[async_trait]
pub trait ChirpStore: Send + Sync {
    async fn create_chirp(&self, body: &str, user_id: Uuid) -> Result<ChirpRecord, StoreError>;

    /// Oldest first
    async fn list_chirps(&self) -> Result<Vec<ChirpRecord>, StoreError>;

    async fn get_chirp(&self, id: Uuid) -> Result<Option<ChirpRecord>, StoreError>;

    /// Returns `false` if the chirp did not exist
    async fn delete_chirp(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// Shared handles to every store, all backed by the same backend
#[derive(Clone)]
pub struct Storage {
    pub users: Arc<dyn UserStore>,
    pub refresh_tokens: Arc<dyn RefreshTokenStore>,
    pub chirps: Arc<dyn ChirpStore>,
}

impl Storage {
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self::from_backend(Arc::new(PgStore::new(pool)))
    }

    pub fn in_memory() -> Self {
        Self::from_backend(Arc::new(InMemoryStore::new()))
    }

    fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: UserStore + RefreshTokenStore + ChirpStore + 'static,
    {
        Self {
            users: backend.clone(),
            refresh_tokens: backend.clone(),
            chirps: backend,
        }
    }
}
