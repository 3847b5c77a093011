/// Refresh Token Management
///
/// Refresh tokens are:
/// - 32 bytes from the OS random source, hex encoded (64 characters)
/// - Hashed with SHA-256 before storage (the plaintext never reaches the store)
/// - Valid for a fixed window from creation unless revoked first
///
/// State machine: `Active -> Expired` (time) and `Active -> Revoked`
/// (explicit). Both are terminal.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::store::{RefreshTokenRecord, RefreshTokenStore, StoreError};

const TOKEN_BYTES: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum RefreshTokenError {
    #[error("refresh token not found")]
    NotFound,
    #[error("refresh token has expired")]
    Expired,
    #[error("refresh token has been revoked")]
    Revoked,
    #[error("random source failure: {0}")]
    RandomSource(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTokenState {
    Active,
    Expired,
    Revoked,
}

impl RefreshTokenRecord {
    /// State of the token at `now`. Revocation takes effect at the instant it
    /// is recorded; expiry is checked first.
    pub fn state_at(&self, now: DateTime<Utc>) -> RefreshTokenState {
        if now > self.expires_at {
            RefreshTokenState::Expired
        } else if self.revoked_at.map_or(false, |revoked_at| revoked_at <= now) {
            RefreshTokenState::Revoked
        } else {
            RefreshTokenState::Active
        }
    }
}

/// Generate a new cryptographically secure refresh token
///
/// # Errors
/// Returns `RefreshTokenError::RandomSource` if the OS random source fails
pub fn generate_refresh_token() -> Result<String, RefreshTokenError> {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| RefreshTokenError::RandomSource(e.to_string()))?;
    Ok(hex::encode(bytes))
}

/// SHA-256 digest of a token, hex encoded. This is the store's lookup key.
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Issues, validates and revokes refresh tokens against a `RefreshTokenStore`.
/// Holds no token state of its own.
pub struct RefreshTokenManager {
    store: Arc<dyn RefreshTokenStore>,
    ttl: Duration,
}

impl RefreshTokenManager {
    pub fn new(store: Arc<dyn RefreshTokenStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Generate and persist a token for `user_id`
    ///
    /// Returns the plaintext token (handed to the client) and the stored record.
    pub async fn issue(
        &self,
        user_id: Uuid,
    ) -> Result<(String, RefreshTokenRecord), RefreshTokenError> {
        let token = generate_refresh_token()?;
        let now = Utc::now();
        let record = RefreshTokenRecord {
            token_hash: hash_token(&token),
            user_id,
            created_at: now,
            updated_at: now,
            expires_at: now + self.ttl,
            revoked_at: None,
        };

        self.store.insert(&record).await?;
        tracing::debug!(user_id = %user_id, "Refresh token issued");

        Ok((token, record))
    }

    /// Resolve a token to its owner if it is still active
    ///
    /// # Errors
    /// `NotFound`, `Expired` or `Revoked`; store failures propagate as `Store`
    pub async fn validate(&self, token: &str) -> Result<Uuid, RefreshTokenError> {
        let record = self
            .store
            .find_by_token(&hash_token(token))
            .await?
            .ok_or_else(|| {
                tracing::warn!("Refresh token not found");
                RefreshTokenError::NotFound
            })?;

        match record.state_at(Utc::now()) {
            RefreshTokenState::Active => Ok(record.user_id),
            RefreshTokenState::Expired => {
                tracing::info!(user_id = %record.user_id, "Refresh token expired");
                Err(RefreshTokenError::Expired)
            }
            RefreshTokenState::Revoked => {
                tracing::warn!(user_id = %record.user_id, "Attempt to use revoked refresh token");
                Err(RefreshTokenError::Revoked)
            }
        }
    }

    /// Revoke a token, effective immediately
    ///
    /// Revoking an already revoked token succeeds and keeps the original
    /// revocation time.
    ///
    /// # Errors
    /// `NotFound` if no such token was ever issued
    pub async fn revoke(&self, token: &str) -> Result<(), RefreshTokenError> {
        let found = self.store.mark_revoked(&hash_token(token), Utc::now()).await?;
        if !found {
            return Err(RefreshTokenError::NotFound);
        }
        Ok(())
    }
}
