/// JWT Token Generation and Validation
///
/// Access tokens are stateless HS256 JWTs. Nothing is persisted and there is
/// no revocation list: a token with a valid signature is honored until it
/// expires, so the access TTL is the only bound on a leaked token.

use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use uuid::Uuid;

use super::claims::{Claims, ISSUER};
use crate::configuration::JwtSettings;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessTokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
    #[error("token issuer is not accepted")]
    InvalidIssuer,
    #[error("token subject is not a valid user id")]
    MalformedSubject,
    #[error("token signing failed: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for AccessTokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => AccessTokenError::InvalidSignature,
            ErrorKind::ExpiredSignature => AccessTokenError::Expired,
            ErrorKind::InvalidIssuer => AccessTokenError::InvalidIssuer,
            _ => AccessTokenError::Malformed,
        }
    }
}

/// Sign a new access token for `user_id`, valid for `ttl`
///
/// # Errors
/// Returns `AccessTokenError::Signing` if encoding fails
pub fn issue_access_token(
    user_id: Uuid,
    signing_secret: &str,
    ttl: Duration,
) -> Result<String, AccessTokenError> {
    let claims = Claims::new(user_id, ttl);

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_secret.as_bytes()),
    )
    .map_err(|e| AccessTokenError::Signing(e.to_string()))
}

/// Verify an access token and return the user id it was issued to
///
/// The signature is checked before any claim is looked at. A token is
/// accepted up to and including its expiry second, with no leeway.
///
/// # Errors
/// - `InvalidSignature` if the MAC does not match
/// - `Expired` if the expiry has passed
/// - `InvalidIssuer` if the token was not issued by this service
/// - `MalformedSubject` if the subject is not a UUID
/// - `Malformed` for anything that is not a well-formed token
pub fn validate_access_token(token: &str, signing_secret: &str) -> Result<Uuid, AccessTokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_issuer(&[ISSUER]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(signing_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        tracing::debug!("JWT validation error: {}", e);
        AccessTokenError::from(e)
    })?;

    data.claims.user_id()
}

/// Issue an access token using the configured secret and lifetime
pub fn generate_access_token(
    user_id: Uuid,
    config: &JwtSettings,
) -> Result<String, AccessTokenError> {
    issue_access_token(
        user_id,
        config.secret.expose_secret(),
        config.access_token_ttl(),
    )
}
