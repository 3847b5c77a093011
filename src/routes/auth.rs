/// Session Routes
///
/// Login issues an access token and a refresh token; the refresh token is
/// then presented as a bearer credential to mint new access tokens or to be
/// revoked.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Serialize;

use super::users::CredentialsRequest;
use super::UserResponse;
use crate::auth::{
    bearer_token, generate_access_token, hash_password, verify_password, RefreshTokenManager,
};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError, ErrorContext};
use crate::store::{UserRecord, UserStore};
use crate::telemetry::spawn_blocking_with_tracing;

/// Login response: the user plus both tokens
#[derive(Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub token: String,
    pub refresh_token: String,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Check `password` against the stored hash, if there is a user at all.
///
/// An unknown email still pays for one hash so response time does not
/// reveal whether the account exists.
async fn password_matches(password: String, user: Option<&UserRecord>) -> Result<bool, AppError> {
    let Some(user) = user else {
        let _ = spawn_blocking_with_tracing(move || hash_password(&password)).await?;
        return Ok(false);
    };

    let stored_hash = user.hashed_password.clone();
    let outcome =
        spawn_blocking_with_tracing(move || verify_password(&password, &stored_hash)).await?;

    Ok(outcome.unwrap_or_else(|e| {
        tracing::error!(user_id = %user.id, error = %e, "Stored password hash is unusable");
        false
    }))
}

/// POST /api/login
///
/// # Errors
/// - 401: unknown email or wrong password, with the same message for both
pub async fn login(
    form: web::Json<CredentialsRequest>,
    users: web::Data<dyn UserStore>,
    refresh_tokens: web::Data<RefreshTokenManager>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_login");
    let CredentialsRequest { email, password } = form.into_inner();

    let user = users.get_user_by_email(email.trim()).await?;
    let matched = password_matches(password, user.as_ref()).await?;

    let user = match user {
        Some(user) if matched => user,
        _ => {
            tracing::warn!(request_id = %context.request_id, "Failed login attempt");
            return Err(AuthError::InvalidCredentials.into());
        }
    };

    let token = generate_access_token(user.id, jwt_config.get_ref())?;
    let (refresh_token, _) = refresh_tokens.issue(user.id).await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user.id,
        "User logged in successfully"
    );

    Ok(HttpResponse::Ok().json(LoginResponse {
        user: UserResponse::from(user),
        token,
        refresh_token,
    }))
}

/// POST /api/refresh
///
/// Exchanges an active refresh token (sent as `Authorization: Bearer`) for a
/// new access token. The refresh token itself is not rotated.
pub async fn refresh(
    req: HttpRequest,
    refresh_tokens: web::Data<RefreshTokenManager>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("token_refresh");

    let presented = bearer_token(req.headers())?;
    let user_id = refresh_tokens.validate(&presented).await?;
    let token = generate_access_token(user_id, jwt_config.get_ref())?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user_id,
        "Access token refreshed"
    );

    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

/// POST /api/revoke
///
/// Revokes the refresh token sent as `Authorization: Bearer`. Revoking an
/// already revoked token succeeds.
pub async fn revoke(
    req: HttpRequest,
    refresh_tokens: web::Data<RefreshTokenManager>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("token_revoke");

    let presented = bearer_token(req.headers())?;
    refresh_tokens.revoke(&presented).await?;

    tracing::info!(request_id = %context.request_id, "Refresh token revoked");

    Ok(HttpResponse::NoContent().finish())
}
