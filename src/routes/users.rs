/// Account Routes
///
/// Registration and self-service credential updates.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use super::UserResponse;
use crate::auth::{hash_password, AuthenticatedUser};
use crate::error::{AppError, ErrorContext};
use crate::store::UserStore;
use crate::telemetry::spawn_blocking_with_tracing;
use crate::validators::{is_valid_email, is_valid_password};

/// Email and password, as sent to registration, update and login
#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Validate credentials and hash the password off the async runtime
async fn prepare_credentials(form: CredentialsRequest) -> Result<(String, String), AppError> {
    let email = is_valid_email(&form.email)?;
    is_valid_password(&form.password)?;

    let password = form.password;
    let password_hash = spawn_blocking_with_tracing(move || hash_password(&password)).await??;

    Ok((email, password_hash))
}

/// POST /api/users
///
/// # Errors
/// - 400: invalid email or password
/// - 409: email already registered
pub async fn create_user(
    form: web::Json<CredentialsRequest>,
    users: web::Data<dyn UserStore>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_registration");

    let (email, password_hash) = prepare_credentials(form.into_inner()).await?;
    let user = users.create_user(&email, &password_hash).await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user.id,
        "User registered successfully"
    );

    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// PUT /api/users
///
/// Replaces the caller's email and password.
///
/// # Errors
/// - 401: missing or invalid access token
/// - 404: the account behind the token no longer exists
/// - 409: the new email belongs to another account
pub async fn update_user(
    user: AuthenticatedUser,
    form: web::Json<CredentialsRequest>,
    users: web::Data<dyn UserStore>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_update").with_user_id(user.user_id());

    let (email, password_hash) = prepare_credentials(form.into_inner()).await?;
    let updated = users
        .update_user(user.user_id(), &email, &password_hash)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = ?context.user_id,
        operation = %context.operation,
        "User credentials updated"
    );

    Ok(HttpResponse::Ok().json(UserResponse::from(updated)))
}
