/// Chirp Routes
///
/// Anyone may read chirps. Posting needs an access token, and only the
/// author may delete.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::{ensure_owner, AuthenticatedUser};
use crate::error::{AppError, ErrorContext, ValidationError};
use crate::store::ChirpStore;
use crate::validators::is_valid_chirp;

#[derive(Deserialize)]
pub struct CreateChirpRequest {
    pub body: String,
}

fn parse_chirp_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| ValidationError::InvalidFormat("chirp_id").into())
}

/// POST /api/chirps
pub async fn create_chirp(
    user: AuthenticatedUser,
    form: web::Json<CreateChirpRequest>,
    chirps: web::Data<dyn ChirpStore>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("chirp_create").with_user_id(user.user_id());

    is_valid_chirp(&form.body)?;
    let chirp = chirps.create_chirp(&form.body, user.user_id()).await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user.user_id(),
        chirp_id = %chirp.id,
        "Chirp created"
    );

    Ok(HttpResponse::Created().json(chirp))
}

/// GET /api/chirps
pub async fn list_chirps(chirps: web::Data<dyn ChirpStore>) -> Result<HttpResponse, AppError> {
    let all = chirps.list_chirps().await?;
    Ok(HttpResponse::Ok().json(all))
}

/// GET /api/chirps/{chirp_id}
pub async fn get_chirp(
    path: web::Path<String>,
    chirps: web::Data<dyn ChirpStore>,
) -> Result<HttpResponse, AppError> {
    let chirp_id = parse_chirp_id(&path)?;
    let chirp = chirps
        .get_chirp(chirp_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Chirp not found".to_string()))?;

    Ok(HttpResponse::Ok().json(chirp))
}

/// DELETE /api/chirps/{chirp_id}
///
/// A missing chirp is 404 for everyone; ownership is only checked once the
/// chirp is known to exist.
pub async fn delete_chirp(
    user: AuthenticatedUser,
    path: web::Path<String>,
    chirps: web::Data<dyn ChirpStore>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("chirp_delete").with_user_id(user.user_id());

    let chirp_id = parse_chirp_id(&path)?;
    let chirp = chirps
        .get_chirp(chirp_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Chirp not found".to_string()))?;

    if let Err(e) = ensure_owner(user.user_id(), chirp.user_id) {
        tracing::warn!(
            request_id = %context.request_id,
            user_id = %user.user_id(),
            chirp_id = %chirp_id,
            "Attempt to delete another user's chirp"
        );
        return Err(e);
    }

    // Gone between lookup and delete
    if !chirps.delete_chirp(chirp_id).await? {
        return Err(AppError::NotFound("Chirp not found".to_string()));
    }

    tracing::info!(
        request_id = %context.request_id,
        user_id = ?context.user_id,
        chirp_id = %chirp_id,
        "Chirp deleted"
    );

    Ok(HttpResponse::NoContent().finish())
}
