/// Payment provider webhooks

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, ErrorContext, ValidationError};
use crate::store::UserStore;

const USER_UPGRADED: &str = "user.upgraded";

#[derive(Deserialize)]
pub struct PolkaWebhook {
    pub event: String,
    pub data: Option<PolkaWebhookData>,
}

#[derive(Deserialize)]
pub struct PolkaWebhookData {
    pub user_id: Uuid,
}

/// POST /api/polka/webhooks
///
/// `user.upgraded` grants Chirpy Red; any other event is acknowledged and
/// ignored.
pub async fn polka_webhook(
    form: web::Json<PolkaWebhook>,
    users: web::Data<dyn UserStore>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("polka_webhook");
    let webhook = form.into_inner();

    if webhook.event != USER_UPGRADED {
        tracing::debug!(request_id = %context.request_id, event = %webhook.event, "Ignoring webhook event");
        return Ok(HttpResponse::NoContent().finish());
    }

    let user_id = webhook
        .data
        .ok_or(ValidationError::EmptyField("data"))?
        .user_id;

    users
        .upgrade_to_chirpy_red(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user_id,
        "User upgraded to Chirpy Red"
    );

    Ok(HttpResponse::NoContent().finish())
}
