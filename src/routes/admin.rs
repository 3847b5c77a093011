use actix_web::{web, HttpResponse};

use crate::admin_state::AdminState;
use crate::error::{AppError, ErrorContext};
use crate::store::UserStore;

/// GET /admin/metrics
pub async fn metrics(state: web::Data<AdminState>) -> HttpResponse {
    let body = format!(
        "<html>\n  <body>\n    <h1>Welcome, Chirpy Admin</h1>\n    <p>Chirpy has been visited {} times!</p>\n  </body>\n</html>",
        state.hits()
    );

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

/// POST /admin/reset
///
/// Zeroes the hit counter and deletes every user. Only allowed on the `dev`
/// platform.
pub async fn reset(
    state: web::Data<AdminState>,
    users: web::Data<dyn UserStore>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("admin_reset");

    if !state.is_dev() {
        tracing::warn!(request_id = %context.request_id, "Reset attempted outside dev platform");
        return Err(AppError::Forbidden(
            "Reset is only allowed in dev environment".to_string(),
        ));
    }

    state.reset_hits();
    users.delete_all_users().await?;

    tracing::info!(request_id = %context.request_id, "Hits and users reset");

    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Hits reset to 0 and database reset to initial state."))
}
