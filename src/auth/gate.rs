/// Authorization Gate
///
/// Authenticates a request from its `Authorization` header and decides
/// whether an identity may mutate a resource. Resource lookup is the
/// caller's job and must happen first, so a missing resource is reported as
/// not found before ownership is ever evaluated.

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use secrecy::ExposeSecret;
use uuid::Uuid;

use super::bearer::{extract_bearer_token, BearerError};
use super::jwt::validate_access_token;
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};

/// Extract the bearer token and validate it as an access token
///
/// The first failure is returned as-is.
pub fn authenticate(header_value: &str, signing_secret: &str) -> Result<Uuid, AuthError> {
    let token = extract_bearer_token(header_value)?;
    validate_access_token(&token, signing_secret).map_err(AuthError::AccessToken)
}

/// Exact identity match against the resource owner
pub fn authorize_ownership(identity: Uuid, resource_owner_id: Uuid) -> bool {
    identity == resource_owner_id
}

/// `authorize_ownership` as a `Result`, `false` becoming `Forbidden`
pub fn ensure_owner(identity: Uuid, resource_owner_id: Uuid) -> Result<(), AppError> {
    if authorize_ownership(identity, resource_owner_id) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only the author may modify this resource".to_string(),
        ))
    }
}

/// The user behind a valid access token.
///
/// Handlers that take this extractor reject the request with 401 before
/// their body runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub Uuid);

impl AuthenticatedUser {
    pub fn user_id(&self) -> Uuid {
        self.0
    }

    fn from_http_request(req: &HttpRequest) -> Result<Self, AppError> {
        let settings = req
            .app_data::<web::Data<JwtSettings>>()
            .ok_or_else(|| AppError::Config("JWT settings are not registered".to_string()))?;

        // An absent header parses the same as an empty one
        let header_value = match req.headers().get(AUTHORIZATION) {
            Some(value) => value
                .to_str()
                .map_err(|_| AuthError::Bearer(BearerError::MissingScheme))?,
            None => "",
        };
        let user_id = authenticate(header_value, settings.secret.expose_secret())?;

        tracing::debug!(user_id = %user_id, "Access token validated");
        Ok(Self(user_id))
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::from_http_request(req))
    }
}
