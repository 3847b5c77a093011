/// Error Handling Module
///
/// Unified error handling for the whole service:
/// 1. Domain-specific error types (validation, auth)
/// 2. A central `AppError` every handler returns
/// 3. HTTP response mapping with structured logging
/// 4. Error context carrying a request id through a handler

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};

use crate::auth::{AccessTokenError, BearerError, PasswordError, RefreshTokenError};
use crate::store::StoreError;

// ============================================================================
// 1. DOMAIN-SPECIFIC ERROR TYPES
// ============================================================================

/// Validation errors for input data
#[derive(Debug, Clone, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is empty")]
    EmptyField(&'static str),
    #[error("{0} is too short (minimum {1} characters)")]
    TooShort(&'static str, usize),
    #[error("{0} is too long (maximum {1} characters)")]
    TooLong(&'static str, usize),
    #[error("{0} has invalid format")]
    InvalidFormat(&'static str),
    #[error("malformed request body: {0}")]
    MalformedBody(String),
}

/// Authentication failures. Every variant maps to 401.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Incorrect email or password")]
    InvalidCredentials,
    #[error(transparent)]
    Bearer(#[from] BearerError),
    #[error(transparent)]
    AccessToken(AccessTokenError),
    #[error(transparent)]
    RefreshToken(RefreshTokenError),
}

// ============================================================================
// 2. UNIFIED APPLICATION ERROR TYPE
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Database(#[from] StoreError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<BearerError> for AppError {
    fn from(err: BearerError) -> Self {
        AppError::Auth(AuthError::Bearer(err))
    }
}

impl From<AccessTokenError> for AppError {
    fn from(err: AccessTokenError) -> Self {
        match err {
            AccessTokenError::Signing(msg) => {
                AppError::Internal(format!("Token generation failed: {}", msg))
            }
            other => AppError::Auth(AuthError::AccessToken(other)),
        }
    }
}

impl From<RefreshTokenError> for AppError {
    fn from(err: RefreshTokenError) -> Self {
        match err {
            RefreshTokenError::Store(e) => AppError::Database(e),
            RefreshTokenError::RandomSource(msg) => {
                AppError::Internal(format!("Random source failure: {}", msg))
            }
            other => AppError::Auth(AuthError::RefreshToken(other)),
        }
    }
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::InvalidHashFormat(_) => {
                AppError::Validation(ValidationError::InvalidFormat("password hash"))
            }
            PasswordError::Hashing(msg) => {
                AppError::Internal(format!("Password hashing failed: {}", msg))
            }
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("Blocking task failed: {}", err))
    }
}

// ============================================================================
// 3. HTTP RESPONSE MAPPING
// ============================================================================

/// Error response structure for HTTP responses
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Human-readable error message
    pub message: String,
    /// Error code for client-side handling
    pub code: String,
    pub status: u16,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_id: String, message: String, code: String, status: u16) -> Self {
        Self {
            error_id,
            message,
            code,
            status,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Trait for converting errors to HTTP responses with proper logging
pub trait ErrorHandler {
    fn error_response(&self, request_id: &str) -> (StatusCode, ErrorResponse);
    fn log_error(&self, request_id: &str);
}

impl AppError {
    fn code_and_message(&self) -> (&'static str, String) {
        match self {
            AppError::Validation(e) => ("VALIDATION_ERROR", e.to_string()),
            AppError::Database(e) => match e {
                StoreError::UniqueViolation(_) => {
                    ("DUPLICATE_ENTRY", "Resource already exists".to_string())
                }
                StoreError::Unavailable(_) => (
                    "SERVICE_UNAVAILABLE",
                    "Database service temporarily unavailable".to_string(),
                ),
                StoreError::Backend(_) => ("DATABASE_ERROR", "Database error occurred".to_string()),
            },
            // Never reveal which authentication step failed
            AppError::Auth(e) => match e {
                AuthError::InvalidCredentials => ("INVALID_CREDENTIALS", e.to_string()),
                AuthError::Bearer(BearerError::MissingHeader) => (
                    "MISSING_TOKEN",
                    "Missing authentication token".to_string(),
                ),
                _ => ("TOKEN_INVALID", "Invalid or expired token".to_string()),
            },
            AppError::Forbidden(msg) => ("FORBIDDEN", msg.clone()),
            AppError::NotFound(msg) => ("NOT_FOUND", msg.clone()),
            AppError::Config(_) => ("CONFIG_ERROR", "Server configuration error".to_string()),
            AppError::Internal(_) => ("INTERNAL_ERROR", "Internal server error".to_string()),
        }
    }
}

impl ErrorHandler for AppError {
    fn error_response(&self, request_id: &str) -> (StatusCode, ErrorResponse) {
        let status = ResponseError::status_code(self);
        let (code, message) = self.code_and_message();

        let error_response = ErrorResponse::new(
            request_id.to_string(),
            message,
            code.to_string(),
            status.as_u16(),
        );

        (status, error_response)
    }

    fn log_error(&self, request_id: &str) {
        match self {
            AppError::Validation(e) => {
                tracing::warn!(request_id = request_id, error = %e, "Validation error");
            }
            AppError::Database(StoreError::UniqueViolation(_)) => {
                tracing::warn!(request_id = request_id, error = %self, "Duplicate entry attempt");
            }
            AppError::Database(e) => {
                tracing::error!(request_id = request_id, error = %e, "Database error");
            }
            AppError::Auth(AuthError::InvalidCredentials) => {
                tracing::warn!(request_id = request_id, "Invalid credentials attempt");
            }
            AppError::Auth(e) => {
                tracing::warn!(request_id = request_id, error = %e, "Authentication error");
            }
            AppError::Forbidden(msg) => {
                tracing::warn!(request_id = request_id, error = %msg, "Forbidden");
            }
            AppError::NotFound(msg) => {
                tracing::debug!(request_id = request_id, error = %msg, "Not found");
            }
            AppError::Config(msg) => {
                tracing::error!(request_id = request_id, error = %msg, "Configuration error");
            }
            AppError::Internal(msg) => {
                tracing::error!(request_id = request_id, error = %msg, "Internal error");
            }
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let request_id = uuid::Uuid::new_v4().to_string();
        self.log_error(&request_id);

        let (status, error_response) = <Self as ErrorHandler>::error_response(self, &request_id);

        HttpResponse::build(status).json(error_response)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Database(e) => match e {
                StoreError::UniqueViolation(_) => StatusCode::CONFLICT,
                StoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                StoreError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// ============================================================================
// 4. ERROR CONTEXT ENRICHMENT
// ============================================================================

/// Per-handler context for correlated log lines
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub request_id: String,
    pub user_id: Option<String>,
    pub operation: String,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            user_id: None,
            operation: operation.into(),
        }
    }

    pub fn with_user_id(mut self, user_id: impl ToString) -> Self {
        self.user_id = Some(user_id.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::EmptyField("email");
        assert_eq!(err.to_string(), "email is empty");
    }

    #[test]
    fn test_auth_failures_map_to_401() {
        let errors: Vec<AppError> = vec![
            AuthError::InvalidCredentials.into(),
            BearerError::MissingScheme.into(),
            AccessTokenError::Expired.into(),
            RefreshTokenError::Revoked.into(),
            RefreshTokenError::NotFound.into(),
        ];

        for err in errors {
            assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED, "{:?}", err);
        }
    }

    #[test]
    fn test_internal_failures_map_to_500() {
        let errors: Vec<AppError> = vec![
            AccessTokenError::Signing("boom".to_string()).into(),
            RefreshTokenError::RandomSource("boom".to_string()).into(),
            PasswordError::Hashing("boom".to_string()).into(),
            StoreError::Backend("boom".to_string()).into(),
        ];

        for err in errors {
            assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR, "{:?}", err);
        }
    }

    #[test]
    fn test_store_errors_routed_through_refresh_tokens() {
        let err: AppError =
            RefreshTokenError::Store(StoreError::UniqueViolation("pk".to_string())).into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_token_failures_share_one_message() {
        let expired: AppError = AccessTokenError::Expired.into();
        let bad_signature: AppError = AccessTokenError::InvalidSignature.into();
        let revoked: AppError = RefreshTokenError::Revoked.into();

        let (_, a) = ErrorHandler::error_response(&expired, "1");
        let (_, b) = ErrorHandler::error_response(&bad_signature, "2");
        let (_, c) = ErrorHandler::error_response(&revoked, "3");
        assert_eq!(a.message, b.message);
        assert_eq!(b.message, c.message);
        assert_eq!(a.code, "TOKEN_INVALID");
    }

    #[test]
    fn test_forbidden_and_not_found_are_distinct() {
        assert_eq!(
            AppError::Forbidden("x".to_string()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::NotFound("x".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_error_context_creation() {
        let ctx = ErrorContext::new("test_operation");
        assert_eq!(ctx.operation, "test_operation");
        assert!(ctx.user_id.is_none());

        let ctx_with_user = ctx.with_user_id("user-123");
        assert_eq!(ctx_with_user.user_id, Some("user-123".to_string()));
    }
}
