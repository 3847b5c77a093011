/// Authentication module
///
/// Password hashing, access token (JWT) issuance/validation, refresh token
/// management, bearer header parsing, and the authorization gate that ties
/// them together for request handlers.

mod bearer;
mod claims;
mod gate;
mod jwt;
mod password;
mod refresh_token;

pub use bearer::{bearer_token, extract_bearer_token, BearerError};
pub use claims::{Claims, ISSUER};
pub use gate::{authenticate, authorize_ownership, ensure_owner, AuthenticatedUser};
pub use jwt::{generate_access_token, issue_access_token, validate_access_token, AccessTokenError};
pub use password::{hash_password, verify_password, PasswordError};
pub use refresh_token::{
    generate_refresh_token, RefreshTokenError, RefreshTokenManager, RefreshTokenState,
};
