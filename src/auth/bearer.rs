/// Bearer credential extraction from the `Authorization` header

use actix_web::http::header::{HeaderMap, AUTHORIZATION};

const SCHEME: &str = "Bearer";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BearerError {
    #[error("no authorization header")]
    MissingHeader,
    #[error("authorization header does not use the Bearer scheme")]
    MissingScheme,
    #[error("authorization header carries no token")]
    EmptyToken,
}

/// Pull the token out of a `Bearer <token>` header value
///
/// The scheme is case-sensitive and may be followed by any amount of
/// whitespace, including none. An empty value is treated as a missing header.
pub fn extract_bearer_token(header_value: &str) -> Result<String, BearerError> {
    if header_value.is_empty() {
        return Err(BearerError::MissingHeader);
    }

    let rest = header_value
        .strip_prefix(SCHEME)
        .ok_or(BearerError::MissingScheme)?;

    let token = rest.trim();
    if token.is_empty() {
        return Err(BearerError::EmptyToken);
    }

    Ok(token.to_string())
}

/// Read and parse the `Authorization` header of a request
pub fn bearer_token(headers: &HeaderMap) -> Result<String, BearerError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(BearerError::MissingHeader)?
        .to_str()
        .map_err(|_| BearerError::MissingScheme)?;

    extract_bearer_token(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header::HeaderValue;

    #[test]
    fn test_extracts_token_after_any_whitespace() {
        assert_eq!(extract_bearer_token("Bearer abc123").unwrap(), "abc123");
        assert_eq!(extract_bearer_token("Bearer   abc123").unwrap(), "abc123");
        assert_eq!(extract_bearer_token("Bearer\tabc123  ").unwrap(), "abc123");
    }

    #[test]
    fn test_empty_header() {
        assert_eq!(extract_bearer_token(""), Err(BearerError::MissingHeader));
    }

    #[test]
    fn test_other_scheme() {
        assert_eq!(extract_bearer_token("Token abc"), Err(BearerError::MissingScheme));
        assert_eq!(extract_bearer_token("abc"), Err(BearerError::MissingScheme));
    }

    #[test]
    fn test_token_may_follow_scheme_directly() {
        assert_eq!(extract_bearer_token("Bearerabc").unwrap(), "abc");
        assert_eq!(extract_bearer_token("Bearerabc  ").unwrap(), "abc");
    }

    #[test]
    fn test_scheme_is_case_sensitive() {
        assert_eq!(extract_bearer_token("bearer abc"), Err(BearerError::MissingScheme));
    }

    #[test]
    fn test_empty_token() {
        assert_eq!(extract_bearer_token("Bearer "), Err(BearerError::EmptyToken));
        assert_eq!(extract_bearer_token("Bearer"), Err(BearerError::EmptyToken));
    }

    #[test]
    fn test_from_header_map() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), Err(BearerError::MissingHeader));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer    token"));
        assert_eq!(bearer_token(&headers).unwrap(), "token");
    }
}
