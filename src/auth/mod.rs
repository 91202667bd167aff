//! Bearer-credential verification against the identity service.
//!
//! Both pipelines run this gate before touching the store: extract the
//! bearer token from the `Authorization` header, then exchange it with the
//! identity service for a verified user id. Token issuance and refresh are
//! handled elsewhere; this module only verifies.

use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

/// Authentication and authorization failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// The `Authorization` header is absent or not a bearer credential.
    #[error("Authorization token required")]
    MissingToken,
    /// The identity service rejected the credential.
    #[error("Invalid or expired session")]
    InvalidSession,
    /// The caller is authenticated but does not own the resource.
    #[error("Forbidden")]
    Forbidden,
}

/// Pulls the bearer token out of the request headers.
///
/// The header must be present and prefixed with `Bearer `; an empty token
/// after trimming counts as malformed.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AuthError> {
    let header = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::MissingToken)?
        .trim();

    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }

    Ok(token.to_string())
}

/// Exchanges a bearer credential for a verified user id.
///
/// Injected into the router state so tests can substitute a fake; the
/// production implementation is [`IdentityClient`].
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify_token(&self, token: &str) -> Result<Uuid, AuthError>;
}

/// HTTP client for the identity service.
#[derive(Debug, Clone)]
pub struct IdentityClient {
    base_url: String,
    service_key: String,
    client: Client,
}

impl IdentityClient {
    pub fn new(base_url: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            service_key: service_key.into(),
            client: Client::new(),
        }
    }
}

/// Shape of the identity service's user record. Only the id is needed here.
#[derive(Debug, Deserialize)]
struct IdentityUser {
    id: Uuid,
}

#[async_trait]
impl TokenVerifier for IdentityClient {
    async fn verify_token(&self, token: &str) -> Result<Uuid, AuthError> {
        let url = format!("{}/user", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .header("apikey", &self.service_key)
            .send()
            .await
            .map_err(|err| {
                tracing::warn!("identity service call failed: {err}");
                AuthError::InvalidSession
            })?;

        if !response.status().is_success() {
            tracing::warn!(
                "identity service rejected credential with status {}",
                response.status()
            );
            return Err(AuthError::InvalidSession);
        }

        let user: IdentityUser = response.json().await.map_err(|err| {
            tracing::warn!("identity service returned an unusable user record: {err}");
            AuthError::InvalidSession
        })?;

        Ok(user.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn missing_header_is_rejected() {
        let headers = HeaderMap::new();
        assert_eq!(
            extract_bearer_token(&headers),
            Err(AuthError::MissingToken)
        );
    }

    #[test]
    fn non_bearer_scheme_is_rejected() {
        let headers = headers_with("Basic dXNlcjpwYXNz");
        assert_eq!(
            extract_bearer_token(&headers),
            Err(AuthError::MissingToken)
        );
    }

    #[test]
    fn empty_token_is_rejected() {
        let headers = headers_with("Bearer   ");
        assert_eq!(
            extract_bearer_token(&headers),
            Err(AuthError::MissingToken)
        );
    }

    #[test]
    fn bearer_token_is_extracted_and_trimmed() {
        let headers = headers_with("Bearer  abc123 ");
        assert_eq!(extract_bearer_token(&headers).unwrap(), "abc123");
    }
}
