//! Session credentials: where they are read from and how internal ones are minted.

use axum::http::{HeaderMap, HeaderName, header};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use authz_decision_sdk::DecisionError;

/// Header carrying the session token unless configured otherwise.
pub const DEFAULT_SESSION_HEADER: &str = "X-Session-Token";

/// Reads the ambient session credential of a request.
///
/// The configured session header wins; `Authorization: Bearer` is the fallback.
#[derive(Debug, Clone)]
pub struct CredentialExtractor {
    session_header: HeaderName,
}

impl CredentialExtractor {
    /// # Errors
    /// Returns `InvalidRequest` if `session_header` is not a valid header name.
    pub fn new(session_header: &str) -> Result<Self, DecisionError> {
        let session_header = HeaderName::try_from(session_header).map_err(|e| {
            DecisionError::InvalidRequest(format!("invalid session header '{session_header}': {e}"))
        })?;
        Ok(Self { session_header })
    }

    #[must_use]
    pub fn session_header(&self) -> &HeaderName {
        &self.session_header
    }

    #[must_use]
    pub fn extract(&self, headers: &HeaderMap) -> Option<SecretString> {
        headers
            .get(&self.session_header)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .or_else(|| extract_bearer_token(headers))
            .map(|token| SecretString::from(token.to_owned()))
    }
}

impl Default for CredentialExtractor {
    fn default() -> Self {
        Self {
            session_header: HeaderName::from_static("x-session-token"),
        }
    }
}

/// Extract Bearer token from Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer ").map(str::trim))
        .filter(|s| !s.is_empty())
}

#[derive(Serialize)]
struct SessionClaims<'a> {
    #[serde(rename = "userId")]
    user_id: &'a str,
    iat: u64,
}

/// Mints HS256 session tokens for service-to-service calls made on behalf
/// of a fixed acting user.
pub struct SessionTokenIssuer {
    key: EncodingKey,
}

impl SessionTokenIssuer {
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        Self {
            key: EncodingKey::from_secret(secret.expose_secret().as_bytes()),
        }
    }

    /// # Errors
    /// Returns `Internal` if signing fails.
    pub fn issue(&self, user_id: &str) -> Result<SecretString, DecisionError> {
        let claims = SessionClaims {
            user_id,
            iat: jsonwebtoken::get_current_timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.key)
            .map(SecretString::from)
            .map_err(|e| DecisionError::Internal(format!("failed to sign session token: {e}")))
    }
}
