//! Identity resolution from the session credential.

use axum::http::HeaderMap;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};

use authz_security::UserIdentity;
use authz_security::constants::USER_ID_CLAIM;

use super::session::CredentialExtractor;

/// Resolves the caller of a request.
///
/// `None` means anonymous: no credential, an invalid one, or one that fails
/// verification. Resolution never fails loudly and has no side effects.
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, headers: &HeaderMap) -> Option<UserIdentity>;
}

/// Verifies HS256 session tokens signed with a shared secret.
pub struct JwtIdentityResolver {
    key: DecodingKey,
    validation: Validation,
    credentials: CredentialExtractor,
}

impl JwtIdentityResolver {
    #[must_use]
    pub fn new(secret: &SecretString, credentials: CredentialExtractor) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Session tokens are not required to expire; `exp` is still checked when present.
        validation.required_spec_claims.clear();
        validation.validate_aud = false;
        Self {
            key: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            validation,
            credentials,
        }
    }

    /// Only accept tokens issued for `audience`.
    #[must_use]
    pub fn with_audience(mut self, audience: &str) -> Self {
        self.validation.set_audience(&[audience]);
        self.validation.validate_aud = true;
        self
    }

    #[must_use]
    pub fn credentials(&self) -> &CredentialExtractor {
        &self.credentials
    }

    /// Verify a raw token.
    #[must_use]
    pub fn resolve_token(&self, token: &SecretString) -> Option<UserIdentity> {
        let claims = match jsonwebtoken::decode::<Map<String, Value>>(
            token.expose_secret(),
            &self.key,
            &self.validation,
        ) {
            Ok(data) => data.claims,
            Err(e) => {
                tracing::debug!("session token rejected: {e}");
                return None;
            }
        };

        let Some(user_id) = subject_of(&claims) else {
            tracing::debug!("session token carries no user id");
            return None;
        };

        Some(
            UserIdentity::builder(user_id)
                .claims(claims)
                .credential(token.clone())
                .build(),
        )
    }
}

impl IdentityResolver for JwtIdentityResolver {
    fn resolve(&self, headers: &HeaderMap) -> Option<UserIdentity> {
        let token = self.credentials.extract(headers)?;
        self.resolve_token(&token)
    }
}

fn subject_of(claims: &Map<String, Value>) -> Option<String> {
    [USER_ID_CLAIM, "sub"]
        .iter()
        .filter_map(|name| claims.get(*name).and_then(Value::as_str))
        .map(str::trim)
        .find(|id| !id.is_empty())
        .map(str::to_owned)
}
