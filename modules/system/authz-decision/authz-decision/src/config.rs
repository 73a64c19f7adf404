//! Configuration for the `AuthZ` decision module.

use std::time::Duration;

use anyhow::{Context, bail};
use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

use authz_security::constants::DEFAULT_ADMIN_USER_ID;

use crate::domain::session::DEFAULT_SESSION_HEADER;

/// Configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthzDecisionConfig {
    /// Policy decision point.
    pub pdp: PdpConfig,
    /// Session credential verification.
    pub identity: IdentityConfig,
    /// User-management service (legacy admin gate only).
    pub user_management: UserManagementConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PdpConfig {
    pub base_url: String,
    /// Path of the decision endpoint, relative to `base_url`.
    pub decision_path: String,
    /// Upper bound for a single decision query. Elapsing counts as the PDP
    /// being unavailable.
    pub timeout_ms: u64,
}

impl PdpConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// `decision_path` resolved below `base_url`.
    ///
    /// # Errors
    /// Fails if `base_url` is not a usable base URL.
    pub fn decision_url(&self) -> anyhow::Result<Url> {
        let base = base_url(&self.base_url)?;
        base.join(self.decision_path.trim_start_matches('/'))
            .with_context(|| format!("invalid decision path `{}`", self.decision_path))
    }
}

impl Default for PdpConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:6104".to_owned(),
            decision_path: "/v0/opa/decision".to_owned(),
            timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdentityConfig {
    /// Shared HS256 secret for session tokens.
    pub jwt_secret: SecretString,
    /// Header carrying the session token (`Authorization: Bearer` is the fallback).
    pub session_header: String,
    /// Required `aud` claim, if any.
    pub audience: Option<String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: SecretString::from(String::new()),
            session_header: DEFAULT_SESSION_HEADER.to_owned(),
            audience: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UserManagementConfig {
    pub base_url: String,
    /// User the gateway acts as when calling user management.
    pub acting_user_id: String,
    pub timeout_ms: u64,
}

impl UserManagementConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// # Errors
    /// Fails if `base_url` is not a usable base URL.
    pub fn base(&self) -> anyhow::Result<Url> {
        base_url(&self.base_url)
    }
}

impl Default for UserManagementConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:6104".to_owned(),
            acting_user_id: DEFAULT_ADMIN_USER_ID.to_owned(),
            timeout_ms: 10_000,
        }
    }
}

/// Parse a service base URL. The path always ends in `/`, so relative joins
/// stay below any path prefix.
///
/// # Errors
/// Fails on unparsable URLs, non-HTTP schemes, and URLs carrying a query or
/// fragment.
pub fn base_url(raw: &str) -> anyhow::Result<Url> {
    let mut url = Url::parse(raw).with_context(|| format!("invalid base URL `{raw}`"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("base URL `{raw}` must use http or https");
    }
    if url.query().is_some() || url.fragment().is_some() {
        bail!("base URL `{raw}` must not carry a query or fragment");
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
