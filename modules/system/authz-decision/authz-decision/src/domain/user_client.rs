//! HTTP client for the user-management service.

use std::time::Duration;

use async_trait::async_trait;
use axum::http::HeaderName;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use url::Url;

use authz_decision_sdk::{DecisionError, RoleRecord, UserManagementClient, UserRecord};

use super::session::SessionTokenIssuer;
use crate::config::UserManagementConfig;

/// Calls user management as a fixed acting user (by default the built-in
/// administrator), authenticating with a freshly minted session token.
pub struct HttpUserManagementClient {
    http: reqwest::Client,
    base_url: Url,
    acting_user_id: String,
    issuer: SessionTokenIssuer,
    session_header: HeaderName,
    timeout: Duration,
}

impl HttpUserManagementClient {
    /// # Errors
    /// Fails if the configured base URL is unusable.
    pub fn new(
        cfg: &UserManagementConfig,
        issuer: SessionTokenIssuer,
        session_header: HeaderName,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: cfg.base()?,
            acting_user_id: cfg.acting_user_id.clone(),
            issuer,
            session_header,
            timeout: cfg.timeout(),
        })
    }

    fn user_url(&self, user_id: &str, suffix: &str) -> Result<Url, DecisionError> {
        self.base_url
            .join(&format!("v0/auth/users/{}{suffix}", urlencoding::encode(user_id)))
            .map_err(|e| DecisionError::InvalidRequest(format!("invalid user URL: {e}")))
    }

    /// GET `url`; `Ok(None)` on 404.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>, DecisionError> {
        let token = self.issuer.issue(&self.acting_user_id)?;
        let send = async {
            let response = self
                .http
                .get(url)
                .header(self.session_header.clone(), token.expose_secret())
                .send()
                .await
                .map_err(|e| {
                    DecisionError::ServiceUnavailable(format!("user management request failed: {e}"))
                })?;
            let status = response.status();
            let body = response.bytes().await.map_err(|e| {
                DecisionError::ServiceUnavailable(format!(
                    "failed to read user management response: {e}"
                ))
            })?;
            Ok::<_, DecisionError>((status, body))
        };

        let (status, body) = tokio::time::timeout(self.timeout, send).await.map_err(|_| {
            DecisionError::ServiceUnavailable(format!(
                "user management request timed out after {}ms",
                self.timeout.as_millis()
            ))
        })??;

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(DecisionError::ServiceUnavailable(format!(
                "user management responded with {status}"
            )));
        }

        serde_json::from_slice(&body).map(Some).map_err(|e| {
            DecisionError::MalformedResponse(format!("invalid user management response: {e}"))
        })
    }
}

#[async_trait]
impl UserManagementClient for HttpUserManagementClient {
    async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>, DecisionError> {
        self.get_json(self.user_url(user_id, "")?).await
    }

    async fn get_user_roles(&self, user_id: &str) -> Result<Vec<RoleRecord>, DecisionError> {
        Ok(self
            .get_json(self.user_url(user_id, "/roles")?)
            .await?
            .unwrap_or_default())
    }
}
