//! HTTP client for the policy decision point.

use std::time::Duration;

use async_trait::async_trait;
use axum::http::HeaderName;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use authz_decision_sdk::{AuthDecision, AuthDecisionClient, DecisionError, DecisionRequestConfig};

use super::wire::DecisionResponseWire;
use crate::config::PdpConfig;

/// Queries the PDP decision endpoint over HTTP.
///
/// One POST per decision, bounded by the configured timeout, no retries.
pub struct HttpAuthDecisionClient {
    http: reqwest::Client,
    decision_url: Url,
    session_header: HeaderName,
    timeout: Duration,
}

impl HttpAuthDecisionClient {
    /// # Errors
    /// Fails if the configured base URL is unusable.
    pub fn new(cfg: &PdpConfig, session_header: HeaderName) -> anyhow::Result<Self> {
        Self::with_client(reqwest::Client::new(), cfg, session_header)
    }

    /// Share an existing connection pool.
    ///
    /// # Errors
    /// Fails if the configured base URL is unusable.
    pub fn with_client(
        http: reqwest::Client,
        cfg: &PdpConfig,
        session_header: HeaderName,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            http,
            decision_url: cfg.decision_url()?,
            session_header,
            timeout: cfg.timeout(),
        })
    }

    #[must_use]
    pub fn decision_url(&self) -> &Url {
        &self.decision_url
    }

    async fn send(
        &self,
        config: &DecisionRequestConfig,
        credential: Option<&SecretString>,
    ) -> Result<(reqwest::StatusCode, bytes::Bytes), DecisionError> {
        let mut request = self.http.post(self.decision_url.clone()).json(config);
        if let Some(token) = credential {
            request = request.header(self.session_header.clone(), token.expose_secret());
        }

        let response = request
            .send()
            .await
            .map_err(|e| DecisionError::ServiceUnavailable(format!("decision request failed: {e}")))?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            DecisionError::ServiceUnavailable(format!("failed to read decision response: {e}"))
        })?;
        Ok((status, body))
    }
}

#[async_trait]
impl AuthDecisionClient for HttpAuthDecisionClient {
    async fn get_auth_decision(
        &self,
        config: &DecisionRequestConfig,
        credential: Option<&SecretString>,
    ) -> Result<AuthDecision, DecisionError> {
        if config.operation_uri().trim().is_empty() {
            return Err(DecisionError::InvalidRequest(
                "operation URI must not be empty".to_owned(),
            ));
        }

        tracing::debug!(
            operation_uri = config.operation_uri(),
            unknowns = config.unknowns().len(),
            anonymous = credential.is_none(),
            "querying PDP"
        );

        let (status, body) = tokio::time::timeout(self.timeout, self.send(config, credential))
            .await
            .map_err(|_| {
                DecisionError::ServiceUnavailable(format!(
                    "decision request timed out after {}ms",
                    self.timeout.as_millis()
                ))
            })??;

        if !status.is_success() {
            let snippet: String = String::from_utf8_lossy(&body).chars().take(200).collect();
            return Err(DecisionError::ServiceUnavailable(format!(
                "PDP responded with {status}: {snippet}"
            )));
        }

        DecisionResponseWire::parse(&body)
    }
}
