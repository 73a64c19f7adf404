use std::sync::Arc;

use async_trait::async_trait;
use axum::http::request::Parts;

use authz_decision_sdk::{AuthDecisionClient, DecisionError};

use super::config_source::{ConfigAbort, ConfigResolution, DecisionConfigSource};
use super::identity::ensure_request_identity;
use super::{Gate, GateVerdict};
use crate::context::{DecisionContext, DecisionRequestContext, RequestIdentity};
use crate::domain::identity::IdentityResolver;
use crate::domain::session::CredentialExtractor;

pub const DECISION_FAILURE: &str =
    "An error occurred while retrieving auth decision for the request";

/// Result of running the decision pipeline for one request.
#[derive(Debug)]
pub enum DecisionOutcome {
    Decided(DecisionContext),
    Aborted(ConfigAbort),
}

/// Resolves the decision config, queries the PDP and stores the result in
/// [`DecisionContext`]. Any decision, conditional ones included, lets the
/// request through; handlers decide what to do with it.
pub struct DecisionMiddleware {
    client: Arc<dyn AuthDecisionClient>,
    source: DecisionConfigSource,
    identity: Option<Arc<dyn IdentityResolver>>,
    credentials: CredentialExtractor,
    force_unconditional: bool,
}

impl DecisionMiddleware {
    #[must_use]
    pub fn new(client: Arc<dyn AuthDecisionClient>, source: impl Into<DecisionConfigSource>) -> Self {
        Self {
            client,
            source: source.into(),
            identity: None,
            credentials: CredentialExtractor::default(),
            force_unconditional: false,
        }
    }

    /// Resolve the caller before the config producer runs, so producers can
    /// see it through [`DecisionRequestContext::identity`].
    #[must_use]
    pub fn with_identity_resolver(mut self, resolver: Arc<dyn IdentityResolver>) -> Self {
        self.identity = Some(resolver);
        self
    }

    #[must_use]
    pub fn with_credentials(mut self, credentials: CredentialExtractor) -> Self {
        self.credentials = credentials;
        self
    }

    /// Strip unknowns from every resolved config.
    #[must_use]
    pub fn unconditional(mut self) -> Self {
        self.force_unconditional = true;
        self
    }

    /// Run config resolution and the PDP query without touching the
    /// decision context.
    ///
    /// # Errors
    /// Producer errors and PDP client errors, unchanged.
    pub async fn decide(&self, parts: &mut Parts) -> Result<DecisionOutcome, DecisionError> {
        if let Some(resolver) = &self.identity {
            ensure_request_identity(parts, resolver.as_ref());
        }

        let resolution = self
            .source
            .resolve(&DecisionRequestContext::new(parts))
            .await?;
        let mut config = match resolution {
            ConfigResolution::Resolved(config) => config,
            ConfigResolution::Aborted(abort) => {
                tracing::debug!(path = %parts.uri.path(), "decision config producer handled the request");
                return Ok(DecisionOutcome::Aborted(abort));
            }
        };
        if self.force_unconditional {
            config = config.without_unknowns();
        }

        // Explicit override, then the verified identity's token, then whatever
        // the request carries; the PDP decides what an invalid token means.
        let credential = config
            .credential()
            .cloned()
            .or_else(|| {
                parts
                    .extensions
                    .get::<RequestIdentity>()
                    .and_then(RequestIdentity::credential)
                    .cloned()
            })
            .or_else(|| self.credentials.extract(&parts.headers));

        let decision = self
            .client
            .get_auth_decision(&config, credential.as_ref())
            .await?;

        tracing::debug!(
            operation_uri = config.operation_uri(),
            residual = decision.has_residual_rules(),
            "auth decision retrieved"
        );
        Ok(DecisionOutcome::Decided(DecisionContext::new(decision, config)))
    }
}

#[async_trait]
impl Gate for DecisionMiddleware {
    async fn evaluate(&self, parts: &mut Parts) -> GateVerdict {
        match self.decide(parts).await {
            Ok(DecisionOutcome::Decided(ctx)) => {
                parts.extensions.insert(ctx);
                GateVerdict::Pass
            }
            Ok(DecisionOutcome::Aborted(abort)) => GateVerdict::Aborted(abort),
            Err(err) => GateVerdict::failure(DECISION_FAILURE, err),
        }
    }
}
