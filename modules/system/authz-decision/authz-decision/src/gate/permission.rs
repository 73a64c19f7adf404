use std::sync::Arc;

use async_trait::async_trait;
use axum::http::request::Parts;
use serde_json::{Map, Value};

use authz_decision_sdk::{AuthDecisionClient, DecisionError, DecisionRequestConfig};

use super::config_source::{ConfigResolution, DecisionConfigProducer, DecisionConfigSource};
use super::unconditional::UnconditionalDecisionGate;
use super::{Gate, GateVerdict};
use crate::context::DecisionRequestContext;
use crate::domain::identity::IdentityResolver;
use crate::domain::session::CredentialExtractor;

pub type InputProducerFn = dyn Fn(&DecisionRequestContext<'_>) -> Result<Map<String, Value>, DecisionError>
    + Send
    + Sync;

/// Input document of a permission check.
#[derive(Clone, Default)]
pub enum PermissionInput {
    #[default]
    None,
    Static(Map<String, Value>),
    Producer(Arc<InputProducerFn>),
}

impl PermissionInput {
    #[must_use]
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&DecisionRequestContext<'_>) -> Result<Map<String, Value>, DecisionError>
            + Send
            + Sync
            + 'static,
    {
        Self::Producer(Arc::new(f))
    }
}

impl From<Map<String, Value>> for PermissionInput {
    fn from(input: Map<String, Value>) -> Self {
        Self::Static(input)
    }
}

struct PermissionConfigProducer {
    operation_uri: String,
    input: PermissionInput,
}

#[async_trait]
impl DecisionConfigProducer for PermissionConfigProducer {
    async fn produce(
        &self,
        ctx: &DecisionRequestContext<'_>,
    ) -> Result<ConfigResolution, DecisionError> {
        let config = DecisionRequestConfig::new(self.operation_uri.clone());
        let config = match &self.input {
            PermissionInput::None => config,
            PermissionInput::Static(input) => config.with_input(input.clone()),
            PermissionInput::Producer(produce) => {
                let input = (**produce)(ctx).map_err(|err| {
                    if err.is_rejection() {
                        err
                    } else {
                        DecisionError::InvalidRequest(format!(
                            "failed to build input for `{}`: {err}",
                            self.operation_uri
                        ))
                    }
                })?;
                config.with_input(input)
            }
        };
        Ok(ConfigResolution::Resolved(config))
    }
}

/// Single-object permission check: `operation_uri` must be granted
/// unconditionally for the given input.
pub struct PermissionGate {
    inner: UnconditionalDecisionGate,
}

impl PermissionGate {
    #[must_use]
    pub fn new(
        client: Arc<dyn AuthDecisionClient>,
        operation_uri: impl Into<String>,
        input: PermissionInput,
    ) -> Self {
        let source = DecisionConfigSource::producer(PermissionConfigProducer {
            operation_uri: operation_uri.into(),
            input,
        });
        Self {
            inner: UnconditionalDecisionGate::new(client, source, true),
        }
    }

    #[must_use]
    pub fn with_identity_resolver(mut self, resolver: Arc<dyn IdentityResolver>) -> Self {
        self.inner = self.inner.with_identity_resolver(resolver);
        self
    }

    #[must_use]
    pub fn with_credentials(mut self, credentials: CredentialExtractor) -> Self {
        self.inner = self.inner.with_credentials(credentials);
        self
    }
}

#[async_trait]
impl Gate for PermissionGate {
    async fn evaluate(&self, parts: &mut Parts) -> GateVerdict {
        self.inner.evaluate(parts).await
    }
}
