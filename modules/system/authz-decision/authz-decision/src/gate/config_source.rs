use std::sync::Arc;

use async_trait::async_trait;
use axum::response::Response;

use authz_decision_sdk::{DecisionError, DecisionRequestConfig};

use crate::context::DecisionRequestContext;

/// How a config producer ended decision processing early.
#[derive(Debug)]
pub enum ConfigAbort {
    /// Send this response instead of continuing.
    Respond(Response),
    /// Skip the decision and continue the pipeline.
    Continue,
}

#[derive(Debug)]
pub enum ConfigResolution {
    Resolved(DecisionRequestConfig),
    /// No decision is made and nothing is written to the decision context.
    Aborted(ConfigAbort),
}

impl From<DecisionRequestConfig> for ConfigResolution {
    fn from(config: DecisionRequestConfig) -> Self {
        Self::Resolved(config)
    }
}

/// Builds the decision request per request.
#[async_trait]
pub trait DecisionConfigProducer: Send + Sync {
    /// # Errors
    /// Any error ends the request: deliberate rejections keep their status,
    /// everything else becomes a 500.
    async fn produce(
        &self,
        ctx: &DecisionRequestContext<'_>,
    ) -> Result<ConfigResolution, DecisionError>;
}

struct FnProducer<F>(F);

#[async_trait]
impl<F> DecisionConfigProducer for FnProducer<F>
where
    F: Fn(&DecisionRequestContext<'_>) -> Result<ConfigResolution, DecisionError> + Send + Sync,
{
    async fn produce(
        &self,
        ctx: &DecisionRequestContext<'_>,
    ) -> Result<ConfigResolution, DecisionError> {
        (self.0)(ctx)
    }
}

/// Either a fixed decision request or a per-request producer.
#[derive(Clone)]
pub enum DecisionConfigSource {
    Static(DecisionRequestConfig),
    Producer(Arc<dyn DecisionConfigProducer>),
}

impl DecisionConfigSource {
    #[must_use]
    pub fn producer(producer: impl DecisionConfigProducer + 'static) -> Self {
        Self::Producer(Arc::new(producer))
    }

    /// Wrap a synchronous producer function.
    #[must_use]
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&DecisionRequestContext<'_>) -> Result<ConfigResolution, DecisionError>
            + Send
            + Sync
            + 'static,
    {
        Self::producer(FnProducer(f))
    }

    /// # Errors
    /// Propagates producer errors unchanged.
    pub async fn resolve(
        &self,
        ctx: &DecisionRequestContext<'_>,
    ) -> Result<ConfigResolution, DecisionError> {
        match self {
            Self::Static(config) => Ok(ConfigResolution::Resolved(config.clone())),
            Self::Producer(producer) => producer.produce(ctx).await,
        }
    }
}

impl From<DecisionRequestConfig> for DecisionConfigSource {
    fn from(config: DecisionRequestConfig) -> Self {
        Self::Static(config)
    }
}
