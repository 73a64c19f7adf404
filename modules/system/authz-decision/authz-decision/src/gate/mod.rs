//! Request gates.
//!
//! A gate inspects the request head and either lets the request through or
//! ends it with exactly one response. Gates are mounted with
//! [`gate_middleware`]:
//!
//! ```ignore
//! let router = Router::new()
//!     .route("/v0/datasets/{id}", get(get_dataset))
//!     .route_layer(from_fn_with_state(gates.require_permission("object/dataset/read", input), gate_middleware));
//! ```

mod config_source;
mod decision;
mod identity;
mod legacy_admin;
mod permission;
#[cfg(test)]
mod test_support;
mod unconditional;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::extract::{Request, State};
use axum::http::request::Parts;
use axum::middleware::{Next, from_fn_with_state};
use axum::response::{IntoResponse, Response};

use authz_decision_sdk::DecisionError;

use crate::problem::Problem;

pub use config_source::{
    ConfigAbort, ConfigResolution, DecisionConfigProducer, DecisionConfigSource,
};
pub use decision::{DECISION_FAILURE, DecisionMiddleware, DecisionOutcome};
pub use identity::{ANONYMOUS_REJECTED, IdentityGate, RequireUserIdGate};
#[allow(deprecated)]
pub use legacy_admin::LegacyAdminGate;
pub use permission::{InputProducerFn, PermissionGate, PermissionInput};
pub use unconditional::UnconditionalDecisionGate;

/// Outcome of a gate for one request.
#[derive(Debug)]
pub enum GateVerdict {
    /// Continue with the next pipeline stage.
    Pass,
    /// Deliberate 401/403.
    Deny(DecisionError),
    /// Infrastructure failure; reported as 500 prefixed with `context`.
    Error {
        context: &'static str,
        error: DecisionError,
    },
    /// The config producer already handled the request.
    Aborted(ConfigAbort),
}

impl GateVerdict {
    /// `Deny` for deliberate rejections, `Error` for everything else.
    #[must_use]
    pub fn failure(context: &'static str, error: DecisionError) -> Self {
        if error.is_rejection() {
            Self::Deny(error)
        } else {
            Self::Error { context, error }
        }
    }
}

#[async_trait]
pub trait Gate: Send + Sync {
    async fn evaluate(&self, parts: &mut Parts) -> GateVerdict;
}

pub type SharedGate = Arc<dyn Gate>;

/// Runs a gate in front of the inner service.
///
/// Cognitive complexity is inflated by tracing macro expansion.
#[allow(clippy::cognitive_complexity)]
pub async fn gate_middleware(
    State(gate): State<SharedGate>,
    req: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = req.into_parts();
    match gate.evaluate(&mut parts).await {
        GateVerdict::Pass | GateVerdict::Aborted(ConfigAbort::Continue) => {
            next.run(Request::from_parts(parts, body)).await
        }
        GateVerdict::Aborted(ConfigAbort::Respond(response)) => response,
        GateVerdict::Deny(err) => {
            tracing::debug!(path = %parts.uri.path(), "request rejected: {err}");
            Problem::from_decision_error(&err, "")
                .with_instance(parts.uri.path())
                .into_response()
        }
        GateVerdict::Error { context, error } => {
            tracing::error!(path = %parts.uri.path(), "{context}: {error}");
            Problem::from_decision_error(&error, context)
                .with_instance(parts.uri.path())
                .into_response()
        }
    }
}

/// Mount gates on every route of a router.
pub trait GateRouterExt {
    #[must_use]
    fn guarded_by(self, gate: SharedGate) -> Self;
}

impl<S> GateRouterExt for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn guarded_by(self, gate: SharedGate) -> Self {
        self.route_layer(from_fn_with_state(gate, gate_middleware))
    }
}
