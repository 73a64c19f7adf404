//! Request-scoped values written by the gates and read by handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, Method, Uri};
use secrecy::SecretString;

use authz_decision_sdk::{AuthDecision, DecisionRequestConfig};
use authz_security::UserIdentity;

use crate::problem::Problem;

/// The last decision computed for this request and the config that produced it.
///
/// Written by the decision gates only after a successful PDP query; never
/// present when a gate aborted or failed.
#[derive(Debug, Clone)]
pub struct DecisionContext {
    decision: AuthDecision,
    config: DecisionRequestConfig,
}

impl DecisionContext {
    #[must_use]
    pub fn new(decision: AuthDecision, config: DecisionRequestConfig) -> Self {
        Self { decision, config }
    }

    #[must_use]
    pub fn decision(&self) -> &AuthDecision {
        &self.decision
    }

    #[must_use]
    pub fn config(&self) -> &DecisionRequestConfig {
        &self.config
    }

    #[must_use]
    pub fn operation_uri(&self) -> &str {
        self.config.operation_uri()
    }
}

impl<S> FromRequestParts<S> for DecisionContext
where
    S: Send + Sync,
{
    type Rejection = Problem;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(|| {
                Problem::internal("DecisionContext not found - decision gate not configured")
            })
    }
}

/// Identity of the caller as resolved for this request. Anonymous when no
/// valid credential was presented.
#[derive(Debug, Clone, Default)]
pub struct RequestIdentity(Option<UserIdentity>);

impl RequestIdentity {
    #[must_use]
    pub fn anonymous() -> Self {
        Self(None)
    }

    #[must_use]
    pub fn authenticated(user: UserIdentity) -> Self {
        Self(Some(user))
    }

    #[must_use]
    pub fn user(&self) -> Option<&UserIdentity> {
        self.0.as_ref()
    }

    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.0.as_ref().map(UserIdentity::id)
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.0.is_none()
    }

    #[must_use]
    pub fn credential(&self) -> Option<&SecretString> {
        self.0.as_ref().and_then(UserIdentity::credential)
    }
}

impl From<Option<UserIdentity>> for RequestIdentity {
    fn from(user: Option<UserIdentity>) -> Self {
        Self(user)
    }
}

impl<S> FromRequestParts<S> for RequestIdentity
where
    S: Send + Sync,
{
    type Rejection = Problem;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(|| {
                Problem::internal("RequestIdentity not found - identity gate not configured")
            })
    }
}

/// What a config producer may look at: the request head and the identity
/// resolved so far.
pub struct DecisionRequestContext<'a> {
    parts: &'a Parts,
}

impl<'a> DecisionRequestContext<'a> {
    #[must_use]
    pub fn new(parts: &'a Parts) -> Self {
        Self { parts }
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    #[must_use]
    pub fn parts(&self) -> &Parts {
        self.parts
    }

    #[must_use]
    pub fn identity(&self) -> Option<&UserIdentity> {
        self.parts
            .extensions
            .get::<RequestIdentity>()
            .and_then(RequestIdentity::user)
    }
}
