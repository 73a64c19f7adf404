use std::sync::Arc;

use async_trait::async_trait;
use axum::http::request::Parts;

use authz_decision_sdk::DecisionError;

use super::{Gate, GateVerdict};
use crate::context::RequestIdentity;
use crate::domain::identity::IdentityResolver;

pub const ANONYMOUS_REJECTED: &str =
    "Anonymous users access are not permitted: userId is required.";

/// Resolve the caller once per request. A previously stored identity is reused.
pub fn ensure_request_identity(
    parts: &mut Parts,
    resolver: &dyn IdentityResolver,
) -> RequestIdentity {
    if let Some(existing) = parts.extensions.get::<RequestIdentity>() {
        return existing.clone();
    }
    let identity = RequestIdentity::from(resolver.resolve(&parts.headers));
    parts.extensions.insert(identity.clone());
    identity
}

/// Stores the caller's [`RequestIdentity`], anonymous or not. Always passes.
pub struct IdentityGate {
    resolver: Arc<dyn IdentityResolver>,
}

impl IdentityGate {
    #[must_use]
    pub fn new(resolver: Arc<dyn IdentityResolver>) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl Gate for IdentityGate {
    async fn evaluate(&self, parts: &mut Parts) -> GateVerdict {
        ensure_request_identity(parts, self.resolver.as_ref());
        GateVerdict::Pass
    }
}

/// Like [`IdentityGate`], but rejects anonymous callers with 401.
pub struct RequireUserIdGate {
    resolver: Arc<dyn IdentityResolver>,
}

impl RequireUserIdGate {
    #[must_use]
    pub fn new(resolver: Arc<dyn IdentityResolver>) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl Gate for RequireUserIdGate {
    async fn evaluate(&self, parts: &mut Parts) -> GateVerdict {
        if ensure_request_identity(parts, self.resolver.as_ref()).is_anonymous() {
            GateVerdict::Deny(DecisionError::Unauthenticated(
                ANONYMOUS_REJECTED.to_owned(),
            ))
        } else {
            GateVerdict::Pass
        }
    }
}
