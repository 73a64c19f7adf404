#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! `AuthZ` Decision module.
//!
//! Turns a request into an access decision by querying an external policy
//! decision point, and enforces it with axum gates:
//!
//! - [`DecisionMiddleware`] (`withAuthDecision`) - stores the decision, conditional or not
//! - [`UnconditionalDecisionGate`] - requires a fully resolved decision
//! - [`PermissionGate`] (`requirePermission`) - single-object permission check
//! - [`IdentityGate`], [`RequireUserIdGate`] - caller identity
//! - [`LegacyAdminGate`] (`mustBeAdmin`) - deprecated role check
//!
//! [`DecisionGates`] builds all of them from [`AuthzDecisionConfig`].

pub mod config;
pub mod context;
pub mod domain;
pub mod gate;
pub mod module;
pub mod problem;

pub use config::AuthzDecisionConfig;
pub use context::{DecisionContext, DecisionRequestContext, RequestIdentity};
pub use domain::{
    CredentialExtractor, HttpAuthDecisionClient, HttpUserManagementClient, IdentityResolver,
    JwtIdentityResolver, SessionTokenIssuer,
};
#[allow(deprecated)]
pub use gate::LegacyAdminGate;
pub use gate::{
    ConfigAbort, ConfigResolution, DecisionConfigProducer, DecisionConfigSource,
    DecisionMiddleware, Gate, GateRouterExt, GateVerdict, IdentityGate, PermissionGate,
    PermissionInput, RequireUserIdGate, SharedGate, UnconditionalDecisionGate, gate_middleware,
};
pub use module::DecisionGates;
pub use problem::Problem;
