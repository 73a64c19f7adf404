#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! `AuthZ` Decision SDK
//!
//! This crate provides the public contract of the `authz_decision` module:
//!
//! - [`AuthDecisionClient`] - queries the policy decision point (PDP)
//! - [`UserManagementClient`] - user and role lookups for the legacy admin path
//! - [`DecisionRequestConfig`] - what is asked of the PDP
//! - [`AuthDecision`], [`DecisionResult`] - the canonical answer
//! - [`ResidualRules`] - conditions returned by partial evaluation
//! - [`is_true_equivalent`] - the single truthiness predicate for PDP literals
//! - [`DecisionError`] - error types
//!
//! ## Usage
//!
//! ```ignore
//! use authz_decision_sdk::{AuthDecisionClient, DecisionRequestConfig};
//!
//! let config = DecisionRequestConfig::new("object/dataset/read")
//!     .with_input_value("object", json!({ "dataset": { "id": id } }));
//!
//! let decision = client.get_auth_decision(&config, credential).await?;
//! if decision.unconditional() == Some(true) {
//!     // allowed for every record
//! }
//! ```

pub mod api;
pub mod error;
pub mod models;
pub mod residual;
pub mod truth;
pub mod user_api;

// Re-export main types at crate root
pub use api::AuthDecisionClient;
pub use error::DecisionError;
pub use models::{AuthDecision, DecisionRequestConfig, DecisionResult};
pub use residual::{ResidualExpression, ResidualOperand, ResidualRule, ResidualRules};
pub use truth::is_true_equivalent;
pub use user_api::{RoleRecord, UserManagementClient, UserRecord};
