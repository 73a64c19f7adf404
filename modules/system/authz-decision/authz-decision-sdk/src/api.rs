//! Public API trait for the policy decision point.

use async_trait::async_trait;
use secrecy::SecretString;

use crate::error::DecisionError;
use crate::models::{AuthDecision, DecisionRequestConfig};

/// Queries the external policy decision point.
///
/// ```ignore
/// let decision = client.get_auth_decision(&config, identity.credential()).await?;
/// ```
#[async_trait]
pub trait AuthDecisionClient: Send + Sync {
    /// Ask the PDP for a decision on `config`.
    ///
    /// `credential` is the session credential to evaluate with; `None` asks
    /// for an anonymous decision. Implementations issue exactly one request
    /// and do not retry.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` if the config cannot be sent (e.g. empty operation URI)
    /// - `ServiceUnavailable` on transport failure, timeout or failure status
    /// - `MalformedResponse` if the answer is not a canonical decision
    async fn get_auth_decision(
        &self,
        config: &DecisionRequestConfig,
        credential: Option<&SecretString>,
    ) -> Result<AuthDecision, DecisionError>;
}
