use std::sync::Arc;

use async_trait::async_trait;
use axum::http::request::Parts;

use authz_decision_sdk::{AuthDecisionClient, DecisionError};

use super::config_source::DecisionConfigSource;
use super::decision::{DECISION_FAILURE, DecisionMiddleware, DecisionOutcome};
use super::{Gate, GateVerdict};
use crate::domain::identity::IdentityResolver;
use crate::domain::session::CredentialExtractor;

/// Lets a request through only if the PDP answers with a fully resolved
/// decision equal to `required_outcome`.
///
/// Unknowns are stripped from the config, and a residual answer is always a
/// rejection: "allowed on some records" never authorizes an all-records action.
pub struct UnconditionalDecisionGate {
    inner: DecisionMiddleware,
    required_outcome: bool,
}

impl UnconditionalDecisionGate {
    #[must_use]
    pub fn new(
        client: Arc<dyn AuthDecisionClient>,
        source: impl Into<DecisionConfigSource>,
        required_outcome: bool,
    ) -> Self {
        Self {
            inner: DecisionMiddleware::new(client, source).unconditional(),
            required_outcome,
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
impl Gate for UnconditionalDecisionGate {
    async fn evaluate(&self, parts: &mut Parts) -> GateVerdict {
        match self.inner.decide(parts).await {
            Ok(DecisionOutcome::Decided(ctx)) => {
                let verdict = if ctx.decision().is_unconditionally(self.required_outcome) {
                    GateVerdict::Pass
                } else {
                    GateVerdict::Deny(DecisionError::denied(ctx.operation_uri()))
                };
                parts.extensions.insert(ctx);
                verdict
            }
            Ok(DecisionOutcome::Aborted(abort)) => GateVerdict::Aborted(abort),
            Err(err) => GateVerdict::failure(DECISION_FAILURE, err),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use authz_decision_sdk::{AuthDecision, DecisionRequestConfig};

    use super::*;
    use crate::context::DecisionContext;
    use crate::gate::test_support::{ScriptedClient, owner_rules, parts};

    fn build_gate(decision: AuthDecision, required: bool) -> (UnconditionalDecisionGate, Arc<ScriptedClient>) {
        let client = ScriptedClient::returning(decision);
        let config = DecisionRequestConfig::new("object/record/delete")
            .with_unknowns(["input.record"]);
        (
            UnconditionalDecisionGate::new(client.clone(), config, required),
            client,
        )
    }

    #[tokio::test]
    async fn literal_outcomes_against_required_outcome() {
        let cases = [
            (true, true, true),
            (true, false, false),
            (false, true, false),
            (false, false, true),
        ];
        for (allowed, required, passes) in cases {
            let (gate, _) = build_gate(AuthDecision::literal(allowed), required);
            let verdict = gate.evaluate(&mut parts("/records", None)).await;
            assert_eq!(
                matches!(verdict, GateVerdict::Pass),
                passes,
                "allowed={allowed} required={required}"
            );
        }
    }

    #[tokio::test]
    async fn residual_decision_is_always_denied() {
        for required in [true, false] {
            let (gate, _) = build_gate(AuthDecision::residual(owner_rules()), required);
            let mut parts = parts("/records", None);

            let verdict = gate.evaluate(&mut parts).await;
            let GateVerdict::Deny(err) = verdict else {
                panic!("residual decision must be denied");
            };
            assert_eq!(err, DecisionError::denied("object/record/delete"));
            // The decision is still recorded for downstream consumers.
            assert!(
                parts
                    .extensions
                    .get::<DecisionContext>()
                    .unwrap()
                    .decision()
                    .has_residual_rules()
            );
        }
    }

    #[tokio::test]
    async fn unknowns_are_stripped_before_querying() {
        let (gate, client) = build_gate(AuthDecision::literal(true), true);
        gate.evaluate(&mut parts("/records", None)).await;

        let calls = client.calls();
        assert!(calls[0].0.demands_unconditional());
    }

    #[tokio::test]
    async fn pdp_failure_is_an_error_not_a_denial() {
        let client = ScriptedClient::failing(DecisionError::MalformedResponse("bad".to_owned()));
        let gate = UnconditionalDecisionGate::new(
            client,
            DecisionRequestConfig::new("object/record/delete"),
            true,
        );
        assert!(matches!(
            gate.evaluate(&mut parts("/records", None)).await,
            GateVerdict::Error { error: DecisionError::MalformedResponse(_), .. }
        ));
    }
}
