//! PDP response wire format and its conversion to the canonical decision.
//!
//! This is the only place that looks at raw PDP result shapes.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use authz_decision_sdk::{
    AuthDecision, DecisionError, ResidualRule, ResidualRules, is_true_equivalent,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionResponseWire {
    has_residual_rules: Option<bool>,
    /// `Some(Value::Null)` for an explicit `null`, `None` when absent.
    #[serde(default, deserialize_with = "present")]
    result: Option<Value>,
    #[serde(default)]
    residual_rules: Option<Vec<ResidualRule>>,
    #[serde(default)]
    warns: Vec<Value>,
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl DecisionResponseWire {
    /// Parse a response body.
    ///
    /// # Errors
    /// `MalformedResponse` if the body is not JSON or not a decision.
    pub fn parse(body: &[u8]) -> Result<AuthDecision, DecisionError> {
        let wire: Self = serde_json::from_slice(body)
            .map_err(|e| DecisionError::MalformedResponse(format!("invalid decision body: {e}")))?;
        wire.into_decision()
    }

    /// # Errors
    /// `MalformedResponse` if the fields contradict each other.
    pub fn into_decision(self) -> Result<AuthDecision, DecisionError> {
        for warn in &self.warns {
            tracing::warn!(warning = %warn, "PDP returned a warning");
        }

        let Some(has_residual_rules) = self.has_residual_rules else {
            return Err(DecisionError::MalformedResponse(
                "missing `hasResidualRules`".to_owned(),
            ));
        };

        if has_residual_rules {
            let rules = self.residual_rules.and_then(ResidualRules::new).ok_or_else(|| {
                DecisionError::MalformedResponse(
                    "`hasResidualRules` is true but no residual rules were returned".to_owned(),
                )
            })?;
            Ok(AuthDecision::residual(rules))
        } else {
            let result = self.result.ok_or_else(|| {
                DecisionError::MalformedResponse(
                    "`hasResidualRules` is false but `result` is missing".to_owned(),
                )
            })?;
            Ok(AuthDecision::literal(is_true_equivalent(&result)))
        }
    }
}
