//! Domain models for the `AuthZ` decision module.

use std::collections::BTreeSet;

use secrecy::SecretString;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::residual::ResidualRules;

/// A decision request: which operation, with what context, and which
/// variables the PDP may leave unresolved.
///
/// Serializes to the PDP query body `{operationUri, input, unknowns}`.
/// The credential override is never serialized.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRequestConfig {
    operation_uri: String,
    input: Map<String, Value>,
    /// Empty means a fully resolved boolean is demanded.
    unknowns: BTreeSet<String>,
    #[serde(skip)]
    credential: Option<SecretString>,
}

impl DecisionRequestConfig {
    #[must_use]
    pub fn new(operation_uri: impl Into<String>) -> Self {
        Self {
            operation_uri: operation_uri.into(),
            input: Map::new(),
            unknowns: BTreeSet::new(),
            credential: None,
        }
    }

    /// Replace the whole input document.
    #[must_use]
    pub fn with_input(mut self, input: Map<String, Value>) -> Self {
        self.input = input;
        self
    }

    /// Set a single top-level input key.
    #[must_use]
    pub fn with_input_value(mut self, key: impl Into<String>, value: Value) -> Self {
        self.input.insert(key.into(), value);
        self
    }

    #[must_use]
    pub fn with_unknowns<I, S>(mut self, unknowns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unknowns = unknowns.into_iter().map(Into::into).collect();
        self
    }

    /// Drop all unknowns, forcing an unconditional decision.
    #[must_use]
    pub fn without_unknowns(mut self) -> Self {
        self.unknowns.clear();
        self
    }

    /// Evaluate with this credential instead of the request's own.
    #[must_use]
    pub fn with_credential(mut self, token: impl Into<SecretString>) -> Self {
        self.credential = Some(token.into());
        self
    }

    #[must_use]
    pub fn operation_uri(&self) -> &str {
        &self.operation_uri
    }

    #[must_use]
    pub fn input(&self) -> &Map<String, Value> {
        &self.input
    }

    #[must_use]
    pub fn unknowns(&self) -> &BTreeSet<String> {
        &self.unknowns
    }

    #[must_use]
    pub fn credential(&self) -> Option<&SecretString> {
        self.credential.as_ref()
    }

    /// `true` when the PDP is not allowed to answer with residual rules.
    #[must_use]
    pub fn demands_unconditional(&self) -> bool {
        self.unknowns.is_empty()
    }
}

/// The two shapes a decision can take.
///
/// Raw PDP literals are folded into `Literal` once, at the client boundary,
/// with [`crate::is_true_equivalent`].
#[derive(Debug, Clone, PartialEq)]
pub enum DecisionResult {
    /// Fully evaluated: allowed for every record, or for none.
    Literal(bool),
    /// Partially evaluated: allowed only where the rules hold.
    Residual(ResidualRules),
}

/// Canonical PDP decision.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthDecision {
    result: DecisionResult,
}

impl AuthDecision {
    #[must_use]
    pub fn literal(allowed: bool) -> Self {
        Self {
            result: DecisionResult::Literal(allowed),
        }
    }

    #[must_use]
    pub fn residual(rules: ResidualRules) -> Self {
        Self {
            result: DecisionResult::Residual(rules),
        }
    }

    #[must_use]
    pub fn result(&self) -> &DecisionResult {
        &self.result
    }

    #[must_use]
    pub fn has_residual_rules(&self) -> bool {
        matches!(self.result, DecisionResult::Residual(_))
    }

    /// The boolean verdict, or `None` if the decision is conditional.
    ///
    /// This is the only boolean view of a decision; residual rules must be
    /// evaluated per record instead.
    #[must_use]
    pub fn unconditional(&self) -> Option<bool> {
        match self.result {
            DecisionResult::Literal(allowed) => Some(allowed),
            DecisionResult::Residual(_) => None,
        }
    }

    /// `true` iff the decision is unconditional and equals `required`.
    #[must_use]
    pub fn is_unconditionally(&self, required: bool) -> bool {
        self.unconditional() == Some(required)
    }

    #[must_use]
    pub fn residual_rules(&self) -> Option<&ResidualRules> {
        match &self.result {
            DecisionResult::Residual(rules) => Some(rules),
            DecisionResult::Literal(_) => None,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CanonicalDecision<'a> {
    has_residual_rules: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    residual_rules: Option<&'a ResidualRules>,
}

impl Serialize for AuthDecision {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        CanonicalDecision {
            has_residual_rules: self.has_residual_rules(),
            result: self.unconditional(),
            residual_rules: self.residual_rules(),
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use secrecy::ExposeSecret;
    use serde_json::json;

    use super::*;
    use crate::residual::{ResidualExpression, ResidualOperand, ResidualRule};

    fn owner_rules() -> ResidualRules {
        ResidualRules::new(vec![ResidualRule {
            default: false,
            value: json!(true),
            full_name: "data.partial.object.dataset.allow".to_owned(),
            name: "allow".to_owned(),
            expressions: vec![ResidualExpression {
                negated: false,
                operator: Some("=".to_owned()),
                operands: vec![
                    ResidualOperand::reference("input.object.dataset.owner"),
                    ResidualOperand::literal(json!("user-1")),
                ],
            }],
        }])
        .unwrap()
    }

    #[test]
    fn config_serializes_query_body_without_credential() {
        let config = DecisionRequestConfig::new("object/dataset/read")
            .with_input_value("object", json!({ "dataset": { "id": "d1" } }))
            .with_unknowns(["input.object.dataset"])
            .with_credential("secret-token".to_owned());

        let body = serde_json::to_value(&config).unwrap();
        assert_eq!(
            body,
            json!({
                "operationUri": "object/dataset/read",
                "input": { "object": { "dataset": { "id": "d1" } } },
                "unknowns": ["input.object.dataset"],
            })
        );
        assert_eq!(
            config.credential().map(ExposeSecret::expose_secret),
            Some("secret-token")
        );
    }

    #[test]
    fn without_unknowns_demands_unconditional() {
        let config = DecisionRequestConfig::new("object/dataset/read")
            .with_unknowns(["input.object.dataset", "input.object.dataset"]);
        assert_eq!(config.unknowns().len(), 1);
        assert!(!config.demands_unconditional());

        let config = config.without_unknowns();
        assert!(config.demands_unconditional());
    }

    #[test]
    fn literal_decision_is_unconditional() {
        let allow = AuthDecision::literal(true);
        assert!(!allow.has_residual_rules());
        assert_eq!(allow.unconditional(), Some(true));
        assert!(allow.is_unconditionally(true));
        assert!(!allow.is_unconditionally(false));

        let deny = AuthDecision::literal(false);
        assert!(deny.is_unconditionally(false));
        assert!(!deny.is_unconditionally(true));
    }

    #[test]
    fn residual_decision_has_no_boolean_view() {
        let decision = AuthDecision::residual(owner_rules());
        assert!(decision.has_residual_rules());
        assert_eq!(decision.unconditional(), None);
        assert!(!decision.is_unconditionally(true));
        assert!(!decision.is_unconditionally(false));
        assert!(decision.residual_rules().is_some());
    }

    #[test]
    fn decision_serializes_canonical_shape() {
        let literal = serde_json::to_value(AuthDecision::literal(false)).unwrap();
        assert_eq!(literal, json!({ "hasResidualRules": false, "result": false }));

        let residual = serde_json::to_value(AuthDecision::residual(owner_rules())).unwrap();
        assert_eq!(residual["hasResidualRules"], json!(true));
        assert!(residual.get("result").is_none());
        assert_eq!(residual["residualRules"][0]["name"], json!("allow"));
    }
}
