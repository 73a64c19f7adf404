//! Residual rules returned by partial evaluation.
//!
//! The rules are opaque to the gates. Only a record-filtering stage that
//! knows the concrete record attributes may evaluate them.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One rule left over after partial evaluation. The rule yields `value`
/// when all of its `expressions` hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResidualRule {
    /// Whether this is the policy's default rule.
    #[serde(default)]
    pub default: bool,
    #[serde(default)]
    pub value: Value,
    /// Fully qualified rule name (e.g. `data.partial.object.dataset.allow`).
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub name: String,
    /// Conjunction of expressions.
    #[serde(default)]
    pub expressions: Vec<ResidualExpression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResidualExpression {
    #[serde(default)]
    pub negated: bool,
    /// Comparison operator; `None` for a bare term.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    #[serde(default)]
    pub operands: Vec<ResidualOperand>,
}

/// Either a reference to an unknown (`input.object.dataset.owner`) or a
/// concrete value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResidualOperand {
    #[serde(default)]
    pub is_ref: bool,
    pub value: Value,
}

impl ResidualOperand {
    #[must_use]
    pub fn reference(path: impl Into<String>) -> Self {
        Self {
            is_ref: true,
            value: Value::String(path.into()),
        }
    }

    #[must_use]
    pub fn literal(value: Value) -> Self {
        Self {
            is_ref: false,
            value,
        }
    }

    /// The referenced path, if this operand is a reference.
    #[must_use]
    pub fn as_ref_path(&self) -> Option<&str> {
        if self.is_ref {
            self.value.as_str()
        } else {
            None
        }
    }
}

/// Non-empty set of residual rules (disjunction).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResidualRules(Vec<ResidualRule>);

impl ResidualRules {
    /// Returns `None` for an empty rule list: a residual decision with no
    /// rules is not a valid decision.
    #[must_use]
    pub fn new(rules: Vec<ResidualRule>) -> Option<Self> {
        if rules.is_empty() {
            None
        } else {
            Some(Self(rules))
        }
    }

    #[must_use]
    pub fn rules(&self) -> &[ResidualRule] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All unknown references the rules depend on, deduplicated.
    #[must_use]
    pub fn referenced_refs(&self) -> BTreeSet<&str> {
        self.0
            .iter()
            .flat_map(|rule| rule.expressions.iter())
            .flat_map(|expr| expr.operands.iter())
            .filter_map(ResidualOperand::as_ref_path)
            .collect()
    }
}
