use secrecy::SecretString;
use serde_json::{Map, Value};

use crate::constants::IS_ADMIN_CLAIM;

/// `UserIdentity` is the verified caller of a request.
///
/// Built by the identity resolver from the session credential, shared read-only
/// by every gate that runs for the request and dropped with it.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct UserIdentity {
    /// Opaque user identifier (never empty).
    id: String,
    /// Every other claim attached to the credential, plus any fields merged in
    /// from the user-management record.
    #[serde(default)]
    claims: Map<String, Value>,
    /// Original session credential, kept for forwarding to the PDP.
    /// Never serialized/persisted.
    #[serde(skip)]
    credential: Option<SecretString>,
}

impl UserIdentity {
    /// Create a builder for the identity with the given user id.
    #[must_use]
    pub fn builder(id: impl Into<String>) -> UserIdentityBuilder {
        UserIdentityBuilder {
            id: id.into(),
            claims: Map::new(),
            credential: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn claims(&self) -> &Map<String, Value> {
        &self.claims
    }

    #[must_use]
    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    /// Legacy admin flag. Only a literal `true` counts.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.claims
            .get(IS_ADMIN_CLAIM)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Get the original session credential (for PDP forwarding).
    #[must_use]
    pub fn credential(&self) -> Option<&SecretString> {
        self.credential.as_ref()
    }

    /// Overlay `fields` on top of the existing claims. The id and the
    /// credential are left untouched.
    #[must_use]
    pub fn with_merged_claims(mut self, fields: Map<String, Value>) -> Self {
        for (key, value) in fields {
            if key == "id" {
                continue;
            }
            self.claims.insert(key, value);
        }
        self
    }
}

pub struct UserIdentityBuilder {
    id: String,
    claims: Map<String, Value>,
    credential: Option<SecretString>,
}

impl UserIdentityBuilder {
    #[must_use]
    pub fn claim(mut self, name: impl Into<String>, value: Value) -> Self {
        self.claims.insert(name.into(), value);
        self
    }

    #[must_use]
    pub fn claims(mut self, claims: Map<String, Value>) -> Self {
        self.claims.extend(claims);
        self
    }

    #[must_use]
    pub fn is_admin(self, is_admin: bool) -> Self {
        self.claim(IS_ADMIN_CLAIM, Value::Bool(is_admin))
    }

    #[must_use]
    pub fn credential(mut self, token: impl Into<SecretString>) -> Self {
        self.credential = Some(token.into());
        self
    }

    #[must_use]
    pub fn build(self) -> UserIdentity {
        UserIdentity {
            id: self.id,
            claims: self.claims,
            credential: self.credential,
        }
    }
}
