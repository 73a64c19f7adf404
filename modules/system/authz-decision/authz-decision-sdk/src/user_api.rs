//! User-management lookups used by the legacy admin gate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DecisionError;

/// A user as returned by the user-management service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    /// Legacy admin flag; `None` when the record does not carry one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
    /// Remaining profile fields (display name, email, ...).
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl UserRecord {
    /// Flatten the record into identity claims. `isAdmin` is only present
    /// if the record carried it, so merging never clears a token's flag.
    #[must_use]
    pub fn into_claims(self) -> Map<String, Value> {
        let mut claims = self.attributes;
        if let Some(is_admin) = self.is_admin {
            claims.insert("isAdmin".to_owned(), Value::Bool(is_admin));
        }
        claims
    }
}

/// A role assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// Client for the user-management service.
#[async_trait]
pub trait UserManagementClient: Send + Sync {
    /// Fetch a user by id. `Ok(None)` if the user does not exist.
    ///
    /// # Errors
    ///
    /// `ServiceUnavailable` if the service fails, `MalformedResponse` if the
    /// record cannot be parsed.
    async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>, DecisionError>;

    /// Fetch the roles assigned to a user.
    ///
    /// # Errors
    ///
    /// `ServiceUnavailable` if the service fails, `MalformedResponse` if the
    /// role list cannot be parsed.
    async fn get_user_roles(&self, user_id: &str) -> Result<Vec<RoleRecord>, DecisionError>;
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn user_record_keeps_extra_fields_as_claims() {
        let user: UserRecord = serde_json::from_value(json!({
            "id": "user-1",
            "isAdmin": true,
            "displayName": "Ada",
            "email": "ada@example.com"
        }))
        .unwrap();

        assert_eq!(user.is_admin, Some(true));
        let claims = user.into_claims();
        assert_eq!(claims.get("isAdmin"), Some(&json!(true)));
        assert_eq!(claims.get("displayName"), Some(&json!("Ada")));
        assert!(!claims.contains_key("id"));
    }

    #[test]
    fn missing_admin_flag_is_left_out_of_claims() {
        let user: UserRecord = serde_json::from_value(json!({ "id": "user-1" })).unwrap();
        assert_eq!(user.is_admin, None);
        assert!(!user.into_claims().contains_key("isAdmin"));
    }

    #[test]
    fn explicit_false_admin_flag_is_kept() {
        let user: UserRecord =
            serde_json::from_value(json!({ "id": "user-1", "isAdmin": false })).unwrap();
        assert_eq!(user.into_claims().get("isAdmin"), Some(&json!(false)));
    }

    #[test]
    fn role_record_parses_minimal_shape() {
        let roles: Vec<RoleRecord> = serde_json::from_value(json!([
            { "id": "00000000-0000-0003-0000-000000000000", "name": "Admin Users" },
            { "id": "r2", "permissionIds": [] }
        ]))
        .unwrap();

        assert_eq!(roles.len(), 2);
        assert_eq!(roles[0].name.as_deref(), Some("Admin Users"));
        assert!(roles[1].attributes.contains_key("permissionIds"));
    }

    struct StaticUsers;

    #[async_trait]
    impl UserManagementClient for StaticUsers {
        async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>, DecisionError> {
            Ok((user_id == "user-1").then(|| UserRecord {
                id: user_id.to_owned(),
                is_admin: None,
                attributes: Map::new(),
            }))
        }

        async fn get_user_roles(&self, _user_id: &str) -> Result<Vec<RoleRecord>, DecisionError> {
            Err(DecisionError::ServiceUnavailable("down".to_owned()))
        }
    }

    #[tokio::test]
    async fn client_trait_is_object_safe() {
        let client: Box<dyn UserManagementClient> = Box::new(StaticUsers);
        assert!(client.get_user("user-1").await.unwrap().is_some());
        assert!(client.get_user("user-2").await.unwrap().is_none());
        assert!(client.get_user_roles("user-1").await.is_err());
    }
}
