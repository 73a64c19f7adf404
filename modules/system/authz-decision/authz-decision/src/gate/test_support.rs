//! Mocks shared by the gate unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue, Request};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;

use authz_decision_sdk::{
    AuthDecision, AuthDecisionClient, DecisionError, DecisionRequestConfig, ResidualExpression,
    ResidualOperand, ResidualRule, ResidualRules, RoleRecord, UserManagementClient, UserRecord,
};
use authz_security::UserIdentity;

use crate::domain::identity::IdentityResolver;

/// Answers every query with the same result and records what it was asked.
pub struct ScriptedClient {
    response: Result<AuthDecision, DecisionError>,
    calls: Mutex<Vec<(DecisionRequestConfig, Option<String>)>>,
}

impl ScriptedClient {
    pub fn returning(decision: AuthDecision) -> Arc<Self> {
        Arc::new(Self {
            response: Ok(decision),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(err: DecisionError) -> Arc<Self> {
        Arc::new(Self {
            response: Err(err),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<(DecisionRequestConfig, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuthDecisionClient for ScriptedClient {
    async fn get_auth_decision(
        &self,
        config: &DecisionRequestConfig,
        credential: Option<&SecretString>,
    ) -> Result<AuthDecision, DecisionError> {
        self.calls.lock().unwrap().push((
            config.clone(),
            credential.map(|c| c.expose_secret().to_owned()),
        ));
        self.response.clone()
    }
}

/// Maps `x-session-token` values to identities.
#[derive(Default)]
pub struct StaticIdentity {
    users: HashMap<String, UserIdentity>,
}

impl StaticIdentity {
    pub fn with_user(mut self, token: &str, user: UserIdentity) -> Self {
        self.users.insert(token.to_owned(), user);
        self
    }
}

impl IdentityResolver for StaticIdentity {
    fn resolve(&self, headers: &HeaderMap) -> Option<UserIdentity> {
        let token = headers.get("x-session-token")?.to_str().ok()?;
        self.users.get(token).cloned()
    }
}

pub struct MockUsers {
    pub user: Result<Option<UserRecord>, DecisionError>,
    pub roles: Result<Vec<RoleRecord>, DecisionError>,
    pub role_lookups: Mutex<usize>,
}

impl MockUsers {
    pub fn new(
        user: Result<Option<UserRecord>, DecisionError>,
        roles: Result<Vec<RoleRecord>, DecisionError>,
    ) -> Arc<Self> {
        Arc::new(Self {
            user,
            roles,
            role_lookups: Mutex::new(0),
        })
    }

    pub fn role_lookups(&self) -> usize {
        *self.role_lookups.lock().unwrap()
    }
}

#[async_trait]
impl UserManagementClient for MockUsers {
    async fn get_user(&self, _user_id: &str) -> Result<Option<UserRecord>, DecisionError> {
        self.user.clone()
    }

    async fn get_user_roles(&self, _user_id: &str) -> Result<Vec<RoleRecord>, DecisionError> {
        *self.role_lookups.lock().unwrap() += 1;
        self.roles.clone()
    }
}

pub fn user(id: &str, token: &str) -> UserIdentity {
    UserIdentity::builder(id).credential(token.to_owned()).build()
}

pub fn role(id: &str) -> RoleRecord {
    RoleRecord {
        id: id.to_owned(),
        name: None,
        attributes: serde_json::Map::new(),
    }
}

pub fn parts(path: &str, token: Option<&str>) -> Parts {
    let mut builder = Request::builder().uri(path);
    if let Some(token) = token {
        builder = builder.header("x-session-token", HeaderValue::from_str(token).unwrap());
    }
    builder.body(()).unwrap().into_parts().0
}

pub fn owner_rules() -> ResidualRules {
    ResidualRules::new(vec![ResidualRule {
        default: false,
        value: json!(true),
        full_name: "data.partial.object.record.allow".to_owned(),
        name: "allow".to_owned(),
        expressions: vec![ResidualExpression {
            negated: false,
            operator: Some("=".to_owned()),
            operands: vec![
                ResidualOperand::reference("input.record.owner"),
                ResidualOperand::literal(json!("user-1")),
            ],
        }],
    }])
    .unwrap()
}
