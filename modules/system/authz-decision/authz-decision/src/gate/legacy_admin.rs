#![allow(deprecated)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::request::Parts;

use authz_decision_sdk::{DecisionError, UserManagementClient};
use authz_security::UserIdentity;
use authz_security::constants::ADMIN_USERS_ROLE_ID;

use super::{Gate, GateVerdict};
use crate::context::RequestIdentity;
use crate::domain::identity::IdentityResolver;

const LEGACY_ADMIN_FAILURE: &str = "An error occurred while checking admin access";

/// Admin-only access without the policy engine: the legacy `isAdmin` flag,
/// or an assignment of the admin role.
///
/// Kept for routes that have not moved to policy-based permissions yet.
#[deprecated(
    note = "legacy admin check; guard routes with `PermissionGate` or `UnconditionalDecisionGate` instead"
)]
pub struct LegacyAdminGate {
    identity: Arc<dyn IdentityResolver>,
    users: Arc<dyn UserManagementClient>,
}

impl LegacyAdminGate {
    #[must_use]
    pub fn new(identity: Arc<dyn IdentityResolver>, users: Arc<dyn UserManagementClient>) -> Self {
        Self { identity, users }
    }

    /// Overlay the user-management record on the token identity. Lookup
    /// failures leave the token identity as is.
    async fn with_user_record(&self, user: UserIdentity) -> UserIdentity {
        match self.users.get_user(user.id()).await {
            Ok(Some(record)) => user.with_merged_claims(record.into_claims()),
            Ok(None) => user,
            Err(err) => {
                tracing::debug!(user_id = user.id(), "user lookup failed, using token claims: {err}");
                user
            }
        }
    }

    async fn check(&self, user: &UserIdentity, url: &str) -> Result<(), DecisionError> {
        if user.is_admin() {
            return Ok(());
        }
        let roles = self.users.get_user_roles(user.id()).await?;
        if roles.iter().any(|role| role.id == ADMIN_USERS_ROLE_ID) {
            Ok(())
        } else {
            Err(DecisionError::Forbidden(format!(
                "Only admin users are authorised to access this API: {url}"
            )))
        }
    }
}

#[async_trait]
impl Gate for LegacyAdminGate {
    #[allow(clippy::cognitive_complexity)]
    async fn evaluate(&self, parts: &mut Parts) -> GateVerdict {
        let token_identity = parts
            .extensions
            .get::<RequestIdentity>()
            .and_then(RequestIdentity::user)
            .cloned()
            .or_else(|| self.identity.resolve(&parts.headers));

        let Some(user) = token_identity else {
            tracing::warn!(path = %parts.uri.path(), "rejected by legacy admin gate: no identity");
            return GateVerdict::Deny(DecisionError::Unauthenticated("Not authorized".to_owned()));
        };

        let user = self.with_user_record(user).await;
        let url = parts
            .uri
            .path_and_query()
            .map_or_else(|| parts.uri.path().to_owned(), ToString::to_string);
        let result = self.check(&user, &url).await;
        parts
            .extensions
            .insert(RequestIdentity::authenticated(user));

        match result {
            Ok(()) => GateVerdict::Pass,
            Err(err) => {
                if err.is_rejection() {
                    tracing::warn!("rejected by legacy admin gate: {err}");
                }
                GateVerdict::failure(LEGACY_ADMIN_FAILURE, err)
            }
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use authz_decision_sdk::UserRecord;
    use serde_json::Map;

    use super::*;
    use crate::gate::test_support::{MockUsers, StaticIdentity, parts, role, user};

    fn identities() -> Arc<StaticIdentity> {
        Arc::new(
            StaticIdentity::default()
                .with_user("plain", user("user-1", "plain"))
                .with_user(
                    "admin-claim",
                    UserIdentity::builder("user-2").is_admin(true).build(),
                ),
        )
    }

    fn record(is_admin: Option<bool>) -> UserRecord {
        UserRecord {
            id: "user-1".to_owned(),
            is_admin,
            attributes: Map::new(),
        }
    }

    #[tokio::test]
    async fn admin_claim_passes_without_role_lookup() {
        let users = MockUsers::new(Ok(None), Ok(Vec::new()));
        let gate = LegacyAdminGate::new(identities(), users.clone());

        assert!(matches!(
            gate.evaluate(&mut parts("/admin", Some("admin-claim"))).await,
            GateVerdict::Pass
        ));
        assert_eq!(users.role_lookups(), 0);
    }

    #[tokio::test]
    async fn record_without_admin_flag_keeps_token_admin_claim() {
        let record: UserRecord = serde_json::from_value(serde_json::json!({ "id": "user-2" })).unwrap();
        let users = MockUsers::new(Ok(Some(record)), Ok(Vec::new()));
        let gate = LegacyAdminGate::new(identities(), users.clone());
        let mut parts = parts("/admin", Some("admin-claim"));

        assert!(matches!(gate.evaluate(&mut parts).await, GateVerdict::Pass));
        assert_eq!(users.role_lookups(), 0);
        let identity = parts.extensions.get::<RequestIdentity>().unwrap();
        assert!(identity.user().unwrap().is_admin());
    }

    #[tokio::test]
    async fn admin_flag_from_user_record_passes() {
        let users = MockUsers::new(Ok(Some(record(Some(true)))), Ok(Vec::new()));
        let gate = LegacyAdminGate::new(identities(), users.clone());
        let mut parts = parts("/admin", Some("plain"));

        assert!(matches!(gate.evaluate(&mut parts).await, GateVerdict::Pass));
        assert_eq!(users.role_lookups(), 0);
        let identity = parts.extensions.get::<RequestIdentity>().unwrap();
        assert!(identity.user().unwrap().is_admin());
    }

    #[tokio::test]
    async fn admin_role_passes() {
        let users = MockUsers::new(
            Ok(Some(record(Some(false)))),
            Ok(vec![role("r-1"), role(ADMIN_USERS_ROLE_ID)]),
        );
        let gate = LegacyAdminGate::new(identities(), users.clone());

        assert!(matches!(
            gate.evaluate(&mut parts("/admin", Some("plain"))).await,
            GateVerdict::Pass
        ));
        assert_eq!(users.role_lookups(), 1);
    }

    #[tokio::test]
    async fn user_lookup_failure_is_ignored() {
        let users = MockUsers::new(
            Err(DecisionError::ServiceUnavailable("down".to_owned())),
            Ok(vec![role(ADMIN_USERS_ROLE_ID)]),
        );
        let gate = LegacyAdminGate::new(identities(), users);

        assert!(matches!(
            gate.evaluate(&mut parts("/admin", Some("plain"))).await,
            GateVerdict::Pass
        ));
    }

    #[tokio::test]
    async fn missing_or_other_roles_are_forbidden() {
        for roles in [Vec::new(), vec![role("r-1")]] {
            let users = MockUsers::new(Ok(None), Ok(roles));
            let gate = LegacyAdminGate::new(identities(), users);

            let verdict = gate.evaluate(&mut parts("/admin/status?x=1", Some("plain"))).await;
            assert!(matches!(
                verdict,
                GateVerdict::Deny(DecisionError::Forbidden(ref msg))
                    if msg == "Only admin users are authorised to access this API: /admin/status?x=1"
            ));
        }
    }

    #[tokio::test]
    async fn anonymous_is_unauthenticated() {
        let users = MockUsers::new(Ok(None), Ok(Vec::new()));
        let gate = LegacyAdminGate::new(identities(), users.clone());

        assert!(matches!(
            gate.evaluate(&mut parts("/admin", None)).await,
            GateVerdict::Deny(DecisionError::Unauthenticated(ref msg)) if msg == "Not authorized"
        ));
        assert_eq!(users.role_lookups(), 0);
    }

    #[tokio::test]
    async fn role_lookup_failure_is_an_error() {
        let users = MockUsers::new(
            Ok(None),
            Err(DecisionError::ServiceUnavailable("down".to_owned())),
        );
        let gate = LegacyAdminGate::new(identities(), users);

        assert!(matches!(
            gate.evaluate(&mut parts("/admin", Some("plain"))).await,
            GateVerdict::Error { context: LEGACY_ADMIN_FAILURE, .. }
        ));
    }
}
