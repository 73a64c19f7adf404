//! Wiring: builds the clients from config and hands out gates.

use std::sync::Arc;

use anyhow::{Context, bail};
use secrecy::ExposeSecret;

use authz_decision_sdk::{AuthDecisionClient, UserManagementClient};

use crate::config::AuthzDecisionConfig;
use crate::domain::{
    CredentialExtractor, HttpAuthDecisionClient, HttpUserManagementClient, IdentityResolver,
    JwtIdentityResolver, SessionTokenIssuer,
};
#[allow(deprecated)]
use crate::gate::LegacyAdminGate;
use crate::gate::{
    DecisionConfigSource, DecisionMiddleware, IdentityGate, PermissionGate, PermissionInput,
    RequireUserIdGate, SharedGate, UnconditionalDecisionGate,
};

/// Factory for every gate, sharing one PDP client, one identity resolver and
/// one user-management client.
#[derive(Clone)]
pub struct DecisionGates {
    client: Arc<dyn AuthDecisionClient>,
    identity: Arc<dyn IdentityResolver>,
    users: Arc<dyn UserManagementClient>,
    credentials: CredentialExtractor,
}

impl DecisionGates {
    #[must_use]
    pub fn new(
        client: Arc<dyn AuthDecisionClient>,
        identity: Arc<dyn IdentityResolver>,
        users: Arc<dyn UserManagementClient>,
    ) -> Self {
        Self {
            client,
            identity,
            users,
            credentials: CredentialExtractor::default(),
        }
    }

    #[must_use]
    pub fn with_credentials(mut self, credentials: CredentialExtractor) -> Self {
        self.credentials = credentials;
        self
    }

    /// Build the HTTP clients and the JWT resolver from config.
    ///
    /// # Errors
    /// Fails if the JWT secret is empty, the session header is invalid or a
    /// service base URL is unusable.
    pub fn from_config(cfg: &AuthzDecisionConfig) -> anyhow::Result<Self> {
        if cfg.identity.jwt_secret.expose_secret().is_empty() {
            bail!("identity.jwt_secret must be set");
        }
        let credentials = CredentialExtractor::new(&cfg.identity.session_header)
            .context("invalid identity.session_header")?;

        let mut resolver = JwtIdentityResolver::new(&cfg.identity.jwt_secret, credentials.clone());
        if let Some(audience) = &cfg.identity.audience {
            resolver = resolver.with_audience(audience);
        }

        let client = HttpAuthDecisionClient::new(&cfg.pdp, credentials.session_header().clone())
            .context("invalid pdp.base_url")?;
        let users = HttpUserManagementClient::new(
            &cfg.user_management,
            SessionTokenIssuer::new(&cfg.identity.jwt_secret),
            credentials.session_header().clone(),
        )
        .context("invalid user_management.base_url")?;

        tracing::info!(
            pdp = %client.decision_url(),
            timeout_ms = cfg.pdp.timeout_ms,
            session_header = %credentials.session_header(),
            "authz decision gates configured"
        );

        Ok(Self::new(Arc::new(client), Arc::new(resolver), Arc::new(users))
            .with_credentials(credentials))
    }

    #[must_use]
    pub fn client(&self) -> Arc<dyn AuthDecisionClient> {
        Arc::clone(&self.client)
    }

    /// `withAuthDecision`: store the decision, conditional or not, and continue.
    #[must_use]
    pub fn with_auth_decision(&self, source: impl Into<DecisionConfigSource>) -> SharedGate {
        Arc::new(
            DecisionMiddleware::new(self.client(), source)
                .with_identity_resolver(Arc::clone(&self.identity))
                .with_credentials(self.credentials.clone()),
        )
    }

    /// `requireUnconditionalAuthDecision`.
    #[must_use]
    pub fn require_unconditional_auth_decision(
        &self,
        source: impl Into<DecisionConfigSource>,
        required_outcome: bool,
    ) -> SharedGate {
        Arc::new(
            UnconditionalDecisionGate::new(self.client(), source, required_outcome)
                .with_identity_resolver(Arc::clone(&self.identity))
                .with_credentials(self.credentials.clone()),
        )
    }

    /// `requirePermission`.
    #[must_use]
    pub fn require_permission(
        &self,
        operation_uri: impl Into<String>,
        input: PermissionInput,
    ) -> SharedGate {
        Arc::new(
            PermissionGate::new(self.client(), operation_uri, input)
                .with_identity_resolver(Arc::clone(&self.identity))
                .with_credentials(self.credentials.clone()),
        )
    }

    /// `getUserId`.
    #[must_use]
    pub fn get_user_id(&self) -> SharedGate {
        Arc::new(IdentityGate::new(Arc::clone(&self.identity)))
    }

    /// `requireUserId`.
    #[must_use]
    pub fn require_user_id(&self) -> SharedGate {
        Arc::new(RequireUserIdGate::new(Arc::clone(&self.identity)))
    }

    /// `mustBeAdmin`.
    #[deprecated(note = "legacy admin check; use `require_permission` instead")]
    #[must_use]
    #[allow(deprecated)]
    pub fn must_be_admin(&self) -> SharedGate {
        Arc::new(LegacyAdminGate::new(
            Arc::clone(&self.identity),
            Arc::clone(&self.users),
        ))
    }
}
