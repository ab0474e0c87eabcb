use serde::Serialize;
use std::fmt;

use super::provider::{SessionProvider, Subscription};
use super::{IdentityError, Role, Session};

/// Login page the admin area redirects to
pub const LOGIN_PATH: &str = "/admin/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DenyReason {
    /// No session
    Unauthorized,
    /// Signed in, but not an admin
    Permission,
    /// The identity service failed
    Error,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::Unauthorized => "unauthorized",
            DenyReason::Permission => "permission",
            DenyReason::Error => "error",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "lowercase")]
pub enum GateState {
    Loading,
    Authenticated(Role),
    Unauthenticated(DenyReason),
}

impl GateState {
    /// Decide the terminal state from a session lookup
    pub fn resolve(lookup: Result<Option<&Session>, &IdentityError>) -> GateState {
        match lookup {
            Err(e) => {
                tracing::warn!("session lookup failed: {}", e);
                GateState::Unauthenticated(DenyReason::Error)
            }
            Ok(None) => GateState::Unauthenticated(DenyReason::Unauthorized),
            Ok(Some(session)) => match Role::from_user(&session.user) {
                Role::Admin => GateState::Authenticated(Role::Admin),
                Role::Anonymous => GateState::Unauthenticated(DenyReason::Permission),
            },
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, GateState::Authenticated(Role::Admin))
    }

    /// Where the client should go instead of the protected content
    pub fn redirect(&self) -> Option<String> {
        match self {
            GateState::Unauthenticated(reason) => Some(format!("{}?reason={}", LOGIN_PATH, reason)),
            _ => None,
        }
    }
}

/// Guards protected content for one [`SessionProvider`].
///
/// Starts in `Loading`, resolves on [`SessionGate::evaluate`], then follows
/// every auth change the provider pushes.
pub struct SessionGate {
    state: GateState,
    subscription: Subscription,
}

impl SessionGate {
    pub fn new(provider: &SessionProvider) -> Self {
        Self { state: GateState::Loading, subscription: provider.subscribe() }
    }

    pub fn state(&self) -> &GateState {
        &self.state
    }

    /// Ask the identity service for the current session and settle the state
    pub async fn evaluate(&mut self, provider: &SessionProvider) -> &GateState {
        let lookup = provider.get_session().await;
        self.state = GateState::resolve(lookup.as_ref().map(Option::as_ref));
        &self.state
    }

    /// Wait for the next pushed auth change and re-evaluate against it.
    /// Returns `None` once the provider is dropped.
    pub async fn next(&mut self) -> Option<GateState> {
        let change = self.subscription.changed().await?;
        self.state = GateState::resolve(Ok(change.session.as_ref()));
        Some(self.state.clone())
    }

    /// Stop following the provider
    pub fn close(self) -> GateState {
        self.subscription.unsubscribe();
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{IdentityProvider, MemoryIdentity, User};
    use serde_json::{json, Map, Value};
    use std::sync::Arc;

    fn session_with(metadata: Value) -> Session {
        Session {
            access_token: "t".into(),
            refresh_token: None,
            expires_in: None,
            user: User {
                id: "u".into(),
                email: None,
                user_metadata: Map::new(),
                app_metadata: metadata.as_object().cloned().unwrap_or_default(),
            },
        }
    }

    #[test]
    fn no_session_is_unauthorized() {
        let state = GateState::resolve(Ok(None));
        assert_eq!(state, GateState::Unauthenticated(DenyReason::Unauthorized));
        assert_eq!(state.redirect().as_deref(), Some("/admin/login?reason=unauthorized"));
    }

    #[test]
    fn editor_role_is_permission_denied() {
        let session = session_with(json!({"role": "editor"}));
        assert_eq!(
            GateState::resolve(Ok(Some(&session))),
            GateState::Unauthenticated(DenyReason::Permission)
        );
    }

    #[test]
    fn admin_role_is_authenticated() {
        let session = session_with(json!({"role": "admin"}));
        let state = GateState::resolve(Ok(Some(&session)));
        assert!(state.is_authenticated());
        assert_eq!(state.redirect(), None);
    }

    #[test]
    fn identity_errors_are_reason_error() {
        let err = IdentityError::Transport("down".into());
        assert_eq!(GateState::resolve(Err(&err)), GateState::Unauthenticated(DenyReason::Error));
    }

    #[test]
    fn serializes_with_state_tag() {
        let v = serde_json::to_value(GateState::Unauthenticated(DenyReason::Permission)).unwrap();
        assert_eq!(v, json!({"state": "unauthenticated", "detail": "permission"}));
    }

    #[tokio::test]
    async fn gate_follows_provider_events() {
        let identity = MemoryIdentity::new();
        let mut editor = Map::new();
        editor.insert("role".into(), json!("editor"));
        identity.add_user("editor@example.com", "pw123456", editor).await;
        let mut admin = Map::new();
        admin.insert("role".into(), json!("admin"));
        identity.add_user("admin@example.com", "pw123456", admin).await;

        let provider = SessionProvider::new(Arc::new(identity.clone()));
        let mut gate = SessionGate::new(&provider);
        assert_eq!(gate.state(), &GateState::Loading);

        assert_eq!(
            gate.evaluate(&provider).await,
            &GateState::Unauthenticated(DenyReason::Unauthorized)
        );

        provider.sign_in("editor@example.com", "pw123456").await.unwrap();
        assert_eq!(gate.next().await, Some(GateState::Unauthenticated(DenyReason::Permission)));

        provider.sign_in("admin@example.com", "pw123456").await.unwrap();
        assert_eq!(gate.next().await, Some(GateState::Authenticated(Role::Admin)));

        provider.sign_out().await;
        assert_eq!(gate.next().await, Some(GateState::Unauthenticated(DenyReason::Unauthorized)));
    }

    #[tokio::test]
    async fn editor_claiming_admin_in_own_metadata_stays_denied() {
        let identity = MemoryIdentity::new();
        let mut editor = Map::new();
        editor.insert("role".into(), json!("editor"));
        identity.add_user("editor@example.com", "pw123456", editor).await;

        let provider = SessionProvider::new(Arc::new(identity.clone()));
        let session = provider.sign_in("editor@example.com", "pw123456").await.unwrap();
        let mut claim = Map::new();
        claim.insert("role".into(), json!("admin"));
        identity.update_user(&session.access_token, claim).await.unwrap();

        let mut gate = SessionGate::new(&provider);
        assert_eq!(
            gate.evaluate(&provider).await,
            &GateState::Unauthenticated(DenyReason::Permission)
        );
    }

    #[tokio::test]
    async fn offline_identity_service_resolves_to_error() {
        let identity = MemoryIdentity::new();
        identity.create_user("admin@example.com", "pw123456", Role::Admin).await.unwrap();
        let provider = SessionProvider::new(Arc::new(identity.clone()));
        provider.sign_in("admin@example.com", "pw123456").await.unwrap();

        let mut gate = SessionGate::new(&provider);
        identity.set_offline(true);
        assert_eq!(gate.evaluate(&provider).await, &GateState::Unauthenticated(DenyReason::Error));
    }
}
