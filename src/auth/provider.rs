use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::{debug, info};

use super::{IdentityError, IdentityProvider, Session, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthEvent {
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
}

/// One pushed change: what happened and the session afterwards
#[derive(Debug, Clone, PartialEq)]
pub struct AuthChange {
    pub event: AuthEvent,
    pub session: Option<Session>,
}

/// Owns the current session for one client of the identity service.
///
/// Constructed explicitly and handed to whoever needs it; it is the only
/// writer of the session state. Consumers observe changes through
/// [`SessionProvider::subscribe`].
pub struct SessionProvider {
    identity: Arc<dyn IdentityProvider>,
    current: RwLock<Option<Session>>,
    events: watch::Sender<AuthChange>,
}

impl SessionProvider {
    pub fn new(identity: Arc<dyn IdentityProvider>) -> Self {
        let (events, _) = watch::channel(AuthChange { event: AuthEvent::InitialSession, session: None });
        Self { identity, current: RwLock::new(None), events }
    }

    /// Start from a previously issued access token (e.g. one saved by a CLI)
    pub async fn restore(&self, access_token: &str) -> Result<Option<Session>, IdentityError> {
        let session = self.identity.get_session(access_token).await?;
        *self.current.write().await = session.clone();
        self.publish(AuthEvent::InitialSession, session.clone());
        Ok(session)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, IdentityError> {
        let session = self.identity.sign_in_with_password(email, password).await?;
        info!("signed in as {}", session.user.email.as_deref().unwrap_or(&session.user.id));
        *self.current.write().await = Some(session.clone());
        self.publish(AuthEvent::SignedIn, Some(session.clone()));
        Ok(session)
    }

    /// Trade the held refresh token for a new session
    pub async fn refresh(&self) -> Result<Session, IdentityError> {
        let refresh_token = self
            .current
            .read()
            .await
            .as_ref()
            .and_then(|s| s.refresh_token.clone())
            .ok_or_else(|| IdentityError::Rejected { status: 401, message: "no refresh token held".to_string() })?;

        let session = self.identity.refresh_session(&refresh_token).await?;
        *self.current.write().await = Some(session.clone());
        self.publish(AuthEvent::TokenRefreshed, Some(session.clone()));
        Ok(session)
    }

    pub async fn sign_out(&self) {
        *self.current.write().await = None;
        self.publish(AuthEvent::SignedOut, None);
    }

    /// Re-validate the held token with the identity service.
    ///
    /// A token the service no longer recognises signs the provider out.
    pub async fn get_session(&self) -> Result<Option<Session>, IdentityError> {
        let held = self.current.read().await.clone();
        let Some(held) = held else {
            return Ok(None);
        };

        match self.identity.get_session(&held.access_token).await? {
            Some(mut fresh) => {
                // the lookup does not return refresh data; keep what sign-in gave us
                fresh.refresh_token = held.refresh_token.clone();
                fresh.expires_in = held.expires_in;
                if fresh.user != held.user {
                    *self.current.write().await = Some(fresh.clone());
                    self.publish(AuthEvent::UserUpdated, Some(fresh.clone()));
                }
                Ok(Some(fresh))
            }
            None => {
                debug!("held session is no longer valid");
                self.sign_out().await;
                Ok(None)
            }
        }
    }

    pub async fn update_user(&self, metadata: Map<String, Value>) -> Result<User, IdentityError> {
        let token = self
            .current
            .read()
            .await
            .as_ref()
            .map(|s| s.access_token.clone())
            .ok_or_else(|| IdentityError::Rejected { status: 401, message: "not signed in".to_string() })?;

        let user = self.identity.update_user(&token, metadata).await?;
        let mut current = self.current.write().await;
        if let Some(session) = current.as_mut() {
            session.user = user.clone();
            self.publish(AuthEvent::UserUpdated, Some(session.clone()));
        }
        Ok(user)
    }

    /// Current session without asking the identity service
    pub async fn current(&self) -> Option<Session> {
        self.current.read().await.clone()
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription { rx: self.events.subscribe() }
    }

    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }

    fn publish(&self, event: AuthEvent, session: Option<Session>) {
        debug!("auth event {:?}", event);
        self.events.send_replace(AuthChange { event, session });
    }
}

/// Live view of a provider's auth changes; dropping it unsubscribes
pub struct Subscription {
    rx: watch::Receiver<AuthChange>,
}

impl Subscription {
    /// Wait for the next change; `None` once the provider is gone
    pub async fn changed(&mut self) -> Option<AuthChange> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Latest change without waiting
    pub fn latest(&self) -> AuthChange {
        self.rx.borrow().clone()
    }

    pub fn unsubscribe(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{MemoryIdentity, Role};

    async fn provider_with_admin() -> (SessionProvider, MemoryIdentity) {
        let identity = MemoryIdentity::new();
        identity.create_user("admin@example.com", "hunter22", Role::Admin).await.unwrap();
        (SessionProvider::new(Arc::new(identity.clone())), identity)
    }

    #[tokio::test]
    async fn sign_in_and_out_push_events() {
        let (provider, _) = provider_with_admin().await;
        let mut sub = provider.subscribe();

        provider.sign_in("admin@example.com", "hunter22").await.unwrap();
        let change = sub.changed().await.unwrap();
        assert_eq!(change.event, AuthEvent::SignedIn);
        assert!(change.session.is_some());

        provider.sign_out().await;
        let change = sub.changed().await.unwrap();
        assert_eq!(change.event, AuthEvent::SignedOut);
        assert!(change.session.is_none());
    }

    #[tokio::test]
    async fn refresh_publishes_token_refreshed() {
        let (provider, _) = provider_with_admin().await;
        let first = provider.sign_in("admin@example.com", "hunter22").await.unwrap();
        let mut sub = provider.subscribe();

        let renewed = provider.refresh().await.unwrap();
        assert_ne!(renewed.access_token, first.access_token);
        let change = sub.changed().await.unwrap();
        assert_eq!(change.event, AuthEvent::TokenRefreshed);
        assert_eq!(sub.latest().session.map(|s| s.access_token), Some(renewed.access_token));
    }

    #[tokio::test]
    async fn restore_adopts_an_existing_token() {
        let (provider, identity) = provider_with_admin().await;
        let issued = identity.sign_in_with_password("admin@example.com", "hunter22").await.unwrap();

        let restored = provider.restore(&issued.access_token).await.unwrap();
        assert!(restored.is_some());
        assert_eq!(provider.subscribe().latest().event, AuthEvent::InitialSession);
        assert!(provider.restore("token-unknown").await.unwrap().is_none());
        assert!(provider.current().await.is_none());
    }

    #[tokio::test]
    async fn unsubscribe_releases_the_receiver() {
        let (provider, _) = provider_with_admin().await;
        let sub = provider.subscribe();
        assert_eq!(provider.subscriber_count(), 1);
        sub.unsubscribe();
        assert_eq!(provider.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn expired_token_signs_out() {
        let (provider, identity) = provider_with_admin().await;
        let session = provider.sign_in("admin@example.com", "hunter22").await.unwrap();
        identity.expire(&session.access_token).await;

        assert!(provider.get_session().await.unwrap().is_none());
        assert!(provider.current().await.is_none());
    }

    #[tokio::test]
    async fn update_user_refreshes_held_session() {
        let (provider, _) = provider_with_admin().await;
        provider.sign_in("admin@example.com", "hunter22").await.unwrap();

        let mut metadata = Map::new();
        metadata.insert("display_name".into(), Value::String("Ops".into()));
        provider.update_user(metadata).await.unwrap();

        let held = provider.current().await.unwrap();
        assert_eq!(held.user.user_metadata["display_name"], Value::String("Ops".into()));
        assert_eq!(Role::from_user(&held.user), Role::Admin);
    }
}
