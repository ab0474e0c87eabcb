use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{IdentityError, IdentityProvider, Role, Session, User};

#[derive(Debug, Clone)]
struct Account {
    password: String,
    user: User,
}

/// In-process identity service for tests and local runs
#[derive(Clone, Default)]
pub struct MemoryIdentity {
    accounts: Arc<RwLock<HashMap<String, Account>>>,
    sessions: Arc<RwLock<HashMap<String, String>>>,
    refresh_tokens: Arc<RwLock<HashMap<String, String>>>,
    next_id: Arc<AtomicU64>,
    offline: Arc<AtomicBool>,
}

impl MemoryIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user with raw server-side metadata (lets tests use roles
    /// like "editor")
    pub async fn add_user(&self, email: &str, password: &str, app_metadata: Map<String, Value>) -> User {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let user = User {
            id: format!("user-{}", n),
            email: Some(email.to_string()),
            user_metadata: Map::new(),
            app_metadata,
        };
        self.accounts.write().await.insert(
            email.to_ascii_lowercase(),
            Account { password: password.to_string(), user: user.clone() },
        );
        user
    }

    /// Make every call fail as if the service were unreachable
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Forget an access token, as if it expired
    pub async fn expire(&self, access_token: &str) {
        self.sessions.write().await.remove(access_token);
    }

    fn check_online(&self) -> Result<(), IdentityError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(IdentityError::Transport("identity service offline".to_string()));
        }
        Ok(())
    }

    /// New access/refresh pair for an account key (lowercased email)
    async fn issue(&self, key: String, user: User) -> Session {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let access_token = format!("token-{}", n);
        let refresh_token = format!("refresh-{}", n);
        self.sessions.write().await.insert(access_token.clone(), key.clone());
        self.refresh_tokens.write().await.insert(refresh_token.clone(), key);

        Session {
            access_token,
            refresh_token: Some(refresh_token),
            expires_in: Some(3600),
            user,
        }
    }

    async fn user_for_token(&self, access_token: &str) -> Option<User> {
        let email = self.sessions.read().await.get(access_token).cloned()?;
        self.accounts.read().await.get(&email).map(|a| a.user.clone())
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentity {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, IdentityError> {
        self.check_online()?;
        let key = email.to_ascii_lowercase();
        let user = match self.accounts.read().await.get(&key) {
            Some(account) if account.password == password => account.user.clone(),
            _ => return Err(IdentityError::InvalidCredentials("Invalid login credentials".to_string())),
        };

        Ok(self.issue(key, user).await)
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, IdentityError> {
        self.check_online()?;
        // refresh tokens are single use
        let key = self
            .refresh_tokens
            .write()
            .await
            .remove(refresh_token)
            .ok_or_else(|| IdentityError::InvalidCredentials("Invalid Refresh Token".to_string()))?;
        let user = self
            .accounts
            .read()
            .await
            .get(&key)
            .map(|a| a.user.clone())
            .ok_or_else(|| IdentityError::Rejected { status: 404, message: "user not found".to_string() })?;
        Ok(self.issue(key, user).await)
    }

    async fn get_session(&self, access_token: &str) -> Result<Option<Session>, IdentityError> {
        self.check_online()?;
        Ok(self.user_for_token(access_token).await.map(|user| Session {
            access_token: access_token.to_string(),
            refresh_token: None,
            expires_in: None,
            user,
        }))
    }

    async fn create_user(&self, email: &str, password: &str, role: Role) -> Result<User, IdentityError> {
        self.check_online()?;
        if self.accounts.read().await.contains_key(&email.to_ascii_lowercase()) {
            return Err(IdentityError::Rejected {
                status: 422,
                message: "A user with this email address has already been registered".to_string(),
            });
        }
        let mut metadata = Map::new();
        metadata.insert("role".to_string(), Value::String(role.as_str().to_string()));
        Ok(self.add_user(email, password, metadata).await)
    }

    async fn update_user(&self, access_token: &str, metadata: Map<String, Value>) -> Result<User, IdentityError> {
        self.check_online()?;
        let email = self
            .sessions
            .read()
            .await
            .get(access_token)
            .cloned()
            .ok_or_else(|| IdentityError::Rejected { status: 401, message: "invalid JWT".to_string() })?;

        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(&email)
            .ok_or_else(|| IdentityError::Rejected { status: 404, message: "user not found".to_string() })?;
        for (k, v) in metadata {
            account.user.user_metadata.insert(k, v);
        }
        Ok(account.user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sign_in_then_lookup_session() {
        let identity = MemoryIdentity::new();
        identity.create_user("admin@example.com", "hunter22", Role::Admin).await.unwrap();

        let session = identity.sign_in_with_password("Admin@Example.com", "hunter22").await.unwrap();
        let found = identity.get_session(&session.access_token).await.unwrap().unwrap();
        assert_eq!(Role::from_user(&found.user), Role::Admin);

        identity.expire(&session.access_token).await;
        assert!(identity.get_session(&session.access_token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn refresh_tokens_are_single_use() {
        let identity = MemoryIdentity::new();
        identity.create_user("admin@example.com", "hunter22", Role::Admin).await.unwrap();
        let session = identity.sign_in_with_password("admin@example.com", "hunter22").await.unwrap();
        let refresh = session.refresh_token.unwrap();

        let renewed = identity.refresh_session(&refresh).await.unwrap();
        assert_ne!(renewed.access_token, session.access_token);
        assert!(identity.get_session(&renewed.access_token).await.unwrap().is_some());

        let err = identity.refresh_session(&refresh).await.unwrap_err();
        assert!(matches!(err, IdentityError::InvalidCredentials(_)));
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let identity = MemoryIdentity::new();
        identity.create_user("admin@example.com", "hunter22", Role::Admin).await.unwrap();
        let err = identity.sign_in_with_password("admin@example.com", "nope").await.unwrap_err();
        assert!(matches!(err, IdentityError::InvalidCredentials(_)));
    }

    #[tokio::test]
    async fn role_is_stored_server_side() {
        let identity = MemoryIdentity::new();
        let user = identity.create_user("admin@example.com", "hunter22", Role::Admin).await.unwrap();
        assert_eq!(user.app_metadata["role"], Value::String("admin".into()));
        assert!(user.user_metadata.is_empty());
    }

    #[tokio::test]
    async fn self_update_cannot_change_role() {
        let identity = MemoryIdentity::new();
        let mut editor = Map::new();
        editor.insert("role".to_string(), Value::String("editor".into()));
        identity.add_user("editor@example.com", "hunter22", editor).await;
        let session = identity.sign_in_with_password("editor@example.com", "hunter22").await.unwrap();

        let mut claim = Map::new();
        claim.insert("role".to_string(), Value::String("admin".into()));
        let updated = identity.update_user(&session.access_token, claim).await.unwrap();
        assert_eq!(updated.user_metadata["role"], Value::String("admin".into()));
        assert_eq!(Role::from_user(&updated), Role::Anonymous);
    }

    #[tokio::test]
    async fn duplicate_users_are_rejected() {
        let identity = MemoryIdentity::new();
        identity.create_user("a@example.com", "pw123456", Role::Admin).await.unwrap();
        let err = identity.create_user("a@example.com", "pw123456", Role::Admin).await.unwrap_err();
        assert!(matches!(err, IdentityError::Rejected { status: 422, .. }));
    }
}
