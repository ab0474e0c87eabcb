//! Identity collaborator: the hosted user-management API, plus the session
//! provider and role gate built on top of it.

pub mod gate;
pub mod memory;
pub mod provider;
pub mod rest;

pub use gate::{DenyReason, GateState, SessionGate};
pub use memory::MemoryIdentity;
pub use provider::{AuthChange, AuthEvent, SessionProvider, Subscription};
pub use rest::RestIdentity;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::config::StoreConfig;

/// Typed role, resolved once from user metadata at the gate boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Anonymous,
}

impl Role {
    /// Read from `app_metadata.role` only; `user_metadata` is writable by the
    /// user themselves. Anything but "admin" is anonymous.
    pub fn from_user(user: &User) -> Self {
        let role = user.app_metadata.get("role").and_then(Value::as_str);
        match role {
            Some(r) if r.eq_ignore_ascii_case("admin") => Role::Admin,
            _ => Role::Anonymous,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Anonymous => "anonymous",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "anonymous" | "user" => Ok(Role::Anonymous),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Map<String, Value>,
    #[serde(default)]
    pub app_metadata: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    pub user: User,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid login credentials: {0}")]
    InvalidCredentials(String),

    #[error("Identity service rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Identity service unreachable: {0}")]
    Transport(String),

    #[error("Unexpected identity response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for IdentityError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            IdentityError::Decode(err.to_string())
        } else {
            IdentityError::Transport(err.to_string())
        }
    }
}

/// Operations consumed from the hosted identity service
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, IdentityError>;

    /// Exchange a refresh token for a new session
    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, IdentityError>;

    /// Session behind an access token; `Ok(None)` when the token is unknown or expired
    async fn get_session(&self, access_token: &str) -> Result<Option<Session>, IdentityError>;

    async fn create_user(&self, email: &str, password: &str, role: Role) -> Result<User, IdentityError>;

    /// Merge `metadata` into the token owner's user metadata
    async fn update_user(&self, access_token: &str, metadata: Map<String, Value>) -> Result<User, IdentityError>;
}

/// Used when the identity service has no URL/key; nobody can sign in
pub struct UnconfiguredIdentity;

#[async_trait]
impl IdentityProvider for UnconfiguredIdentity {
    async fn sign_in_with_password(&self, _email: &str, _password: &str) -> Result<Session, IdentityError> {
        Err(IdentityError::ConfigMissing("STORE_URL/STORE_ANON_KEY"))
    }

    async fn refresh_session(&self, _refresh_token: &str) -> Result<Session, IdentityError> {
        Err(IdentityError::ConfigMissing("STORE_URL/STORE_ANON_KEY"))
    }

    async fn get_session(&self, _access_token: &str) -> Result<Option<Session>, IdentityError> {
        Err(IdentityError::ConfigMissing("STORE_URL/STORE_ANON_KEY"))
    }

    async fn create_user(&self, _email: &str, _password: &str, _role: Role) -> Result<User, IdentityError> {
        Err(IdentityError::ConfigMissing("STORE_URL/STORE_SERVICE_ROLE_KEY"))
    }

    async fn update_user(&self, _access_token: &str, _metadata: Map<String, Value>) -> Result<User, IdentityError> {
        Err(IdentityError::ConfigMissing("STORE_URL/STORE_ANON_KEY"))
    }
}

pub fn open_identity(config: &StoreConfig) -> Result<Arc<dyn IdentityProvider>, IdentityError> {
    match (&config.url, &config.anon_key) {
        (Some(url), Some(anon_key)) => Ok(Arc::new(RestIdentity::new(
            url,
            anon_key,
            config.service_role_key.as_deref(),
            config.timeout_secs,
        )?)),
        _ => {
            tracing::warn!("Identity service not configured; admin sign-in is disabled");
            Ok(Arc::new(UnconfiguredIdentity))
        }
    }
}
