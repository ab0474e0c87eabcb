pub mod manager;
pub mod memory;
pub mod models;
pub mod repository;
pub mod rest;

pub use manager::PgStore;
pub use memory::MemoryStore;
pub use repository::Repository;
pub use rest::RestStore;

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;

use crate::config::StoreConfig;
use crate::filter::{FilterData, FilterError};

/// A row as the store hands it back: column name -> JSON value
pub type Row = Map<String, Value>;

/// Errors from a store backend, before classification for clients
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Store unreachable: {0}")]
    Transport(String),

    /// Error reported by the store itself, with its SQLSTATE/API code when known
    #[error("{message}")]
    Backend { code: Option<String>, message: String },

    #[error("No row in '{table}' matched id {id}")]
    NoMatch { table: String, id: i64 },

    #[error("Unexpected store response: {0}")]
    Decode(String),

    #[error(transparent)]
    Filter(#[from] FilterError),
}

impl StoreError {
    pub fn backend(code: impl Into<String>, message: impl Into<String>) -> Self {
        StoreError::Backend { code: Some(code.into()), message: message.into() }
    }

    /// Credentials are absent, as opposed to the store failing
    pub fn is_unconfigured(&self) -> bool {
        matches!(self, StoreError::ConfigMissing(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db) => StoreError::Backend {
                code: db.code().map(|c| c.into_owned()),
                message: db.message().to_string(),
            },
            sqlx::Error::Decode(e) | sqlx::Error::ColumnDecode { source: e, .. } => {
                StoreError::Decode(e.to_string())
            }
            other => StoreError::Transport(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            StoreError::Decode(err.to_string())
        } else {
            StoreError::Transport(err.to_string())
        }
    }
}

/// Generic table access over the hosted relational store
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Short backend label for logs and the health endpoint
    fn backend(&self) -> &'static str;

    /// Cheap reachability probe
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn select(&self, table: &str, filter: Option<&FilterData>) -> Result<Vec<Row>, StoreError>;

    /// Insert one row and return it as stored, including the assigned id
    async fn insert(&self, table: &str, record: Row) -> Result<Row, StoreError>;

    /// Patch the row with `id`; `Ok(None)` when no row matched
    async fn update(&self, table: &str, id: i64, patch: Row) -> Result<Option<Row>, StoreError>;

    /// Delete the row with `id`; a missing row is reported as [`StoreError::NoMatch`]
    async fn delete(&self, table: &str, id: i64) -> Result<(), StoreError>;
}

/// Stand-in used when no store credentials are configured.
/// Every call fails, which routes reads to fallback data.
pub struct UnconfiguredStore;

#[async_trait]
impl DataStore for UnconfiguredStore {
    fn backend(&self) -> &'static str {
        "none"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(StoreError::ConfigMissing("STORE_URL/STORE_ANON_KEY or DATABASE_URL"))
    }

    async fn select(&self, _table: &str, _filter: Option<&FilterData>) -> Result<Vec<Row>, StoreError> {
        Err(StoreError::ConfigMissing("STORE_URL/STORE_ANON_KEY or DATABASE_URL"))
    }

    async fn insert(&self, _table: &str, _record: Row) -> Result<Row, StoreError> {
        Err(StoreError::ConfigMissing("STORE_URL/STORE_ANON_KEY or DATABASE_URL"))
    }

    async fn update(&self, _table: &str, _id: i64, _patch: Row) -> Result<Option<Row>, StoreError> {
        Err(StoreError::ConfigMissing("STORE_URL/STORE_ANON_KEY or DATABASE_URL"))
    }

    async fn delete(&self, _table: &str, _id: i64) -> Result<(), StoreError> {
        Err(StoreError::ConfigMissing("STORE_URL/STORE_ANON_KEY or DATABASE_URL"))
    }
}

/// Store handles per audience. Public pages read as the anonymous role; the
/// admin area reads with the service role so rows hidden by row-level
/// policies (inquiries) are visible there.
#[derive(Clone)]
pub struct Stores {
    pub public: Arc<dyn DataStore>,
    pub admin: Arc<dyn DataStore>,
}

impl Stores {
    /// One backend for both audiences (direct Postgres, memory, unconfigured)
    pub fn shared(store: Arc<dyn DataStore>) -> Self {
        Self { public: store.clone(), admin: store }
    }
}

/// Pick the backend from configuration: hosted REST when its URL and anon
/// key are present, direct Postgres when only DATABASE_URL is set, otherwise
/// the unconfigured stand-in.
pub fn open_stores(config: &StoreConfig) -> Result<Stores, StoreError> {
    if !config.is_configured() {
        tracing::warn!("No store credentials configured; public pages will serve fallback data");
        return Ok(Stores::shared(Arc::new(UnconfiguredStore)));
    }

    if let (Some(url), Some(anon_key)) = (&config.url, &config.anon_key) {
        let public = RestStore::new(url, anon_key, config.service_role_key.as_deref(), config.timeout_secs)?;
        let admin = public.elevated();
        if !admin.reads_elevated() {
            tracing::warn!("STORE_SERVICE_ROLE_KEY not set; admin reads and writes run as the anonymous role");
        }
        tracing::info!("Using hosted REST store at {}", url);
        return Ok(Stores { public: Arc::new(public), admin: Arc::new(admin) });
    }

    let database_url = config
        .database_url
        .as_deref()
        .ok_or(StoreError::ConfigMissing("STORE_URL/STORE_ANON_KEY or DATABASE_URL"))?;
    let store = PgStore::connect_lazy(database_url, config.max_connections, config.timeout_secs)?;
    tracing::info!("Using direct Postgres store");
    Ok(Stores::shared(Arc::new(store)))
}
