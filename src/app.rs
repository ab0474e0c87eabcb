use axum::{
    extract::State,
    http::{HeaderValue, Method},
    middleware,
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{open_identity, IdentityError, IdentityProvider};
use crate::config::AppConfig;
use crate::database::{open_stores, DataStore, StoreError, Stores};
use crate::handlers::{admin, public};
use crate::services::fetch_list;
use crate::types::Resource;

/// Shared, immutable per-process state handed to every handler
#[derive(Clone)]
pub struct AppState {
    /// Public pages and the contact form
    pub store: Arc<dyn DataStore>,
    /// The admin area; reads with elevated credentials where the backend has them
    pub admin_store: Arc<dyn DataStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub config: Arc<AppConfig>,
}

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Identity(#[from] IdentityError),
}

impl AppState {
    pub fn new(stores: Stores, identity: Arc<dyn IdentityProvider>, config: AppConfig) -> Self {
        Self {
            store: stores.public,
            admin_store: stores.admin,
            identity,
            config: Arc::new(config),
        }
    }

    /// Select backends from configuration
    pub fn from_config(config: AppConfig) -> Result<Self, StartupError> {
        let stores = open_stores(&config.store)?;
        let identity = open_identity(&config.store)?;
        Ok(Self::new(stores, identity, config))
    }
}

pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_routes())
        // Admin, behind the session/role gate
        .merge(admin_routes(state.clone()))
        // Global middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/companies", get(public::catalog_companies))
        .route("/api/courses", get(public::catalog_courses))
        .route("/api/projects", get(public::catalog_projects))
        .route("/api/inquiries", post(public::inquiry_post))
        .route("/auth/login", post(public::auth_login))
        .route("/auth/refresh", post(public::auth_refresh))
        .route("/auth/session", get(public::auth_session))
}

fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/admin/setup", get(admin::setup_get))
        .route("/api/admin/users", post(admin::users_create))
        .route("/api/admin/users/me", put(admin::users_update_me))
        .route(
            "/api/admin/:resource",
            get(admin::resource_list).post(admin::resource_post),
        )
        .route(
            "/api/admin/:resource/:id",
            get(admin::resource_get)
                .put(admin::resource_put)
                .delete(admin::resource_delete),
        )
        .route_layer(middleware::from_fn_with_state(state, crate::middleware::admin_gate))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if !config.security.enable_cors {
        return CorsLayer::new();
    }
    let origins: Vec<HeaderValue> = config
        .allowed_origins()
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
}

async fn root(State(state): State<AppState>) -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Site API",
            "version": version,
            "environment": format!("{:?}", state.config.environment).to_lowercase(),
            "store": state.store.backend(),
            "endpoints": {
                "catalog": "/api/companies, /api/courses, /api/projects (public)",
                "contact": "/api/inquiries (public, POST)",
                "auth": "/auth/login, /auth/refresh, /auth/session (public)",
                "admin": "/api/admin/:resource[/:id] (admin session)",
                "users": "/api/admin/users, /api/admin/users/me (admin session)",
                "setup": "/api/admin/setup (admin session)",
            }
        }
    }))
}

/// Reports whether public pages are served from the store or from fallback data
async fn health(State(state): State<AppState>) -> Json<Value> {
    let listing = fetch_list(state.store.as_ref(), Resource::Course).await;
    let store = if listing.used_fallback { "fallback" } else { "live" };

    Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "timestamp": chrono::Utc::now(),
            "backend": state.store.backend(),
            "store": store
        }
    }))
}
