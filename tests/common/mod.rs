#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Map, Value};
use tower::ServiceExt;

use site_api::auth::{IdentityProvider, MemoryIdentity, Role};
use site_api::config::AppConfig;
use site_api::database::{MemoryStore, Stores};
use site_api::{router, AppState};

static SERVER: OnceLock<TestServer> = OnceLock::new();

/// The real `site-api` binary started with no store credentials
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_site-api"));
        cmd.env("SITE_API_PORT", port.to_string())
            .env("RUST_LOG", "warn")
            .env_remove("STORE_URL")
            .env_remove("STORE_ANON_KEY")
            .env_remove("STORE_SERVICE_ROLE_KEY")
            .env_remove("DATABASE_URL")
            // keep a developer's .env from leaking credentials in
            .current_dir(std::env::temp_dir())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == reqwest::StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// In-process app over in-memory collaborators
pub struct TestApp {
    pub router: Router,
    pub store: MemoryStore,
    pub identity: MemoryIdentity,
}

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const EDITOR_EMAIL: &str = "editor@example.com";
pub const PASSWORD: &str = "correct-horse";

impl TestApp {
    pub async fn new(store: MemoryStore) -> Self {
        let identity = MemoryIdentity::new();
        identity
            .create_user(ADMIN_EMAIL, PASSWORD, Role::Admin)
            .await
            .expect("seed admin");
        let mut editor = Map::new();
        editor.insert("role".into(), json!("editor"));
        identity.add_user(EDITOR_EMAIL, PASSWORD, editor).await;

        let state = AppState::new(
            Stores::shared(Arc::new(store.clone())),
            Arc::new(identity.clone()),
            AppConfig::from_env(),
        );
        Self { router: router(state), store, identity }
    }

    pub async fn provisioned() -> Self {
        Self::new(MemoryStore::provisioned()).await
    }

    pub async fn token_for(&self, email: &str) -> String {
        let (status, body) = self
            .send(Method::POST, "/auth/login", None, Some(json!({"email": email, "password": PASSWORD})))
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["data"]["access_token"].as_str().expect("access token").to_string()
    }

    pub async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self.router.clone().oneshot(request).await.expect("infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
        };
        (status, value)
    }
}
