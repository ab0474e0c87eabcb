use once_cell::sync::Lazy;
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub store: StoreConfig,
    pub site: SiteConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

/// Credentials for the hosted store/identity service. Presence of these
/// decides whether live-store or fallback paths run.
#[derive(Clone, Default)]
pub struct StoreConfig {
    pub url: Option<String>,
    pub anon_key: Option<String>,
    pub service_role_key: Option<String>,
    pub database_url: Option<String>,
    pub timeout_secs: u64,
    pub max_connections: u32,
}

// keys stay out of logs
impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("url", &self.url)
            .field("anon_key", &self.anon_key.as_ref().map(|_| "<set>"))
            .field("service_role_key", &self.service_role_key.as_ref().map(|_| "<set>"))
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("timeout_secs", &self.timeout_secs)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl StoreConfig {
    pub fn is_hosted(&self) -> bool {
        self.url.is_some() && self.anon_key.is_some()
    }

    pub fn is_configured(&self) -> bool {
        self.is_hosted() || self.database_url.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub base_url: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Store credentials; blank values count as absent
        self.store.url = non_empty_var("STORE_URL");
        self.store.anon_key = non_empty_var("STORE_ANON_KEY");
        self.store.service_role_key = non_empty_var("STORE_SERVICE_ROLE_KEY");
        self.store.database_url = non_empty_var("DATABASE_URL");
        if let Ok(v) = env::var("STORE_TIMEOUT_SECS") {
            self.store.timeout_secs = v.parse().unwrap_or(self.store.timeout_secs);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.store.max_connections = v.parse().unwrap_or(self.store.max_connections);
        }

        // Site overrides
        if let Some(v) = non_empty_var("SITE_URL") {
            self.site.base_url = v.trim_end_matches('/').to_string();
        }
        if let Some(port) = non_empty_var("SITE_API_PORT")
            .or_else(|| non_empty_var("PORT"))
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.site.port = port;
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            store: StoreConfig {
                timeout_secs: 30,
                max_connections: 5,
                ..StoreConfig::default()
            },
            site: SiteConfig {
                base_url: "http://localhost:3000".to_string(),
                port: 3001,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            store: StoreConfig {
                timeout_secs: 10,
                max_connections: 10,
                ..StoreConfig::default()
            },
            site: SiteConfig {
                base_url: "https://staging.example.com".to_string(),
                port: 3001,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            store: StoreConfig {
                timeout_secs: 5,
                max_connections: 20,
                ..StoreConfig::default()
            },
            site: SiteConfig {
                base_url: "https://www.example.com".to_string(),
                port: 3001,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://www.example.com".to_string()],
            },
        }
    }

    /// Allowed CORS origins; the site's own base URL is always included
    pub fn allowed_origins(&self) -> Vec<String> {
        let mut origins = self.security.cors_origins.clone();
        if !origins.iter().any(|o| o == &self.site.base_url) {
            origins.push(self.site.base_url.clone());
        }
        origins
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert!(!config.store.is_configured());
        assert_eq!(config.store.timeout_secs, 30);
        assert!(config.security.enable_cors);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.store.timeout_secs, 5);
    }

    #[test]
    fn hosted_store_needs_url_and_anon_key() {
        let mut store = StoreConfig { url: Some("https://x.example.co".into()), ..StoreConfig::default() };
        assert!(!store.is_hosted());
        store.anon_key = Some("anon".into());
        assert!(store.is_hosted());
        assert!(store.is_configured());
    }

    #[test]
    fn debug_output_hides_keys() {
        let store = StoreConfig { anon_key: Some("super-secret".into()), ..StoreConfig::default() };
        let out = format!("{:?}", store);
        assert!(!out.contains("super-secret"));
        assert!(out.contains("<set>"));
    }

    #[test]
    fn site_origin_is_always_allowed() {
        let mut config = AppConfig::production();
        config.security.cors_origins.clear();
        assert_eq!(config.allowed_origins(), vec!["https://www.example.com".to_string()]);
    }
}
