use async_trait::async_trait;
use reqwest::{header, Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;

use super::{IdentityError, IdentityProvider, Role, Session, User};

/// Client for the hosted identity API (`{url}/auth/v1/...`)
pub struct RestIdentity {
    client: Client,
    base_url: String,
    anon_key: String,
    service_role_key: Option<String>,
}

/// The identity API reports errors under several keys depending on endpoint
#[derive(Debug, Default, Deserialize)]
struct IdentityErrorBody {
    error: Option<String>,
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
}

impl IdentityErrorBody {
    fn into_message(self) -> Option<String> {
        self.error_description.or(self.msg).or(self.message).or(self.error)
    }
}

impl RestIdentity {
    pub fn new(url: &str, anon_key: &str, service_role_key: Option<&str>, timeout_secs: u64) -> Result<Self, IdentityError> {
        let parsed = url::Url::parse(url).map_err(|_| IdentityError::ConfigMissing("STORE_URL (invalid URL)"))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            service_role_key: service_role_key.map(str::to_string),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    async fn error_message(response: Response) -> (u16, String) {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<IdentityErrorBody>(&text)
            .ok()
            .and_then(IdentityErrorBody::into_message)
            .unwrap_or_else(|| format!("HTTP {}", status));
        (status.as_u16(), message)
    }

    async fn rejected(response: Response) -> IdentityError {
        let (status, message) = Self::error_message(response).await;
        IdentityError::Rejected { status, message }
    }
}

#[async_trait]
impl IdentityProvider for RestIdentity {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, IdentityError> {
        let response = self
            .client
            .post(self.url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        match response.status() {
            s if s.is_success() => Ok(response.json::<Session>().await?),
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
                let (_, message) = Self::error_message(response).await;
                Err(IdentityError::InvalidCredentials(message))
            }
            _ => Err(Self::rejected(response).await),
        }
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, IdentityError> {
        let response = self
            .client
            .post(self.url("token"))
            .query(&[("grant_type", "refresh_token")])
            .header("apikey", &self.anon_key)
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;

        match response.status() {
            s if s.is_success() => Ok(response.json::<Session>().await?),
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
                let (_, message) = Self::error_message(response).await;
                Err(IdentityError::InvalidCredentials(message))
            }
            _ => Err(Self::rejected(response).await),
        }
    }

    async fn get_session(&self, access_token: &str) -> Result<Option<Session>, IdentityError> {
        let response = self
            .client
            .get(self.url("user"))
            .header("apikey", &self.anon_key)
            .header(header::AUTHORIZATION, format!("Bearer {}", access_token))
            .send()
            .await?;

        match response.status() {
            s if s.is_success() => {
                let user = response.json::<User>().await?;
                Ok(Some(Session {
                    access_token: access_token.to_string(),
                    refresh_token: None,
                    expires_in: None,
                    user,
                }))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            _ => Err(Self::rejected(response).await),
        }
    }

    async fn create_user(&self, email: &str, password: &str, role: Role) -> Result<User, IdentityError> {
        let service_key = self
            .service_role_key
            .as_deref()
            .ok_or(IdentityError::ConfigMissing("STORE_SERVICE_ROLE_KEY"))?;

        let response = self
            .client
            .post(self.url("admin/users"))
            .header("apikey", service_key)
            .header(header::AUTHORIZATION, format!("Bearer {}", service_key))
            .json(&json!({
                "email": email,
                "password": password,
                "email_confirm": true,
                "app_metadata": { "role": role.as_str() }
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejected(response).await);
        }
        Ok(response.json::<User>().await?)
    }

    async fn update_user(&self, access_token: &str, metadata: Map<String, Value>) -> Result<User, IdentityError> {
        let response = self
            .client
            .put(self.url("user"))
            .header("apikey", &self.anon_key)
            .header(header::AUTHORIZATION, format!("Bearer {}", access_token))
            .json(&json!({ "data": metadata }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejected(response).await);
        }
        Ok(response.json::<User>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_auth_urls() {
        let identity = RestIdentity::new("https://abc.example.co/", "anon", None, 5).unwrap();
        assert_eq!(identity.url("token"), "https://abc.example.co/auth/v1/token");
    }

    #[test]
    fn error_body_prefers_description() {
        let body: IdentityErrorBody = serde_json::from_str(
            r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        )
        .unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Invalid login credentials"));
    }

    #[tokio::test]
    async fn create_user_requires_service_key() {
        let identity = RestIdentity::new("https://abc.example.co", "anon", None, 5).unwrap();
        let err = identity.create_user("a@example.com", "secret123", Role::Admin).await.unwrap_err();
        assert!(matches!(err, IdentityError::ConfigMissing(_)));
    }
}
