use async_trait::async_trait;
use reqwest::{header, Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::{DataStore, Row, StoreError};
use crate::filter::{Filter, FilterData};

/// Client for the hosted store's REST interface (`{url}/rest/v1/{table}`).
///
/// Reads go out with the anonymous key unless the store was
/// [`elevated`](RestStore::elevated); writes use the service-role key when
/// one is configured so row-level policies do not block the admin area.
#[derive(Clone)]
pub struct RestStore {
    client: Client,
    base_url: String,
    anon_key: String,
    read_key: String,
    write_key: String,
}

/// Error body returned by the REST layer
#[derive(Debug, Deserialize)]
struct RestErrorBody {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

impl RestStore {
    pub fn new(url: &str, anon_key: &str, service_role_key: Option<&str>, timeout_secs: u64) -> Result<Self, StoreError> {
        let parsed = url::Url::parse(url).map_err(|_| StoreError::ConfigMissing("STORE_URL (invalid URL)"))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            read_key: anon_key.to_string(),
            write_key: service_role_key.unwrap_or(anon_key).to_string(),
        })
    }

    /// Same store, reading with the service-role key as well. Rows hidden
    /// from anonymous readers (inquiries) become visible. Without a
    /// service-role key this is identical to `self`.
    pub fn elevated(&self) -> Self {
        Self { read_key: self.write_key.clone(), ..self.clone() }
    }

    pub fn reads_elevated(&self) -> bool {
        self.read_key != self.anon_key
    }

    fn table_url(&self, table: &str) -> Result<String, StoreError> {
        Filter::validate_table_name(table)?;
        Ok(format!("{}/rest/v1/{}", self.base_url, table))
    }

    fn request(&self, method: Method, url: &str, key: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", key)
            .header(header::AUTHORIZATION, format!("Bearer {}", key))
    }

    fn id_query(id: i64) -> [(&'static str, String); 1] {
        [("id", format!("eq.{}", id))]
    }

    /// Turn a non-2xx response into a backend error, keeping the API code
    async fn check(response: Response) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        match serde_json::from_str::<RestErrorBody>(&text) {
            Ok(body) => {
                let mut message = body.message.unwrap_or_else(|| format!("HTTP {}", status));
                if let Some(details) = body.details.filter(|d| !d.is_empty()) {
                    message = format!("{} ({})", message, details);
                }
                if let Some(hint) = body.hint.filter(|h| !h.is_empty()) {
                    debug!("store hint: {}", hint);
                }
                Err(StoreError::Backend { code: body.code, message })
            }
            Err(_) => Err(StoreError::Backend {
                code: None,
                message: format!("HTTP {}: {}", status, text),
            }),
        }
    }

    fn into_rows(value: Value) -> Result<Vec<Row>, StoreError> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(map) => Ok(map),
                    other => Err(StoreError::Decode(format!("expected a JSON object row, got {}", other))),
                })
                .collect(),
            Value::Object(map) => Ok(vec![map]),
            other => Err(StoreError::Decode(format!("expected a JSON array, got {}", other))),
        }
    }
}

#[async_trait]
impl DataStore for RestStore {
    fn backend(&self) -> &'static str {
        "rest"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let url = format!("{}/rest/v1/", self.base_url);
        let response = self.request(Method::GET, &url, &self.anon_key).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn select(&self, table: &str, filter: Option<&FilterData>) -> Result<Vec<Row>, StoreError> {
        let mut f = Filter::new(table)?;
        if let Some(data) = filter {
            f.assign(data.clone())?;
        }
        let url = self.table_url(table)?;
        let response = self
            .request(Method::GET, &url, &self.read_key)
            .query(&f.to_rest_query()?)
            .send()
            .await?;
        let body: Value = Self::check(response).await?.json().await?;
        Self::into_rows(body)
    }

    async fn insert(&self, table: &str, record: Row) -> Result<Row, StoreError> {
        let url = self.table_url(table)?;
        let response = self
            .request(Method::POST, &url, &self.write_key)
            .header("Prefer", "return=representation")
            .json(&record)
            .send()
            .await?;
        let body: Value = Self::check(response).await?.json().await?;
        Self::into_rows(body)?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode(format!("insert into '{}' returned no row", table)))
    }

    async fn update(&self, table: &str, id: i64, patch: Row) -> Result<Option<Row>, StoreError> {
        let url = self.table_url(table)?;
        let response = self
            .request(Method::PATCH, &url, &self.write_key)
            .header("Prefer", "return=representation")
            .query(&Self::id_query(id))
            .json(&patch)
            .send()
            .await?;
        let body: Value = Self::check(response).await?.json().await?;
        Ok(Self::into_rows(body)?.into_iter().next())
    }

    async fn delete(&self, table: &str, id: i64) -> Result<(), StoreError> {
        let url = self.table_url(table)?;
        let response = self
            .request(Method::DELETE, &url, &self.write_key)
            .header("Prefer", "return=representation")
            .query(&Self::id_query(id))
            .send()
            .await?;
        let body: Value = Self::check(response).await?.json().await?;
        if Self::into_rows(body)?.is_empty() {
            return Err(StoreError::NoMatch { table: table.to_string(), id });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn trims_trailing_slash_from_base_url() {
        let store = RestStore::new("https://abc.example.co/", "anon", None, 5).unwrap();
        assert_eq!(store.table_url("courses").unwrap(), "https://abc.example.co/rest/v1/courses");
        assert_eq!(store.write_key, "anon");
    }

    #[test]
    fn elevated_reads_use_the_service_key() {
        let store = RestStore::new("https://abc.example.co", "anon", Some("service"), 5).unwrap();
        assert!(!store.reads_elevated());
        let admin = store.elevated();
        assert!(admin.reads_elevated());
        assert_eq!(admin.read_key, "service");
        assert_eq!(store.read_key, "anon");

        let anon_only = RestStore::new("https://abc.example.co", "anon", None, 5).unwrap();
        assert!(!anon_only.elevated().reads_elevated());
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(RestStore::new("not a url", "anon", None, 5).is_err());
    }

    #[test]
    fn decodes_single_object_or_array() {
        assert_eq!(RestStore::into_rows(json!([{"id": 1}, {"id": 2}])).unwrap().len(), 2);
        assert_eq!(RestStore::into_rows(json!({"id": 1})).unwrap().len(), 1);
        assert!(RestStore::into_rows(json!([1])).is_err());
    }
}
