//! Fallback-aware reads behind the public pages and admin lists.

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::database::models::{Company, Course, Inquiry, Project, Record};
use crate::database::{DataStore, Repository, StoreError};
use crate::fallback;
use crate::types::{Operation, Resource};

use super::classify::classify;
use super::error::WriteError;

/// Result of a list read; `used_fallback` tells callers the rows are built-in
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub records: Vec<Record>,
    pub used_fallback: bool,
}

/// Query the store for every row of `resource`.
///
/// Any failure (unconfigured, unreachable, store error, undecodable rows) or
/// an empty table yields the built-in list instead. Never fails and never
/// returns an empty list.
pub async fn fetch_list(store: &dyn DataStore, resource: Resource) -> Listing {
    let result = match resource {
        Resource::Company => select_all::<Company>(store, resource).await,
        Resource::Course => select_all::<Course>(store, resource).await,
        Resource::Project => select_all::<Project>(store, resource).await,
        Resource::Inquiry => select_all::<Inquiry>(store, resource).await,
    };

    match result {
        Ok(records) if !records.is_empty() => Listing { records, used_fallback: false },
        Ok(_) => {
            debug!("{} table is empty; serving fallback data", resource.table());
            fallback_listing(resource)
        }
        Err(e) if e.is_unconfigured() => {
            debug!("store not configured; serving fallback {}", resource.table());
            fallback_listing(resource)
        }
        Err(e) => {
            warn!("failed to load {} from {} store, serving fallback: {}", resource.table(), store.backend(), e);
            fallback_listing(resource)
        }
    }
}

/// Single record for the admin edit form; no fallback
pub async fn fetch_one(store: &dyn DataStore, resource: Resource, id: i64) -> Result<Record, WriteError> {
    let found = match resource {
        Resource::Company => select_one::<Company>(store, resource, id).await,
        Resource::Course => select_one::<Course>(store, resource, id).await,
        Resource::Project => select_one::<Project>(store, resource, id).await,
        Resource::Inquiry => select_one::<Inquiry>(store, resource, id).await,
    };

    match found {
        Ok(Some(record)) => Ok(record),
        Ok(None) => Err(WriteError::NotFound { resource, id }),
        Err(e) => Err(classify(resource.table(), e)),
    }
}

fn fallback_listing(resource: Resource) -> Listing {
    Listing { records: fallback::records(resource), used_fallback: true }
}

async fn select_all<T>(store: &dyn DataStore, resource: Resource) -> Result<Vec<Record>, StoreError>
where
    T: DeserializeOwned + Into<Record>,
{
    debug!("{} {} via {}", Operation::Select, resource.table(), store.backend());
    let rows = Repository::<T>::new(resource, store).select_all().await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

async fn select_one<T>(store: &dyn DataStore, resource: Resource, id: i64) -> Result<Option<Record>, StoreError>
where
    T: DeserializeOwned + Into<Record>,
{
    let row = Repository::<T>::new(resource, store).select_one(id).await?;
    Ok(row.map(Into::into))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{MemoryStore, UnconfiguredStore};
    use crate::services::writer::create_or_update;
    use serde_json::json;

    #[tokio::test]
    async fn fetch_list_never_empty_without_store() {
        for resource in Resource::ALL {
            let listing = fetch_list(&UnconfiguredStore, resource).await;
            assert!(listing.used_fallback);
            assert!(!listing.records.is_empty());
        }
    }

    #[tokio::test]
    async fn missing_tables_fall_back() {
        let store = MemoryStore::new();
        let listing = fetch_list(&store, Resource::Project).await;
        assert!(listing.used_fallback);
        assert_eq!(listing.records, fallback::records(Resource::Project));
    }

    #[tokio::test]
    async fn empty_tables_fall_back_and_live_rows_win() {
        let store = MemoryStore::provisioned();
        assert!(fetch_list(&store, Resource::Course).await.used_fallback);

        create_or_update(
            &store,
            Resource::Course,
            json!({
                "title": "Rust in Practice",
                "description": "Ten weeks of systems programming",
                "duration": "10 weeks",
                "price": 899
            }),
            None,
        )
        .await
        .unwrap();

        let listing = fetch_list(&store, Resource::Course).await;
        assert!(!listing.used_fallback);
        assert_eq!(listing.records.len(), 1);
    }

    #[tokio::test]
    async fn undecodable_rows_fall_back() {
        let store = MemoryStore::new();
        store.create_table("courses", &["id", "title"]).await;
        store
            .insert("courses", json!({"title": "no price"}).as_object().cloned().unwrap())
            .await
            .unwrap();
        assert!(fetch_list(&store, Resource::Course).await.used_fallback);
    }

    #[tokio::test]
    async fn fetch_one_reports_not_found() {
        let store = MemoryStore::provisioned();
        let err = fetch_one(&store, Resource::Company, 42).await.unwrap_err();
        assert!(matches!(err, WriteError::NotFound { id: 42, .. }));
    }
}
