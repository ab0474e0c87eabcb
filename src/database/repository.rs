use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use super::{DataStore, Row, StoreError};
use crate::filter::FilterData;
use crate::types::Resource;

/// Typed access to one resource's table through any [`DataStore`]
pub struct Repository<'a, T> {
    resource: Resource,
    store: &'a dyn DataStore,
    _phantom: std::marker::PhantomData<T>,
}

impl<'a, T> Repository<'a, T>
where
    T: DeserializeOwned,
{
    pub fn new(resource: Resource, store: &'a dyn DataStore) -> Self {
        Self {
            resource,
            store,
            _phantom: std::marker::PhantomData,
        }
    }

    pub fn table(&self) -> &'static str {
        self.resource.table()
    }

    /// All rows in the resource's display order
    pub async fn select_all(&self) -> Result<Vec<T>, StoreError> {
        let filter = FilterData::ordered(self.resource.default_order());
        let rows = self.store.select(self.table(), Some(&filter)).await?;
        rows.into_iter().map(Self::decode).collect()
    }

    pub async fn select_one(&self, id: i64) -> Result<Option<T>, StoreError> {
        let rows = self.store.select(self.table(), Some(&FilterData::by_id(id))).await?;
        rows.into_iter().next().map(Self::decode).transpose()
    }

    pub async fn insert<D: Serialize>(&self, draft: &D) -> Result<T, StoreError> {
        let row = self.store.insert(self.table(), Self::encode(draft)?).await?;
        Self::decode(row)
    }

    pub async fn update<D: Serialize>(&self, id: i64, draft: &D) -> Result<Option<T>, StoreError> {
        let row = self.store.update(self.table(), id, Self::encode(draft)?).await?;
        row.map(Self::decode).transpose()
    }

    pub async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.store.delete(self.table(), id).await
    }

    fn encode<D: Serialize>(draft: &D) -> Result<Row, StoreError> {
        match serde_json::to_value(draft) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(StoreError::Decode(format!("draft did not serialize to an object: {}", other))),
            Err(e) => Err(StoreError::Decode(e.to_string())),
        }
    }

    fn decode(row: Row) -> Result<T, StoreError> {
        serde_json::from_value(Value::Object(row)).map_err(|e| StoreError::Decode(e.to_string()))
    }
}
