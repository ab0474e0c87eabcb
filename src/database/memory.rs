use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{DataStore, Row, StoreError};
use crate::filter::{Filter, FilterData, SortDirection};
use crate::types::Resource;

#[derive(Debug, Default)]
struct Table {
    columns: Vec<String>,
    next_id: i64,
    rows: BTreeMap<i64, Row>,
}

/// In-process store that mimics the hosted store's failure signatures
/// (undefined table / undefined column codes). Backs tests and local demos.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<HashMap<String, Table>>>,
}

impl MemoryStore {
    /// Store with no tables at all; every call hits "relation does not exist"
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with the four site tables created
    pub fn provisioned() -> Self {
        let mut tables = HashMap::new();
        for resource in Resource::ALL {
            tables.insert(
                resource.table().to_string(),
                Table {
                    columns: resource.columns().iter().map(|c| c.to_string()).collect(),
                    next_id: 1,
                    rows: BTreeMap::new(),
                },
            );
        }
        Self { tables: Arc::new(RwLock::new(tables)) }
    }

    /// Create (or replace) a table with an explicit column set
    pub async fn create_table(&self, table: &str, columns: &[&str]) {
        let mut tables = self.tables.write().await;
        tables.insert(
            table.to_string(),
            Table {
                columns: columns.iter().map(|c| c.to_string()).collect(),
                next_id: 1,
                rows: BTreeMap::new(),
            },
        );
    }

    pub async fn drop_table(&self, table: &str) {
        self.tables.write().await.remove(table);
    }

    pub async fn row_count(&self, table: &str) -> usize {
        self.tables.read().await.get(table).map(|t| t.rows.len()).unwrap_or(0)
    }

    fn missing_table(table: &str) -> StoreError {
        StoreError::backend("42P01", format!("relation \"{}\" does not exist", table))
    }

    fn check_columns(table_name: &str, table: &Table, row: &Row) -> Result<(), StoreError> {
        for key in row.keys() {
            if !table.columns.iter().any(|c| c == key) {
                return Err(StoreError::backend(
                    "42703",
                    format!("column \"{}\" of relation \"{}\" does not exist", key, table_name),
                ));
            }
        }
        Ok(())
    }

    fn compare(a: &Row, b: &Row, column: &str) -> std::cmp::Ordering {
        match (a.get(column), b.get(column)) {
            (Some(Value::Number(x)), Some(Value::Number(y))) => x
                .as_f64()
                .partial_cmp(&y.as_f64())
                .unwrap_or(std::cmp::Ordering::Equal),
            (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
            (Some(_), None) => std::cmp::Ordering::Greater,
            (None, Some(_)) => std::cmp::Ordering::Less,
            _ => std::cmp::Ordering::Equal,
        }
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn select(&self, table: &str, filter: Option<&FilterData>) -> Result<Vec<Row>, StoreError> {
        let mut f = Filter::new(table)?;
        let data = filter.cloned().unwrap_or_default();
        f.assign(data.clone())?;

        let tables = self.tables.read().await;
        let t = tables.get(table).ok_or_else(|| Self::missing_table(table))?;

        let mut rows: Vec<Row> = match data.id {
            Some(id) => t.rows.get(&id).cloned().into_iter().collect(),
            None => t.rows.values().cloned().collect(),
        };

        for info in data.order.iter().rev() {
            rows.sort_by(|a, b| {
                let ord = Self::compare(a, b, &info.column);
                match info.sort {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            });
        }

        if let Some(limit) = data.limit {
            rows.truncate(limit as usize);
        }
        Ok(rows)
    }

    async fn insert(&self, table: &str, mut record: Row) -> Result<Row, StoreError> {
        Filter::validate_table_name(table)?;
        let mut tables = self.tables.write().await;
        let t = tables.get_mut(table).ok_or_else(|| Self::missing_table(table))?;
        Self::check_columns(table, t, &record)?;

        let id = t.next_id;
        t.next_id += 1;

        // fill every column like a real table would: defaults or null
        for column in &t.columns {
            if record.contains_key(column) {
                continue;
            }
            let value = match column.as_str() {
                "id" => Value::from(id),
                "created_at" => Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)),
                _ => Value::Null,
            };
            record.insert(column.clone(), value);
        }

        t.rows.insert(id, record.clone());
        Ok(record)
    }

    async fn update(&self, table: &str, id: i64, patch: Row) -> Result<Option<Row>, StoreError> {
        Filter::validate_table_name(table)?;
        let mut tables = self.tables.write().await;
        let t = tables.get_mut(table).ok_or_else(|| Self::missing_table(table))?;
        Self::check_columns(table, t, &patch)?;

        let Some(row) = t.rows.get_mut(&id) else {
            return Ok(None);
        };
        for (k, v) in patch {
            if k != "id" {
                row.insert(k, v);
            }
        }
        Ok(Some(row.clone()))
    }

    async fn delete(&self, table: &str, id: i64) -> Result<(), StoreError> {
        Filter::validate_table_name(table)?;
        let mut tables = self.tables.write().await;
        let t = tables.get_mut(table).ok_or_else(|| Self::missing_table(table))?;
        match t.rows.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NoMatch { table: table.to_string(), id }),
        }
    }
}
