use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgPool, Row as _};
use std::time::Duration;
use tracing::{debug, info};

use super::{DataStore, Row, StoreError};
use crate::filter::{Filter, FilterData};

/// Direct Postgres access to the same four tables the hosted REST API serves.
///
/// Rows travel as JSON (`row_to_json` out, `jsonb_populate_record` in) so the
/// store stays table-agnostic, matching the REST backend.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Build the pool without touching the network; connections open on first use
    pub fn connect_lazy(database_url: &str, max_connections: u32, timeout_secs: u64) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(timeout_secs))
            .connect_lazy(database_url)
            .map_err(|_| StoreError::ConfigMissing("DATABASE_URL (unparseable)"))?;
        info!("Created lazy database pool (max {} connections)", max_connections);
        Ok(Self { pool })
    }

    /// Quote SQL identifier to prevent injection
    fn quote_identifier(name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    fn column_list(record: &Row) -> Result<String, StoreError> {
        if record.is_empty() {
            return Err(StoreError::Decode("empty record".to_string()));
        }
        let mut cols = Vec::with_capacity(record.len());
        for key in record.keys() {
            Filter::validate_column_name(key)?;
            cols.push(Self::quote_identifier(key));
        }
        Ok(cols.join(", "))
    }

    fn insert_sql(table: &str, record: &Row) -> Result<String, StoreError> {
        Filter::validate_table_name(table)?;
        let table = Self::quote_identifier(table);
        let cols = Self::column_list(record)?;
        Ok(format!(
            "WITH ins AS (INSERT INTO {table} ({cols}) SELECT {cols} FROM jsonb_populate_record(NULL::{table}, $1) RETURNING *) \
             SELECT row_to_json(ins) AS row FROM ins"
        ))
    }

    fn update_sql(table: &str, patch: &Row) -> Result<String, StoreError> {
        Filter::validate_table_name(table)?;
        let table = Self::quote_identifier(table);
        let cols = Self::column_list(patch)?;
        Ok(format!(
            "WITH upd AS (UPDATE {table} SET ({cols}) = (SELECT {cols} FROM jsonb_populate_record(NULL::{table}, $1)) \
             WHERE \"id\" = $2 RETURNING *) SELECT row_to_json(upd) AS row FROM upd"
        ))
    }

    fn into_row(value: Value) -> Result<Row, StoreError> {
        match value {
            Value::Object(map) => Ok(map),
            other => Err(StoreError::Decode(format!("expected a JSON object row, got {}", other))),
        }
    }
}

#[async_trait]
impl DataStore for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn select(&self, table: &str, filter: Option<&FilterData>) -> Result<Vec<Row>, StoreError> {
        let mut f = Filter::new(table)?;
        if let Some(data) = filter {
            f.assign(data.clone())?;
        }
        let sql = f.to_sql()?;
        debug!("select: {}", sql.query);

        let mut q = sqlx::query(&sql.query);
        for p in &sql.params {
            q = q.bind(*p);
        }
        let rows = q.fetch_all(&self.pool).await?;

        rows.into_iter()
            .map(|r| {
                let v: Value = r.try_get("row")?;
                Self::into_row(v)
            })
            .collect()
    }

    async fn insert(&self, table: &str, record: Row) -> Result<Row, StoreError> {
        let sql = Self::insert_sql(table, &record)?;
        let row = sqlx::query(&sql)
            .bind(Value::Object(record))
            .fetch_one(&self.pool)
            .await?;
        Self::into_row(row.try_get("row")?)
    }

    async fn update(&self, table: &str, id: i64, patch: Row) -> Result<Option<Row>, StoreError> {
        let sql = Self::update_sql(table, &patch)?;
        let row = sqlx::query(&sql)
            .bind(Value::Object(patch))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(r) => Ok(Some(Self::into_row(r.try_get("row")?)?)),
            None => Ok(None),
        }
    }

    async fn delete(&self, table: &str, id: i64) -> Result<(), StoreError> {
        Filter::validate_table_name(table)?;
        let sql = format!("DELETE FROM {} WHERE \"id\" = $1", Self::quote_identifier(table));
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NoMatch { table: table.to_string(), id });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(v: Value) -> Row {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn insert_sql_lists_payload_columns() {
        let sql = PgStore::insert_sql("companies", &row(json!({"name": "Acme", "logo_url": "https://x/y.png"}))).unwrap();
        assert!(sql.contains("INSERT INTO \"companies\""));
        assert!(sql.contains("jsonb_populate_record(NULL::\"companies\", $1)"));
        assert!(sql.contains("\"name\""));
        assert!(sql.contains("\"logo_url\""));
    }

    #[test]
    fn update_sql_targets_id() {
        let sql = PgStore::update_sql("courses", &row(json!({"title": "Go", "price": 10}))).unwrap();
        assert!(sql.contains("UPDATE \"courses\" SET ("));
        assert!(sql.contains("WHERE \"id\" = $2"));
    }

    #[test]
    fn rejects_hostile_column_names() {
        let err = PgStore::insert_sql("companies", &row(json!({"name\"; drop": 1}))).unwrap_err();
        assert!(matches!(err, StoreError::Filter(_)));
    }

    #[test]
    fn quotes_identifiers() {
        assert_eq!(PgStore::quote_identifier("a\"b"), "\"a\"\"b\"");
    }
}
