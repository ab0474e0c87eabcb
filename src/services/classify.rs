//! Map raw store failures onto the client-facing [`WriteError`] taxonomy.
//!
//! Both backends surface Postgres codes: `42P01` undefined table, `42703`
//! undefined column. The hosted REST layer adds its own schema-cache codes
//! (`PGRST205` table, `PGRST204` column).

use crate::database::StoreError;

use super::error::WriteError;

const UNDEFINED_TABLE: &[&str] = &["42P01", "PGRST205", "PGRST106"];
const UNDEFINED_COLUMN: &[&str] = &["42703", "PGRST204"];

pub fn classify(table: &str, err: StoreError) -> WriteError {
    match err {
        StoreError::Backend { code: Some(code), message } if UNDEFINED_TABLE.contains(&code.as_str()) => {
            tracing::error!("store reports missing table '{}': {}", table, message);
            WriteError::SchemaMissing { table: table.to_string() }
        }
        StoreError::Backend { code: Some(code), message } if UNDEFINED_COLUMN.contains(&code.as_str()) => {
            tracing::error!("store reports missing column on '{}': {}", table, message);
            let column = quoted_name(&message).unwrap_or_else(|| "unknown".to_string());
            WriteError::ColumnMissing { table: table.to_string(), column }
        }
        StoreError::Backend { code: None, message } if looks_like_missing_table(&message) => {
            WriteError::SchemaMissing { table: table.to_string() }
        }
        other => {
            tracing::error!("store error on '{}': {}", table, other);
            WriteError::Store(other.to_string())
        }
    }
}

/// First `"name"` or `'name'` in a store message
fn quoted_name(message: &str) -> Option<String> {
    for quote in ['"', '\''] {
        let mut parts = message.split(quote);
        if let (Some(_), Some(name)) = (parts.next(), parts.next()) {
            if !name.is_empty() && parts.next().is_some() {
                return Some(name.to_string());
            }
        }
    }
    None
}

fn looks_like_missing_table(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("relation") && lower.contains("does not exist")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_table_is_schema_missing() {
        let err = classify("courses", StoreError::backend("42P01", "relation \"courses\" does not exist"));
        assert!(matches!(err, WriteError::SchemaMissing { ref table } if table == "courses"));
        assert!(err.needs_setup());
    }

    #[test]
    fn undefined_column_names_the_column() {
        let err = classify(
            "projects",
            StoreError::backend("42703", "column \"technologies\" of relation \"projects\" does not exist"),
        );
        match err {
            WriteError::ColumnMissing { table, column } => {
                assert_eq!(table, "projects");
                assert_eq!(column, "technologies");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn rest_schema_cache_codes_are_recognized() {
        let err = classify(
            "projects",
            StoreError::backend("PGRST204", "Could not find the 'technologies' column of 'projects' in the schema cache"),
        );
        assert!(matches!(err, WriteError::ColumnMissing { ref column, .. } if column == "technologies"));

        let err = classify(
            "projects",
            StoreError::backend("PGRST205", "Could not find the table 'public.projects' in the schema cache"),
        );
        assert!(matches!(err, WriteError::SchemaMissing { .. }));
    }

    #[test]
    fn everything_else_is_a_store_error() {
        let err = classify("courses", StoreError::NoMatch { table: "courses".into(), id: 9 });
        assert!(matches!(err, WriteError::Store(_)));
        assert!(err.remediation().is_some());

        let err = classify("courses", StoreError::Transport("connection refused".into()));
        assert!(matches!(err, WriteError::Store(_)));
    }
}
