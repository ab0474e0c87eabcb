use thiserror::Error;

use crate::types::Resource;
use crate::validation::ValidationError;

/// Where operators are sent when the store is missing tables or columns
pub const SETUP_HINT: &str = "Run the setup SQL (GET /api/admin/setup or `site-admin setup sql`) against the store, then retry.";

/// Failure of a validated write, classified for the caller
#[derive(Debug, Error)]
pub enum WriteError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("The '{table}' table does not exist")]
    SchemaMissing { table: String },

    #[error("The '{table}' table has no '{column}' column")]
    ColumnMissing { table: String, column: String },

    #[error("Store error: {0}")]
    Store(String),

    #[error("{resource} {id} not found")]
    NotFound { resource: Resource, id: i64 },

    #[error("{0} records cannot be modified after creation")]
    Immutable(Resource),
}

impl WriteError {
    /// One human-readable remediation line per failure kind
    pub fn remediation(&self) -> Option<String> {
        match self {
            WriteError::SchemaMissing { table } => Some(format!(
                "The '{}' table has not been created yet. {}",
                table, SETUP_HINT
            )),
            WriteError::ColumnMissing { table, column } => Some(format!(
                "The '{}' table is missing the '{}' column. {}",
                table, column, SETUP_HINT
            )),
            WriteError::Store(_) => {
                Some("The data store rejected the request. Check the server logs for details.".to_string())
            }
            _ => None,
        }
    }

    /// Whether the operator has to run the setup procedure
    pub fn needs_setup(&self) -> bool {
        matches!(self, WriteError::SchemaMissing { .. } | WriteError::ColumnMissing { .. })
    }
}
