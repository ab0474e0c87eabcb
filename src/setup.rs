//! Schema setup script for the backing store.

use crate::types::Resource;

/// Idempotent SQL that creates every table, missing column and read policy
pub const SETUP_SQL: &str = include_str!("../sql/setup.sql");

/// Tables the script provisions, in creation order
pub fn tables() -> Vec<&'static str> {
    Resource::ALL.iter().map(Resource::table).collect()
}
