// handlers/mod.rs - two security tiers
//
// Public (no auth): site catalog reads, contact form, sign-in
// Admin (bearer session with role=admin): back-office CRUD, users, setup
pub mod admin;
pub mod public;

use crate::error::ApiError;
use crate::types::Resource;

/// Resource segment of an `/api/admin/{resource}` path
pub(crate) fn parse_resource(segment: &str) -> Result<Resource, ApiError> {
    segment.parse::<Resource>().map_err(ApiError::not_found)
}

/// Numeric record id from a path segment
pub(crate) fn parse_id(segment: &str) -> Result<i64, ApiError> {
    segment
        .parse::<i64>()
        .map_err(|_| ApiError::bad_request(format!("Invalid record id '{}'", segment)))
}
