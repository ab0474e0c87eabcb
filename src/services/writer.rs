//! Schema-validated writes: validate first, then exactly one store call.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::info;

use crate::database::models::{
    Company, CompanyInput, Course, CourseInput, Inquiry, InquiryInput, Project, ProjectInput, Record,
};
use crate::database::{DataStore, Repository, Row};
use crate::types::{Operation, Resource};
use crate::validation::{Validate, ValidationError};

use super::classify::classify;
use super::error::WriteError;

/// Insert (`id` absent) or update (`id` present) one record.
///
/// Validation runs before any I/O. Updating an absent id is `NotFound`;
/// inquiries cannot be updated at all.
pub async fn create_or_update(
    store: &dyn DataStore,
    resource: Resource,
    payload: Value,
    id: Option<i64>,
) -> Result<Record, WriteError> {
    if id.is_some() && !resource.supports_update() {
        return Err(WriteError::Immutable(resource));
    }

    match resource {
        Resource::Company => write::<CompanyInput, Company>(store, resource, payload, id).await,
        Resource::Course => write::<CourseInput, Course>(store, resource, payload, id).await,
        Resource::Project => write::<ProjectInput, Project>(store, resource, payload, id).await,
        Resource::Inquiry => write::<InquiryInput, Inquiry>(store, resource, payload, id).await,
    }
}

/// Remove one record; a missing id surfaces as the store's error
pub async fn delete(store: &dyn DataStore, resource: Resource, id: i64) -> Result<(), WriteError> {
    // no rows are decoded, so the untyped row is enough
    Repository::<Row>::new(resource, store)
        .delete(id)
        .await
        .map_err(|e| classify(resource.table(), e))?;
    info!("{} {} {}", Operation::Delete, resource, id);
    Ok(())
}

async fn write<I, T>(store: &dyn DataStore, resource: Resource, payload: Value, id: Option<i64>) -> Result<Record, WriteError>
where
    I: Validate + DeserializeOwned,
    T: DeserializeOwned + Into<Record>,
{
    let input: I = serde_json::from_value(payload).map_err(ValidationError::malformed_body)?;
    let draft = input.validate()?;

    let repo = Repository::<T>::new(resource, store);
    let table = resource.table();

    let saved = match id {
        None => repo.insert(&draft).await.map_err(|e| classify(table, e))?,
        Some(id) => repo
            .update(id, &draft)
            .await
            .map_err(|e| classify(table, e))?
            .ok_or(WriteError::NotFound { resource, id })?,
    };

    let record: Record = saved.into();
    let op = if id.is_some() { Operation::Update } else { Operation::Create };
    info!("{} {} {}", op, resource, record.id());
    Ok(record)
}
