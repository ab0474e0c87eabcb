// /api/admin/:resource[/:id] - list, read, create, update, delete

use axum::extract::{rejection::JsonRejection, Path, State};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::app::AppState;
use crate::database::models::Record;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{self, fetch_list, fetch_one};

use super::super::{parse_id, parse_resource};

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub id: i64,
}

/// GET /api/admin/:resource - every row, flagged when served from fallback
pub async fn list(State(state): State<AppState>, Path(resource): Path<String>) -> ApiResult<Vec<Record>> {
    let resource = parse_resource(&resource)?;
    let listing = fetch_list(state.admin_store.as_ref(), resource).await;
    Ok(ApiResponse::listing(listing.records, listing.used_fallback))
}

/// GET /api/admin/:resource/:id
pub async fn get(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
) -> ApiResult<Record> {
    let resource = parse_resource(&resource)?;
    let id = parse_id(&id)?;
    let record = fetch_one(state.admin_store.as_ref(), resource, id).await?;
    Ok(ApiResponse::success(record))
}

/// POST /api/admin/:resource
pub async fn post(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Record> {
    let resource = parse_resource(&resource)?;
    let Json(payload) = body.map_err(|e| ApiError::invalid_json(e.body_text()))?;
    let record = services::create_or_update(state.admin_store.as_ref(), resource, payload, None).await?;
    Ok(ApiResponse::success(record))
}

/// PUT /api/admin/:resource/:id - full replacement; 405 for inquiries
pub async fn put(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Record> {
    let resource = parse_resource(&resource)?;
    let id = parse_id(&id)?;
    let Json(payload) = body.map_err(|e| ApiError::invalid_json(e.body_text()))?;
    let record = services::create_or_update(state.admin_store.as_ref(), resource, payload, Some(id)).await?;
    Ok(ApiResponse::success(record))
}

/// DELETE /api/admin/:resource/:id
pub async fn delete(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
) -> ApiResult<Deleted> {
    let resource = parse_resource(&resource)?;
    let id = parse_id(&id)?;
    services::delete(state.admin_store.as_ref(), resource, id).await?;
    Ok(ApiResponse::success(Deleted { id }))
}
