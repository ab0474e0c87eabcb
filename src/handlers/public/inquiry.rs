// POST /api/inquiries - contact form submission

use axum::extract::{rejection::JsonRejection, State};
use axum::Json;
use serde_json::Value;

use crate::app::AppState;
use crate::database::models::Record;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::create_or_update;
use crate::types::Resource;

pub async fn post(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Record> {
    let Json(payload) = body.map_err(|e| ApiError::invalid_json(e.body_text()))?;
    let record = create_or_update(state.store.as_ref(), Resource::Inquiry, payload, None).await?;
    Ok(ApiResponse::success(record))
}
