// GET /api/admin/setup - the schema script operators run against the store

use axum::extract::State;
use serde::Serialize;

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::setup::{tables, SETUP_SQL};

#[derive(Debug, Serialize)]
pub struct SetupScript {
    pub backend: &'static str,
    pub tables: Vec<&'static str>,
    pub sql: &'static str,
}

pub async fn get(State(state): State<AppState>) -> ApiResult<SetupScript> {
    Ok(ApiResponse::success(SetupScript {
        backend: state.admin_store.backend(),
        tables: tables(),
        sql: SETUP_SQL,
    }))
}
