// GET /api/companies, /api/courses, /api/projects - public site content

use axum::{
    extract::State,
    http::{HeaderName, HeaderValue},
    response::{IntoResponse, Json, Response},
};

use crate::app::AppState;
use crate::services::fetch_list;
use crate::types::Resource;

/// Response header naming where the rows came from: `live` or `fallback`
pub const DATA_SOURCE_HEADER: &str = "x-data-source";

pub async fn companies(State(state): State<AppState>) -> Response {
    list(&state, Resource::Company).await
}

pub async fn courses(State(state): State<AppState>) -> Response {
    list(&state, Resource::Course).await
}

pub async fn projects(State(state): State<AppState>) -> Response {
    list(&state, Resource::Project).await
}

/// Bare JSON array; reads never fail, so there is no error branch
async fn list(state: &AppState, resource: Resource) -> Response {
    let listing = fetch_list(state.store.as_ref(), resource).await;
    let source = if listing.used_fallback { "fallback" } else { "live" };

    let mut response = Json(listing.records).into_response();
    response
        .headers_mut()
        .insert(HeaderName::from_static(DATA_SOURCE_HEADER), HeaderValue::from_static(source));
    response
}
