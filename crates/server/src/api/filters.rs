use analytics::{Predicate, SavedFilter};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::{api_error, ApiError, AppState};
use crate::metrics::record_registry_size;

#[derive(Debug, Deserialize)]
pub struct SaveFilterRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub filters: Vec<Predicate>,
}

pub async fn list_filters(State(state): State<Arc<AppState>>) -> Json<Vec<SavedFilter>> {
    Json(state.registry.list_saved_filters())
}

pub async fn get_filter(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SavedFilter>, ApiError> {
    state
        .registry
        .load_filter(&id)
        .map(Json)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("saved filter not found: {id}")))
}

/// Full replace; there is no partial update.
pub async fn save_filter(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SaveFilterRequest>,
) -> Result<Json<SavedFilter>, ApiError> {
    if req.name.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "name must not be empty"));
    }
    let saved = state
        .registry
        .save_filter(id, req.name, req.filters, req.description);
    record_registry_size(state.registry.len());
    Ok(Json(saved))
}

pub async fn delete_filter(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> StatusCode {
    if state.registry.delete_filter(&id) {
        record_registry_size(state.registry.len());
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}
