use analytics::{
    apply_filters, calculate_basic_tier_analytics, calculate_breakdown, calculate_clv_summary,
    calculate_pro_tier_analytics, calculate_streaks, describe_filters, AnalyticsError,
    BasicAnalyticsSummary, Bet, BreakdownRow, ClvSummary, ConfidenceLevel, Dimension, Predicate,
    ProAnalyticsSummary, StreakSummary,
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::api::{api_error, ApiError, AppState};
use crate::metrics::record_request;

/// Body shared by every report endpoint. Bets come from the caller; the
/// saved filter (if any) runs first, then the inline filters.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub bets: Vec<Bet>,
    #[serde(default)]
    pub filters: Vec<Predicate>,
    pub saved_filter_id: Option<String>,
    pub confidence_level: Option<ConfidenceLevel>,
}

#[derive(Debug, Deserialize)]
pub struct BreakdownParams {
    pub by: String,
}

fn select_bets(state: &AppState, req: &ReportRequest) -> Result<Vec<Bet>, ApiError> {
    let base = match &req.saved_filter_id {
        Some(id) => state.registry.apply_saved(id, &req.bets).ok_or_else(|| {
            api_error(StatusCode::NOT_FOUND, format!("saved filter not found: {id}"))
        })?,
        None => req.bets.clone(),
    };
    Ok(apply_filters(&base, &req.filters))
}

pub async fn filter_bets(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReportRequest>,
) -> Result<Json<Vec<Bet>>, ApiError> {
    let selected = select_bets(&state, &req)?;
    record_request("filter", selected.len());
    info!(
        input = req.bets.len(),
        kept = selected.len(),
        filters = %describe_filters(&req.filters),
        saved_filter = req.saved_filter_id.as_deref().unwrap_or("-"),
        "bets filtered"
    );
    Ok(Json(selected))
}

pub async fn pro_summary(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReportRequest>,
) -> Result<Json<ProAnalyticsSummary>, ApiError> {
    let selected = select_bets(&state, &req)?;
    let level = req.confidence_level.unwrap_or(state.confidence_level);
    let summary = calculate_pro_tier_analytics(&selected, level);
    record_request("pro", selected.len());
    info!(
        bets = selected.len(),
        settled = summary.total_bets,
        roi = summary.roi,
        confidence = level.as_fraction(),
        "pro summary computed"
    );
    Ok(Json(summary))
}

pub async fn basic_summary(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReportRequest>,
) -> Result<Json<BasicAnalyticsSummary>, ApiError> {
    let selected = select_bets(&state, &req)?;
    record_request("basic", selected.len());
    Ok(Json(calculate_basic_tier_analytics(&selected)))
}

pub async fn breakdown(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BreakdownParams>,
    Json(req): Json<ReportRequest>,
) -> Result<Json<Vec<BreakdownRow>>, ApiError> {
    let dimension: Dimension = params
        .by
        .parse()
        .map_err(|e: AnalyticsError| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;
    let selected = select_bets(&state, &req)?;
    record_request("breakdown", selected.len());
    Ok(Json(calculate_breakdown(&selected, dimension)))
}

pub async fn streaks(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReportRequest>,
) -> Result<Json<StreakSummary>, ApiError> {
    let selected = select_bets(&state, &req)?;
    record_request("streaks", selected.len());
    Ok(Json(calculate_streaks(&selected)))
}

pub async fn clv_summary(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReportRequest>,
) -> Result<Json<ClvSummary>, ApiError> {
    let selected = select_bets(&state, &req)?;
    record_request("clv", selected.len());
    Ok(Json(calculate_clv_summary(&selected)))
}
