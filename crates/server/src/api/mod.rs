pub mod filters;
pub mod reports;

use analytics::{ConfidenceLevel, FilterRegistry};
use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared application state available to all handlers.
pub struct AppState {
    pub registry: FilterRegistry,
    pub confidence_level: ConfidenceLevel,
    pub metrics: PrometheusHandle,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub api_key: Option<String>,
    pub max_body_bytes: usize,
}

#[derive(Serialize)]
pub(crate) struct MessageResponse {
    pub message: String,
}

pub(crate) type ApiError = (StatusCode, Json<MessageResponse>);

pub(crate) fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(MessageResponse {
            message: message.into(),
        }),
    )
}

pub fn router(state: Arc<AppState>) -> Router {
    let public = Router::new()
        .route("/api/health", get(health))
        .route("/metrics", get(render_metrics));

    let protected = Router::new()
        .route("/api/bets/filter", post(reports::filter_bets))
        .route("/api/analytics/pro", post(reports::pro_summary))
        .route("/api/analytics/basic", post(reports::basic_summary))
        .route("/api/analytics/breakdown", post(reports::breakdown))
        .route("/api/analytics/streaks", post(reports::streaks))
        .route("/api/analytics/clv", post(reports::clv_summary))
        .route("/api/filters", get(filters::list_filters))
        .route(
            "/api/filters/{id}",
            get(filters::get_filter)
                .put(filters::save_filter)
                .delete(filters::delete_filter),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    public
        .merge(protected)
        .layer(DefaultBodyLimit::max(state.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bearer token auth. Skipped when no api_key is configured.
async fn auth_middleware(State(state): State<Arc<AppState>>, req: Request, next: Next) -> Response {
    let Some(api_key) = &state.api_key else {
        return next.run(req).await;
    };

    let token = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    match token {
        Some(token) if constant_time_eq(token.as_bytes(), api_key.as_bytes()) => {
            next.run(req).await
        }
        _ => StatusCode::UNAUTHORIZED.into_response(),
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |diff, (x, y)| diff | (x ^ y)) == 0
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_secs: i64,
    saved_filters: usize,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let uptime = chrono::Utc::now()
        .signed_duration_since(state.started_at)
        .num_seconds();

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: uptime,
        saved_filters: state.registry.len(),
    })
}

async fn render_metrics(State(state): State<Arc<AppState>>) -> String {
    state.metrics.run_upkeep();
    state.metrics.render()
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use axum::body::Body;
    use metrics_exporter_prometheus::PrometheusBuilder;

    pub fn state_with_key(api_key: Option<&str>) -> Arc<AppState> {
        Arc::new(AppState {
            registry: FilterRegistry::new(),
            confidence_level: ConfidenceLevel::P95,
            metrics: PrometheusBuilder::new().build_recorder().handle(),
            started_at: chrono::Utc::now(),
            api_key: api_key.map(str::to_string),
            max_body_bytes: 1024 * 1024,
        })
    }

    pub fn test_app() -> (Router, Arc<AppState>) {
        let state = state_with_key(None);
        (router(Arc::clone(&state)), state)
    }

    pub fn json_request(
        method: &str,
        uri: &str,
        body: &serde_json::Value,
    ) -> axum::http::Request<Body> {
        axum::http::Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}
