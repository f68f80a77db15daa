mod api;
mod metrics;

use analytics::FilterRegistry;
use anyhow::{Context, Result};
use common::config::Config;
use std::sync::Arc;
use tracing::info;

/// Loads configured saved filters into a fresh registry.
fn seeded_registry(config: &Config) -> FilterRegistry {
    let registry = FilterRegistry::new();
    for seed in &config.saved_filters {
        registry.save_filter(
            seed.id.clone(),
            seed.name.clone(),
            seed.filters.clone(),
            seed.description.clone(),
        );
    }
    registry
}

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(Config::default_config_path);
    let config = Config::load(&config_path)?;

    let (dispatch, _otel_guard) =
        common::observability::build_dispatch("betstats", &config.general.log_level);
    tracing::dispatcher::set_global_default(dispatch).map_err(anyhow::Error::msg)?;

    info!(path = %config_path, "betstats server starting");

    let prometheus = metrics::init_global()?;
    let registry = seeded_registry(&config);
    metrics::record_registry_size(registry.len());
    info!(
        saved_filters = registry.len(),
        confidence = config.analytics.confidence_level.as_fraction(),
        "analytics engine ready"
    );

    let state = Arc::new(api::AppState {
        registry,
        confidence_level: config.analytics.confidence_level,
        metrics: prometheus,
        started_at: chrono::Utc::now(),
        api_key: config.server.api_key.clone(),
        max_body_bytes: config.server.max_body_bytes,
    });
    let app = api::router(state);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    info!(addr = %bind_addr, "starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
