use anyhow::Result;
use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

pub const REQUESTS_TOTAL: &str = "betstats_requests_total";
pub const BETS_EVALUATED_TOTAL: &str = "betstats_bets_evaluated_total";
pub const SAVED_FILTERS: &str = "betstats_saved_filters";

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub fn describe() {
    describe_counter!(
        REQUESTS_TOTAL,
        "Analytics API requests handled, labelled by endpoint."
    );
    describe_counter!(
        BETS_EVALUATED_TOTAL,
        "Bets selected by a request's filters and passed to its report."
    );
    describe_gauge!(SAVED_FILTERS, "Entries currently held in the saved filter registry.");
}

pub fn record_request(endpoint: &'static str, bets: usize) {
    ::metrics::counter!(REQUESTS_TOTAL, "endpoint" => endpoint).increment(1);
    ::metrics::counter!(BETS_EVALUATED_TOTAL).increment(bets as u64);
}

pub fn record_registry_size(len: usize) {
    ::metrics::gauge!(SAVED_FILTERS).set(len as f64);
}

/// Install the global Prometheus recorder once and return the handle that renders `/metrics`.
///
/// Upkeep is run from the `/metrics` handler rather than a background task.
pub fn init_global() -> Result<PrometheusHandle> {
    if let Some(handle) = PROM_HANDLE.get() {
        return Ok(handle.clone());
    }
    describe();
    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROM_HANDLE.set(handle.clone());
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_counters_render() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        ::metrics::with_local_recorder(&recorder, || {
            describe();
            record_request("pro", 12);
            record_registry_size(3);
        });

        let rendered = handle.render();
        assert!(rendered.contains(REQUESTS_TOTAL));
        assert!(rendered.contains("endpoint=\"pro\""));
        assert!(rendered.contains(BETS_EVALUATED_TOTAL));
        assert!(rendered.contains(SAVED_FILTERS));
    }
}
