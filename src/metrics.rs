use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus exporter and register all application metrics.
/// Returns a `PrometheusHandle` whose `render()` method produces the
/// text/plain Prometheus scrape payload. Safe to call more than once; the
/// recorder is installed on the first call only.
pub fn init_metrics() -> PrometheusHandle {
    HANDLE
        .get_or_init(|| {
            let handle = PrometheusBuilder::new()
                .install_recorder()
                .expect("failed to install Prometheus recorder");

            // Pre-register counters so they appear even before the first increment.
            counter!("blocks_enriched_total").absolute(0);
            counter!("block_enrich_failures_total").absolute(0);
            counter!("address_resolution_failures_total").absolute(0);
            counter!("tx_utxo_failures_total").absolute(0);
            counter!("poll_ticks_total").absolute(0);
            counter!("tip_fetch_failures_total").absolute(0);
            counter!("broadcasts_total").absolute(0);
            counter!("viewers_pruned_total").absolute(0);

            gauge!("viewers_connected").set(0.0);
            gauge!("last_broadcast_height").set(0.0);

            histogram!("block_enrich_latency_seconds").record(0.0);

            handle
        })
        .clone()
}
