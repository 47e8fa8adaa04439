//! Prometheus metrics for authorization decisions.
//!
//! Counters emitted by the pipeline:
//!
//! - `authz_decisions_total{outcome, code}` - one per pipeline run
//! - `auth_success_total{method}` - successful token validations
//! - `auth_errors_total{error_type}` - denials rendered as HTTP responses

use metrics::describe_counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::config::MetricsConfig;

/// Install the Prometheus recorder. Returns `None` when metrics are disabled.
pub fn init_metrics(config: &MetricsConfig) -> anyhow::Result<Option<PrometheusHandle>> {
    if !config.enabled {
        return Ok(None);
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    register_metric_descriptions();

    tracing::info!("Metrics initialized");
    Ok(Some(handle))
}

/// Register all metric descriptions.
fn register_metric_descriptions() {
    describe_counter!(
        "authz_decisions_total",
        "Authorization pipeline decisions by outcome and denial code"
    );
    describe_counter!(
        "auth_success_total",
        "Successfully validated bearer tokens"
    );
    describe_counter!(
        "auth_errors_total",
        "Authorization denials returned to clients"
    );
}
