use std::fmt;
use std::net::SocketAddr;

use tracing::{info, warn};

/// Every metric the API records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    RequestsUnauthorized,
    RequestsStoreUnavailable,
    NotesCreated,
    ChatGenerationsSucceeded,
    ChatGenerationsFailed,
    DirectoryMutations,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::RequestsUnauthorized => "zenith_requests_unauthorized_total",
            MetricName::RequestsStoreUnavailable => "zenith_requests_store_unavailable_total",
            MetricName::NotesCreated => "zenith_notes_created_total",
            MetricName::ChatGenerationsSucceeded => "zenith_chat_generations_success_total",
            MetricName::ChatGenerationsFailed => "zenith_chat_generations_error_total",
            MetricName::DirectoryMutations => "zenith_directory_mutations_total",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Increment a counter by one
pub fn record(name: MetricName) {
    ::metrics::counter!(name.as_str()).increment(1);
}

/// Install the Prometheus exporter on `port`. Install failures are logged.
pub fn init_metrics(port: u16) {
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    let builder = metrics_exporter_prometheus::PrometheusBuilder::new().with_http_listener(addr);
    match builder.install() {
        Ok(()) => info!("Prometheus exporter listening on http://{}/metrics", addr),
        Err(e) => warn!("Prometheus exporter install failed: {}", e),
    }
}
