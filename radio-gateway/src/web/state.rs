//! Application state for the web layer.

use std::sync::Arc;

use crate::directory::DirectoryClient;
use crate::metrics::MetricsSink;
use crate::proxy::UpstreamClient;

/// Shared application state.
///
/// Contains all the services needed to handle requests. The metrics sink
/// is the only state that observes writes from concurrent requests.
#[derive(Clone)]
pub struct AppState {
    /// Station directory client
    pub directory: Arc<DirectoryClient>,

    /// Broadcast server client
    pub upstream: Arc<UpstreamClient>,

    /// Metrics sink
    pub metrics: Arc<dyn MetricsSink>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(
        directory: DirectoryClient,
        upstream: UpstreamClient,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        Self {
            directory: Arc::new(directory),
            upstream: Arc::new(upstream),
            metrics,
        }
    }
}
