//! Active-stream gauge guard.

use std::sync::Arc;

use super::MetricsSink;

/// Holds one unit of the active-stream gauge.
///
/// Creating the guard increments the gauge; dropping it decrements it.
/// Every exit path out of streaming, including a panic in the relay,
/// therefore releases the gauge exactly once.
pub struct ActiveStreamGuard {
    metrics: Arc<dyn MetricsSink>,
}

impl ActiveStreamGuard {
    /// Enter the streaming state.
    pub fn enter(metrics: Arc<dyn MetricsSink>) -> Self {
        metrics.active_streams_add(1);
        Self { metrics }
    }
}

impl Drop for ActiveStreamGuard {
    fn drop(&mut self) {
        self.metrics.active_streams_add(-1);
    }
}
