//! Operational metrics.
//!
//! The proxy records observations through the [`MetricsSink`] trait rather
//! than touching process-wide globals. [`PrometheusMetrics`] backs the
//! `/metrics` endpoint; [`RecordingMetrics`] records observations in memory
//! for tests.

mod guard;
mod registry;
mod recording;

use std::time::Duration;

pub use self::guard::ActiveStreamGuard;
pub use self::registry::PrometheusMetrics;
pub use self::recording::RecordingMetrics;

/// Errors from rendering metrics.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Metric registration or encoding failed
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),

    /// Encoded output was not valid UTF-8
    #[error("metrics output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Counter and gauge capabilities consumed by the stream proxy.
///
/// Implementations must be safe for concurrent use from many requests.
pub trait MetricsSink: Send + Sync {
    /// Count one stream request for the named station.
    fn station_requested(&self, station: &str);

    /// Count one stream failure (connect or mid-stream).
    fn stream_failed(&self);

    /// Adjust the active-stream gauge by `delta`.
    fn active_streams_add(&self, delta: i64);

    /// Record how long a request to `endpoint` took.
    fn observe_latency(&self, endpoint: &str, elapsed: Duration);

    /// Render the current values in a text exposition format, if supported.
    fn render(&self) -> Option<Result<String, MetricsError>> {
        None
    }
}
