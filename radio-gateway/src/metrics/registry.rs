//! Prometheus-backed metrics sink.

use std::time::Duration;

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

use super::{MetricsError, MetricsSink};

/// Metrics sink that records into a private Prometheus registry.
#[derive(Clone)]
pub struct PrometheusMetrics {
    registry: Registry,
    station_requests: IntCounterVec,
    api_latency: HistogramVec,
    stream_errors: IntCounter,
    active_streams: IntGauge,
}

impl PrometheusMetrics {
    /// Create and register the gateway's metrics.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let station_requests = IntCounterVec::new(
            Opts::new(
                "radio_station_requests_total",
                "The total number of requests per station",
            ),
            &["station"],
        )?;
        let api_latency = HistogramVec::new(
            HistogramOpts::new("radio_api_latency_seconds", "The latency of API requests"),
            &["endpoint"],
        )?;
        let stream_errors = IntCounter::new(
            "radio_stream_errors_total",
            "The total number of streaming errors",
        )?;
        let active_streams = IntGauge::new(
            "radio_active_streams",
            "The number of currently active streams",
        )?;

        registry.register(Box::new(station_requests.clone()))?;
        registry.register(Box::new(api_latency.clone()))?;
        registry.register(Box::new(stream_errors.clone()))?;
        registry.register(Box::new(active_streams.clone()))?;

        Ok(Self {
            registry,
            station_requests,
            api_latency,
            stream_errors,
            active_streams,
        })
    }

    /// Encode every registered metric in the Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

impl MetricsSink for PrometheusMetrics {
    fn station_requested(&self, station: &str) {
        self.station_requests.with_label_values(&[station]).inc();
    }

    fn stream_failed(&self) {
        self.stream_errors.inc();
    }

    fn active_streams_add(&self, delta: i64) {
        self.active_streams.add(delta);
    }

    fn observe_latency(&self, endpoint: &str, elapsed: Duration) {
        self.api_latency
            .with_label_values(&[endpoint])
            .observe(elapsed.as_secs_f64());
    }

    fn render(&self) -> Option<Result<String, MetricsError>> {
        Some(self.encode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exposes_recorded_values() {
        let metrics = PrometheusMetrics::new().unwrap();
        metrics.station_requested("kexp");
        metrics.station_requested("kexp");
        metrics.stream_failed();
        metrics.active_streams_add(1);
        metrics.observe_latency("/stream", Duration::from_millis(20));

        let text = metrics.encode().unwrap();
        assert!(text.contains(r#"radio_station_requests_total{station="kexp"} 2"#));
        assert!(text.contains("radio_stream_errors_total 1"));
        assert!(text.contains("radio_active_streams 1"));
        assert!(text.contains(r#"radio_api_latency_seconds_count{endpoint="/stream"} 1"#));
    }

    #[test]
    fn instances_do_not_share_state() {
        let first = PrometheusMetrics::new().unwrap();
        let second = PrometheusMetrics::new().unwrap();
        first.stream_failed();

        assert!(second.encode().unwrap().contains("radio_stream_errors_total 0"));
    }
}
