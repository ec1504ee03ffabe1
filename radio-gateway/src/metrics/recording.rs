//! In-memory metrics sink for tests.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

use super::MetricsSink;

/// Metrics sink that keeps every observation in memory.
///
/// Useful for asserting that a request left the gauge balanced and
/// counted errors exactly once.
#[derive(Debug, Default)]
pub struct RecordingMetrics {
    station_requests: Mutex<HashMap<String, u64>>,
    latencies: Mutex<Vec<(String, Duration)>>,
    stream_errors: AtomicU64,
    active_streams: AtomicI64,
    active_stream_changes: AtomicU64,
}

impl RecordingMetrics {
    /// Requests counted for a station label.
    pub fn station_requests(&self, station: &str) -> u64 {
        self.station_requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(station)
            .copied()
            .unwrap_or(0)
    }

    /// Stream failures counted so far.
    pub fn stream_errors(&self) -> u64 {
        self.stream_errors.load(Ordering::SeqCst)
    }

    /// Current value of the active-stream gauge.
    pub fn active_streams(&self) -> i64 {
        self.active_streams.load(Ordering::SeqCst)
    }

    /// Number of gauge adjustments made, in either direction.
    pub fn active_stream_changes(&self) -> u64 {
        self.active_stream_changes.load(Ordering::SeqCst)
    }

    /// Endpoints for which a latency was observed, in order.
    pub fn latency_endpoints(&self) -> Vec<String> {
        self.latencies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(endpoint, _)| endpoint.clone())
            .collect()
    }
}

impl MetricsSink for RecordingMetrics {
    fn station_requested(&self, station: &str) {
        *self
            .station_requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(station.to_string())
            .or_insert(0) += 1;
    }

    fn stream_failed(&self) {
        self.stream_errors.fetch_add(1, Ordering::SeqCst);
    }

    fn active_streams_add(&self, delta: i64) {
        self.active_streams.fetch_add(delta, Ordering::SeqCst);
        self.active_stream_changes.fetch_add(1, Ordering::SeqCst);
    }

    fn observe_latency(&self, endpoint: &str, elapsed: Duration) {
        self.latencies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((endpoint.to_string(), elapsed));
    }
}
