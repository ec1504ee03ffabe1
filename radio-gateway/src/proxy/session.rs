//! One proxied stream, from first byte to teardown.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, ready};
use std::time::Instant;

use bytes::Bytes;
use futures::Stream;
use tokio::io::DuplexStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::io::ReaderStream;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{error, info};

use super::relay::{RELAY_BUFFER_SIZE, RelayOutcome, relay};
use super::upstream::UpstreamBody;
use crate::metrics::{ActiveStreamGuard, MetricsSink};

/// Response body handed to the HTTP server for one stream.
///
/// Dropping the body (the server does this when the client disconnects)
/// fires the session's disconnect signal. If the relay fails, the body
/// ends with an error instead of a clean end-of-stream, so the server
/// aborts the chunked response rather than completing it.
pub struct ClientBody {
    // Declared first so the disconnect fires before the pipe closes.
    _disconnect: DropGuard,
    inner: ReaderStream<DuplexStream>,
    failure: Option<oneshot::Receiver<io::Error>>,
}

impl Stream for ClientBody {
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if let Some(item) = ready!(Pin::new(&mut this.inner).poll_next(cx)) {
            return Poll::Ready(Some(item));
        }

        // Pipe closed: wait for the session to say whether that was a
        // clean end or a failure.
        let Some(failure) = this.failure.as_mut() else {
            return Poll::Ready(None);
        };
        let result = ready!(Pin::new(failure).poll(cx));
        this.failure = None;
        Poll::Ready(result.ok().map(Err))
    }
}

/// A live stream between one upstream and one client.
///
/// Owns the copy task and the active-stream gauge for its lifetime.
pub struct StreamSession {
    station: String,
    metrics: Arc<dyn MetricsSink>,
    latency: Option<(&'static str, Instant)>,
}

impl StreamSession {
    /// Create a session for `station`.
    pub fn new(station: impl Into<String>, metrics: Arc<dyn MetricsSink>) -> Self {
        Self {
            station: station.into(),
            metrics,
            latency: None,
        }
    }

    /// Record the latency of `endpoint`, measured from `started`, when the
    /// session settles.
    pub fn timed(mut self, endpoint: &'static str, started: Instant) -> Self {
        self.latency = Some((endpoint, started));
        self
    }

    /// Enter the streaming state and start relaying `upstream`.
    ///
    /// Returns the body to send to the client and a handle that resolves
    /// once the session has fully settled: copy task finished, metrics
    /// and latency recorded, gauge released.
    pub fn start(self, upstream: UpstreamBody) -> (ClientBody, JoinHandle<RelayOutcome>) {
        let gauge = ActiveStreamGuard::enter(self.metrics.clone());

        let (writer, reader) = tokio::io::duplex(RELAY_BUFFER_SIZE);
        let disconnect = CancellationToken::new();
        let (failure_tx, failure_rx) = oneshot::channel();

        let body = ClientBody {
            _disconnect: disconnect.clone().drop_guard(),
            inner: ReaderStream::with_capacity(reader, RELAY_BUFFER_SIZE),
            failure: Some(failure_rx),
        };

        let copy = tokio::spawn(relay(upstream, writer, disconnect.clone()));
        let supervisor = tokio::spawn(self.supervise(copy, disconnect, failure_tx, gauge));

        (body, supervisor)
    }

    /// Wait for the first of {relay error, client disconnect, completion}
    /// and settle the session accordingly.
    async fn supervise(
        self,
        mut copy: JoinHandle<RelayOutcome>,
        disconnect: CancellationToken,
        failure_tx: oneshot::Sender<io::Error>,
        gauge: ActiveStreamGuard,
    ) -> RelayOutcome {
        let outcome = tokio::select! {
            biased;
            joined = &mut copy => flatten(joined),
            _ = disconnect.cancelled() => {
                // The copy task watches the same token; wait for it to
                // release the upstream connection.
                let _ = copy.await;
                RelayOutcome::Cancelled
            }
        };

        match &outcome {
            RelayOutcome::Completed { bytes } => {
                info!(station = %self.station, bytes, "stream completed");
            }
            RelayOutcome::Failed(e) => {
                error!(station = %self.station, error = %e, "stream error");
                self.metrics.stream_failed();
                let _ = failure_tx.send(io::Error::new(e.kind(), e.to_string()));
            }
            RelayOutcome::Cancelled => {
                info!(station = %self.station, "stream cancelled by client");
            }
        }

        if let Some((endpoint, started)) = self.latency {
            self.metrics.observe_latency(endpoint, started.elapsed());
        }

        drop(gauge);
        outcome
    }
}

/// Treat a panicked copy task as a failed relay.
fn flatten(joined: Result<RelayOutcome, tokio::task::JoinError>) -> RelayOutcome {
    joined.unwrap_or_else(|e| RelayOutcome::Failed(io::Error::other(e)))
}
