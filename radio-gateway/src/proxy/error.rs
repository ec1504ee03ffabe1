//! Stream proxy error types.

/// Errors raised before streaming starts.
///
/// Failures after the first byte are reported through
/// [`RelayOutcome::Failed`](super::RelayOutcome::Failed) instead, since the
/// response status has already been sent by then.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Upstream broadcast server could not be reached
    #[error("failed to connect to stream: {0}")]
    Connect(#[source] reqwest::Error),
}
