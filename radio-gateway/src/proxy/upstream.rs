//! Upstream broadcast server connection.

use std::io;
use std::pin::Pin;

use futures::TryStreamExt;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;
use tracing::{info, warn};

use super::content_type::negotiate_content_type;
use super::error::ProxyError;

/// User agent sent to broadcast servers.
///
/// Many Shoutcast/Icecast servers only emit `icy-*` headers for clients
/// that identify as ICY players.
pub const ICY_USER_AGENT: &str = "ICY/5.0";

/// Response headers logged when a stream opens.
const LOGGED_HEADERS: [&str; 8] = [
    "icy-pub",
    "icy-description",
    "icy-url",
    "icy-name",
    "icy-genre",
    "icy-br",
    "icy-metaint",
    "content-type",
];

/// Upstream audio body as a byte reader.
pub type UpstreamBody = Pin<Box<dyn AsyncRead + Send>>;

/// An open upstream stream, ready to be relayed.
pub struct UpstreamStream {
    /// Content type to advertise to the client
    pub content_type: HeaderValue,
    /// Audio body
    pub body: UpstreamBody,
}

/// HTTP client for broadcast servers.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
}

impl UpstreamClient {
    /// Create a new upstream client.
    ///
    /// No request timeout is set: streams are expected to stay open
    /// indefinitely.
    pub fn new() -> Result<Self, ProxyError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(ProxyError::Client)?;

        Ok(Self { http })
    }

    /// Open the audio stream at `url`.
    ///
    /// The upstream status code is not checked; whatever body the server
    /// returns is relayed.
    pub async fn open(&self, url: &str) -> Result<UpstreamStream, ProxyError> {
        let response = self
            .http
            .get(url)
            .header("Icy-MetaData", "1")
            .header(USER_AGENT, ICY_USER_AGENT)
            .send()
            .await
            .map_err(ProxyError::Connect)?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, url, "upstream returned non-success status");
        }

        log_stream_headers(response.headers());
        let content_type = negotiate_content_type(response.headers());

        let body = response.bytes_stream().map_err(io::Error::other);

        Ok(UpstreamStream {
            content_type,
            body: Box::pin(StreamReader::new(body)),
        })
    }
}

/// Log the informational stream headers that are present.
fn log_stream_headers(headers: &HeaderMap) {
    for name in LOGGED_HEADERS {
        if let Some(value) = headers.get(name).filter(|v| !v.is_empty()) {
            info!(header = name, value = ?value, "stream header");
        }
    }
}
