//! Directory error types.

/// Errors that can occur when fetching the station directory.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// Transport-level failure (DNS, connection refused, timeout, body read)
    #[error("failed to fetch stations: {0}")]
    Fetch(#[from] reqwest::Error),

    /// Payload was not a JSON array of stations
    #[error("failed to parse stations: {message}")]
    Parse { message: String },
}
