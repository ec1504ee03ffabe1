//! Upstream-to-client copy loop.

use std::io;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufWriter};
use tokio_util::sync::CancellationToken;

/// Size of the client write buffer.
pub const RELAY_BUFFER_SIZE: usize = 32 * 1024;

/// How a relay ended. Exactly one outcome is produced per relay.
#[derive(Debug)]
pub enum RelayOutcome {
    /// Upstream body ended and every byte was flushed to the client.
    Completed { bytes: u64 },
    /// First I/O failure on either side.
    Failed(io::Error),
    /// Client went away; upstream reading was abandoned.
    Cancelled,
}

/// Copy `upstream` into `client` through a [`RELAY_BUFFER_SIZE`] buffer.
///
/// Bytes are copied sequentially, so order is preserved exactly. When
/// `cancel` fires the copy is dropped mid-flight, which releases the
/// upstream reader. A write error seen after cancellation counts as
/// cancellation, not failure.
pub async fn relay<R, W>(mut upstream: R, client: W, cancel: CancellationToken) -> RelayOutcome
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut writer = BufWriter::with_capacity(RELAY_BUFFER_SIZE, client);

    let copy = async {
        let bytes = tokio::io::copy(&mut upstream, &mut writer).await?;
        writer.flush().await?;
        writer.shutdown().await?;
        Ok::<_, io::Error>(bytes)
    };

    tokio::select! {
        biased;
        _ = cancel.cancelled() => RelayOutcome::Cancelled,
        result = copy => match result {
            Ok(bytes) => RelayOutcome::Completed { bytes },
            Err(_) if cancel.is_cancelled() => RelayOutcome::Cancelled,
            Err(e) => RelayOutcome::Failed(e),
        },
    }
}
