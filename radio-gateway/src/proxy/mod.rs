//! Stream proxy engine.
//!
//! Opens a connection to a station's broadcast server and relays the audio
//! body to the client. Each proxied connection is a [`StreamSession`]: a copy
//! task that moves bytes through a 32 KiB buffer, and a supervisor that owns
//! it, watches for client disconnect, and settles the metrics once.
//!
//! Client disconnect is propagated into the copy task, which stops reading
//! from upstream and drops the upstream connection.

mod content_type;
mod error;
mod relay;
mod session;
mod upstream;

pub use content_type::{DEFAULT_CONTENT_TYPE, negotiate_content_type};
pub use error::ProxyError;
pub use relay::{RELAY_BUFFER_SIZE, RelayOutcome, relay};
pub use session::{ClientBody, StreamSession};
pub use upstream::{ICY_USER_AGENT, UpstreamBody, UpstreamClient, UpstreamStream};
