//! Station directory client and name lookup.
//!
//! The directory is an upstream JSON endpoint listing every station the
//! gateway can relay. It is fetched fresh for every request and never cached.

mod client;
mod error;
mod resolve;

pub use client::{DirectoryClient, DirectoryClientConfig, Station, StationSummary};
pub use error::DirectoryError;
pub use resolve::resolve_by_name;
