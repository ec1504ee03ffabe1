//! Internet radio gateway.
//!
//! Lists the stations of an upstream directory and relays their live
//! audio streams to clients, recording request and stream metrics.

pub mod config;
pub mod directory;
pub mod metrics;
pub mod proxy;
pub mod web;
