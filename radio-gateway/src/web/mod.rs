//! Web layer for the radio gateway.
//!
//! Provides HTTP endpoints for listing stations and relaying streams.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
