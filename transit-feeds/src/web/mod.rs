//! Read-only JSON surface over the running feeds.
//!
//! Exposes each feed's snapshot, status and last error, plus two
//! pass-through lookups (station search, stop-point info). Nothing here
//! can trigger a refresh.

mod dto;
mod routes;
mod state;


pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
