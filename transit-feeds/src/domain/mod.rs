//! Domain types for transit feeds.
//!
//! Values here are validated at construction time, so the provider and
//! feed layers can pass them around without re-checking bounds.

mod error;
mod request;
mod station;

pub use error::DomainError;
pub use request::{DestinationFilter, FeedRequest, FilterType, RowCount, TimeWindow};
pub use station::{Crs, InvalidCrs};
