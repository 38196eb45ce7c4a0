//! Independently scheduled feeds with last-good caching.
//!
//! Each feed is one [`FeedCoordinator`] polling one upstream on its own
//! timer. A failed poll is recorded against that feed only; the snapshot
//! it already holds keeps being served.

mod coordinator;
mod error;
mod kind;
mod registry;
mod state;

pub use coordinator::{FeedCoordinator, FeedHandle, FeedReader, FeedSources};
pub use error::FeedError;
pub use kind::{
    BUS_STOP_POLL_INTERVAL, DISRUPTION_POLL_INTERVAL, FeedId, FeedKind, LINE_STATUS_POLL_INTERVAL,
    RAIL_POLL_INTERVAL,
};
pub use registry::{FeedPlan, FeedRegistry, MAX_DESTINATIONS};
pub use state::{FeedState, FeedStatus};
