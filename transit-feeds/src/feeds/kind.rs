//! Feed kinds and their polling policy.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::domain::FeedRequest;

/// Rail departure and arrival boards.
pub const RAIL_POLL_INTERVAL: Duration = Duration::from_secs(120);

/// Line status changes slowly and TfL rate-limits it hardest.
pub const LINE_STATUS_POLL_INTERVAL: Duration = Duration::from_secs(300);

/// Bus predictions move every minute.
pub const BUS_STOP_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Same upstream and volatility as line status.
pub const DISRUPTION_POLL_INTERVAL: Duration = Duration::from_secs(300);

/// What a feed fetches. Each variant carries only what its fetch needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedKind {
    /// A departure board, optionally filtered to one destination.
    Departures { request: FeedRequest },
    /// An arrival board.
    Arrivals { request: FeedRequest },
    /// Status of a set of TfL lines.
    LineStatus { lines: Vec<String> },
    /// Arrival predictions at one bus stop.
    BusStop { stop_id: String },
    /// Disruptions across a set of TfL modes.
    Disruptions { modes: Vec<String> },
}

impl FeedKind {
    /// Fixed polling interval for this kind.
    pub fn poll_interval(&self) -> Duration {
        match self {
            FeedKind::Departures { .. } | FeedKind::Arrivals { .. } => RAIL_POLL_INTERVAL,
            FeedKind::LineStatus { .. } => LINE_STATUS_POLL_INTERVAL,
            FeedKind::BusStop { .. } => BUS_STOP_POLL_INTERVAL,
            FeedKind::Disruptions { .. } => DISRUPTION_POLL_INTERVAL,
        }
    }

    /// Short label for logs and the read API.
    pub fn label(&self) -> &'static str {
        match self {
            FeedKind::Departures { .. } => "departures",
            FeedKind::Arrivals { .. } => "arrivals",
            FeedKind::LineStatus { .. } => "line_status",
            FeedKind::BusStop { .. } => "bus_stop",
            FeedKind::Disruptions { .. } => "disruptions",
        }
    }

    /// Whether this feed goes through the unified train client.
    pub fn is_rail(&self) -> bool {
        matches!(self, FeedKind::Departures { .. } | FeedKind::Arrivals { .. })
    }

    /// Stable identifier derived from the feed's parameters.
    pub fn id(&self) -> FeedId {
        let id = match self {
            FeedKind::Departures { request } => match request.filter() {
                Some(filter) => format!(
                    "train_departures_{}_{}_{}",
                    request.station(),
                    filter.direction,
                    filter.crs
                ),
                None => format!("train_departures_{}", request.station()),
            },
            FeedKind::Arrivals { request } => match request.filter() {
                Some(filter) => format!(
                    "train_arrivals_{}_{}_{}",
                    request.station(),
                    filter.direction,
                    filter.crs
                ),
                None => format!("train_arrivals_{}", request.station()),
            },
            FeedKind::LineStatus { lines } => format!("line_status_{}", lines.join("_")),
            FeedKind::BusStop { stop_id } => format!("bus_arrivals_{stop_id}"),
            FeedKind::Disruptions { modes } => format!("disruptions_{}", modes.join("_")),
        };
        FeedId(id)
    }
}

/// Identifier of one registered feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct FeedId(String);

impl FeedId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
