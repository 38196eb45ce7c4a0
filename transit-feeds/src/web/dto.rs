//! Data transfer objects for the read API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::feeds::{FeedHandle, FeedId, FeedState, FeedStatus};
use crate::train::SourceTag;

/// Query for station search.
#[derive(Debug, Deserialize)]
pub struct StationSearchRequest {
    /// Free-text station name
    #[serde(default)]
    pub q: String,
}

/// One feed without its snapshot.
#[derive(Debug, Serialize)]
pub struct FeedSummary {
    pub id: FeedId,
    pub kind: &'static str,
    pub status: FeedStatus,
    /// True when the snapshot is older than one poll interval
    pub stale: bool,
    pub poll_interval_secs: u64,
    pub last_updated: Option<DateTime<Utc>>,
    pub last_success: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    /// Rail feeds only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceTag>,
}

/// Response for `GET /feeds`.
#[derive(Debug, Serialize)]
pub struct FeedListResponse {
    pub feeds: Vec<FeedSummary>,
}

/// Response for `GET /feeds/{id}`.
#[derive(Debug, Serialize)]
pub struct FeedDetail {
    #[serde(flatten)]
    pub summary: FeedSummary,
    /// Last good payload, exactly as the provider returned it
    pub snapshot: Option<Value>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

impl FeedSummary {
    pub fn from_handle(feed: &FeedHandle, now: DateTime<Utc>) -> Self {
        Self::from_state(feed, &feed.reader().state(), now)
    }

    fn from_state(feed: &FeedHandle, state: &FeedState, now: DateTime<Utc>) -> Self {
        Self {
            id: feed.id().clone(),
            kind: feed.kind().label(),
            status: state.status(),
            stale: state.is_stale(now),
            poll_interval_secs: state.poll_interval().as_secs(),
            last_updated: state.last_updated(),
            last_success: state.last_success(),
            last_error: state.last_error().map(ToString::to_string),
            source: feed.reader().last_source_used(),
        }
    }
}

impl FeedDetail {
    pub fn from_handle(feed: &FeedHandle, now: DateTime<Utc>) -> Self {
        let state = feed.reader().state();
        Self {
            summary: FeedSummary::from_state(feed, &state, now),
            snapshot: state.snapshot().map(|p| Value::clone(p)),
        }
    }
}
