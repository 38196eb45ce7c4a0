//! Per-feed cached state.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::providers::Payload;
use crate::train::SourceTag;

use super::error::FeedError;

/// Health of a feed as seen by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedStatus {
    /// No successful fetch yet. Consumers have nothing to show.
    Uninitialized,
    /// Latest poll succeeded.
    Ready,
    /// Latest poll failed; the previous snapshot is still served.
    Degraded,
}

/// Last-good snapshot plus the outcome of the most recent poll.
///
/// A failed poll never replaces the snapshot: it only records the error
/// and the time it happened.
#[derive(Debug, Clone)]
pub struct FeedState {
    snapshot: Option<Payload>,
    source: Option<SourceTag>,
    last_updated: Option<DateTime<Utc>>,
    last_success: Option<DateTime<Utc>>,
    last_error: Option<FeedError>,
    poll_interval: Duration,
}

impl FeedState {
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            snapshot: None,
            source: None,
            last_updated: None,
            last_success: None,
            last_error: None,
            poll_interval,
        }
    }

    pub fn status(&self) -> FeedStatus {
        match (&self.snapshot, &self.last_error) {
            (None, _) => FeedStatus::Uninitialized,
            (Some(_), None) => FeedStatus::Ready,
            (Some(_), Some(_)) => FeedStatus::Degraded,
        }
    }

    /// The most recent successfully fetched payload.
    pub fn snapshot(&self) -> Option<&Payload> {
        self.snapshot.as_ref()
    }

    /// Error from the most recent poll, if it failed.
    pub fn last_error(&self) -> Option<&FeedError> {
        self.last_error.as_ref()
    }

    /// When the most recent poll finished, successful or not.
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    /// When the current snapshot was fetched.
    pub fn last_success(&self) -> Option<DateTime<Utc>> {
        self.last_success
    }

    /// Which rail provider supplied the current snapshot. `None` for
    /// non-rail feeds and before the first success.
    pub fn source(&self) -> Option<SourceTag> {
        self.source
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Whether the snapshot is older than one polling interval.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        let Some(fetched) = self.last_success else {
            return false;
        };
        let interval = chrono::Duration::from_std(self.poll_interval)
            .unwrap_or(chrono::Duration::MAX);
        now.signed_duration_since(fetched) > interval
    }

    pub(crate) fn record_success(
        &mut self,
        payload: Payload,
        source: Option<SourceTag>,
        at: DateTime<Utc>,
    ) {
        self.snapshot = Some(payload);
        self.source = source;
        self.last_updated = Some(at);
        self.last_success = Some(at);
        self.last_error = None;
    }

    pub(crate) fn record_failure(&mut self, error: FeedError, at: DateTime<Utc>) {
        self.last_updated = Some(at);
        self.last_error = Some(error);
    }
}
