//! Builds and owns every configured feed.

use std::collections::HashSet;

use futures::future::join_all;
use tracing::{error, info, warn};

use crate::domain::{Crs, FeedRequest, FilterType, RowCount, TimeWindow};

use super::coordinator::{FeedCoordinator, FeedHandle, FeedSources};
use super::kind::{FeedId, FeedKind};

/// Destination-filtered departure feeds beyond this many are dropped.
/// Each one costs an upstream call per rail poll.
pub const MAX_DESTINATIONS: usize = 5;

/// Which feeds to run, before they become [`FeedKind`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedPlan {
    pub station: Crs,
    pub num_rows: RowCount,
    pub time_window: TimeWindow,
    pub destinations: Vec<Crs>,
    pub lines: Vec<String>,
    pub bus_stops: Vec<String>,
    pub disruption_modes: Vec<String>,
}

impl FeedPlan {
    /// A plan with just the station's own boards.
    pub fn new(station: Crs) -> Self {
        Self {
            station,
            num_rows: RowCount::default(),
            time_window: TimeWindow::default(),
            destinations: Vec::new(),
            lines: Vec::new(),
            bus_stops: Vec::new(),
            disruption_modes: Vec::new(),
        }
    }

    /// Expands the plan into one kind per feed, in registration order:
    /// main departures, per-destination departures, arrivals, line status,
    /// bus stops, disruptions.
    pub fn kinds(&self) -> Vec<FeedKind> {
        let base = FeedRequest::new(self.station, self.num_rows, self.time_window);
        let mut kinds = vec![FeedKind::Departures {
            request: base.clone(),
        }];

        if self.destinations.len() > MAX_DESTINATIONS {
            let dropped: Vec<&str> = self.destinations[MAX_DESTINATIONS..]
                .iter()
                .map(Crs::as_str)
                .collect();
            warn!(
                configured = self.destinations.len(),
                limit = MAX_DESTINATIONS,
                ?dropped,
                "too many destinations, ignoring the rest"
            );
        }
        kinds.extend(
            self.destinations
                .iter()
                .take(MAX_DESTINATIONS)
                .map(|&crs| FeedKind::Departures {
                    request: base.clone().with_filter(crs, FilterType::To),
                }),
        );

        kinds.push(FeedKind::Arrivals { request: base });

        if !self.lines.is_empty() {
            kinds.push(FeedKind::LineStatus {
                lines: self.lines.clone(),
            });
        }
        kinds.extend(self.bus_stops.iter().map(|stop_id| FeedKind::BusStop {
            stop_id: stop_id.clone(),
        }));
        if !self.disruption_modes.is_empty() {
            kinds.push(FeedKind::Disruptions {
                modes: self.disruption_modes.clone(),
            });
        }

        kinds
    }
}

/// The running set of feeds.
pub struct FeedRegistry {
    feeds: Vec<FeedHandle>,
}

impl FeedRegistry {
    /// Creates one coordinator per kind, runs every first fetch, then
    /// starts the poll loops.
    ///
    /// First fetches run concurrently and independently: a feed whose
    /// first fetch panics is left out, and its siblings are unaffected.
    pub async fn start(kinds: Vec<FeedKind>, sources: FeedSources) -> Self {
        let mut seen = HashSet::new();
        let coordinators: Vec<FeedCoordinator> = kinds
            .into_iter()
            .filter(|kind| {
                let fresh = seen.insert(kind.id());
                if !fresh {
                    warn!(feed = %kind.id(), "duplicate feed ignored");
                }
                fresh
            })
            .map(|kind| FeedCoordinator::new(kind, sources.clone()))
            .collect();

        let results = join_all(coordinators.into_iter().map(|c| c.first_refresh())).await;

        let mut feeds = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(coordinator) => {
                    info!(
                        feed = %coordinator.id(),
                        kind = coordinator.kind().label(),
                        status = ?coordinator.subscribe().status(),
                        "feed registered"
                    );
                    feeds.push(coordinator.spawn());
                }
                Err(e) => error!(error = %e, "feed setup aborted"),
            }
        }

        info!(count = feeds.len(), "feed registry started");
        Self { feeds }
    }

    pub fn get(&self, id: &str) -> Option<&FeedHandle> {
        self.feeds.iter().find(|feed| feed.id().as_str() == id)
    }

    /// Feeds in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &FeedHandle> {
        self.feeds.iter()
    }

    pub fn ids(&self) -> Vec<FeedId> {
        self.feeds.iter().map(|feed| feed.id().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.feeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feeds.is_empty()
    }

    /// Tears down one feed. Returns `false` if no such feed exists.
    pub async fn remove(&mut self, id: &str) -> bool {
        let Some(index) = self.feeds.iter().position(|feed| feed.id().as_str() == id) else {
            return false;
        };
        self.feeds.remove(index).shutdown().await;
        true
    }

    /// Tells every coordinator to stop without waiting for them.
    pub fn signal_shutdown(&self) {
        for feed in &self.feeds {
            feed.signal_shutdown();
        }
    }

    /// Stops every coordinator and waits for their tasks.
    pub async fn shutdown(self) {
        join_all(self.feeds.into_iter().map(FeedHandle::shutdown)).await;
        info!("feed registry stopped");
    }
}
