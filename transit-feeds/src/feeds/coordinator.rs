//! One polling loop per feed.
//!
//! A [`FeedCoordinator`] owns exactly one [`FeedState`]. It is the only
//! writer: consumers get a [`FeedReader`] backed by a `watch` receiver, so
//! reads never block the poll loop and nothing needs a lock.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::providers::{Payload, ProviderResult, TransitProvider};
use crate::train::{SourceTag, TrainClient, panic_message};

use super::error::FeedError;
use super::kind::{FeedId, FeedKind};
use super::state::{FeedState, FeedStatus};

/// Upstreams a coordinator may call, shared by every feed.
#[derive(Clone)]
pub struct FeedSources {
    pub trains: Arc<TrainClient>,
    pub transit: Arc<dyn TransitProvider>,
}

/// What one fetch produced before it is folded into state.
struct Fetched {
    result: ProviderResult,
    source: Option<SourceTag>,
}

/// Fetches one feed and records the outcome.
pub struct FeedCoordinator {
    id: FeedId,
    kind: FeedKind,
    sources: FeedSources,
    state: watch::Sender<FeedState>,
}

impl FeedCoordinator {
    pub fn new(kind: FeedKind, sources: FeedSources) -> Self {
        let (state, _) = watch::channel(FeedState::new(kind.poll_interval()));
        Self {
            id: kind.id(),
            kind,
            sources,
            state,
        }
    }

    pub fn id(&self) -> &FeedId {
        &self.id
    }

    pub fn kind(&self) -> &FeedKind {
        &self.kind
    }

    /// A read-only view of this feed's state.
    pub fn subscribe(&self) -> FeedReader {
        FeedReader {
            rail: self.kind.is_rail(),
            state: self.state.subscribe(),
        }
    }

    /// Fetches once and records the outcome.
    ///
    /// The returned error has already been logged and stored as the feed's
    /// last error; callers only need it to decide what to do next.
    pub async fn refresh(&self) -> Result<(), FeedError> {
        let outcome = self.fetch().await;
        self.apply(outcome, Utc::now())
    }

    /// The mandatory fetch before a feed is exposed.
    ///
    /// An empty result still yields a usable (uninitialized) coordinator;
    /// only a panic aborts setup of this feed.
    pub async fn first_refresh(self) -> Result<Self, FeedError> {
        match self.refresh().await {
            Err(FeedError::Panicked(message)) => Err(FeedError::Panicked(message)),
            Ok(()) | Err(FeedError::NoData(_)) => Ok(self),
        }
    }

    /// Starts the poll loop. The first tick fires one interval from now.
    pub fn spawn(self) -> FeedHandle {
        let (shutdown, signal) = watch::channel(false);
        let id = self.id.clone();
        let kind = self.kind.clone();
        let reader = self.subscribe();
        let task = tokio::spawn(self.run(signal));

        FeedHandle {
            id,
            kind,
            reader,
            shutdown,
            task,
        }
    }

    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let period = self.kind.poll_interval();
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        debug!(feed = %self.id, interval_secs = period.as_secs(), "feed coordinator started");

        loop {
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow_and_update() {
                        break;
                    }
                    continue;
                }
                _ = ticker.tick() => {}
            }

            let outcome = self.fetch().await;
            if *shutdown.borrow() {
                debug!(feed = %self.id, "discarding fetch that completed after teardown");
                break;
            }
            // Already logged and recorded.
            let _ = self.apply(outcome, Utc::now());
        }

        info!(feed = %self.id, "feed coordinator stopped");
    }

    async fn fetch(&self) -> Result<Fetched, FeedError> {
        match AssertUnwindSafe(self.dispatch()).catch_unwind().await {
            Ok(fetched) => Ok(fetched),
            Err(panic) => Err(FeedError::Panicked(panic_message(panic.as_ref()))),
        }
    }

    async fn dispatch(&self) -> Fetched {
        let FeedSources { trains, transit } = &self.sources;
        match &self.kind {
            FeedKind::Departures { request } => {
                let response = trains.get_departures(request).await;
                Fetched {
                    result: response.result,
                    source: Some(response.source),
                }
            }
            FeedKind::Arrivals { request } => {
                let response = trains.get_arrivals(request).await;
                Fetched {
                    result: response.result,
                    source: Some(response.source),
                }
            }
            FeedKind::LineStatus { lines } => Fetched {
                result: transit.line_status(lines).await,
                source: None,
            },
            FeedKind::BusStop { stop_id } => Fetched {
                result: transit.stop_arrivals(stop_id).await,
                source: None,
            },
            FeedKind::Disruptions { modes } => Fetched {
                result: transit.disruptions(modes).await,
                source: None,
            },
        }
    }

    fn apply(&self, outcome: Result<Fetched, FeedError>, at: DateTime<Utc>) -> Result<(), FeedError> {
        let error = match outcome {
            Ok(Fetched {
                result: ProviderResult::Success(payload),
                source,
            }) => {
                let was_degraded = self.state.borrow().status() == FeedStatus::Degraded;
                self.state
                    .send_modify(|state| state.record_success(payload, source, at));
                if was_degraded {
                    info!(feed = %self.id, "feed recovered");
                } else {
                    debug!(feed = %self.id, "feed updated");
                }
                return Ok(());
            }
            Ok(Fetched {
                result: ProviderResult::Empty(cause),
                ..
            }) => FeedError::NoData(cause),
            Err(error) => error,
        };

        warn!(feed = %self.id, kind = self.kind.label(), error = %error, "feed update failed");
        self.state
            .send_modify(|state| state.record_failure(error.clone(), at));
        Err(error)
    }
}

/// Consumer view of one feed. Cheap to clone; never writes.
#[derive(Debug, Clone)]
pub struct FeedReader {
    rail: bool,
    state: watch::Receiver<FeedState>,
}

impl FeedReader {
    pub fn current_snapshot(&self) -> Option<Payload> {
        self.state.borrow().snapshot().cloned()
    }

    pub fn last_error(&self) -> Option<FeedError> {
        self.state.borrow().last_error().cloned()
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.state.borrow().last_updated()
    }

    /// Which rail provider supplied the current snapshot; `None` for feeds
    /// that do not go through the train client.
    pub fn last_source_used(&self) -> Option<SourceTag> {
        if !self.rail {
            return None;
        }
        Some(self.state.borrow().source().unwrap_or(SourceTag::None))
    }

    pub fn status(&self) -> FeedStatus {
        self.state.borrow().status()
    }

    /// A copy of the whole state at this instant.
    pub fn state(&self) -> FeedState {
        self.state.borrow().clone()
    }
}

/// A running coordinator.
pub struct FeedHandle {
    id: FeedId,
    kind: FeedKind,
    reader: FeedReader,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl FeedHandle {
    pub fn id(&self) -> &FeedId {
        &self.id
    }

    pub fn kind(&self) -> &FeedKind {
        &self.kind
    }

    pub fn reader(&self) -> &FeedReader {
        &self.reader
    }

    /// Stops further ticks without waiting. A fetch already in flight
    /// completes but its result is dropped.
    pub fn signal_shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    /// Stops the coordinator and waits for its task to exit.
    pub async fn shutdown(self) {
        self.signal_shutdown();
        if let Err(e) = self.task.await {
            warn!(feed = %self.id, error = %e, "feed task ended abnormally");
        }
        info!(feed = %self.id, "feed torn down");
    }
}
