//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::CachedStationSearch;
use crate::feeds::FeedRegistry;
use crate::providers::TflClient;

/// Shared application state.
///
/// Everything here is read-only from the handlers' point of view; the
/// feeds are written only by their own coordinators.
#[derive(Clone)]
pub struct AppState {
    /// Running feeds
    pub registry: Arc<FeedRegistry>,

    /// Cached Huxley station search
    pub stations: Arc<CachedStationSearch>,

    /// TfL client for stop-point lookups
    pub tfl: Arc<TflClient>,

    /// NaPTAN id of the monitored station
    pub station_naptan: Arc<str>,
}

impl AppState {
    pub fn new(
        registry: Arc<FeedRegistry>,
        stations: CachedStationSearch,
        tfl: TflClient,
        station_naptan: &str,
    ) -> Self {
        Self {
            registry,
            stations: Arc::new(stations),
            tfl: Arc::new(tfl),
            station_naptan: Arc::from(station_naptan),
        }
    }
}
