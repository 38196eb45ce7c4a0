//! Upstream provider clients.
//!
//! Three independent HTTP clients share one transport:
//! - [`DarwinClient`]: National Rail Darwin LDB, the primary rail source
//!   (needs an API key)
//! - [`HuxleyClient`]: Huxley2 JSON proxy, the secondary rail source
//! - [`TflClient`]: TfL Unified API for line status, bus stops and
//!   disruptions
//!
//! Every operation returns a [`ProviderResult`]. Transport failures,
//! non-2xx statuses and malformed bodies are logged and folded into
//! `Empty` here, so nothing above this layer handles HTTP errors.

mod darwin;
mod error;
mod http;
mod huxley;
mod mock;
mod result;
mod tfl;


use futures::future::BoxFuture;

use crate::domain::FeedRequest;

pub use darwin::{DarwinClient, DarwinConfig};
pub use error::ProviderError;
pub use http::{HttpConfig, build_http_client};
pub use huxley::{HuxleyClient, HuxleyConfig};
pub use mock::{MockDataError, MockRailProvider};
pub use result::{Payload, ProviderResult};
pub(crate) use result::payload_has_data;
pub use tfl::{TflClient, TflConfig};

/// Which rail board to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Board {
    Departures,
    Arrivals,
}

impl Board {
    pub fn as_str(self) -> &'static str {
        match self {
            Board::Departures => "departures",
            Board::Arrivals => "arrivals",
        }
    }
}

/// A source of rail departure and arrival boards.
///
/// Implementations must not fail: every problem is reported as
/// [`ProviderResult::Empty`].
pub trait RailProvider: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &'static str;

    fn departures<'a>(&'a self, request: &'a FeedRequest) -> BoxFuture<'a, ProviderResult>;

    fn arrivals<'a>(&'a self, request: &'a FeedRequest) -> BoxFuture<'a, ProviderResult>;

    /// Dispatch on board kind.
    fn board<'a>(&'a self, board: Board, request: &'a FeedRequest) -> BoxFuture<'a, ProviderResult> {
        match board {
            Board::Departures => self.departures(request),
            Board::Arrivals => self.arrivals(request),
        }
    }
}

/// A source of transit-authority data (line status, stop arrivals,
/// disruptions).
pub trait TransitProvider: Send + Sync {
    fn line_status<'a>(&'a self, line_ids: &'a [String]) -> BoxFuture<'a, ProviderResult>;

    /// Arrival predictions ordered by expected arrival.
    fn stop_arrivals<'a>(&'a self, stop_id: &'a str) -> BoxFuture<'a, ProviderResult>;

    fn disruptions<'a>(&'a self, modes: &'a [String]) -> BoxFuture<'a, ProviderResult>;
}
