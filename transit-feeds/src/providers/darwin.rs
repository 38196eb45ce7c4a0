//! Darwin LDB HTTP client (Rail Data Marketplace).
//!
//! The primary rail provider. Requires an API key sent as `x-apikey`;
//! without one the client is simply not constructed and the unified
//! train client goes straight to Huxley.

use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use reqwest::header::HeaderValue;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::domain::FeedRequest;

use super::error::ProviderError;
use super::http::get_json;
use super::result::{ProviderResult, fold};
use super::{Board, RailProvider};

/// Default base URL for Darwin LDB API.
const DEFAULT_BASE_URL: &str =
    "https://api1.raildata.org.uk/1010-live-departure-board-dep1_2/LDBWS/api/20220120";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Longest board window Darwin accepts, in minutes.
const MAX_TIME_WINDOW: u16 = 120;

/// Configuration for the Darwin client.
#[derive(Debug, Clone)]
pub struct DarwinConfig {
    /// API key for authentication
    pub api_key: String,
    /// Base URL for the API (defaults to production Darwin)
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
}

impl DarwinConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }
}

/// Darwin LDB API client.
///
/// Uses a semaphore to cap concurrent requests across every feed that
/// shares this client, keeping bursts under the marketplace rate limit.
#[derive(Debug, Clone)]
pub struct DarwinClient {
    http: reqwest::Client,
    api_key: HeaderValue,
    base_url: String,
    semaphore: Arc<Semaphore>,
}

impl DarwinClient {
    /// Create a client on the shared transport.
    pub fn new(http: reqwest::Client, config: DarwinConfig) -> Result<Self, ProviderError> {
        let mut api_key = HeaderValue::from_str(&config.api_key)
            .map_err(|_| ProviderError::InvalidCredential("Darwin API key is not a valid header"))?;
        api_key.set_sensitive(true);

        Ok(Self {
            http,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
        })
    }

    /// Get the departure board with calling points.
    pub async fn get_departures(&self, request: &FeedRequest) -> ProviderResult {
        self.get_board(Board::Departures, request).await
    }

    /// Get the arrival board with calling points.
    ///
    /// Darwin already orders arrivals by scheduled time; the board is
    /// returned as-is.
    pub async fn get_arrivals(&self, request: &FeedRequest) -> ProviderResult {
        self.get_board(Board::Arrivals, request).await
    }

    async fn get_board(&self, board: Board, request: &FeedRequest) -> ProviderResult {
        let station = request.station();
        debug!(provider = "darwin", board = board.as_str(), %station, "requesting board");
        fold(
            "darwin",
            board.as_str(),
            station.as_str(),
            self.fetch_board(board, request).await,
        )
    }

    async fn fetch_board(
        &self,
        board: Board,
        request: &FeedRequest,
    ) -> Result<serde_json::Value, ProviderError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| ProviderError::Transport("request semaphore closed".to_string()))?;

        get_json(self.board_request(board, request)).await
    }

    fn board_request(&self, board: Board, request: &FeedRequest) -> reqwest::RequestBuilder {
        let operation = match board {
            Board::Departures => "GetDepBoardWithDetails",
            Board::Arrivals => "GetArrBoardWithDetails",
        };
        let url = format!("{}/{}/{}", self.base_url, operation, request.station());

        let mut query = vec![
            ("numRows", request.num_rows().get().to_string()),
            ("timeOffset", request.time_offset().to_string()),
            ("timeWindow", request.time_window().minutes().min(MAX_TIME_WINDOW).to_string()),
        ];
        if let Some(filter) = request.filter() {
            query.push(("filterCrs", filter.crs.to_string()));
            query.push(("filterType", filter.direction.to_string()));
        }

        self.http
            .get(url)
            .header("x-apikey", self.api_key.clone())
            .query(&query)
    }
}

impl RailProvider for DarwinClient {
    fn name(&self) -> &'static str {
        "darwin"
    }

    fn departures<'a>(&'a self, request: &'a FeedRequest) -> BoxFuture<'a, ProviderResult> {
        self.get_departures(request).boxed()
    }

    fn arrivals<'a>(&'a self, request: &'a FeedRequest) -> BoxFuture<'a, ProviderResult> {
        self.get_arrivals(request).boxed()
    }
}
