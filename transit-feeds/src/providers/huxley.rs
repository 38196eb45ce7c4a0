//! Huxley2 REST proxy client.
//!
//! The secondary rail provider: a community JSON proxy in front of
//! Darwin that works without a key. Its path scheme encodes the filter
//! and row count; everything else goes in the query string.

use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::debug;

use crate::domain::FeedRequest;

use super::error::ProviderError;
use super::http::get_json;
use super::result::{ProviderResult, fold};
use super::{Board, RailProvider};

/// Default base URL for the public Huxley2 instance.
const DEFAULT_BASE_URL: &str = "https://huxley2.azurewebsites.net";

/// Configuration for the Huxley client.
#[derive(Debug, Clone)]
pub struct HuxleyConfig {
    /// Base URL of the Huxley instance
    pub base_url: String,
    /// Optional Darwin access token forwarded as `accessToken`
    pub access_token: Option<String>,
    /// Ask for calling points inline
    pub expand: bool,
}

impl HuxleyConfig {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token: None,
            expand: true,
        }
    }

    /// Set a custom base URL (self-hosted instance or tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Forward an access token. Blank tokens are treated as absent.
    pub fn with_access_token(mut self, token: Option<String>) -> Self {
        self.access_token = token.filter(|t| !t.trim().is_empty());
        self
    }
}

impl Default for HuxleyConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Which Huxley board endpoint to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HuxleyBoard {
    Departures,
    Arrivals,
}

impl HuxleyBoard {
    fn path(self) -> &'static str {
        match self {
            HuxleyBoard::Departures => "departures",
            HuxleyBoard::Arrivals => "arrivals",
        }
    }
}

impl From<Board> for HuxleyBoard {
    fn from(board: Board) -> Self {
        match board {
            Board::Departures => HuxleyBoard::Departures,
            Board::Arrivals => HuxleyBoard::Arrivals,
        }
    }
}

/// Huxley2 API client.
#[derive(Debug, Clone)]
pub struct HuxleyClient {
    http: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
    expand: bool,
}

impl HuxleyClient {
    /// Create a client on the shared transport.
    pub fn new(http: reqwest::Client, config: HuxleyConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token,
            expand: config.expand,
        }
    }

    pub async fn get_departures(&self, request: &FeedRequest) -> ProviderResult {
        self.get_board(HuxleyBoard::Departures, request).await
    }

    pub async fn get_arrivals(&self, request: &FeedRequest) -> ProviderResult {
        self.get_board(HuxleyBoard::Arrivals, request).await
    }

    /// Look up stations whose name matches `query`.
    ///
    /// Returns a list of `{stationName, crsCode}` objects.
    pub async fn search_stations(&self, query: &str) -> ProviderResult {
        let url = format!("{}/crs/{}", self.base_url, urlencoding::encode(query));
        let outcome = get_json(self.http.get(url)).await.and_then(expect_array);
        fold("huxley", "station_search", query, outcome)
    }

    async fn get_board(&self, board: HuxleyBoard, request: &FeedRequest) -> ProviderResult {
        let station = request.station();
        debug!(provider = "huxley", board = board.path(), %station, "requesting board");
        let outcome = get_json(self.board_request(board, request)).await;
        fold("huxley", board.path(), station.as_str(), outcome)
    }

    fn board_url(&self, board: HuxleyBoard, request: &FeedRequest) -> String {
        let station = request.station();
        let rows = request.num_rows().get();
        match request.filter() {
            Some(filter) => format!(
                "{}/{}/{}/{}/{}/{}",
                self.base_url,
                board.path(),
                station,
                filter.direction,
                filter.crs,
                rows
            ),
            None => format!("{}/{}/{}/{}", self.base_url, board.path(), station, rows),
        }
    }

    fn board_request(&self, board: HuxleyBoard, request: &FeedRequest) -> reqwest::RequestBuilder {
        let mut query = vec![
            ("timeOffset", request.time_offset().to_string()),
            ("timeWindow", request.time_window().minutes().to_string()),
            ("expand", self.expand.to_string()),
        ];
        if let Some(token) = &self.access_token {
            query.push(("accessToken", token.clone()));
        }

        self.http.get(self.board_url(board, request)).query(&query)
    }
}

impl RailProvider for HuxleyClient {
    fn name(&self) -> &'static str {
        "huxley"
    }

    fn departures<'a>(&'a self, request: &'a FeedRequest) -> BoxFuture<'a, ProviderResult> {
        self.get_departures(request).boxed()
    }

    fn arrivals<'a>(&'a self, request: &'a FeedRequest) -> BoxFuture<'a, ProviderResult> {
        self.get_arrivals(request).boxed()
    }
}

fn expect_array(value: serde_json::Value) -> Result<serde_json::Value, ProviderError> {
    if value.is_array() {
        Ok(value)
    } else {
        Err(ProviderError::Malformed {
            message: "expected a JSON array".to_string(),
            body: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Crs, FilterType, RowCount, TimeWindow};
    use crate::providers::{HttpConfig, build_http_client};

    fn client(config: HuxleyConfig) -> HuxleyClient {
        let http = build_http_client(&HttpConfig::default()).unwrap();
        HuxleyClient::new(http, config.with_base_url("http://huxley.test/"))
    }

    fn request() -> FeedRequest {
        FeedRequest::new(
            Crs::parse("GRP").unwrap(),
            RowCount::new(10).unwrap(),
            TimeWindow::new(90).unwrap(),
        )
    }

    #[test]
    fn config_defaults() {
        let config = HuxleyConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.access_token.is_none());
        assert!(config.expand);
    }

    #[test]
    fn blank_token_is_absent() {
        let config = HuxleyConfig::new().with_access_token(Some("  ".into()));
        assert!(config.access_token.is_none());
    }

    #[test]
    fn unfiltered_board_url() {
        let client = client(HuxleyConfig::new());
        assert_eq!(
            client.board_url(HuxleyBoard::Departures, &request()),
            "http://huxley.test/departures/GRP/10"
        );
        assert_eq!(
            client.board_url(HuxleyBoard::Arrivals, &request()),
            "http://huxley.test/arrivals/GRP/10"
        );
    }

    #[test]
    fn filtered_board_url_encodes_direction() {
        let client = client(HuxleyConfig::new());
        let lbg = Crs::parse("LBG").unwrap();
        assert_eq!(
            client.board_url(
                HuxleyBoard::Arrivals,
                &request().with_filter(lbg, FilterType::From)
            ),
            "http://huxley.test/arrivals/GRP/from/LBG/10"
        );
    }

    #[test]
    fn token_sent_only_when_configured() {
        let without = client(HuxleyConfig::new())
            .board_request(HuxleyBoard::Departures, &request())
            .build()
            .unwrap();
        assert_eq!(without.url().query(), Some("timeOffset=0&timeWindow=90&expand=true"));

        let with = client(HuxleyConfig::new().with_access_token(Some("tok".into())))
            .board_request(HuxleyBoard::Departures, &request())
            .build()
            .unwrap();
        assert!(with.url().query().unwrap().ends_with("&accessToken=tok"));
    }
}
