//! TfL Unified API client.
//!
//! Serves line status, stop-point arrivals, stop-point info and
//! per-mode disruptions. The optional `app_key` travels as a query
//! parameter; without it TfL still answers at a lower rate limit.

use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Value;
use tracing::debug;

use super::error::ProviderError;
use super::http::get_json;
use super::result::{ProviderResult, fold};
use super::TransitProvider;

/// Default base URL for the TfL Unified API.
const DEFAULT_BASE_URL: &str = "https://api.tfl.gov.uk";

/// Configuration for the TfL client.
#[derive(Debug, Clone)]
pub struct TflConfig {
    pub base_url: String,
    pub app_key: Option<String>,
}

impl TflConfig {
    pub fn new(app_key: Option<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            app_key: app_key.filter(|k| !k.trim().is_empty()),
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

/// TfL Unified API client.
#[derive(Debug, Clone)]
pub struct TflClient {
    http: reqwest::Client,
    base_url: String,
    app_key: Option<String>,
}

impl TflClient {
    /// Create a client on the shared transport.
    pub fn new(http: reqwest::Client, config: TflConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            app_key: config.app_key,
        }
    }

    /// Current status of the given lines, e.g. `["southeastern"]`.
    pub async fn get_line_status(&self, line_ids: &[String]) -> ProviderResult {
        let lines = join_ids(line_ids);
        debug!(provider = "tfl", %lines, "requesting line status");
        let outcome = get_json(self.request(&format!("Line/{lines}/Status"))).await;
        fold("tfl", "line_status", &lines, outcome)
    }

    /// Predicted arrivals at a stop point, soonest first.
    pub async fn get_stop_arrivals(&self, stop_id: &str) -> ProviderResult {
        debug!(provider = "tfl", stop_id, "requesting stop arrivals");
        let path = format!("StopPoint/{}/Arrivals", urlencoding::encode(stop_id));
        let outcome = get_json(self.request(&path))
            .await
            .and_then(sort_by_expected_arrival);
        fold("tfl", "stop_arrivals", stop_id, outcome)
    }

    /// Stop point metadata for a NaPTAN id.
    pub async fn get_station_info(&self, naptan_id: &str) -> ProviderResult {
        let path = format!("StopPoint/{}", urlencoding::encode(naptan_id));
        let outcome = get_json(self.request(&path)).await;
        fold("tfl", "station_info", naptan_id, outcome)
    }

    /// Current disruptions for the given modes, e.g. `["overground", "dlr"]`.
    pub async fn get_disruptions(&self, modes: &[String]) -> ProviderResult {
        let modes = join_ids(modes);
        debug!(provider = "tfl", %modes, "requesting disruptions");
        let outcome = get_json(self.request(&format!("Line/Mode/{modes}/Disruption"))).await;
        fold("tfl", "disruptions", &modes, outcome)
    }

    fn request(&self, path: &str) -> reqwest::RequestBuilder {
        let request = self.http.get(format!("{}/{}", self.base_url, path));
        match &self.app_key {
            Some(key) => request.query(&[("app_key", key)]),
            None => request,
        }
    }
}

impl TransitProvider for TflClient {
    fn line_status<'a>(&'a self, line_ids: &'a [String]) -> BoxFuture<'a, ProviderResult> {
        self.get_line_status(line_ids).boxed()
    }

    fn stop_arrivals<'a>(&'a self, stop_id: &'a str) -> BoxFuture<'a, ProviderResult> {
        self.get_stop_arrivals(stop_id).boxed()
    }

    fn disruptions<'a>(&'a self, modes: &'a [String]) -> BoxFuture<'a, ProviderResult> {
        self.get_disruptions(modes).boxed()
    }
}

fn join_ids(ids: &[String]) -> String {
    ids.iter()
        .map(|id| urlencoding::encode(id.trim()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Order arrival predictions by their ISO-8601 `expectedArrival`.
///
/// String order matches time order for TfL's fixed-format UTC stamps.
/// The sort is stable, so predictions with equal or missing times keep
/// their upstream order; missing times sort first.
pub(crate) fn sort_by_expected_arrival(value: Value) -> Result<Value, ProviderError> {
    let Value::Array(mut arrivals) = value else {
        return Err(ProviderError::Malformed {
            message: "expected a JSON array of arrivals".to_string(),
            body: None,
        });
    };

    arrivals.sort_by(|a, b| expected_arrival(a).cmp(expected_arrival(b)));
    Ok(Value::Array(arrivals))
}

fn expected_arrival(arrival: &Value) -> &str {
    arrival
        .get("expectedArrival")
        .and_then(Value::as_str)
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{HttpConfig, build_http_client};
    use serde_json::json;

    fn client(app_key: Option<&str>) -> TflClient {
        let http = build_http_client(&HttpConfig::default()).unwrap();
        TflClient::new(
            http,
            TflConfig::new(app_key.map(String::from)).with_base_url("http://tfl.test"),
        )
    }

    #[test]
    fn app_key_attached_when_configured() {
        let req = client(Some("k3y")).request("Line/southeastern/Status").build().unwrap();
        assert_eq!(req.url().as_str(), "http://tfl.test/Line/southeastern/Status?app_key=k3y");
    }

    #[test]
    fn app_key_omitted_when_absent_or_blank() {
        for key in [None, Some("")] {
            let req = client(key).request("StopPoint/910GGRVPK").build().unwrap();
            assert_eq!(req.url().as_str(), "http://tfl.test/StopPoint/910GGRVPK");
        }
    }

    #[test]
    fn join_ids_uses_commas() {
        let ids = vec!["southeastern".to_string(), " thameslink ".to_string()];
        assert_eq!(join_ids(&ids), "southeastern,thameslink");
    }

    #[test]
    fn ids_are_percent_encoded() {
        let ids = vec!["london overground".to_string(), "dlr".to_string()];
        assert_eq!(join_ids(&ids), "london%20overground,dlr");

        let req = client(None)
            .request(&format!("StopPoint/{}", urlencoding::encode("490/1")))
            .build()
            .unwrap();
        assert_eq!(req.url().path(), "/StopPoint/490%2F1");
    }

    #[test]
    fn arrivals_sorted_by_expected_arrival() {
        let sorted = sort_by_expected_arrival(json!([
            {"vehicleId": "b", "expectedArrival": "2026-10-16T09:07:00Z"},
            {"vehicleId": "a", "expectedArrival": "2026-10-16T09:01:30Z"},
            {"vehicleId": "c", "expectedArrival": "2026-10-16T09:20:00Z"},
        ]))
        .unwrap();

        let order: Vec<_> = sorted
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["vehicleId"].as_str().unwrap())
            .collect();
        assert_eq!(order, ["a", "b", "c"]);
    }

    #[test]
    fn arrivals_without_time_keep_relative_order_and_come_first() {
        let sorted = sort_by_expected_arrival(json!([
            {"id": 1, "expectedArrival": "2026-10-16T09:00:00Z"},
            {"id": 2},
            {"id": 3},
        ]))
        .unwrap();
        let ids: Vec<_> = sorted
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, [2, 3, 1]);
    }

    #[test]
    fn non_array_arrivals_are_malformed() {
        let err = sort_by_expected_arrival(json!({"message": "not found"})).unwrap_err();
        assert!(matches!(err, ProviderError::Malformed { .. }));
    }
}
