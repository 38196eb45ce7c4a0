//! Environment-driven configuration.
//!
//! Everything has a default except credentials, which are optional: a
//! missing or blank key just means that provider is not used.

use std::net::SocketAddr;
use std::path::PathBuf;

use tracing::warn;

use crate::domain::{Crs, DomainError, RowCount, TimeWindow};
use crate::feeds::{FeedPlan, MAX_DESTINATIONS};

pub const DEFAULT_STATION_CRS: &str = "GRP";
pub const DEFAULT_STATION_NAPTAN: &str = "910GGRVPK";
pub const DEFAULT_HUXLEY_BASE_URL: &str = "https://huxley2.azurewebsites.net";
/// Charing Cross, London Bridge and Victoria.
pub const DEFAULT_DESTINATIONS: &str = "CHX,LBG,VIC";
pub const DEFAULT_BUS_STOPS: &str = "490001124E,490015256D";
pub const DEFAULT_LINES: &str = "southeastern";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Errors reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var}: {source}")]
    Invalid {
        var: &'static str,
        #[source]
        source: DomainError,
    },

    #[error("{var}: expected a number, got {value:?}")]
    NotANumber { var: &'static str, value: String },

    #[error("{var}: must be greater than zero")]
    Zero { var: &'static str },

    #[error("{var}: invalid socket address {value:?}")]
    InvalidAddr { var: &'static str, value: String },
}

/// Everything the binary needs to start.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub station: Crs,
    /// TfL NaPTAN id of the same station, for stop-point lookups.
    pub station_naptan: String,
    pub darwin_api_key: Option<String>,
    pub huxley_base_url: String,
    pub huxley_access_token: Option<String>,
    pub tfl_app_key: Option<String>,
    pub destinations: Vec<Crs>,
    pub bus_stops: Vec<String>,
    pub lines: Vec<String>,
    pub disruption_modes: Vec<String>,
    pub num_rows: RowCount,
    pub time_window: TimeWindow,
    pub http_timeout_secs: u64,
    pub bind_addr: SocketAddr,
    /// Serve rail boards from JSON files in this directory instead of
    /// calling Darwin or Huxley.
    pub mock_data_dir: Option<PathBuf>,
}

impl TransportConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`, which returns the raw value
    /// of a variable if it is set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let get_or = |name: &str, default: &str| get(name).unwrap_or_else(|| default.to_string());

        let station = parse_crs("STATION_CRS", &get_or("STATION_CRS", DEFAULT_STATION_CRS))?;
        let destinations = parse_destinations(&get_or("DESTINATIONS", DEFAULT_DESTINATIONS))?;

        let num_rows = match get("NUM_DEPARTURES") {
            Some(value) => RowCount::new(parse_number("NUM_DEPARTURES", &value)?)
                .map_err(|source| ConfigError::Invalid { var: "NUM_DEPARTURES", source })?,
            None => RowCount::default(),
        };
        let time_window = match get("TIME_WINDOW") {
            Some(value) => TimeWindow::new(parse_number("TIME_WINDOW", &value)?)
                .map_err(|source| ConfigError::Invalid { var: "TIME_WINDOW", source })?,
            None => TimeWindow::default(),
        };
        let http_timeout_secs = match get("HTTP_TIMEOUT_SECS") {
            Some(value) => match parse_number("HTTP_TIMEOUT_SECS", &value)? {
                0 => return Err(ConfigError::Zero { var: "HTTP_TIMEOUT_SECS" }),
                secs => u64::from(secs),
            },
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        let bind_value = get_or("BIND_ADDR", DEFAULT_BIND_ADDR);
        let bind_addr = bind_value.parse().map_err(|_| ConfigError::InvalidAddr {
            var: "BIND_ADDR",
            value: bind_value.clone(),
        })?;

        Ok(Self {
            station,
            station_naptan: get_or("STATION_NAPTAN", DEFAULT_STATION_NAPTAN),
            darwin_api_key: get("DARWIN_API_KEY"),
            huxley_base_url: get_or("HUXLEY_BASE_URL", DEFAULT_HUXLEY_BASE_URL),
            huxley_access_token: get("HUXLEY_ACCESS_TOKEN"),
            tfl_app_key: get("TFL_APP_KEY"),
            destinations,
            bus_stops: split_list(&get_or("BUS_STOPS", DEFAULT_BUS_STOPS)),
            lines: split_list(&get_or("LINES", DEFAULT_LINES)),
            disruption_modes: split_list(&get("DISRUPTION_MODES").unwrap_or_default()),
            num_rows,
            time_window,
            http_timeout_secs,
            bind_addr,
            mock_data_dir: get("MOCK_DATA_DIR").map(PathBuf::from),
        })
    }

    /// The feeds this configuration asks for.
    pub fn feed_plan(&self) -> FeedPlan {
        FeedPlan {
            station: self.station,
            num_rows: self.num_rows,
            time_window: self.time_window,
            destinations: self.destinations.clone(),
            lines: self.lines.clone(),
            bus_stops: self.bus_stops.clone(),
            disruption_modes: self.disruption_modes.clone(),
        }
    }
}

fn parse_crs(var: &'static str, value: &str) -> Result<Crs, ConfigError> {
    Crs::parse_normalized(value).map_err(|e| ConfigError::Invalid {
        var,
        source: DomainError::from(e),
    })
}

/// Parses the destination list up to [`MAX_DESTINATIONS`]. Entries past
/// the cap are never polled, so they are dropped unparsed.
fn parse_destinations(value: &str) -> Result<Vec<Crs>, ConfigError> {
    let codes = split_list(value);
    if codes.len() > MAX_DESTINATIONS {
        let dropped = &codes[MAX_DESTINATIONS..];
        warn!(
            configured = codes.len(),
            limit = MAX_DESTINATIONS,
            ?dropped,
            "too many destinations, ignoring the rest"
        );
    }
    codes
        .iter()
        .take(MAX_DESTINATIONS)
        .map(|code| parse_crs("DESTINATIONS", code))
        .collect()
}

fn parse_number(var: &'static str, value: &str) -> Result<u32, ConfigError> {
    value.parse().map_err(|_| ConfigError::NotANumber {
        var,
        value: value.to_string(),
    })
}

/// Splits a comma-separated list, dropping blanks.
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<TransportConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        TransportConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]).unwrap();

        assert_eq!(config.station.as_str(), "GRP");
        assert_eq!(config.station_naptan, "910GGRVPK");
        assert!(config.darwin_api_key.is_none());
        assert!(config.tfl_app_key.is_none());
        assert_eq!(config.huxley_base_url, DEFAULT_HUXLEY_BASE_URL);
        let destinations: Vec<&str> = config.destinations.iter().map(Crs::as_str).collect();
        assert_eq!(destinations, vec!["CHX", "LBG", "VIC"]);
        assert_eq!(config.bus_stops, vec!["490001124E", "490015256D"]);
        assert_eq!(config.lines, vec!["southeastern"]);
        assert!(config.disruption_modes.is_empty());
        assert_eq!(config.num_rows.get(), 10);
        assert_eq!(config.time_window.minutes(), 120);
        assert_eq!(config.http_timeout_secs, 30);
        assert_eq!(config.bind_addr, "127.0.0.1:3000".parse().unwrap());
        assert!(config.mock_data_dir.is_none());
    }

    #[test]
    fn blank_credentials_are_absent() {
        let config = config(&[
            ("DARWIN_API_KEY", "   "),
            ("HUXLEY_ACCESS_TOKEN", ""),
            ("TFL_APP_KEY", "abc123"),
        ])
        .unwrap();

        assert!(config.darwin_api_key.is_none());
        assert!(config.huxley_access_token.is_none());
        assert_eq!(config.tfl_app_key.as_deref(), Some("abc123"));
    }

    #[test]
    fn lists_are_trimmed_and_normalized() {
        let config = config(&[
            ("STATION_CRS", "lbg"),
            ("DESTINATIONS", " chx, ,vic "),
            ("BUS_STOPS", "490001124E,"),
            ("DISRUPTION_MODES", "dlr,overground"),
        ])
        .unwrap();

        assert_eq!(config.station.as_str(), "LBG");
        let destinations: Vec<&str> = config.destinations.iter().map(Crs::as_str).collect();
        assert_eq!(destinations, vec!["CHX", "VIC"]);
        assert_eq!(config.bus_stops, vec!["490001124E"]);
        assert_eq!(config.disruption_modes, vec!["dlr", "overground"]);
    }

    #[test]
    fn out_of_range_numbers_are_rejected() {
        let err = config(&[("NUM_DEPARTURES", "21")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                var: "NUM_DEPARTURES",
                source: DomainError::RowCountOutOfRange(21)
            }
        ));

        let err = config(&[("TIME_WINDOW", "10")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "TIME_WINDOW", .. }));

        let err = config(&[("NUM_DEPARTURES", "ten")]).unwrap_err();
        assert_eq!(err.to_string(), "NUM_DEPARTURES: expected a number, got \"ten\"");
    }

    #[test]
    fn malformed_crs_is_rejected() {
        let err = config(&[("DESTINATIONS", "CHX,LONDON")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "DESTINATIONS", .. }));
    }

    #[test]
    fn destinations_past_the_cap_are_not_parsed() {
        let config = config(&[("DESTINATIONS", "CHX,CST,VIC,LBG,WAT,not-a-crs,STP")]).unwrap();

        let destinations: Vec<&str> = config.destinations.iter().map(Crs::as_str).collect();
        assert_eq!(destinations, vec!["CHX", "CST", "VIC", "LBG", "WAT"]);
        assert_eq!(config.feed_plan().kinds().len(), 1 + MAX_DESTINATIONS + 1 + 1 + 2);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = config(&[("HTTP_TIMEOUT_SECS", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Zero { var: "HTTP_TIMEOUT_SECS" }));
        assert_eq!(err.to_string(), "HTTP_TIMEOUT_SECS: must be greater than zero");

        let config = config(&[("HTTP_TIMEOUT_SECS", "5")]).unwrap();
        assert_eq!(config.http_timeout_secs, 5);
    }

    #[test]
    fn malformed_bind_addr_is_rejected() {
        let err = config(&[("BIND_ADDR", "localhost")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidAddr { .. }));
    }

    #[test]
    fn feed_plan_carries_request_bounds() {
        let config = config(&[("NUM_DEPARTURES", "5"), ("TIME_WINDOW", "60")]).unwrap();
        let plan = config.feed_plan();

        assert_eq!(plan.station, config.station);
        assert_eq!(plan.num_rows.get(), 5);
        assert_eq!(plan.time_window.minutes(), 60);
        assert_eq!(plan.destinations.len(), 3);
        assert_eq!(plan.kinds().len(), 1 + 3 + 1 + 1 + 2);
    }
}
