//! File-backed rail provider for running without upstream access.
//!
//! Loads sample boards from JSON files and serves them as if they were
//! live responses.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Value;

use crate::domain::{Crs, FeedRequest};

use super::error::ProviderError;
use super::result::ProviderResult;
use super::RailProvider;

/// Errors loading mock board files.
#[derive(Debug, thiserror::Error)]
pub enum MockDataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid CRS in filename {0:?}")]
    InvalidCrs(PathBuf),

    #[error("no mock board files found in {0}")]
    NoBoards(PathBuf),
}

/// Rail provider that serves boards from `{CRS}.json` files.
///
/// The same board answers both departures and arrivals; filters and
/// time parameters are ignored.
#[derive(Debug, Clone)]
pub struct MockRailProvider {
    boards: Arc<HashMap<Crs, Arc<Value>>>,
}

impl MockRailProvider {
    /// Load every `{CRS}.json` file in `data_dir`.
    pub fn from_dir(data_dir: impl AsRef<Path>) -> Result<Self, MockDataError> {
        let data_dir = data_dir.as_ref();
        let io_err = |path: &Path, source| MockDataError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut boards = HashMap::new();
        for entry in std::fs::read_dir(data_dir).map_err(|e| io_err(data_dir, e))? {
            let path = entry.map_err(|e| io_err(data_dir, e))?.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            let crs = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| Crs::parse_normalized(s).ok())
                .ok_or_else(|| MockDataError::InvalidCrs(path.clone()))?;

            let json = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
            let board: Value = serde_json::from_str(&json).map_err(|source| MockDataError::Parse {
                path: path.clone(),
                source,
            })?;

            boards.insert(crs, Arc::new(board));
        }

        if boards.is_empty() {
            return Err(MockDataError::NoBoards(data_dir.to_path_buf()));
        }

        Ok(Self {
            boards: Arc::new(boards),
        })
    }

    /// Stations with a loaded board, sorted.
    pub fn available_stations(&self) -> Vec<Crs> {
        let mut stations: Vec<Crs> = self.boards.keys().copied().collect();
        stations.sort();
        stations
    }

    fn board(&self, request: &FeedRequest) -> ProviderResult {
        match self.boards.get(&request.station()) {
            Some(board) => ProviderResult::Success(board.clone()),
            None => ProviderResult::Empty(ProviderError::Status {
                status: 404,
                message: format!("no mock board for {}", request.station()),
            }),
        }
    }
}

impl RailProvider for MockRailProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn departures<'a>(&'a self, request: &'a FeedRequest) -> BoxFuture<'a, ProviderResult> {
        futures::future::ready(self.board(request)).boxed()
    }

    fn arrivals<'a>(&'a self, request: &'a FeedRequest) -> BoxFuture<'a, ProviderResult> {
        futures::future::ready(self.board(request)).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RowCount, TimeWindow};
    use serde_json::json;
    use tempfile::tempdir;

    fn request(station: &str) -> FeedRequest {
        FeedRequest::new(
            Crs::parse(station).unwrap(),
            RowCount::default(),
            TimeWindow::default(),
        )
    }

    fn write_board(dir: &Path, name: &str, board: &Value) {
        std::fs::write(dir.join(name), serde_json::to_string(board).unwrap()).unwrap();
    }

    #[tokio::test]
    async fn serves_loaded_boards() {
        let dir = tempdir().unwrap();
        let board = json!({"locationName": "Grove Park", "crs": "GRP", "trainServices": []});
        write_board(dir.path(), "GRP.json", &board);
        write_board(dir.path(), "vic.json", &json!({"crs": "VIC"}));
        std::fs::write(dir.path().join("README.txt"), "ignored").unwrap();

        let mock = MockRailProvider::from_dir(dir.path()).unwrap();
        assert_eq!(
            mock.available_stations(),
            vec![Crs::parse("GRP").unwrap(), Crs::parse("VIC").unwrap()]
        );

        let result = mock.departures(&request("GRP")).await;
        assert_eq!(**result.payload().unwrap(), board);
        assert_eq!(mock.arrivals(&request("GRP")).await, result);
    }

    #[tokio::test]
    async fn unknown_station_is_empty() {
        let dir = tempdir().unwrap();
        write_board(dir.path(), "GRP.json", &json!({"crs": "GRP"}));
        let mock = MockRailProvider::from_dir(dir.path()).unwrap();

        let result = mock.departures(&request("XYZ")).await;
        assert!(matches!(
            result,
            ProviderResult::Empty(ProviderError::Status { status: 404, .. })
        ));
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            MockRailProvider::from_dir(dir.path()),
            Err(MockDataError::NoBoards(_))
        ));
    }

    #[test]
    fn bad_filename_and_bad_json_are_errors() {
        let dir = tempdir().unwrap();
        write_board(dir.path(), "GROVE.json", &json!({}));
        assert!(matches!(
            MockRailProvider::from_dir(dir.path()),
            Err(MockDataError::InvalidCrs(_))
        ));

        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("GRP.json"), "{not json").unwrap();
        assert!(matches!(
            MockRailProvider::from_dir(dir.path()),
            Err(MockDataError::Parse { .. })
        ));
    }
}
