//! Unified rail client with primary → secondary fallback.
//!
//! The primary provider (Darwin) is tried first when it is configured.
//! Only once it has definitively failed is the secondary provider
//! (Huxley) asked. The two are never raced; an unresponsive primary
//! costs its full transport timeout before the fallback starts.

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use futures::FutureExt;
use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::FeedRequest;
use crate::providers::{
    Board, Payload, ProviderError, ProviderResult, RailProvider, payload_has_data,
};

/// Which provider satisfied a rail request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceTag {
    Primary,
    Secondary,
    /// Neither provider returned data.
    None,
}

impl SourceTag {
    fn to_u8(self) -> u8 {
        match self {
            SourceTag::Primary => 1,
            SourceTag::Secondary => 2,
            SourceTag::None => 0,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => SourceTag::Primary,
            2 => SourceTag::Secondary,
            _ => SourceTag::None,
        }
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SourceTag::Primary => "primary",
            SourceTag::Secondary => "secondary",
            SourceTag::None => "none",
        })
    }
}

/// Result of one unified rail request.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainResponse {
    pub result: ProviderResult,
    pub source: SourceTag,
}

/// Outcome of the primary step of the pipeline.
enum PrimaryStep {
    /// Primary returned data; stop here.
    Satisfied(Payload),
    /// Primary returned nothing usable or panicked.
    Failed(ProviderError),
    /// No primary configured.
    Skipped,
}

/// One `departures`/`arrivals` contract over two rail providers.
pub struct TrainClient {
    primary: Option<Arc<dyn RailProvider>>,
    secondary: Arc<dyn RailProvider>,
    last_source: AtomicU8,
}

impl TrainClient {
    /// `primary` is `None` when no primary credential was supplied.
    pub fn new(primary: Option<Arc<dyn RailProvider>>, secondary: Arc<dyn RailProvider>) -> Self {
        Self {
            primary,
            secondary,
            last_source: AtomicU8::new(SourceTag::None.to_u8()),
        }
    }

    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }

    /// Which provider answered the most recent request through this
    /// client, across all feeds sharing it.
    pub fn last_source(&self) -> SourceTag {
        SourceTag::from_u8(self.last_source.load(Ordering::Relaxed))
    }

    pub async fn get_departures(&self, request: &FeedRequest) -> TrainResponse {
        self.fetch(Board::Departures, request).await
    }

    pub async fn get_arrivals(&self, request: &FeedRequest) -> TrainResponse {
        self.fetch(Board::Arrivals, request).await
    }

    async fn fetch(&self, board: Board, request: &FeedRequest) -> TrainResponse {
        let response = match self.try_primary(board, request).await {
            PrimaryStep::Satisfied(payload) => TrainResponse {
                result: ProviderResult::Success(payload),
                source: SourceTag::Primary,
            },
            PrimaryStep::Failed(cause) => {
                warn!(
                    board = board.as_str(),
                    station = %request.station(),
                    error = %cause,
                    "primary failed, falling back to secondary"
                );
                self.try_secondary(board, request).await
            }
            PrimaryStep::Skipped => self.try_secondary(board, request).await,
        };

        self.last_source
            .store(response.source.to_u8(), Ordering::Relaxed);
        response
    }

    /// Step one: ask the primary and decide whether to fall back.
    async fn try_primary(&self, board: Board, request: &FeedRequest) -> PrimaryStep {
        let Some(primary) = &self.primary else {
            return PrimaryStep::Skipped;
        };
        let station = request.station();
        debug!(provider = primary.name(), board = board.as_str(), %station, "trying primary");

        let call = AssertUnwindSafe(async { primary.board(board, request).await });
        let result = match call.catch_unwind().await {
            Ok(result) => result,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                warn!(provider = primary.name(), %station, error = %message, "primary provider panicked");
                ProviderResult::Empty(ProviderError::Transport(format!("provider panicked: {message}")))
            }
        };

        match result {
            ProviderResult::Success(payload) if payload_has_data(&payload) => {
                debug!(provider = primary.name(), %station, "primary succeeded");
                PrimaryStep::Satisfied(payload)
            }
            other => PrimaryStep::Failed(other.cause().cloned().unwrap_or(ProviderError::NoContent)),
        }
    }

    /// Step two: ask the secondary; its answer is final.
    async fn try_secondary(&self, board: Board, request: &FeedRequest) -> TrainResponse {
        debug!(
            provider = self.secondary.name(),
            board = board.as_str(),
            station = %request.station(),
            "using secondary"
        );

        match self.secondary.board(board, request).await {
            ProviderResult::Success(payload) if payload_has_data(&payload) => TrainResponse {
                result: ProviderResult::Success(payload),
                source: SourceTag::Secondary,
            },
            ProviderResult::Success(_) => TrainResponse {
                result: ProviderResult::Empty(ProviderError::NoContent),
                source: SourceTag::None,
            },
            empty @ ProviderResult::Empty(_) => TrainResponse {
                result: empty,
                source: SourceTag::None,
            },
        }
    }
}

/// Best-effort text of a caught panic payload.
pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
