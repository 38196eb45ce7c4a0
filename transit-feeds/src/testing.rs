//! Scripted providers for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Value;

use crate::domain::{Crs, FeedRequest, RowCount, TimeWindow};
use crate::providers::{ProviderError, ProviderResult, RailProvider, TransitProvider};

/// What a scripted provider does on one call.
#[derive(Debug, Clone)]
pub(crate) enum Script {
    Payload(Value),
    /// Resolves with the payload only after the delay has elapsed.
    Slow(Duration, Value),
    Empty,
    Panic,
}

/// Plays back a script, one step per call. The last step repeats.
#[derive(Debug)]
struct Playback {
    steps: Mutex<VecDeque<Script>>,
    calls: AtomicUsize,
}

impl Playback {
    fn new(steps: Vec<Script>) -> Self {
        assert!(!steps.is_empty(), "script needs at least one step");
        Self {
            steps: Mutex::new(steps.into()),
            calls: AtomicUsize::new(0),
        }
    }

    fn next(&self) -> BoxFuture<'static, ProviderResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = {
            let mut steps = self.steps.lock().unwrap();
            if steps.len() > 1 {
                steps.pop_front().unwrap()
            } else {
                steps[0].clone()
            }
        };

        match step {
            Script::Payload(value) => futures::future::ready(ProviderResult::success(value)).boxed(),
            Script::Slow(delay, value) => tokio::time::sleep(delay)
                .map(move |_| ProviderResult::success(value))
                .boxed(),
            Script::Empty => futures::future::ready(ProviderResult::Empty(ProviderError::Status {
                status: 503,
                message: "scripted outage".to_string(),
            }))
            .boxed(),
            Script::Panic => {
                futures::future::lazy(|_| -> ProviderResult { panic!("scripted provider panic") })
                    .boxed()
            }
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Rail provider driven by a script; counts calls across both boards.
#[derive(Debug)]
pub(crate) struct ScriptedRail {
    name: &'static str,
    playback: Playback,
}

impl ScriptedRail {
    pub(crate) fn new(name: &'static str, steps: Vec<Script>) -> Arc<Self> {
        Arc::new(Self {
            name,
            playback: Playback::new(steps),
        })
    }

    pub(crate) fn calls(&self) -> usize {
        self.playback.calls()
    }
}

impl RailProvider for ScriptedRail {
    fn name(&self) -> &'static str {
        self.name
    }

    fn departures<'a>(&'a self, _request: &'a FeedRequest) -> BoxFuture<'a, ProviderResult> {
        self.playback.next()
    }

    fn arrivals<'a>(&'a self, _request: &'a FeedRequest) -> BoxFuture<'a, ProviderResult> {
        self.playback.next()
    }
}

/// Transit provider driven by a script; counts calls across operations.
#[derive(Debug)]
pub(crate) struct ScriptedTransit {
    playback: Playback,
}

impl ScriptedTransit {
    pub(crate) fn new(steps: Vec<Script>) -> Arc<Self> {
        Arc::new(Self {
            playback: Playback::new(steps),
        })
    }

    pub(crate) fn calls(&self) -> usize {
        self.playback.calls()
    }
}

impl TransitProvider for ScriptedTransit {
    fn line_status<'a>(&'a self, _line_ids: &'a [String]) -> BoxFuture<'a, ProviderResult> {
        self.playback.next()
    }

    fn stop_arrivals<'a>(&'a self, _stop_id: &'a str) -> BoxFuture<'a, ProviderResult> {
        self.playback.next()
    }

    fn disruptions<'a>(&'a self, _modes: &'a [String]) -> BoxFuture<'a, ProviderResult> {
        self.playback.next()
    }
}

/// A plain unfiltered board request from Grove Park.
pub(crate) fn board_request() -> FeedRequest {
    FeedRequest::new(
        Crs::parse("GRP").unwrap(),
        RowCount::default(),
        TimeWindow::default(),
    )
}

/// Serves `router` on an ephemeral local port and returns its base URL.
pub(crate) async fn serve(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// A plain HTTP client for talking to local test servers.
pub(crate) fn http_client() -> reqwest::Client {
    crate::providers::build_http_client(&crate::providers::HttpConfig::default().with_timeout(5))
        .unwrap()
}
