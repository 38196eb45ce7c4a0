use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use transit_feeds::cache::{CacheConfig, CachedStationSearch};
use transit_feeds::config::TransportConfig;
use transit_feeds::feeds::{FeedRegistry, FeedSources};
use transit_feeds::providers::{
    DarwinClient, DarwinConfig, HttpConfig, HuxleyClient, HuxleyConfig, MockRailProvider,
    RailProvider, TflClient, TflConfig, build_http_client,
};
use transit_feeds::train::TrainClient;
use transit_feeds::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,transit_feeds=debug")),
        )
        .init();

    let config = match TransportConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    // One connection pool for every upstream
    let http_config = HttpConfig::default().with_timeout(config.http_timeout_secs);
    let http = build_http_client(&http_config).expect("Failed to create HTTP client");

    let huxley_config = HuxleyConfig::new()
        .with_base_url(&config.huxley_base_url)
        .with_access_token(config.huxley_access_token.clone());
    let huxley = HuxleyClient::new(http.clone(), huxley_config);

    let trains = match &config.mock_data_dir {
        Some(dir) => {
            let mock = MockRailProvider::from_dir(dir).expect("Failed to load mock rail data");
            info!(
                dir = %dir.display(),
                stations = mock.available_stations().len(),
                "serving rail boards from mock data"
            );
            TrainClient::new(None, Arc::new(mock))
        }
        None => {
            let primary: Option<Arc<dyn RailProvider>> = match &config.darwin_api_key {
                Some(key) => match DarwinClient::new(http.clone(), DarwinConfig::new(key)) {
                    Ok(darwin) => {
                        info!("Darwin API key configured, using it as the primary rail source");
                        Some(Arc::new(darwin) as Arc<dyn RailProvider>)
                    }
                    Err(e) => {
                        warn!(error = %e, "Darwin disabled, using Huxley only");
                        None
                    }
                },
                None => {
                    info!("no Darwin API key, using Huxley only");
                    None
                }
            };
            TrainClient::new(primary, Arc::new(huxley.clone()))
        }
    };

    let tfl = TflClient::new(http.clone(), TflConfig::new(config.tfl_app_key.clone()));
    let sources = FeedSources {
        trains: Arc::new(trains),
        transit: Arc::new(tfl.clone()),
    };

    let registry = Arc::new(FeedRegistry::start(config.feed_plan().kinds(), sources).await);

    let stations = CachedStationSearch::new(huxley, &CacheConfig::default());
    let state = AppState::new(registry.clone(), stations, tfl, &config.station_naptan);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind listener");
    info!(addr = %config.bind_addr, feeds = registry.len(), "transit feeds listening");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %e, "server error");
    }

    // The router (and its clone of the registry) is gone once serve returns
    match Arc::try_unwrap(registry) {
        Ok(registry) => registry.shutdown().await,
        Err(registry) => registry.signal_shutdown(),
    }
    info!("shut down");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
