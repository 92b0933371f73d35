use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use bikeshare_server::cache::{CacheConfig, CachedLookup};
use bikeshare_server::config::AppConfig;
use bikeshare_server::geocoding::{
    HttpTransport, HttpTransportConfig, NominatimLookup, NominatimSearch, ProviderChain,
};
use bikeshare_server::pipeline::ResolutionPipeline;
use bikeshare_server::stations::{PersistedStationStore, StationFile, StationFileConfig};
use bikeshare_server::web::{AppState, create_router};

/// Timeout for the upstream lookup behind the local endpoint.
const UPSTREAM_TIMEOUT_SECS: u64 = 10;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;

    // Station store
    let mut file_config = StationFileConfig::new(&config.data_file);
    if let Some(fallback) = &config.fallback_data_file {
        file_config = file_config.with_fallback(fallback);
    }
    let store = Arc::new(PersistedStationStore::load(StationFile::new(file_config)));
    info!(count = store.len(), path = %config.data_file.display(), "loaded stations");

    // Provider chain and pipeline
    let chain_transport = HttpTransport::new(
        HttpTransportConfig::default().with_timeout(config.pipeline.provider_timeout_secs),
    )?;
    let chain = ProviderChain::standard(
        chain_transport,
        &config.local_geocoder_url,
        &config.language,
    );
    info!(providers = ?chain.provider_names(), "geocoding providers");
    let pipeline = ResolutionPipeline::new(Arc::clone(&store), chain, &config.pipeline);

    // Local reverse-geocode endpoint and search
    let upstream =
        HttpTransport::new(HttpTransportConfig::default().with_timeout(UPSTREAM_TIMEOUT_SECS))?;
    let mut lookup = NominatimLookup::new(&config.language);
    if let Some(email) = &config.contact_email {
        lookup = lookup.with_email(email);
    }
    let lookup = CachedLookup::new(upstream.clone(), lookup, &CacheConfig::default());

    let state = AppState::new(pipeline.clone(), lookup, NominatimSearch::new(), upstream);
    let static_dir = config
        .static_dir
        .as_ref()
        .map(|dir| dir.to_string_lossy().into_owned());
    let app = create_router(state, static_dir.as_deref());

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(addr = %config.bind, "bike-share dashboard listening");

    // Stations saved before their address arrived
    let queued = store
        .list()
        .iter()
        .filter(|station| pipeline.request_resolution(station, false))
        .count();
    if queued > 0 {
        info!(queued, "resuming address resolution");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!(pending = pipeline.pending(), "waiting for address resolution to finish");
    pipeline.drained().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
