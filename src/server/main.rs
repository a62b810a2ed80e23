//! Geofence regions API server.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use georegions::config::{Config, StoreBackend};
use georegions::geocoder::GoogleGeocoder;
use georegions::http::{router, AppState};
use georegions::store::Stores;

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "server")]
#[command(about = "Geofence regions API server")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overrides the config file
    #[arg(short, long)]
    listen: Option<String>,

    /// Store backend, overrides the config file
    #[arg(long, value_enum)]
    store: Option<StoreBackend>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(listen) = args.listen {
        config.server.listen = listen;
    }
    if let Some(backend) = args.store {
        config.store.backend = backend;
    }

    info!("Geofence regions server");

    let stores = Stores::connect(&config.store).await?;

    if config.geocoder.api_key.is_empty() {
        warn!("No geocoding API key configured; address resolution will fail");
    }
    let geocoder = Arc::new(GoogleGeocoder::new(&config.geocoder)?);

    let state = Arc::new(AppState::new(stores, geocoder, config.geocoder.timeout()));
    let app = router(state);

    info!("Starting server on {}", config.server.listen);

    let listener = tokio::net::TcpListener::bind(&config.server.listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
