//! cropwised: Cropwise daemon.
//!
//! Loads the model artifacts once, then serves crop and fertilizer
//! recommendations over HTTP until interrupted.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use cropwise::server::config::Config;
use cropwise::{ArtifactStore, Recommender};

/// Cropwise daemon: crop and fertilizer recommendation service.
#[derive(Parser)]
#[command(name = "cropwised")]
#[command(version = cropwise::PKG_VERSION)]
#[command(about = "Crop and fertilizer recommendation daemon")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind to, overriding the config file.
    #[arg(short, long, env = "CROPWISE_ADDRESS")]
    address: Option<String>,

    /// Directory holding the model artifacts, overriding the config file.
    #[arg(short, long, env = "CROPWISE_MODELS_DIR")]
    models_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing (default: info; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    // Load configuration, then apply CLI overrides
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(address) = args.address {
        config.server.address = address;
    }
    if let Some(dir) = args.models_dir {
        config.models.dir = dir;
    }
    let addr = config.socket_addr()?;

    // Artifacts must all load before anything is served
    let store = ArtifactStore::load(&config.models.dir)?;
    let summary = store.summary();
    info!(
        models_dir = %config.models.dir.display(),
        crop_classes = summary.crop_model.classes.len(),
        fertilizer_classes = summary.fertilizer_model.classes.len(),
        soil_types = summary.soil_types.len(),
        crop_types = summary.crop_types.len(),
        "artifacts loaded"
    );

    info!(version = cropwise::version_string(), %addr, "cropwised starting");

    let listener = TcpListener::bind(addr).await?;
    cropwise::server::serve(listener, Recommender::new(Arc::new(store))).await?;

    Ok(())
}
