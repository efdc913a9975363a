//! Render worker binary.

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use reel_catalog::Catalog;
use reel_queue::JobQueue;
use reel_renderer::RendererClient;
use reel_worker::{Executor, Processor, WorkerConfig};

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env().add_directive("reel=info".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(true).with_target(true))
            .with(env_filter)
            .init();
    }

    info!("Starting reel-worker");

    let config = WorkerConfig::from_env();
    info!("Worker config: {:?}", config);

    let catalog = match Catalog::from_env().await {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to connect to catalog: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = catalog.init_schema().await {
        error!("Failed to initialize catalog schema: {}", e);
        std::process::exit(1);
    }

    let queue = match JobQueue::from_env() {
        Ok(q) => q,
        Err(e) => {
            error!("Failed to create job queue: {}", e);
            std::process::exit(1);
        }
    };

    let storage = match reel_storage::provider_from_env() {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to create storage provider: {}", e);
            std::process::exit(1);
        }
    };
    info!("Storage provider: {}", storage.provider_label());

    let renderer = match RendererClient::new(&config.renderer_base_url) {
        Ok(r) => r,
        Err(e) => {
            error!("Failed to create renderer client: {}", e);
            std::process::exit(1);
        }
    };

    let processor = Processor::new(&catalog, storage, renderer, &config);
    let executor = Executor::new(config, queue, processor, catalog.jobs());

    // Flip the shutdown signal on ctrl-c
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received shutdown signal");
        shutdown_tx.send(true).ok();
    });

    if let Err(e) = executor.run(shutdown_rx).await {
        error!("Executor error: {}", e);
        std::process::exit(1);
    }

    info!("Worker shutdown complete");
}
