mod clients;
mod config;
mod error;
mod helpers;
mod models;
mod routes;
mod status;
mod summary;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use clients::registry::ClusterRegistry;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ClusterRegistry>,
    pub config: Arc<config::Config>,
}

/// Read-only JSON dashboard over one or more Kubernetes clusters.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Path to the YAML config file.
    #[arg(
        long,
        env = "KUBEGLANCE_CONFIG",
        default_value = "/etc/kubeglance/config.yaml"
    )]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("kubeglance=info")),
        )
        .init();

    let args = Args::parse();
    let cfg = config::Config::load(&args.config)
        .with_context(|| format!("loading config {}", args.config.display()))?;

    let registry = Arc::new(ClusterRegistry::from_config(&cfg));
    info!("registered clusters: {}", registry.names().join(", "));
    let cfg = Arc::new(cfg);

    // Shutdown signal
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(());

    tokio::spawn(
        registry
            .clone()
            .run_health_checker(cfg.health_interval(), shutdown_rx),
    );

    let state = AppState {
        registry,
        config: cfg.clone(),
    };

    let router = routes::build_router(state);

    let listen_addr = cfg.listen_addr();
    let listener = TcpListener::bind(&listen_addr)
        .await
        .with_context(|| format!("binding {}", listen_addr))?;

    info!("kubeglance listening on {}", listen_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = shutdown_tx.send(());
        })
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("failed to listen for ctrl+c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
