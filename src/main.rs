//! hyperlocal-server – entry point.
//!
//! Startup order:
//! 1. Parse CLI arguments and environment configuration (the LLM API key is
//!    required; the process refuses to start without it).
//! 2. Initialise tracing.
//! 3. Construct the disruption service (the MCP tool server is connected
//!    lazily on the first query).
//! 4. Build the Axum router and serve with graceful shutdown.

use std::process;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use hyperlocal::cli::Args;
use hyperlocal::config::Config;
use hyperlocal::routes;
use hyperlocal::service::DisruptionService;
use hyperlocal::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match Config::from_env_and_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let env_filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => match config.log_level.parse::<tracing_subscriber::EnvFilter>() {
            Ok(f) => f,
            Err(e) => {
                eprintln!(
                    "WARN: HYPERLOCAL_LOG='{}' is not a valid tracing filter ({}); \
                     falling back to 'info'",
                    config.log_level, e
                );
                tracing_subscriber::EnvFilter::new("info")
            }
        },
    };
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    info!(version = env!("CARGO_PKG_VERSION"), "hyperlocal-server starting");

    let config = Arc::new(config);
    let service = Arc::new(DisruptionService::new(Arc::clone(&config))?);

    let state = AppState {
        config: Arc::clone(&config),
        service,
    };

    let app = routes::build(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!(addr = %config.bind_address, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("hyperlocal-server stopped");
    Ok(())
}

/// Resolves when SIGINT (Ctrl-C) or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install CTRL+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => warn!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown signal received; starting graceful shutdown");
}
