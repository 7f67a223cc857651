mod api;
mod cli;
mod router;
mod state;

use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use crate::cli::{Cli, Command};
use crate::state::AppState;

fn load_config() -> skyquery_core::Config {
    skyquery_core::config::load_dotenv();
    skyquery_core::Config::from_env()
}

async fn serve(config: &skyquery_core::Config) -> anyhow::Result<()> {
    config.log_summary();

    let state = Arc::new(AppState::from_config(config));
    let app = router::build_router(state);

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn query_once(config: &skyquery_core::Config) -> anyhow::Result<()> {
    let state = AppState::from_config(config);
    let result = state.executor.fetch_rows().await?;
    print!("{}", api::render_rows(&result.rows));
    Ok(())
}

async fn list_datasets(config: &skyquery_core::Config) -> anyhow::Result<()> {
    let state = AppState::from_config(config);
    for id in state.executor.datasets().await? {
        println!("{}", id);
    }
    Ok(())
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl_c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {},
                    _ = sigterm.recv() => {},
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to register SIGTERM handler");
                ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let mut config = load_config();

    match Cli::parse().command() {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(&config).await?;
        }
        Command::Query => query_once(&config).await?,
        Command::Datasets => list_datasets(&config).await?,
    }

    Ok(())
}
