// ABOUTME: The `serve` command
// ABOUTME: Boots the application context and runs the HTTP server until shutdown or a fatal error

use anyhow::Context;
use clientwatch_api::{create_router, ApiState};
use clientwatch_config::Config;
use clientwatch_monitor::AppContext;
use std::future::IntoFuture;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info};

pub async fn run(config: Config) -> anyhow::Result<()> {
    info!(
        "Starting Client Watch (database {}, port {})",
        config.database_path.display(),
        config.port
    );

    let (context, mut fatal_rx) = AppContext::bootstrap(&config)
        .await
        .context("Failed to start Client Watch")?;

    let app = create_router(ApiState::from_context(&context), &config.cors_origin);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            context.shutdown().await;
            return Err(e).with_context(|| format!("Failed to bind {}", addr));
        }
    };
    info!("Listening on http://{}", addr);

    let outcome = tokio::select! {
        result = axum::serve(listener, app).into_future() => {
            result.context("HTTP server stopped")
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown requested");
            Ok(())
        }
        Some(err) = fatal_rx.recv() => {
            error!("Stopping after fatal error");
            Err(anyhow::Error::new(err).context("Fatal error"))
        }
    };

    context.shutdown().await;
    outcome
}
