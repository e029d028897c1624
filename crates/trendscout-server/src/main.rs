mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use trendscout_scraper::{build_collectors, HttpSettings};
use trendscout_trends::{ArtifactStore, Pipeline, SnapshotCoordinator};

use crate::api::{build_app, default_trigger_rate_limit, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = trendscout_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let sources = trendscout_core::load_sources(&config.sources_path).with_context(|| {
        format!(
            "loading sources from {}",
            config.sources_path.display()
        )
    })?;
    let collectors = build_collectors(&sources.sources, &HttpSettings::from_app_config(&config))?;
    tracing::info!(
        env = %config.env,
        collectors = collectors.len(),
        artifact_dir = ?config.artifact_dir,
        "starting trendscout server"
    );

    let pipeline = Pipeline::new(collectors)
        .with_artifacts(config.artifact_dir.clone().map(ArtifactStore::new))
        .with_indexed_threshold(config.indexed_scoring_threshold);
    let coordinator = Arc::new(SnapshotCoordinator::new(pipeline));

    if config.run_on_start {
        coordinator.spawn_run();
    }

    let _scheduler =
        scheduler::build_scheduler(Arc::clone(&coordinator), &config.run_schedule).await?;

    let app = build_app(AppState { coordinator }, default_trigger_rate_limit());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
