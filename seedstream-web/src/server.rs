//! HTTP server assembly, startup re-seeding and graceful shutdown.

use std::path::PathBuf;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;

use seedstream_core::{EngineConfig, SeederHandle, spawn_seeder};
use seedstream_db::VideoStore;

use crate::handlers::{self, AppState};

/// Default upload size cap: 500 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 500 * 1024 * 1024;

/// Slack on top of the upload cap for multipart framing, so the streaming
/// size check fires before the body-limit layer does.
const BODY_LIMIT_SLACK: usize = 1024 * 1024;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub database_url: String,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: u64,
    pub engine: EngineConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            database_url: "sqlite://seedstream.db".to_string(),
            upload_dir: PathBuf::from("uploads/videos"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            engine: EngineConfig::default(),
        }
    }
}

/// Builds the API router over the given state.
///
/// The magnet route is registered before the catch-all id route so
/// `/api/videos/{id}/magnet` never resolves as a video id.
pub fn build_router(state: AppState) -> Router {
    let body_limit = usize::try_from(state.max_upload_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(BODY_LIMIT_SLACK);

    Router::new()
        .route("/api/videos/upload", post(handlers::upload_video))
        .route("/api/videos", get(handlers::list_videos))
        .route("/api/videos/stats", get(handlers::get_stats))
        .route("/api/videos/{video_id}/magnet", get(handlers::get_magnet))
        .route("/api/videos/{video_id}", get(handlers::get_video))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Re-seeds every stored video so magnet links survive restarts.
///
/// Items whose file is missing or unreadable are logged and skipped;
/// one damaged upload must not keep the rest offline.
pub async fn reseed_existing(
    store: &VideoStore,
    seeder: &SeederHandle,
) -> Result<usize, Box<dyn std::error::Error>> {
    let videos = store.find_all().await?;
    let mut reseeded = 0;

    for video in &videos {
        match seeder.start_seeding(video.file_path.as_ref()).await {
            Ok(seed) => {
                reseeded += 1;
                tracing::debug!(
                    video_id = video.video_id,
                    info_hash = %seed.info_hash,
                    "re-seeding stored video"
                );
            }
            Err(err) => {
                tracing::warn!(
                    video_id = video.video_id,
                    path = video.file_path,
                    error = %err,
                    "skipping stored video that can no longer be seeded"
                );
            }
        }
    }

    tracing::info!(total = videos.len(), reseeded, "startup re-seed complete");
    Ok(reseeded)
}

/// Runs the server until Ctrl+C or SIGTERM.
///
/// Startup order: storage, upload root, seeding engine, re-seed of stored
/// videos, then the listener. Shutdown reverses it: the listener stops
/// accepting first, then the seeding engine is torn down.
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = VideoStore::connect(&config.database_url).await?;
    store.init_schema().await?;

    tokio::fs::create_dir_all(&config.upload_dir).await?;

    let seeder = spawn_seeder(config.engine.clone());
    reseed_existing(&store, &seeder).await?;

    let state = AppState {
        store,
        seeder: seeder.clone(),
        upload_root: config.upload_dir.clone(),
        max_upload_bytes: config.max_upload_bytes,
    };
    let router = build_router(state);

    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(port = config.port, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("listener stopped, tearing down seeding engine");
    if let Err(err) = seeder.shutdown().await {
        tracing::warn!(error = %err, "seeding engine did not shut down cleanly");
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
