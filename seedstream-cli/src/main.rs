//! Seedstream server binary.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use seedstream_core::EngineConfig;
use seedstream_web::{ServerConfig, run_server};

#[derive(Parser)]
#[command(name = "seedstream")]
#[command(about = "Video upload server that seeds every upload over BitTorrent")]
struct Cli {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// SQLite database URL
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://seedstream.db")]
    database_url: String,

    /// Directory uploaded videos are stored under
    #[arg(long, env = "UPLOAD_DIR", default_value = "uploads/videos")]
    upload_dir: PathBuf,

    /// Maximum upload size in bytes
    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value_t = seedstream_web::server::DEFAULT_MAX_UPLOAD_BYTES)]
    max_upload_bytes: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    let config = ServerConfig {
        port: cli.port,
        database_url: cli.database_url,
        upload_dir: cli.upload_dir,
        max_upload_bytes: cli.max_upload_bytes,
        engine: EngineConfig::default(),
    };

    tracing::info!(
        port = config.port,
        database_url = config.database_url,
        upload_dir = %config.upload_dir.display(),
        "starting seedstream"
    );

    run_server(config).await
}
