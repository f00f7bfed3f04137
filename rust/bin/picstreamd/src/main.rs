//! `picstreamd` — the Picstream server binary.
//!
//! Usage:
//!   picstreamd [--data-dir <dir>] [--listen <addr>] [--jwt-secret <secret>]
//!
//! All persistent state (SQLite database, uploaded images) lives under
//! `--data-dir`.

mod routes;

use std::sync::Arc;

use clap::Parser;
use picstream_core::Module;
use tracing::info;

/// Picstream server.
#[derive(Parser, Debug)]
#[command(name = "picstreamd", about = "Picstream server")]
struct Cli {
    /// Directory for all persistent data.
    #[arg(long = "data-dir", default_value = "./data")]
    data_dir: std::path::PathBuf,

    /// Listen address.
    #[arg(long = "listen", default_value = "0.0.0.0:8080")]
    listen: String,

    /// JWT signing secret. Falls back to a development default.
    #[arg(long = "jwt-secret", env = "PICSTREAM_JWT_SECRET")]
    jwt_secret: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    // Initialize storage.
    std::fs::create_dir_all(&cli.data_dir)?;
    let core_config = picstream_core::ServiceConfig {
        data_dir: Some(cli.data_dir.clone()),
        listen: cli.listen.clone(),
        ..Default::default()
    };

    let sql: Arc<dyn picstream_sql::SQLStore> = Arc::new(
        picstream_sql::SqliteStore::open(&core_config.resolve_sqlite_path())
            .map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?,
    );
    let blob: Arc<dyn picstream_blob::BlobStore> = Arc::new(
        picstream_blob::FileStore::open(&core_config.resolve_blob_dir())
            .map_err(|e| anyhow::anyhow!("failed to open blob store: {}", e))?,
    );

    let mut social_config = social::service::SocialConfig::default();
    if let Some(secret) = cli.jwt_secret {
        social_config.jwt_secret = secret;
    }

    let social_module =
        social::SocialModule::new(Arc::clone(&sql), Arc::clone(&blob), social_config)?;
    info!("Social module initialized");

    let module_routes = vec![(social_module.name().to_string(), social_module.routes())];

    // Build router and serve.
    let app = routes::build_router(module_routes);

    let listener = tokio::net::TcpListener::bind(&cli.listen).await?;
    info!("Picstream server listening on {}", cli.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
