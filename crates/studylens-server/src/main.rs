use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tracing::info;

use studylens::config::validate_config;
use studylens::{load_config, logging, Config, Database, Pipeline, SqliteContentStore, WorkerPool};
use studylens_server::{build_router, AppState};

#[derive(Parser, Debug)]
#[command(name = "studylens-server", version, about = "Learning material processing API")]
struct Args {
    /// Path to the JSON configuration file. Defaults apply when omitted.
    #[arg(short, long, env = "STUDYLENS_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, env = "STUDYLENS_HOST", default_value = "127.0.0.1")]
    host: String,

    #[arg(short, long, env = "STUDYLENS_PORT", default_value_t = 5000)]
    port: u16,

    /// Overrides `dataDirectory` from the config file.
    #[arg(long, env = "STUDYLENS_DATA_DIR")]
    data_dir: Option<String>,

    /// Overrides `logging.level`. `RUST_LOG` still wins.
    #[arg(long, env = "STUDYLENS_LOG_LEVEL")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(data_dir) = args.data_dir {
        config.data_directory = data_dir;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    validate_config(&config).context("Invalid configuration")?;

    logging::init(&config.logging).context("Failed to initialize logging")?;

    let db = Database::open(&config.database_path()).context("Failed to open database")?;
    let store = Arc::new(SqliteContentStore::new(db));
    let pipeline = Arc::new(
        Pipeline::from_config(&config, store).context("Failed to initialize backends")?,
    );
    let pool = Arc::new(WorkerPool::new(Arc::clone(&pipeline), config.worker_count));

    let state = AppState::new(
        &pipeline,
        Arc::clone(&pool),
        &config.owner_id,
        config.max_upload_bytes,
    );
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", args.host, args.port))?;
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Draining queued jobs...");
    pool.wait().await;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
