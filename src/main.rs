use std::sync::Arc;

use chrono::{Days, Utc};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use activation_server::activation::ActivationService;
use activation_server::config::Config;
use activation_server::db::{AppState, create_pool, init_db, queries};
use activation_server::handlers;
use activation_server::models::CreateActivationRecord;
use activation_server::store::SqliteStore;

#[derive(Parser, Debug)]
#[command(name = "activation-server")]
#[command(about = "Single-device activation code backend")]
struct Cli {
    /// Seed the database with sample activation codes (dev mode only)
    #[arg(long)]
    seed: bool,

    /// Delete the database on exit (dev mode only, useful for fresh starts)
    #[arg(long)]
    ephemeral: bool,
}

/// Seeds a handful of codes covering the interesting states.
/// Only runs in dev mode and when the table is empty.
fn seed_dev_data(store: &SqliteStore) {
    let conn = store.pool().get().expect("Failed to get db connection for seeding");

    let count = queries::count_records(&conn).expect("Failed to count activation codes");
    if count > 0 {
        tracing::info!("Database already has activation codes, skipping seed");
        return;
    }

    let today = Utc::now().date_naive();
    let samples = [
        ("DEMO-0001", "Active Demo", today + Days::new(365)),
        ("DEMO-0002", "Second Demo", today + Days::new(30)),
        ("DEMO-EXPD", "Expired Demo", today - Days::new(1)),
    ];

    tracing::info!("============================================");
    tracing::info!("SEEDING DEV DATA");
    tracing::info!("============================================");

    for (code, name, active_till) in samples {
        let record = queries::create_record(
            &conn,
            &CreateActivationRecord {
                code: code.to_string(),
                email: Some("dev@activation.local".to_string()),
                name: Some(name.to_string()),
                active_till,
            },
        )
        .expect("Failed to create dev activation code");
        tracing::info!("Code: {} (valid through {})", code, record.active_till);
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "activation_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    if config.dev_mode {
        tracing::info!("Running in DEVELOPMENT mode");
    }

    let pool = create_pool(&config.database_path).expect("Failed to create database pool");
    {
        let conn = pool.get().expect("Failed to get connection");
        init_db(&conn).expect("Failed to initialize database");
        match queries::count_records(&conn) {
            Ok(count) => tracing::info!("Database ready: {} activation code(s)", count),
            Err(e) => tracing::warn!("Database connection check failed: {}", e),
        }
    }

    let store = SqliteStore::new(pool);

    if cli.seed {
        if !config.dev_mode {
            tracing::warn!("--seed flag ignored: not in dev mode (set ACTIVATION_ENV=dev)");
        } else {
            seed_dev_data(&store);
        }
    }

    let state = AppState {
        activations: ActivationService::new(Arc::new(store)),
    };

    let app = handlers::app(state, &config.allowed_origins);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    let cleanup_on_exit = cli.ephemeral && config.dev_mode;
    if cleanup_on_exit {
        tracing::info!("EPHEMERAL MODE: database will be deleted on exit");
    }

    tracing::info!("Activation server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");

    if cleanup_on_exit {
        let db_path = &config.database_path;
        if let Err(e) = std::fs::remove_file(db_path) {
            tracing::warn!("Failed to remove {}: {}", db_path, e);
        } else {
            tracing::info!("Removed {}", db_path);
        }
        let _ = std::fs::remove_file(format!("{}-wal", db_path));
        let _ = std::fs::remove_file(format!("{}-shm", db_path));
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}
