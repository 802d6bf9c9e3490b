//! Box Office Server
//!
//! Event listing, spot inventory and ticket checkout backed by external
//! reservation partners.

mod api;
mod config;
mod server;
mod shutdown;
mod state;

use boxoffice_core::BoxOffice;
use boxoffice_core::framework::DatabaseProcessor;
use boxoffice_core::partners::RoutingPartnerFactory;
use boxoffice_core::repository::{EventRepository, InMemoryEventRepository, PgEventRepository};
use clap::{Parser, ValueEnum};
use config::{ConfigLoader, get_database_url};
use server::{build_router, run_server};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Where events, spots and tickets are kept.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Storage {
    /// PostgreSQL at `DATABASE_URL`
    Postgres,
    /// Process memory; everything is lost on exit
    Memory,
}

/// Box Office - event ticketing through reservation partners
#[derive(Parser, Debug)]
#[command(name = "boxoffice-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./boxoffice-config.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Run database migrations on startup
    #[arg(long, default_value = "false")]
    migrate: bool,

    /// Storage backend
    #[arg(long, value_enum, default_value_t = Storage::Postgres)]
    storage: Storage,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let args = Args::parse();

    tracing::info!("Starting boxoffice-server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = ConfigLoader::new(&args.config, args.listen)
        .load()
        .map_err(|e| {
            tracing::error!("Failed to load configuration: {}", e);
            e
        })?;
    tracing::info!(
        partners = config.partner_routes.len(),
        "Configuration loaded from {:?}",
        args.config
    );

    let (repository, db_pool): (Arc<dyn EventRepository>, Option<PgPool>) = match args.storage {
        Storage::Memory => {
            tracing::warn!("Using in-memory storage; data will not survive a restart");
            (Arc::new(InMemoryEventRepository::new()), None)
        }
        Storage::Postgres => {
            let db_pool = connect_database(args.migrate).await?;
            let repository = PgEventRepository::new(DatabaseProcessor::new(db_pool.clone()));
            (Arc::new(repository), Some(db_pool))
        }
    };

    let partners = RoutingPartnerFactory::new(config.partner_routes, config.partner_timeout)?;
    let box_office = BoxOffice::new(
        repository,
        Arc::new(partners),
        config.prices,
        config.partner_timeout,
    );

    // Build the router
    let router = build_router(AppState::new(box_office));

    // Run the server
    tracing::info!("Starting HTTP server on {}", config.listen);
    let result = run_server(router, config.listen).await;

    // Close database connections gracefully
    if let Some(db_pool) = db_pool {
        tracing::info!("Closing database connections...");
        db_pool.close().await;
    }
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

async fn connect_database(migrate: bool) -> anyhow::Result<PgPool> {
    // Get database URL from environment
    let database_url = get_database_url().map_err(|e| {
        tracing::error!("DATABASE_URL environment variable not set");
        e
    })?;

    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .map_err(|e| {
            tracing::error!("Failed to connect to database: {}", e);
            e
        })?;
    tracing::info!("Database connection established");

    if migrate {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("../migrations")
            .run(&db_pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to run migrations: {}", e);
                e
            })?;
        tracing::info!("Migrations completed successfully");
    }

    Ok(db_pool)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,tower_http=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
