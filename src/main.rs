//! Users REST service entry point.

use std::net::SocketAddr;
use std::time::Duration;

use clap::{Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use users_service::api::{create_router, AppState};
use users_service::config::{self, Config};
use users_service::db;
use users_service::error::ServiceError;
use users_service::metrics;
use users_service::utils::shutdown_signal;

/// Users REST service.
#[derive(Parser, Debug)]
#[command(name = "users-service")]
#[command(about = "REST CRUD service for a users table backed by Postgres")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Run,

    /// Check configuration validity.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("users_service=debug,tower_http=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // Handle subcommands
    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(),
        Some(Command::Run) | None => cmd_run().await,
    }
}

/// Check configuration validity.
fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("USERS SERVICE - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Database: {}", config.display_url());
    println!("  Log Level: {}", config.rust_log);
    println!("  Listen Port: {}", config::LISTEN_PORT);
    println!("  Pool Ceiling: {}", config::POOL_MAX_CONNECTIONS);
    println!("  Connect Timeout: {}ms", config::CONNECT_TIMEOUT_MS);
    println!("  Idle Timeout: {}ms", config::IDLE_TIMEOUT_MS);
    println!(
        "  Bootstrap: {} attempts, {}ms apart",
        config::BOOTSTRAP_ATTEMPTS,
        config::BOOTSTRAP_DELAY_MS
    );
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Run the HTTP server.
async fn cmd_run() -> anyhow::Result<()> {
    // Initialize metrics
    let prometheus = PrometheusBuilder::new().install_recorder()?;
    metrics::init_metrics();

    // Load configuration
    info!("Loading configuration...");
    let config = Config::load().map_err(ServiceError::from)?;
    info!("Database: {}", config.display_url());

    // Build the pool; no connection is attempted until the first query.
    let pool = db::build_pool(&config);
    let app_state = AppState::new(pool.clone(), prometheus);

    // Bootstrap: reach the database and ensure the schema before binding.
    // Exhaustion is non-fatal; the listener binds regardless and individual
    // queries fail until the database comes back.
    let bootstrap_ok = db::initialize(
        &pool,
        config::BOOTSTRAP_ATTEMPTS,
        Duration::from_millis(config::BOOTSTRAP_DELAY_MS),
    )
    .await;
    app_state.set_bootstrap_ok(bootstrap_ok);
    if !bootstrap_ok {
        warn!("Starting in degraded mode: database unreachable at bootstrap");
    }

    // Start HTTP server
    let addr = SocketAddr::from(([0, 0, 0, 0], config::LISTEN_PORT));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    let router = create_router(app_state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
