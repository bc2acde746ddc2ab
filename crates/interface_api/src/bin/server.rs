//! Commission back office API server
//!
//! # Usage
//!
//! ```bash
//! API_DATABASE_URL=postgres://... cargo run --bin commission-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_JWT_SECRET` - JWT signing secret (required in production)
//! * `API_JWT_EXPIRATION_SECS` - JWT token expiration in seconds (default: 3600)
//! * `API_DATABASE_URL` - PostgreSQL connection string
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `API_BUSINESS_TIMEZONE` - IANA timezone that closes months (default: Asia/Jakarta)
//! * `API_COMMISSION_SCHEDULE_PATH` - TOML commission schedule file (default: built-in schedule)

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use domain_commission::ScheduleBook;
use infra_db::{create_pool, run_migrations, DatabaseConfig};
use interface_api::{config::ApiConfig, create_router, AppState, Ports};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("invalid API configuration")?;

    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        timezone = config.business_timezone.name(),
        "Starting commission API server"
    );

    let schedules = load_schedules(&config)?;

    let pool = create_pool(
        DatabaseConfig::new(config.database_url.clone())
            .max_connections(10)
            .min_connections(2)
            .acquire_timeout(Duration::from_secs(30)),
    )
    .await
    .context("failed to connect to database")?;

    run_migrations(&pool).await.context("failed to apply migrations")?;

    let state = AppState::new(Ports::postgres(pool), schedules, config.clone());
    let app = create_router(state);

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .with_context(|| format!("invalid server address {}", config.server_addr()))?;

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Loads and validates the commission schedules; a bad file stops startup
fn load_schedules(config: &ApiConfig) -> anyhow::Result<Arc<ScheduleBook>> {
    let book = match &config.commission_schedule_path {
        Some(path) => ScheduleBook::from_toml_file(path)
            .with_context(|| format!("failed to load commission schedules from {path}"))?,
        None => ScheduleBook::standard(),
    };

    for schedule in book.schedules() {
        tracing::info!(
            version = %schedule.version,
            effective_from = %schedule.effective_from,
            basic_rate = %schedule.basic_rate,
            tiers = schedule.bonus_tiers.len(),
            "Commission schedule loaded"
        );
    }
    Ok(Arc::new(book))
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
