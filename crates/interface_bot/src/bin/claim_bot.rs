//! Claim Intake Bot - Binary
//!
//! Starts the Telegram long-polling loop and the conversation workers.
//!
//! # Usage
//!
//! ```bash
//! BOT_TOKEN=123:abc BOT_ADMIN_ID=42 cargo run --bin claim-bot
//! ```
//!
//! # Environment Variables
//!
//! * `BOT_TOKEN` - Bot API token (required)
//! * `BOT_ADMIN_ID` - Operator chat id (required)
//! * `BOT_DATABASE_URL` - SQLite connection string (default: sqlite://database.db?mode=rwc)
//! * `BOT_API_URL` - Bot API base URL (default: https://api.telegram.org)
//! * `BOT_POLL_TIMEOUT_SECS` - Long-poll timeout (default: 30)
//! * `BOT_PROGRESS_DELAY_MS` - Delay between verification steps (default: 1200)
//! * `BOT_HEALTH_ADDR` - Address of the health endpoint (default: disabled)
//! * `BOT_LOG_LEVEL` - Log level when `RUST_LOG` is unset (default: info)
//! * `BOT_LOG_JSON` - Emit JSON log lines (default: false)

use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use core_kernel::{HealthCheckable, TokioClock};
use domain_claims::ClaimFlow;
use infra_db::{create_pool, run_migrations, DatabaseConfig, SqliteClaimStore};
use interface_bot::telegram::{TelegramClient, TelegramPoller};
use interface_bot::{
    health, BotConfig, BotError, Dispatcher, Orchestrator, OrchestratorSettings, SessionStore,
};

/// Capacity of the channel between the poller and the dispatcher
const EVENT_BUFFER: usize = 256;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = BotConfig::from_env().map_err(BotError::from)?;
    init_tracing(&config.log_level, config.log_json);

    tracing::info!(
        admin_id = %config.admin_id,
        database_url = %config.database_url,
        "Starting claim bot"
    );

    let pool = create_pool(DatabaseConfig::new(&config.database_url))
        .await
        .map_err(BotError::from)?;
    run_migrations(&pool).await.map_err(BotError::from)?;
    let store = Arc::new(SqliteClaimStore::new(pool.clone()));

    let client = Arc::new(
        TelegramClient::new(&config.api_url, &config.token, config.poll_timeout)
            .map_err(BotError::from)?,
    );
    let me = client.get_me().await.map_err(BotError::from)?;
    tracing::info!(bot = me.username.as_deref().unwrap_or("?"), "Connected to the Bot API");

    let orchestrator = Arc::new(Orchestrator::new(
        ClaimFlow::new(store.clone()),
        Arc::new(SessionStore::new()),
        client.clone(),
        client.clone(),
        Arc::new(TokioClock),
        OrchestratorSettings {
            operator: config.admin_id,
            progress_delay: config.progress_delay,
        },
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);

    let dispatcher = tokio::spawn(
        Dispatcher::new(orchestrator.clone()).run(events_rx, shutdown_rx.clone()),
    );
    let poller = tokio::spawn(
        TelegramPoller::new(client.clone(), config.poll_timeout).run(events_tx, shutdown_rx.clone()),
    );

    let health_server = match config.health_addr {
        Some(addr) => {
            let listener = TcpListener::bind(addr).await.map_err(BotError::from)?;
            tracing::info!(%addr, "Health endpoint listening");
            let app = health::router(store.clone() as Arc<dyn HealthCheckable>);
            let mut stop = shutdown_rx.clone();
            Some(tokio::spawn(async move {
                let shutdown = async move {
                    let _ = stop.wait_for(|s| *s).await;
                };
                if let Err(e) = axum::serve(listener, app).with_graceful_shutdown(shutdown).await {
                    tracing::error!(error = %e, "health endpoint failed");
                }
            }))
        }
        None => None,
    };

    shutdown_signal().await;
    shutdown_tx.send_replace(true);

    poller.await?;
    dispatcher.await?;
    orchestrator.drain_progress().await;
    if let Some(server) = health_server {
        server.await?;
    }
    pool.close().await;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// `RUST_LOG` wins over the configured level.
fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_target(true)))
        .init();
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
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
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
