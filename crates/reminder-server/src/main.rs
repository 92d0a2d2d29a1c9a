//! Reminder call server.
//!
//! Serves the reminder API used by the voice agent and hosts the scheduler
//! that phones users when their reminders come due.

mod config;
mod error;
mod routes;
mod state;

use std::sync::Arc;

use database::Database;
use scheduler::{ReminderScheduler, SchedulerConfig};
use telephony::{TelephonyClient, TelephonyConfig};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(addr = %config.addr, zone = ?config.zone, "Starting reminder server");

    // Connect to database
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    // Telephony bridge
    let telephony = TelephonyClient::new(
        TelephonyConfig::new(&config.telephony_base_url).with_timeout(config.telephony_timeout),
    )?;
    info!(url = %telephony.config().outbound_url(), "Using telephony bridge");

    // Scheduler
    let scheduler_config = SchedulerConfig {
        poll_interval: config.poll_interval,
        lease: config.lease,
        call_timeout: config.telephony_timeout,
        ..SchedulerConfig::with_zone(config.zone)
    };
    let mut scheduler = ReminderScheduler::new(db.clone(), Arc::new(telephony), scheduler_config);
    scheduler.start()?;

    // Build router
    let app = routes::router()
        .layer(TraceLayer::new_for_http())
        .with_state(AppState::new(db.clone(), config.zone));

    // Start server
    info!(addr = %config.addr, "Reminder server listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.stop().await?;
    db.close().await;
    info!("Reminder server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
