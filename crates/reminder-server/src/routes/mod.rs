//! Route handlers for the reminder API.

pub mod health;
pub mod reminders;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health))
        // Voice agent tool hook
        .route("/api/reminders/webhook", post(reminders::webhook))
        // API endpoints
        .route(
            "/api/reminders",
            get(reminders::list)
                .post(reminders::create)
                .delete(reminders::cancel),
        )
        .route("/api/reminders/:id", get(reminders::get_one))
}
