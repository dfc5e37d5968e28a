//! Webhook relay for trough monitor uplinks.
//!
//! Receives the vendor platform's webhook, decodes the embedded binary packet
//! with [`packet_codec`], and emails a notification to every configured
//! destination through the Resend API.
//!
//! # Routes
//! | Route                  | Purpose                                  |
//! |------------------------|------------------------------------------|
//! | `POST /api/send-email` | decode and relay by email                |
//! | `POST /api/view`       | decode only, nothing is sent             |
//! | `GET /health`          | liveness                                 |
//!
//! # Environment variables
//! | Var                          | Default                  |
//! |------------------------------|--------------------------|
//! | `RELAY_ADDR`                 | `0.0.0.0:8080`           |
//! | `RELAY_DESTINATIONS`         | `main,secondary`         |
//! | `RESEND_API_KEY`             | required (`main`)        |
//! | `RESEND_API_KEY_<NAME>`      | required (other names)   |
//! | `MAIL_TO_<NAME>`             | required                 |
//! | `MAIL_FROM`                  | `onboarding@resend.dev`  |
//! | `RESEND_API_URL`             | `https://api.resend.com` |
//! | `RESEND_TIMEOUT_SECS`        | `10`                     |
//! | `DISPLAY_UTC_OFFSET_MINUTES` | `-180`                   |
//! | `DISPLAY_TIME_FORMAT`        | `%M/%H %d/%m/%Y`         |
//! | `RELAY_STRICT_STARTUP`       | `true`                   |
//!
//! API keys may instead come from Bitwarden Secrets Manager, see [`secrets`].

pub mod config;
pub mod display_time;
pub mod error;
pub mod handlers;
pub mod mailer;
pub mod models;
pub mod notification;
pub mod relay;
pub mod secrets;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::{display_time::DisplayClock, relay::Relay};

// ------------------------------------------------------------------ //
//  Shared application state                                           //
// ------------------------------------------------------------------ //

/// Shared state injected into every Axum handler via `State`.
pub struct AppState {
    /// `None` when mail settings were incomplete at startup.
    pub relay: Option<Relay>,
    pub clock: DisplayClock,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/api/send-email",
            post(handlers::send_email).fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/view",
            post(handlers::view).fallback(handlers::method_not_allowed),
        )
        .layer(CatchPanicLayer::custom(error::panic_response))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
