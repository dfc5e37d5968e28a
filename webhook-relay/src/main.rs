//! Webhook relay entry point. See the library docs for configuration.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use webhook_relay::{
    build_router, config::RelayConfig, relay::Relay, secrets::SecretsClient, AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("webhook_relay=info".parse()?),
        )
        .json()
        .init();

    let secrets = SecretsClient::from_env();
    let config = RelayConfig::load(&secrets)
        .await
        .context("invalid configuration")?;

    let relay = match config.mail {
        Ok(mail) => {
            let relay = Relay::from_config(&mail).context("failed to build mail relay")?;
            info!(
                destinations = ?relay.destination_names().collect::<Vec<_>>(),
                "mail relay ready"
            );
            Some(relay)
        }
        Err(e) if config.strict_startup => {
            return Err(e).context("mail relay is not configured");
        }
        Err(e) => {
            warn!(error = %e, "mail relay not configured; /api/send-email will answer 500");
            None
        }
    };

    let state = Arc::new(AppState {
        relay,
        clock: config.clock,
    });
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, "webhook-relay listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("webhook-relay shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
