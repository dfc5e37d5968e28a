//! Axum HTTP handlers for the webhook relay.

use std::sync::Arc;

use axum::{body::Bytes, extract::State, http::StatusCode, response::IntoResponse, Json};
use packet_codec::{envelope, packet};
use tracing::info;

use crate::{
    display_time,
    error::ApiError,
    models::{self, RelayResponse, ViewResponse},
    notification, AppState,
};

// ------------------------------------------------------------------ //
//  POST /api/send-email                                               //
// ------------------------------------------------------------------ //

/// Decode the uplink, email it to every destination and report each outcome.
///
/// Nothing is sent unless the envelope and packet decode completely.
pub async fn send_email(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<RelayResponse>, ApiError> {
    let relay = state.relay.as_ref().ok_or(ApiError::ConfigurationMissing)?;

    let extracted = envelope::extract_from_slice(&body)?;
    let received_at = state.clock.format_millis(extracted.received_timestamp_ms);

    let reading = packet::decode(&extracted.packet_hex)?;
    let device_time = state.clock.format_seconds(reading.device_time_s());

    info!(
        kind = reading.kind(),
        sequence = reading.sequence_number(),
        terminal_id = extracted.terminal_id.as_deref().unwrap_or("-"),
        "uplink decoded"
    );

    let notification = notification::build(&received_at, &device_time, &reading);
    let deliveries = relay.dispatch(&notification).await;

    let delivered = deliveries.iter().filter(|d| d.success).count();
    info!(delivered, total = deliveries.len(), "POST /api/send-email processed");

    Ok(Json(RelayResponse {
        received_at,
        terminal_id: extracted.terminal_id,
        subject: notification.subject,
        device_time,
        reading,
        deliveries,
    }))
}

// ------------------------------------------------------------------ //
//  POST /api/view                                                     //
// ------------------------------------------------------------------ //

/// Decode the uplink and return it without sending anything.
pub async fn view(body: Bytes) -> Result<Json<ViewResponse>, ApiError> {
    let extracted = envelope::extract_from_slice(&body)?;
    let reading = packet::decode(&extracted.packet_hex)?;

    Ok(Json(ViewResponse {
        uplink_type: models::uplink_type(&reading),
        received_timestamp_ms: extracted.received_timestamp_ms,
        terminal_id: extracted.terminal_id,
        device_time_utc: display_time::iso_utc_seconds(reading.device_time_s()),
        reading,
    }))
}

// ------------------------------------------------------------------ //
//  Fallbacks / health                                                 //
// ------------------------------------------------------------------ //

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({"status": "ok"})))
}
