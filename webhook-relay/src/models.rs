//! HTTP response models.

use packet_codec::DecodedReading;
use serde::Serialize;

use crate::relay::DeliveryResult;

/// Response for `POST /api/send-email`.
#[derive(Debug, Serialize)]
pub struct RelayResponse {
    /// Vendor receive time, formatted for display.
    pub received_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terminal_id: Option<String>,
    pub subject: String,
    /// Device clock at send time, formatted for display.
    pub device_time: String,
    pub reading: DecodedReading,
    pub deliveries: Vec<DeliveryResult>,
}

/// Response for `POST /api/view`: the reading's fields inlined next to a
/// human label and the device time in UTC.
#[derive(Debug, Serialize)]
pub struct ViewResponse {
    #[serde(rename = "type")]
    pub uplink_type: &'static str,
    pub received_timestamp_ms: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terminal_id: Option<String>,
    pub device_time_utc: String,
    #[serde(flatten)]
    pub reading: DecodedReading,
}

pub fn uplink_type(reading: &DecodedReading) -> &'static str {
    match reading {
        DecodedReading::Info { .. } => "Periodic uplink",
        DecodedReading::Alert { .. } => "Alert uplink",
    }
}
