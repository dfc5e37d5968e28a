use thiserror::Error;

use crate::packet::{ALERT_PACKET_SIZE, INFO_PACKET_SIZE};

/// Failure to project the first packet out of a webhook envelope.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("Missing \"Data\" (must be a JSON string).")]
    InvalidEnvelope,
    #[error("\"Data\" is not valid JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),
    /// Carries the JSON path of the absent field, e.g. `Packets[0].Value`.
    #[error("Missing {0}.")]
    MissingField(&'static str),
}

/// Failure to decode a hex payload into a reading.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PacketError {
    #[error("Invalid hex string in Packets[0].Value.")]
    InvalidHex,
    #[error(
        "Unknown packet size: {actual} bytes (expected {} or {})",
        INFO_PACKET_SIZE,
        ALERT_PACKET_SIZE
    )]
    UnknownPacketSize { actual: usize },
}
