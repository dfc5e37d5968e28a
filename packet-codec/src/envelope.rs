//! Webhook envelope projection.
//!
//! The vendor posts `{ "Data": "<json string>" }` where the inner document is
//! `{ "Packets": [ { "Timestamp": <epoch ms>, "Value": "<hex>", "TerminalId": "..." } ] }`.
//! Only the first packet is used.

use serde_json::Value;

use crate::error::EnvelopeError;

const TIMESTAMP_FIELD: &str = "Packets[0].Timestamp";
const VALUE_FIELD: &str = "Packets[0].Value";

/// The parts of the first packet the relay needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPacket {
    /// Time the vendor platform received the uplink, epoch milliseconds.
    pub received_timestamp_ms: i64,
    pub packet_hex: String,
    /// Present only when the platform sent a non-empty identifier.
    pub terminal_id: Option<String>,
}

/// Extract the first packet from an already-parsed request body.
pub fn extract(body: &Value) -> Result<ExtractedPacket, EnvelopeError> {
    let data = body
        .get("Data")
        .and_then(Value::as_str)
        .ok_or(EnvelopeError::InvalidEnvelope)?;

    let inner: Value = serde_json::from_str(data)?;
    let packet = inner
        .get("Packets")
        .and_then(Value::as_array)
        .and_then(|packets| packets.first());

    let received_timestamp_ms = packet
        .and_then(|p| p.get("Timestamp"))
        .and_then(epoch_millis)
        .ok_or(EnvelopeError::MissingField(TIMESTAMP_FIELD))?;

    let packet_hex = packet
        .and_then(|p| p.get("Value"))
        .and_then(Value::as_str)
        .ok_or(EnvelopeError::MissingField(VALUE_FIELD))?
        .to_owned();

    let terminal_id = packet
        .and_then(|p| p.get("TerminalId"))
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_owned);

    Ok(ExtractedPacket {
        received_timestamp_ms,
        packet_hex,
        terminal_id,
    })
}

/// Extract the first packet from a raw request body.
///
/// A body that is not JSON at all has no `Data` field either, so it is
/// reported as [`EnvelopeError::InvalidEnvelope`].
pub fn extract_from_slice(body: &[u8]) -> Result<ExtractedPacket, EnvelopeError> {
    let body: Value =
        serde_json::from_slice(body).map_err(|_| EnvelopeError::InvalidEnvelope)?;
    extract(&body)
}

// Any JSON number is accepted; fractional milliseconds are truncated.
fn epoch_millis(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|ms| ms.trunc() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn wrap(inner: Value) -> Value {
        json!({ "Data": inner.to_string() })
    }

    #[test]
    fn extract_first_packet() {
        let body = wrap(json!({
            "Packets": [
                { "Timestamp": 1_700_000_000_123_i64, "Value": "0a0b", "TerminalId": "T-17" },
                { "Timestamp": 1, "Value": "ff" }
            ]
        }));

        let extracted = extract(&body).unwrap();
        assert_eq!(
            extracted,
            ExtractedPacket {
                received_timestamp_ms: 1_700_000_000_123,
                packet_hex: "0a0b".into(),
                terminal_id: Some("T-17".into()),
            }
        );
    }

    #[test]
    fn terminal_id_absent_or_empty_is_none() {
        let absent = wrap(json!({ "Packets": [{ "Timestamp": 1, "Value": "00" }] }));
        let empty = wrap(json!({ "Packets": [{ "Timestamp": 1, "Value": "00", "TerminalId": "" }] }));
        assert_eq!(extract(&absent).unwrap().terminal_id, None);
        assert_eq!(extract(&empty).unwrap().terminal_id, None);
    }

    #[test]
    fn fractional_timestamp_truncated() {
        let body = wrap(json!({ "Packets": [{ "Timestamp": 1500.9, "Value": "00" }] }));
        assert_eq!(extract(&body).unwrap().received_timestamp_ms, 1500);
    }

    #[test]
    fn missing_data_is_invalid_envelope() {
        assert!(matches!(
            extract(&json!({ "Packets": [] })),
            Err(EnvelopeError::InvalidEnvelope)
        ));
    }

    #[test]
    fn non_string_data_is_invalid_envelope() {
        let body = json!({ "Data": { "Packets": [] } });
        assert!(matches!(extract(&body), Err(EnvelopeError::InvalidEnvelope)));
    }

    #[test]
    fn non_json_body_is_invalid_envelope() {
        assert!(matches!(
            extract_from_slice(b"Data=abc"),
            Err(EnvelopeError::InvalidEnvelope)
        ));
    }

    #[test]
    fn data_not_json_is_malformed() {
        let err = extract(&json!({ "Data": "not json" })).unwrap_err();
        assert!(matches!(err, EnvelopeError::MalformedJson(_)));
        assert!(err.to_string().starts_with("\"Data\" is not valid JSON"));
    }

    #[test]
    fn missing_timestamp_reported_first() {
        let body = wrap(json!({ "Packets": [{}] }));
        let err = extract(&body).unwrap_err();
        assert_eq!(err.to_string(), "Missing Packets[0].Timestamp.");
    }

    #[test]
    fn string_timestamp_is_missing() {
        let body = wrap(json!({ "Packets": [{ "Timestamp": "1700000000000", "Value": "00" }] }));
        assert!(matches!(
            extract(&body),
            Err(EnvelopeError::MissingField(TIMESTAMP_FIELD))
        ));
    }

    #[test]
    fn non_string_value_is_missing() {
        let body = wrap(json!({ "Packets": [{ "Timestamp": 1, "Value": 42 }] }));
        let err = extract(&body).unwrap_err();
        assert_eq!(err.to_string(), "Missing Packets[0].Value.");
    }

    #[test]
    fn empty_packet_list_is_missing_timestamp() {
        let body = wrap(json!({ "Packets": [] }));
        assert!(matches!(
            extract(&body),
            Err(EnvelopeError::MissingField(TIMESTAMP_FIELD))
        ));
    }
}
