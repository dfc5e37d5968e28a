//! Email subject and body for a decoded uplink.

use packet_codec::DecodedReading;

pub const INFO_SUBJECT: &str = "aIgrOT info";
pub const NO_WATER_SUBJECT: &str = "aIgrOT: ALERTA bebedero sin agua";
pub const WATER_RESTORED_SUBJECT: &str = "aIgrOT: bebedero con agua nuevamente";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    /// Simple markup: one paragraph, lines separated by `<br/>`.
    pub html: String,
}

/// `received_at` and `device_time` are already formatted for display.
pub fn build(received_at: &str, device_time: &str, reading: &DecodedReading) -> Notification {
    let first_line = format!("Horario de recepción servidor: {received_at}");

    let (subject, lines) = match reading {
        DecodedReading::Info {
            latitude,
            longitude,
            elevation,
            temperature,
            battery_voltage,
            ..
        } => (
            INFO_SUBJECT,
            vec![
                first_line,
                format!("Horario de envío: {device_time}"),
                format!("Latitud: {latitude}"),
                format!("Longitud: {longitude}"),
                format!("Elevación: {elevation}"),
                format!("Temperatura: {temperature}"),
                format!("Voltaje: {battery_voltage}"),
            ],
        ),
        DecodedReading::Alert { alert_status, .. } => (
            if *alert_status {
                NO_WATER_SUBJECT
            } else {
                WATER_RESTORED_SUBJECT
            },
            vec![first_line, format!("Horario: {device_time}")],
        ),
    };

    Notification {
        subject: subject.to_string(),
        html: format!("<p>{}</p>", lines.join("<br/>")),
    }
}
