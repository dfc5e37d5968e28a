//! Binary uplink layouts.
//!
//! Both frames are little-endian and open with the same eight-byte header: a
//! `u32` sequence number followed by the device clock as `u32` epoch seconds.
//!
//! | Frame | Bytes | Fields after the header                                          |
//! |-------|-------|------------------------------------------------------------------|
//! | info  | 21    | `i32` lat, `i32` lon (deg × 1e7), `i16` elevation m, `i8` temp °C, `u16` battery mV |
//! | alert | 9     | `u8` flag, nonzero means the trough ran dry                      |
//!
//! Frames are told apart by length alone, so no other sizes are accepted.

use serde::Serialize;

use crate::error::PacketError;

pub const INFO_PACKET_SIZE: usize = 21;
pub const ALERT_PACKET_SIZE: usize = 9;

/// Degrees per raw coordinate unit.
pub const COORDINATE_SCALE: f64 = 1e-7;

// ------------------------------------------------------------------ //
//  Raw frames                                                         //
// ------------------------------------------------------------------ //

/// Periodic uplink exactly as laid out on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfoPacket {
    pub sequence_number: u32,
    pub device_time_s: u32,
    pub latitude_raw: i32,
    pub longitude_raw: i32,
    pub elevation: i16,
    pub temperature: i8,
    pub battery_voltage: u16,
}

impl InfoPacket {
    fn read(reader: &mut FieldReader<'_>) -> Self {
        Self {
            sequence_number: reader.u32(),
            device_time_s: reader.u32(),
            latitude_raw: reader.i32(),
            longitude_raw: reader.i32(),
            elevation: reader.i16(),
            temperature: reader.i8(),
            battery_voltage: reader.u16(),
        }
    }

    /// Serialise into the 21-byte frame a device would send.
    pub fn to_bytes(&self) -> [u8; INFO_PACKET_SIZE] {
        pack(&[
            &self.sequence_number.to_le_bytes(),
            &self.device_time_s.to_le_bytes(),
            &self.latitude_raw.to_le_bytes(),
            &self.longitude_raw.to_le_bytes(),
            &self.elevation.to_le_bytes(),
            &self.temperature.to_le_bytes(),
            &self.battery_voltage.to_le_bytes(),
        ])
    }

    pub fn latitude(&self) -> f64 {
        f64::from(self.latitude_raw) * COORDINATE_SCALE
    }

    pub fn longitude(&self) -> f64 {
        f64::from(self.longitude_raw) * COORDINATE_SCALE
    }
}

/// Event uplink exactly as laid out on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertPacket {
    pub sequence_number: u32,
    pub device_time_s: u32,
    pub alert_flag: u8,
}

impl AlertPacket {
    fn read(reader: &mut FieldReader<'_>) -> Self {
        Self {
            sequence_number: reader.u32(),
            device_time_s: reader.u32(),
            alert_flag: reader.u8(),
        }
    }

    /// Serialise into the 9-byte frame a device would send.
    pub fn to_bytes(&self) -> [u8; ALERT_PACKET_SIZE] {
        pack(&[
            &self.sequence_number.to_le_bytes(),
            &self.device_time_s.to_le_bytes(),
            &[self.alert_flag],
        ])
    }
}

// ------------------------------------------------------------------ //
//  Decoded reading                                                    //
// ------------------------------------------------------------------ //

/// A decoded uplink. Serialises with a `kind` tag of `info` or `alert`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DecodedReading {
    Info {
        sequence_number: u32,
        device_time_s: u32,
        /// Degrees.
        latitude: f64,
        /// Degrees.
        longitude: f64,
        /// Meters.
        elevation: i16,
        /// Degrees Celsius.
        temperature: i8,
        /// Millivolts.
        battery_voltage: u16,
    },
    Alert {
        sequence_number: u32,
        device_time_s: u32,
        /// `true` when the trough has no water.
        alert_status: bool,
    },
}

impl DecodedReading {
    pub fn kind(&self) -> &'static str {
        match self {
            DecodedReading::Info { .. } => "info",
            DecodedReading::Alert { .. } => "alert",
        }
    }

    pub fn sequence_number(&self) -> u32 {
        match *self {
            DecodedReading::Info { sequence_number, .. }
            | DecodedReading::Alert { sequence_number, .. } => sequence_number,
        }
    }

    pub fn device_time_s(&self) -> u32 {
        match *self {
            DecodedReading::Info { device_time_s, .. }
            | DecodedReading::Alert { device_time_s, .. } => device_time_s,
        }
    }
}

impl From<InfoPacket> for DecodedReading {
    fn from(p: InfoPacket) -> Self {
        DecodedReading::Info {
            sequence_number: p.sequence_number,
            device_time_s: p.device_time_s,
            latitude: p.latitude(),
            longitude: p.longitude(),
            elevation: p.elevation,
            temperature: p.temperature,
            battery_voltage: p.battery_voltage,
        }
    }
}

impl From<AlertPacket> for DecodedReading {
    fn from(p: AlertPacket) -> Self {
        DecodedReading::Alert {
            sequence_number: p.sequence_number,
            device_time_s: p.device_time_s,
            alert_status: p.alert_flag != 0,
        }
    }
}

// ------------------------------------------------------------------ //
//  Decoding                                                           //
// ------------------------------------------------------------------ //

/// Decode a hex-encoded uplink frame.
pub fn decode(packet_hex: &str) -> Result<DecodedReading, PacketError> {
    // `hex::decode` already rejects odd lengths and non-hex digits.
    if packet_hex.is_empty() {
        return Err(PacketError::InvalidHex);
    }
    let bytes = hex::decode(packet_hex).map_err(|_| PacketError::InvalidHex)?;
    decode_bytes(&bytes)
}

/// Decode a raw uplink frame.
pub fn decode_bytes(bytes: &[u8]) -> Result<DecodedReading, PacketError> {
    let mut reader = FieldReader::new(bytes);
    match bytes.len() {
        INFO_PACKET_SIZE => Ok(InfoPacket::read(&mut reader).into()),
        ALERT_PACKET_SIZE => Ok(AlertPacket::read(&mut reader).into()),
        actual => Err(PacketError::UnknownPacketSize { actual }),
    }
}

/// Sequential little-endian reader. Callers check the frame length first.
struct FieldReader<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> FieldReader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, offset: 0 }
    }

    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.offset..self.offset + N]);
        self.offset += N;
        out
    }

    fn u8(&mut self) -> u8 {
        u8::from_le_bytes(self.take())
    }

    fn i8(&mut self) -> i8 {
        i8::from_le_bytes(self.take())
    }

    fn u16(&mut self) -> u16 {
        u16::from_le_bytes(self.take())
    }

    fn i16(&mut self) -> i16 {
        i16::from_le_bytes(self.take())
    }

    fn u32(&mut self) -> u32 {
        u32::from_le_bytes(self.take())
    }

    fn i32(&mut self) -> i32 {
        i32::from_le_bytes(self.take())
    }
}

/// Concatenate fields into a fixed-size frame. Field widths must sum to `N`.
fn pack<const N: usize>(fields: &[&[u8]]) -> [u8; N] {
    let mut out = [0u8; N];
    let mut offset = 0;
    for field in fields {
        out[offset..offset + field.len()].copy_from_slice(field);
        offset += field.len();
    }
    debug_assert_eq!(offset, N);
    out
}
