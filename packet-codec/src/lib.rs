//! Wire format of the trough monitor uplinks.
//!
//! The vendor platform posts a JSON envelope whose `Data` field is itself a
//! JSON-encoded string. The first packet inside it carries a hex-encoded
//! binary frame: [`envelope::extract`] isolates that frame and
//! [`packet::decode`] turns it into a [`DecodedReading`].

pub mod envelope;
pub mod error;
pub mod packet;

pub use envelope::{extract, extract_from_slice, ExtractedPacket};
pub use error::{EnvelopeError, PacketError};
pub use packet::{
    decode, AlertPacket, DecodedReading, InfoPacket, ALERT_PACKET_SIZE, COORDINATE_SCALE,
    INFO_PACKET_SIZE,
};
