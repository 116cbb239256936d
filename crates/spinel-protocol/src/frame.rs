//! Frame building, encoding, and decoding.
//!
//! A frame on the wire is `header ++ command ++ payload`. The header byte
//! always has bit 7 set (host↔device framing marker) and carries the 4-bit
//! transaction ID in its low nibble. There is no length field: the payload
//! runs to the end of the frame, and frame boundaries are the transport
//! layer's responsibility.

use crate::commands::Command;
use crate::error::SpinelError;
use crate::properties::Property;

/// Bit 7 of the header, always set on a valid frame.
pub const HEADER_FLAG: u8 = 0x80;

/// Mask for the transaction ID in the header's low nibble.
pub const TID_MASK: u8 = 0x0F;

/// Maximum transaction ID value.
pub const MAX_TID: u8 = 0x0F;

/// Extract the transaction ID from a header byte.
pub fn extract_tid(header: u8) -> u8 {
    header & TID_MASK
}

/// A Spinel frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Header byte: `0x80 | tid`.
    pub header: u8,
    /// Command carried by the frame.
    pub command: Command,
    /// Command-specific payload.
    pub payload: Vec<u8>,
}

impl Frame {
    /// Build a frame for the given command, payload, and transaction ID.
    ///
    /// The transaction ID must be in `0..=15`.
    pub fn new(command: Command, payload: Vec<u8>, tid: u8) -> Result<Self, SpinelError> {
        if tid > MAX_TID {
            return Err(SpinelError::invalid_argument(format!(
                "tid {tid} out of range 0..=15"
            )));
        }
        Ok(Frame {
            header: HEADER_FLAG | (tid & TID_MASK),
            command,
            payload,
        })
    }

    /// Build a reset request.
    pub fn reset(tid: u8) -> Result<Self, SpinelError> {
        Frame::new(Command::Reset, Vec::new(), tid)
    }

    /// Build a property get request.
    pub fn prop_get(property: Property, tid: u8) -> Result<Self, SpinelError> {
        Frame::new(Command::PropValueGet, vec![property.code()], tid)
    }

    /// Build a property set request.
    pub fn prop_set(property: Property, value: &[u8], tid: u8) -> Result<Self, SpinelError> {
        let mut payload = Vec::with_capacity(1 + value.len());
        payload.push(property.code());
        payload.extend_from_slice(value);
        Frame::new(Command::PropValueSet, payload, tid)
    }

    /// Get the transaction ID carried in the header.
    pub fn tid(&self) -> u8 {
        extract_tid(self.header)
    }

    /// Encode the frame to bytes: `header ++ command ++ payload`.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        buf.push(self.header);
        buf.push(self.command.code());
        buf.extend_from_slice(&self.payload);
        buf
    }

    /// Number of bytes [`Frame::encode`] produces.
    pub fn encoded_len(&self) -> usize {
        2 + self.payload.len()
    }

    /// Decode a frame from bytes.
    ///
    /// Requires at least two bytes and a header with bit 7 set. Any command
    /// byte is accepted (unknown codes pass through); semantic validation
    /// is the caller's concern.
    pub fn decode(data: &[u8]) -> Result<Self, SpinelError> {
        if data.len() < 2 {
            return Err(SpinelError::decode_at(
                0,
                format!("frame needs at least 2 bytes, got {}", data.len()),
            ));
        }
        let header = data[0];
        if header & HEADER_FLAG == 0 {
            return Err(SpinelError::decode_at(
                0,
                format!("invalid header byte 0x{header:02X}"),
            ));
        }
        Ok(Frame {
            header,
            command: Command::from_code(data[1]),
            payload: data[2..].to_vec(),
        })
    }

    /// Read the property code from the first payload byte.
    pub fn property(&self) -> Option<Property> {
        self.payload.first().map(|&code| Property::from_code(code))
    }

    /// The payload with the leading property byte stripped.
    pub fn value(&self) -> Result<&[u8], SpinelError> {
        if self.payload.is_empty() {
            return Err(SpinelError::NoValue);
        }
        Ok(&self.payload[1..])
    }
}
