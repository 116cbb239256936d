//! Primitive Spinel value encoding and decoding.
//!
//! Property values are built from a small set of primitive field formats:
//!
//! | Format     | Encoding                                                |
//! |------------|---------------------------------------------------------|
//! | `uint8`    | 1 byte                                                  |
//! | `uint16`   | 2 bytes, little-endian                                  |
//! | `uint32`   | 4 bytes, little-endian                                  |
//! | `int8/16/32` | two's complement, little-endian                       |
//! | `bool`     | 1 byte, 0x00 = false, 0x01 = true (anything else errors)|
//! | `utf8`     | packed length + that many bytes of UTF-8                |
//! | `data`     | packed length + that many raw bytes                     |
//! | `eui64`    | exactly 8 bytes                                         |
//! | `ipv6addr` | exactly 16 bytes                                        |
//!
//! The packed length is a variable-length quantity: 7 value bits per byte,
//! low-order group first, bit 7 of each byte set when more bytes follow.
//!
//! All decode functions return the decoded value together with the
//! remaining unconsumed bytes, so multiple fields can be pulled out of one
//! payload sequentially:
//!
//! ```rust,ignore
//! let (rloc, rest) = decode_uint16(payload)?;
//! let (rssi, rest) = decode_int8(rest)?;
//! ```

use std::net::Ipv6Addr;

use crate::error::SpinelError;
use crate::types::{Eui64, EUI64_SIZE};

/// Size of an IPv6 address in bytes.
pub const IPV6_ADDR_SIZE: usize = 16;

/// Maximum number of bytes in a packed length (32-bit length ceiling).
pub const MAX_PACKED_LEN_BYTES: usize = 5;

// ============================================================================
// Packed length (VLQ)
// ============================================================================

/// Encode a length as a variable-length quantity.
pub fn encode_packed_len(mut value: u32) -> Vec<u8> {
    let mut buf = Vec::with_capacity(MAX_PACKED_LEN_BYTES);
    loop {
        let group = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(group);
            return buf;
        }
        buf.push(group | 0x80);
    }
}

/// Decode a variable-length quantity.
///
/// Rejects sequences that do not terminate within [`MAX_PACKED_LEN_BYTES`]
/// bytes or that overflow 32 bits, so a hostile length prefix cannot force
/// an unbounded read.
pub fn decode_packed_len(data: &[u8]) -> Result<(u32, &[u8]), SpinelError> {
    let mut value: u32 = 0;
    for (i, &byte) in data.iter().enumerate() {
        if i >= MAX_PACKED_LEN_BYTES {
            return Err(SpinelError::decode_at(i, "packed length exceeds 5 bytes"));
        }
        let group = ((byte & 0x7F) as u64) << (7 * i as u32);
        let total = value as u64 + group;
        if total > u32::MAX as u64 {
            return Err(SpinelError::decode_at(i, "packed length overflows 32 bits"));
        }
        value = total as u32;
        if byte & 0x80 == 0 {
            return Ok((value, &data[i + 1..]));
        }
    }
    Err(SpinelError::decode_at(
        data.len(),
        "unterminated packed length",
    ))
}

// ============================================================================
// Fixed-width integers
// ============================================================================

/// Encode an unsigned 8-bit integer.
pub fn encode_uint8(value: u8) -> Vec<u8> {
    vec![value]
}

/// Decode an unsigned 8-bit integer.
pub fn decode_uint8(data: &[u8]) -> Result<(u8, &[u8]), SpinelError> {
    match data.split_first() {
        Some((&value, rest)) => Ok((value, rest)),
        None => Err(SpinelError::decode_at(0, "not enough data for uint8")),
    }
}

/// Encode an unsigned 16-bit integer (little-endian).
pub fn encode_uint16(value: u16) -> Vec<u8> {
    value.to_le_bytes().to_vec()
}

/// Decode an unsigned 16-bit integer (little-endian).
pub fn decode_uint16(data: &[u8]) -> Result<(u16, &[u8]), SpinelError> {
    if data.len() < 2 {
        return Err(SpinelError::decode_at(0, "not enough data for uint16"));
    }
    Ok((u16::from_le_bytes([data[0], data[1]]), &data[2..]))
}

/// Encode an unsigned 32-bit integer (little-endian).
pub fn encode_uint32(value: u32) -> Vec<u8> {
    value.to_le_bytes().to_vec()
}

/// Decode an unsigned 32-bit integer (little-endian).
pub fn decode_uint32(data: &[u8]) -> Result<(u32, &[u8]), SpinelError> {
    if data.len() < 4 {
        return Err(SpinelError::decode_at(0, "not enough data for uint32"));
    }
    Ok((
        u32::from_le_bytes([data[0], data[1], data[2], data[3]]),
        &data[4..],
    ))
}

/// Encode a signed 8-bit integer.
pub fn encode_int8(value: i8) -> Vec<u8> {
    vec![value as u8]
}

/// Decode a signed 8-bit integer.
pub fn decode_int8(data: &[u8]) -> Result<(i8, &[u8]), SpinelError> {
    match data.split_first() {
        Some((&value, rest)) => Ok((value as i8, rest)),
        None => Err(SpinelError::decode_at(0, "not enough data for int8")),
    }
}

/// Encode a signed 16-bit integer (little-endian).
pub fn encode_int16(value: i16) -> Vec<u8> {
    value.to_le_bytes().to_vec()
}

/// Decode a signed 16-bit integer (little-endian).
pub fn decode_int16(data: &[u8]) -> Result<(i16, &[u8]), SpinelError> {
    if data.len() < 2 {
        return Err(SpinelError::decode_at(0, "not enough data for int16"));
    }
    Ok((i16::from_le_bytes([data[0], data[1]]), &data[2..]))
}

/// Encode a signed 32-bit integer (little-endian).
pub fn encode_int32(value: i32) -> Vec<u8> {
    value.to_le_bytes().to_vec()
}

/// Decode a signed 32-bit integer (little-endian).
pub fn decode_int32(data: &[u8]) -> Result<(i32, &[u8]), SpinelError> {
    if data.len() < 4 {
        return Err(SpinelError::decode_at(0, "not enough data for int32"));
    }
    Ok((
        i32::from_le_bytes([data[0], data[1], data[2], data[3]]),
        &data[4..],
    ))
}

// ============================================================================
// Booleans
// ============================================================================

/// Encode a boolean as a single byte.
pub fn encode_bool(value: bool) -> Vec<u8> {
    vec![u8::from(value)]
}

/// Decode a boolean. Only 0x00 and 0x01 are valid encodings.
pub fn decode_bool(data: &[u8]) -> Result<(bool, &[u8]), SpinelError> {
    match data.split_first() {
        Some((&0, rest)) => Ok((false, rest)),
        Some((&1, rest)) => Ok((true, rest)),
        Some((&other, _)) => Err(SpinelError::decode_at(
            0,
            format!("invalid bool byte 0x{other:02X}"),
        )),
        None => Err(SpinelError::decode_at(0, "not enough data for bool")),
    }
}

// ============================================================================
// Length-prefixed fields
// ============================================================================

/// Encode raw bytes with a packed length prefix.
pub fn encode_data(value: &[u8]) -> Vec<u8> {
    let mut buf = encode_packed_len(value.len() as u32);
    buf.extend_from_slice(value);
    buf
}

/// Decode a packed-length-prefixed byte field.
pub fn decode_data(data: &[u8]) -> Result<(Vec<u8>, &[u8]), SpinelError> {
    let (len, rest) = decode_packed_len(data)?;
    let len = len as usize;
    if rest.len() < len {
        return Err(SpinelError::decode_at(
            data.len() - rest.len(),
            format!("data field declares {} bytes, {} available", len, rest.len()),
        ));
    }
    Ok((rest[..len].to_vec(), &rest[len..]))
}

/// Encode a UTF-8 string with a packed length prefix.
pub fn encode_utf8(value: &str) -> Vec<u8> {
    encode_data(value.as_bytes())
}

/// Decode a packed-length-prefixed UTF-8 string.
///
/// A declared length covering bytes that are not valid UTF-8 is a decode
/// error, never a lossy substitution.
pub fn decode_utf8(data: &[u8]) -> Result<(String, &[u8]), SpinelError> {
    let (bytes, rest) = decode_data(data)?;
    let value = String::from_utf8(bytes).map_err(|_| SpinelError::InvalidUtf8)?;
    Ok((value, rest))
}

// ============================================================================
// Addresses
// ============================================================================

/// Encode an EUI-64 extended address (8 bytes, no length prefix).
pub fn encode_eui64(value: &Eui64) -> Vec<u8> {
    value.as_bytes().to_vec()
}

/// Decode an EUI-64 extended address.
pub fn decode_eui64(data: &[u8]) -> Result<(Eui64, &[u8]), SpinelError> {
    if data.len() < EUI64_SIZE {
        return Err(SpinelError::decode_at(0, "not enough data for eui64"));
    }
    let addr = Eui64::from_slice(&data[..EUI64_SIZE])
        .ok_or_else(|| SpinelError::decode_at(0, "not enough data for eui64"))?;
    Ok((addr, &data[EUI64_SIZE..]))
}

/// Encode an IPv6 address (16 bytes, no length prefix).
pub fn encode_ipv6addr(value: &Ipv6Addr) -> Vec<u8> {
    value.octets().to_vec()
}

/// Decode an IPv6 address.
pub fn decode_ipv6addr(data: &[u8]) -> Result<(Ipv6Addr, &[u8]), SpinelError> {
    if data.len() < IPV6_ADDR_SIZE {
        return Err(SpinelError::decode_at(0, "not enough data for ipv6addr"));
    }
    let mut octets = [0u8; IPV6_ADDR_SIZE];
    octets.copy_from_slice(&data[..IPV6_ADDR_SIZE]);
    Ok((Ipv6Addr::from(octets), &data[IPV6_ADDR_SIZE..]))
}
