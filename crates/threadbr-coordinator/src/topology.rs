//! Router and child table wire formats.
//!
//! The `thread_router_table` and `thread_child_table` property values are
//! sequences of fixed-layout entries, decoded front-to-back until the
//! value is exhausted:
//!
//! | Field        | Router entry | Child entry |
//! |--------------|--------------|-------------|
//! | ext_addr     | eui64 (8)    | eui64 (8)   |
//! | rloc16       | uint16       | uint16      |
//! | timeout      | —            | uint32      |
//! | link_quality | uint8        | uint8       |
//! | rssi         | int8         | int8        |
//!
//! A truncated trailing entry fails the whole decode; the coordinator
//! logs it and retries on the next poll.

use spinel_protocol::{
    decode_eui64, decode_int8, decode_uint16, decode_uint32, decode_uint8, encode_eui64,
    encode_int8, encode_uint16, encode_uint32, encode_uint8, Eui64, SpinelError,
};

/// One entry of the router table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterEntry {
    /// Router's EUI-64.
    pub ext_addr: Eui64,
    /// Router's RLOC16.
    pub rloc16: u16,
    /// Link quality indicator (0-3).
    pub link_quality: u8,
    /// Last RSSI in dBm.
    pub rssi: i8,
}

/// One entry of the child table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildEntry {
    /// Child's EUI-64.
    pub ext_addr: Eui64,
    /// Child's RLOC16.
    pub rloc16: u16,
    /// Child timeout in seconds.
    pub timeout: u32,
    /// Link quality indicator (0-3).
    pub link_quality: u8,
    /// Last RSSI in dBm.
    pub rssi: i8,
}

/// Encode a router table value.
pub fn encode_router_table(entries: &[RouterEntry]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(entries.len() * 12);
    for entry in entries {
        buf.extend(encode_eui64(&entry.ext_addr));
        buf.extend(encode_uint16(entry.rloc16));
        buf.extend(encode_uint8(entry.link_quality));
        buf.extend(encode_int8(entry.rssi));
    }
    buf
}

/// Decode a router table value.
pub fn decode_router_table(value: &[u8]) -> Result<Vec<RouterEntry>, SpinelError> {
    let mut entries = Vec::new();
    let mut rest = value;
    while !rest.is_empty() {
        let (ext_addr, r) = decode_eui64(rest)?;
        let (rloc16, r) = decode_uint16(r)?;
        let (link_quality, r) = decode_uint8(r)?;
        let (rssi, r) = decode_int8(r)?;
        entries.push(RouterEntry {
            ext_addr,
            rloc16,
            link_quality,
            rssi,
        });
        rest = r;
    }
    Ok(entries)
}

/// Encode a child table value.
pub fn encode_child_table(entries: &[ChildEntry]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(entries.len() * 16);
    for entry in entries {
        buf.extend(encode_eui64(&entry.ext_addr));
        buf.extend(encode_uint16(entry.rloc16));
        buf.extend(encode_uint32(entry.timeout));
        buf.extend(encode_uint8(entry.link_quality));
        buf.extend(encode_int8(entry.rssi));
    }
    buf
}

/// Decode a child table value.
pub fn decode_child_table(value: &[u8]) -> Result<Vec<ChildEntry>, SpinelError> {
    let mut entries = Vec::new();
    let mut rest = value;
    while !rest.is_empty() {
        let (ext_addr, r) = decode_eui64(rest)?;
        let (rloc16, r) = decode_uint16(r)?;
        let (timeout, r) = decode_uint32(r)?;
        let (link_quality, r) = decode_uint8(r)?;
        let (rssi, r) = decode_int8(r)?;
        entries.push(ChildEntry {
            ext_addr,
            rloc16,
            timeout,
            link_quality,
            rssi,
        });
        rest = r;
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_table_round_trip() {
        let entries = vec![
            RouterEntry {
                ext_addr: Eui64::new([1; 8]),
                rloc16: 0x0400,
                link_quality: 3,
                rssi: -42,
            },
            RouterEntry {
                ext_addr: Eui64::new([2; 8]),
                rloc16: 0x0800,
                link_quality: 1,
                rssi: -88,
            },
        ];
        let decoded = decode_router_table(&encode_router_table(&entries)).unwrap();
        assert_eq!(decoded, entries);
    }

    #[test]
    fn test_child_table_round_trip() {
        let entries = vec![ChildEntry {
            ext_addr: Eui64::new([7; 8]),
            rloc16: 0x0401,
            timeout: 240,
            link_quality: 2,
            rssi: -61,
        }];
        let decoded = decode_child_table(&encode_child_table(&entries)).unwrap();
        assert_eq!(decoded, entries);
    }

    #[test]
    fn test_empty_tables() {
        assert!(decode_router_table(&[]).unwrap().is_empty());
        assert!(decode_child_table(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_truncated_entry_fails() {
        let mut bytes = encode_router_table(&[RouterEntry {
            ext_addr: Eui64::new([1; 8]),
            rloc16: 0x0400,
            link_quality: 3,
            rssi: -42,
        }]);
        bytes.truncate(bytes.len() - 1);
        assert!(decode_router_table(&bytes).is_err());
    }
}
