//! Common types used in the protocol.

use serde::{Deserialize, Serialize};

/// Size of an EUI-64 extended address in bytes.
pub const EUI64_SIZE: usize = 8;

/// An IEEE EUI-64 extended address.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Eui64(pub [u8; EUI64_SIZE]);

impl Eui64 {
    /// Create a new EUI-64 from bytes.
    pub fn new(bytes: [u8; EUI64_SIZE]) -> Self {
        Eui64(bytes)
    }

    /// Create from a slice. Returns None if slice is wrong length.
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        if slice.len() == EUI64_SIZE {
            let mut bytes = [0u8; EUI64_SIZE];
            bytes.copy_from_slice(slice);
            Some(Eui64(bytes))
        } else {
            None
        }
    }

    /// Get the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; EUI64_SIZE] {
        &self.0
    }

    /// Get the bytes as a hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl Default for Eui64 {
    fn default() -> Self {
        Eui64([0u8; EUI64_SIZE])
    }
}

impl AsRef<[u8]> for Eui64 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Display for Eui64 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eui64_from_slice() {
        assert!(Eui64::from_slice(&[0u8; 7]).is_none());
        assert!(Eui64::from_slice(&[0u8; 9]).is_none());

        let addr = Eui64::from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        assert_eq!(addr.as_bytes(), &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(addr.to_hex(), "0102030405060708");
    }
}
