//! Immutable byte buffer used to exchange raw frames

use std::fmt;

use crate::error::Result;

/// Fixed-length, immutable byte sequence. Equality and hashing are by content.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ByteString {
    bytes: Box<[u8]>,
}

impl ByteString {
    pub fn new(bytes: impl Into<Box<[u8]>>) -> Self {
        Self { bytes: bytes.into() }
    }

    /// Parse an even-length hex string (either case)
    pub fn from_hex(s: &str) -> Result<Self> {
        Ok(Self::new(hex::decode(s)?))
    }

    /// Uppercase hex representation, the form dump1090-style tools print
    pub fn to_hex(&self) -> String {
        hex::encode_upper(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn byte_at(&self, index: usize) -> u8 {
        self.bytes[index]
    }

    /// Read bytes `[from, to)` as a big-endian unsigned integer.
    ///
    /// At most eight bytes fit in the result; wider ranges are a caller defect.
    pub fn bytes_in_range(&self, from: usize, to: usize) -> u64 {
        assert!(from <= to && to <= self.bytes.len(), "range {}..{} out of bounds", from, to);
        assert!(to - from <= 8, "range {}..{} wider than 8 bytes", from, to);
        self.bytes[from..to]
            .iter()
            .fold(0u64, |acc, &b| (acc << 8) | b as u64)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Display for ByteString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ByteString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByteString({})", self.to_hex())
    }
}

impl From<Vec<u8>> for ByteString {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}
