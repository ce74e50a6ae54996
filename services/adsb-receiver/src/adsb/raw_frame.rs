//! Validated 112-bit Mode S frame

use std::sync::OnceLock;

use super::byte_string::ByteString;
use super::crc::Crc24;
use super::types::{DownlinkFormat, IcaoAddress, LONG_FRAME_BYTES};
use crate::bits::extract_uint;

fn crc24() -> &'static Crc24 {
    static CRC: OnceLock<Crc24> = OnceLock::new();
    CRC.get_or_init(Crc24::default)
}

/// A long Mode S frame whose CRC checked out, stamped with its capture time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    /// Capture time in nanoseconds since the start of the stream
    pub timestamp_ns: u64,
    bytes: ByteString,
}

impl RawFrame {
    /// Frame length for a given first byte, 0 if the format is unsupported
    pub fn size(byte0: u8) -> usize {
        DownlinkFormat::of_first_byte(byte0).frame_bytes()
    }

    /// Wrap `bytes` as a frame if its downlink format is a supported long
    /// frame and its CRC remainder is zero.
    ///
    /// `bytes` must be exactly one long frame.
    pub fn new(timestamp_ns: u64, bytes: ByteString) -> Option<Self> {
        assert_eq!(bytes.len(), LONG_FRAME_BYTES, "raw frame must be {} bytes", LONG_FRAME_BYTES);
        if Self::size(bytes.byte_at(0)) != LONG_FRAME_BYTES {
            return None;
        }
        if crc24().crc(bytes.as_bytes()) != 0 {
            return None;
        }
        Some(Self { timestamp_ns, bytes })
    }

    /// Parse a 28-digit hex frame
    pub fn from_hex(timestamp_ns: u64, hex: &str) -> Option<Self> {
        let bytes = ByteString::from_hex(hex).ok()?;
        if bytes.len() != LONG_FRAME_BYTES {
            return None;
        }
        Self::new(timestamp_ns, bytes)
    }

    pub fn bytes(&self) -> &ByteString {
        &self.bytes
    }

    /// Downlink format (first 5 bits)
    pub fn downlink_format(&self) -> u8 {
        self.bytes.byte_at(0) >> 3
    }

    /// ICAO address (bytes 1-3)
    pub fn icao_address(&self) -> IcaoAddress {
        IcaoAddress::new(self.bytes.bytes_in_range(1, 4) as u32)
    }

    /// 56-bit ME field (bytes 4-10)
    pub fn payload(&self) -> u64 {
        self.bytes.bytes_in_range(4, 11)
    }

    /// Type code (first 5 bits of the ME field)
    pub fn type_code(&self) -> u8 {
        Self::type_code_of(self.payload())
    }

    pub fn type_code_of(payload: u64) -> u8 {
        extract_uint(payload, 51, 5) as u8
    }

    pub fn to_hex(&self) -> String {
        self.bytes.to_hex()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields() {
        let frame = RawFrame::from_hex(8096200, "8D4840D6202CC371C32CE0576098").unwrap();
        assert_eq!(frame.timestamp_ns, 8096200);
        assert_eq!(frame.downlink_format(), 17);
        assert_eq!(frame.icao_address(), IcaoAddress::new(0x4840D6));
        assert_eq!(frame.payload(), 0x202CC371C32CE0);
        assert_eq!(frame.type_code(), 4);
        assert_eq!(frame.to_hex(), "8D4840D6202CC371C32CE0576098");
    }

    #[test]
    fn test_rejects_bad_crc() {
        assert!(RawFrame::from_hex(0, "8D4840D6202CC371C32CE0576099").is_none());
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert!(RawFrame::from_hex(0, "02E197B2F3F9A1").is_none());
        assert!(RawFrame::from_hex(0, "not hex").is_none());
    }

    #[test]
    fn test_rejects_unsupported_format_with_valid_crc() {
        // DF18 with a correct parity field
        let bytes = ByteString::from_hex("9040621D58C382D690C8AC76C63F").unwrap();
        assert_eq!(Crc24::default().crc(bytes.as_bytes()), 0);
        assert!(RawFrame::new(0, bytes).is_none());
    }

    #[test]
    fn test_size() {
        assert_eq!(RawFrame::size(0x8D), 14);
        assert_eq!(RawFrame::size(0x8C), 14);
        assert_eq!(RawFrame::size(0x5D), 0);
    }

    #[test]
    #[should_panic]
    fn test_short_buffer_is_a_defect() {
        RawFrame::new(0, ByteString::new(vec![0x8D; 7]));
    }
}
