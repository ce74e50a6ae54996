//! Aircraft identification messages (type codes 1-4)

use super::raw_frame::RawFrame;
use super::types::IcaoAddress;
use crate::bits::extract_uint;

/// Callsign character lookup table, '?' marks codes with no character
const CALLSIGN_CHARS: &[u8; 64] = b"?ABCDEFGHIJKLMNOPQRSTUVWXYZ????? ???????????????0123456789??????";

const CALLSIGN_LEN: u32 = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentificationMessage {
    pub timestamp_ns: u64,
    pub icao: IcaoAddress,
    /// Wake vortex category, `(14 - TC) << 4 | CA`
    pub category: u8,
    /// Flight callsign with trailing blanks removed
    pub callsign: String,
}

impl IdentificationMessage {
    /// Decode an identification frame. `None` if the callsign contains a
    /// code outside the character set.
    pub fn decode(frame: &RawFrame) -> Option<Self> {
        let me = frame.payload();
        let tc = RawFrame::type_code_of(me);
        let ca = extract_uint(me, 48, 3) as u8;

        let callsign = decode_callsign(me)?;

        Some(Self {
            timestamp_ns: frame.timestamp_ns,
            icao: frame.icao_address(),
            category: ((0x0E - tc) << 4) | ca,
            callsign,
        })
    }
}

/// Decode eight 6-bit characters from bits 0..47 of the ME field
fn decode_callsign(me: u64) -> Option<String> {
    let mut callsign = String::with_capacity(CALLSIGN_LEN as usize);
    for i in 0..CALLSIGN_LEN {
        let code = extract_uint(me, 42 - 6 * i, 6) as usize;
        match CALLSIGN_CHARS[code] {
            b'?' => return None,
            c => callsign.push(c as char),
        }
    }

    let trimmed = callsign.trim_end().len();
    callsign.truncate(trimmed);
    Some(callsign)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(hex: &str) -> RawFrame {
        RawFrame::from_hex(0, hex).unwrap()
    }

    /// Build an ME field for type code 4 from eight 6-bit codes
    fn me_with_codes(codes: [u64; 8]) -> u64 {
        let mut me = 4u64 << 51;
        for (i, code) in codes.iter().enumerate() {
            me |= code << (42 - 6 * i);
        }
        me
    }

    #[test]
    fn test_decode_identification() {
        let msg = IdentificationMessage::decode(&frame("8D4840D6202CC371C32CE0576098")).unwrap();
        assert_eq!(msg.icao, IcaoAddress::new(0x4840D6));
        assert_eq!(msg.callsign, "KLM1023");
        assert_eq!(msg.category, 0xA0);
    }

    #[test]
    fn test_callsign_padding_trimmed() {
        // K L M 1 0 2 3 followed by a blank
        let me = me_with_codes([11, 12, 13, 49, 48, 50, 51, 32]);
        assert_eq!(decode_callsign(me).as_deref(), Some("KLM1023"));
    }

    #[test]
    fn test_callsign_unrepresentable_is_absent() {
        let me = me_with_codes([11, 12, 13, 49, 48, 50, 27, 32]);
        assert_eq!(decode_callsign(me), None);
        let me = me_with_codes([0, 12, 13, 49, 48, 50, 51, 32]);
        assert_eq!(decode_callsign(me), None);
    }

    #[test]
    fn test_blank_callsign_is_empty() {
        let me = me_with_codes([32; 8]);
        assert_eq!(decode_callsign(me).as_deref(), Some(""));
    }
}
