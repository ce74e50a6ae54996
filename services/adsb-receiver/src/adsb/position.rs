//! Airborne position messages (type codes 9-18, 20-22)
//!
//! Latitude and longitude arrive CPR-encoded and are only resolved once an
//! even/odd pair is available (see [`super::cpr`]). Altitude is decoded
//! immediately, either from the 25 ft direct encoding (Q bit set) or from
//! the Gillham code used by older transponders.

use super::raw_frame::RawFrame;
use super::types::{AltitudeSource, IcaoAddress};
use crate::bits::{extract_uint, test_bit};
use crate::units::feet_to_meters;

/// CPR coordinates are 17-bit fractions of a zone
const CPR_SCALE: f64 = (1u32 << 17) as f64;

/// CPR format flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parity {
    Even = 0,
    Odd = 1,
}

impl Parity {
    pub fn from_bit(odd: bool) -> Self {
        if odd {
            Self::Odd
        } else {
            Self::Even
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Even => Self::Odd,
            Self::Odd => Self::Even,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AirbornePositionMessage {
    pub timestamp_ns: u64,
    pub icao: IcaoAddress,
    /// Altitude in meters, NaN when the code is undefined
    pub altitude_m: f64,
    pub altitude_source: AltitudeSource,
    pub parity: Parity,
    /// CPR longitude, fraction of a zone in [0, 1)
    pub x: f64,
    /// CPR latitude, fraction of a zone in [0, 1)
    pub y: f64,
}

impl AirbornePositionMessage {
    pub fn decode(frame: &RawFrame) -> Self {
        let me = frame.payload();
        let tc = RawFrame::type_code_of(me);

        let altitude_source = if (20..=22).contains(&tc) {
            AltitudeSource::Gnss
        } else {
            AltitudeSource::Barometric
        };

        Self {
            timestamp_ns: frame.timestamp_ns,
            icao: frame.icao_address(),
            altitude_m: decode_altitude(extract_uint(me, 36, 12) as u16),
            altitude_source,
            parity: Parity::from_bit(test_bit(me, 34)),
            x: extract_uint(me, 0, 17) as f64 / CPR_SCALE,
            y: extract_uint(me, 17, 17) as f64 / CPR_SCALE,
        }
    }

    pub fn has_altitude(&self) -> bool {
        !self.altitude_m.is_nan()
    }
}

/// Decode the 12-bit altitude field to meters, NaN if undefined
pub fn decode_altitude(ac12: u16) -> f64 {
    let q_bit = (ac12 >> 4) & 1;

    if q_bit == 1 {
        // 25 ft resolution, Q bit squeezed out
        let n = ((ac12 & 0x0FE0) >> 1) | (ac12 & 0x000F);
        feet_to_meters(n as f64 * 25.0 - 1000.0)
    } else {
        match decode_gillham(ac12) {
            Some(ft) => feet_to_meters(ft as f64),
            None => f64::NAN,
        }
    }
}

/// Gillham (100 ft resolution) altitude in feet
///
/// ```plain
/// input:  C1 A1 C2 A2 C4 A4 B1 D1 B2 D2 B4 D4
/// output: D1 D2 D4 A1 A2 A4 B1 B2 B4 C1 C2 C4
/// ```
fn decode_gillham(ac12: u16) -> Option<i32> {
    // source bit (from the MSB) for each output position, MSB first
    const ORDER: [u32; 12] = [7, 9, 11, 1, 3, 5, 6, 8, 10, 0, 2, 4];

    let code = ORDER
        .iter()
        .fold(0u32, |acc, &src| (acc << 1) | ((ac12 as u32 >> (11 - src)) & 1));

    let five_hundreds = gray_decode(code >> 3, 9);
    let mut hundreds = gray_decode(code & 0b111, 3);

    match hundreds {
        0 | 5 | 6 => return None,
        7 => hundreds = 5,
        _ => {}
    }
    if five_hundreds % 2 == 1 {
        hundreds = 6 - hundreds;
    }

    Some(-1300 + hundreds as i32 * 100 + five_hundreds as i32 * 500)
}

/// Decode a `bits`-wide reflected binary (Gray) value
pub fn gray_decode(value: u32, bits: u32) -> u32 {
    (0..bits).fold(0, |acc, shift| acc ^ (value >> shift))
}

/// Gray-encode a binary value
pub fn gray_encode(value: u32) -> u32 {
    value ^ (value >> 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meters(ft: f64) -> f64 {
        feet_to_meters(ft)
    }

    #[test]
    fn test_decode_position_fields() {
        let frame = RawFrame::from_hex(0, "8D40621D58C382D690C8AC2863A7").unwrap();
        let msg = AirbornePositionMessage::decode(&frame);
        assert_eq!(msg.icao, IcaoAddress::new(0x40621D));
        assert_eq!(msg.parity, Parity::Even);
        assert_eq!(msg.altitude_source, AltitudeSource::Barometric);
        assert!((msg.altitude_m - meters(38000.0)).abs() < 1e-9);
        assert_eq!(msg.x, 51372.0 / CPR_SCALE);
        assert_eq!(msg.y, 93000.0 / CPR_SCALE);

        let frame = RawFrame::from_hex(0, "8D40621D58C386435CC412692AD6").unwrap();
        let msg = AirbornePositionMessage::decode(&frame);
        assert_eq!(msg.parity, Parity::Odd);
        assert_eq!(msg.x, 50194.0 / CPR_SCALE);
        assert_eq!(msg.y, 74158.0 / CPR_SCALE);
    }

    #[test]
    fn test_direct_altitude_roundtrip() {
        for ft in (-1000..=50175).step_by(25) {
            let n = ((ft + 1000) / 25) as u16;
            let ac12 = ((n & 0x7F0) << 1) | 0x10 | (n & 0x0F);
            assert!((decode_altitude(ac12) - meters(ft as f64)).abs() < 1e-9, "{} ft", ft);
        }
    }

    #[test]
    fn test_gillham_altitudes() {
        assert_eq!(decode_gillham(0x200), Some(-1000));
        assert_eq!(decode_gillham(0x080), Some(-1200));
        assert_eq!(decode_gillham(0x20A), Some(0));
        assert_eq!(decode_gillham(0xA0A), Some(100));
        assert_eq!(decode_gillham(0x22A), Some(1500));
        assert_eq!(decode_gillham(0x362), Some(10000));
        assert_eq!(decode_gillham(0xC43), Some(38200));
        assert!((decode_altitude(0x362) - meters(10000.0)).abs() < 1e-9);
    }

    #[test]
    fn test_gillham_undefined_codes() {
        // hundreds digit 0
        assert_eq!(decode_gillham(0x000), None);
        assert!(decode_altitude(0x000).is_nan());
        // hundreds digit 5 (C1 C2 C4 = 111)
        assert_eq!(decode_gillham(0xA80), None);
        assert!(decode_altitude(0xA80).is_nan());
        // hundreds digit 6 (C1 C2 C4 = 101)
        assert_eq!(decode_gillham(0x880), None);
        assert!(decode_altitude(0x880).is_nan());
    }

    #[test]
    fn test_gray_code_inverse() {
        for x in 0..512u32 {
            assert_eq!(gray_decode(gray_encode(x), 9), x);
        }
        for x in 0..8u32 {
            assert_eq!(gray_decode(gray_encode(x), 3), x);
        }
    }

    #[test]
    fn test_parity() {
        assert_eq!(Parity::from_bit(true).index(), 1);
        assert_eq!(Parity::Even.opposite(), Parity::Odd);
    }
}
