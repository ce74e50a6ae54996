//! Airborne velocity messages (type code 19)

use super::raw_frame::RawFrame;
use super::types::IcaoAddress;
use crate::bits::{extract_uint, test_bit};
use crate::units::{knots_to_mps, normalize_radians, turns_to_radians, FOOT_PER_MINUTE_MPS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VelocityKind {
    /// Ground speed and track over ground (subtypes 1-2)
    GroundVector,
    /// Airspeed and magnetic heading (subtypes 3-4)
    AirHeading,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AirborneVelocityMessage {
    pub timestamp_ns: u64,
    pub icao: IcaoAddress,
    pub kind: VelocityKind,
    /// Speed in m/s
    pub speed_mps: f64,
    /// Track or heading in radians, [0, 2π)
    pub track_or_heading: f64,
    /// Vertical rate in m/s (positive climbing), if reported
    pub vertical_rate_mps: Option<f64>,
}

impl AirborneVelocityMessage {
    /// Decode a velocity frame, `None` for unknown subtypes or "no data" fields
    pub fn decode(frame: &RawFrame) -> Option<Self> {
        let me = frame.payload();
        let subtype = extract_uint(me, 48, 3);

        let (kind, speed_kts, angle) = match subtype {
            1 | 2 => decode_ground_vector(me, subtype)?,
            3 | 4 => decode_air_heading(me, subtype)?,
            _ => return None,
        };

        Some(Self {
            timestamp_ns: frame.timestamp_ns,
            icao: frame.icao_address(),
            kind,
            speed_mps: knots_to_mps(speed_kts),
            track_or_heading: angle,
            vertical_rate_mps: decode_vertical_rate(me),
        })
    }
}

/// Supersonic subtypes (2 and 4) use 4 kt resolution
fn speed_multiplier(subtype: u32) -> f64 {
    if subtype == 2 || subtype == 4 {
        4.0
    } else {
        1.0
    }
}

fn decode_ground_vector(me: u64, subtype: u32) -> Option<(VelocityKind, f64, f64)> {
    let dew = test_bit(me, 42);
    let vew = extract_uint(me, 32, 10);
    let dns = test_bit(me, 31);
    let vns = extract_uint(me, 21, 10);

    if vew == 0 || vns == 0 {
        return None;
    }

    let multiplier = speed_multiplier(subtype);
    let mut v_ew = (vew - 1) as f64 * multiplier;
    let mut v_ns = (vns - 1) as f64 * multiplier;
    if dew {
        v_ew = -v_ew;
    }
    if dns {
        v_ns = -v_ns;
    }

    let speed = v_ew.hypot(v_ns);
    let track = normalize_radians(v_ew.atan2(v_ns));
    Some((VelocityKind::GroundVector, speed, track))
}

fn decode_air_heading(me: u64, subtype: u32) -> Option<(VelocityKind, f64, f64)> {
    let heading_available = test_bit(me, 42);
    let hdg = extract_uint(me, 32, 10);
    let airspeed = extract_uint(me, 21, 10);

    if !heading_available || airspeed == 0 {
        return None;
    }

    let speed = (airspeed - 1) as f64 * speed_multiplier(subtype);
    let heading = turns_to_radians(hdg as f64 / 1024.0);
    Some((VelocityKind::AirHeading, speed, heading))
}

fn decode_vertical_rate(me: u64) -> Option<f64> {
    let descending = test_bit(me, 19);
    let vr = extract_uint(me, 10, 9);
    if vr == 0 {
        return None;
    }
    let fpm = (vr - 1) as f64 * 64.0;
    let fpm = if descending { -fpm } else { fpm };
    Some(fpm * FOOT_PER_MINUTE_MPS)
}
