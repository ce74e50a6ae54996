//! Unit conversions
//!
//! Decoded values are kept in SI units (meters, meters per second, radians);
//! aviation units only appear at the edges (wire encodings, output events).

use std::f64::consts::TAU;

pub const FOOT_M: f64 = 0.3048;
pub const NAUTICAL_MILE_M: f64 = 1852.0;
pub const KNOT_MPS: f64 = NAUTICAL_MILE_M / 3600.0;
pub const FOOT_PER_MINUTE_MPS: f64 = FOOT_M / 60.0;

#[inline]
pub fn feet_to_meters(ft: f64) -> f64 {
    ft * FOOT_M
}

#[inline]
pub fn meters_to_feet(m: f64) -> f64 {
    m / FOOT_M
}

#[inline]
pub fn knots_to_mps(kts: f64) -> f64 {
    kts * KNOT_MPS
}

#[inline]
pub fn mps_to_knots(mps: f64) -> f64 {
    mps / KNOT_MPS
}

/// Fraction of a full turn to radians
#[inline]
pub fn turns_to_radians(turns: f64) -> f64 {
    turns * TAU
}

#[inline]
pub fn radians_to_turns(rad: f64) -> f64 {
    rad / TAU
}

/// Wrap an angle into [0, 2π)
pub fn normalize_radians(rad: f64) -> f64 {
    let r = rad.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if r >= TAU {
        0.0
    } else {
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        assert!((feet_to_meters(38000.0) - 11582.4).abs() < 1e-9);
        assert!((meters_to_feet(feet_to_meters(1234.0)) - 1234.0).abs() < 1e-9);
        assert!((knots_to_mps(1.0) - 0.514444).abs() < 1e-6);
        assert!((turns_to_radians(0.5) - std::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_radians() {
        assert_eq!(normalize_radians(0.0), 0.0);
        assert!((normalize_radians(-std::f64::consts::FRAC_PI_2) - 1.5 * std::f64::consts::PI).abs() < 1e-12);
        assert!(normalize_radians(TAU) < 1e-12);
        assert!(normalize_radians(-1e-18) < TAU);
    }
}
