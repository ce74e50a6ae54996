//! CPR (Compact Position Reporting) position decoding
//!
//! Positions are transmitted as 17-bit fractions of a latitude/longitude
//! zone. A single message is ambiguous modulo its zone size; combining an
//! even (60 latitude zones) and an odd (59 latitude zones) message resolves
//! the absolute position. All arithmetic here is in turns (1 turn = 360°).

use std::f64::consts::TAU;

use super::position::Parity;
use super::types::GeoPos;
use crate::units::{radians_to_turns, turns_to_radians};

/// Number of latitude zones between the equator and a pole
const NZ: f64 = 15.0;

const EVEN_LAT_ZONES: f64 = 4.0 * NZ;
const ODD_LAT_ZONES: f64 = 4.0 * NZ - 1.0;

/// Number of longitude zones at a latitude given in turns
pub fn longitude_zones(lat_turns: f64) -> u32 {
    let cos_lat = turns_to_radians(lat_turns).cos();
    let a = 1.0 - (1.0 - (TAU / EVEN_LAT_ZONES).cos()) / (cos_lat * cos_lat);
    if !(-1.0..=1.0).contains(&a) {
        // polar cap: a single zone
        return 1;
    }
    let a = a.acos();
    if a == 0.0 {
        return 1;
    }
    // the exact equator evaluates to 60
    ((TAU / a).floor() as u32).clamp(1, 59)
}

/// Bring a value in turns from [0, 1) into [-½, ½)
fn recenter(turns: f64) -> f64 {
    if turns >= 0.5 {
        turns - 1.0
    } else {
        turns
    }
}

/// Zone index for a pair of fractions, weighted by the zone counts
fn zone_index(even: f64, odd: f64, odd_zones: f64, even_zones: f64) -> f64 {
    (even * odd_zones - odd * even_zones + 0.5).floor()
}

/// Global decode of an even/odd pair.
///
/// `x`/`y` are the CPR longitude/latitude fractions of the even (0) and odd
/// (1) messages; `most_recent` selects whose zone the result is reported
/// in. Returns `None` when the two latitudes fall in different longitude
/// zone counts or the latitude is out of range.
pub fn decode_global(x0: f64, y0: f64, x1: f64, y1: f64, most_recent: Parity) -> Option<GeoPos> {
    let j = zone_index(y0, y1, ODD_LAT_ZONES, EVEN_LAT_ZONES);

    let lat0 = recenter((j.rem_euclid(EVEN_LAT_ZONES) + y0) / EVEN_LAT_ZONES);
    let lat1 = recenter((j.rem_euclid(ODD_LAT_ZONES) + y1) / ODD_LAT_ZONES);

    // Check latitude zone consistency
    let nl = longitude_zones(lat0);
    if nl != longitude_zones(lat1) {
        return None;
    }

    let (lat, lon) = if nl == 1 {
        match most_recent {
            Parity::Even => (lat0, x0),
            Parity::Odd => (lat1, x1),
        }
    } else {
        let nl = nl as f64;
        let m = zone_index(x0, x1, nl - 1.0, nl);
        match most_recent {
            Parity::Even => (lat0, (m.rem_euclid(nl) + x0) / nl),
            Parity::Odd => (lat1, (m.rem_euclid(nl - 1.0) + x1) / (nl - 1.0)),
        }
    };

    to_geo_pos(lon, lat)
}

/// Local decode of a single message against a reference position.
///
/// Valid when the aircraft is within half a zone (roughly 180 NM) of the
/// reference, e.g. the receiver or the previous fix.
pub fn decode_local(x: f64, y: f64, parity: Parity, reference: GeoPos) -> Option<GeoPos> {
    let i = parity.index() as f64;
    let ref_lat = radians_to_turns(reference.latitude);
    let ref_lon = radians_to_turns(reference.longitude);

    let dlat = 1.0 / (EVEN_LAT_ZONES - i);
    let j = (ref_lat / dlat).floor() + (ref_lat.rem_euclid(dlat) / dlat - y + 0.5).floor();
    let lat = dlat * (j + y);

    let zones = (longitude_zones(lat) as f64 - i).max(1.0);
    let dlon = 1.0 / zones;
    let m = (ref_lon / dlon).floor() + (ref_lon.rem_euclid(dlon) / dlon - x + 0.5).floor();
    let lon = dlon * (m + x);

    to_geo_pos(lon, lat)
}

/// Wrap longitude into (-½, ½] turn and validate latitude
fn to_geo_pos(lon_turns: f64, lat_turns: f64) -> Option<GeoPos> {
    let lon_turns = if lon_turns > 0.5 {
        lon_turns - 1.0
    } else if lon_turns <= -0.5 {
        lon_turns + 1.0
    } else {
        lon_turns
    };

    let pos = GeoPos::new(turns_to_radians(lon_turns), turns_to_radians(lat_turns));
    if !GeoPos::is_valid_latitude(pos.latitude) {
        return None;
    }
    Some(pos)
}
