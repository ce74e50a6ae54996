//! ADS-B data types

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::ReceiverError;

/// Bytes in a long (112-bit) Mode S frame
pub const LONG_FRAME_BYTES: usize = 14;

/// Downlink format identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DownlinkFormat {
    ShortAirSurveillance = 0,
    AltitudeReply = 4,
    IdentityReply = 5,
    AllCallReply = 11,
    LongAirSurveillance = 16,
    ExtendedSquitter = 17,
    ExtendedSquitterNonTransponder = 18,
    MilitaryExtendedSquitter = 19,
    CommBAltitude = 20,
    CommBIdentity = 21,
    Unknown = 255,
}

impl From<u8> for DownlinkFormat {
    fn from(df: u8) -> Self {
        match df {
            0 => Self::ShortAirSurveillance,
            4 => Self::AltitudeReply,
            5 => Self::IdentityReply,
            11 => Self::AllCallReply,
            16 => Self::LongAirSurveillance,
            17 => Self::ExtendedSquitter,
            18 => Self::ExtendedSquitterNonTransponder,
            19 => Self::MilitaryExtendedSquitter,
            20 => Self::CommBAltitude,
            21 => Self::CommBIdentity,
            _ => Self::Unknown,
        }
    }
}

impl DownlinkFormat {
    /// Downlink format carried in the top five bits of a frame's first byte
    pub fn of_first_byte(byte0: u8) -> Self {
        Self::from(byte0 >> 3)
    }

    /// Frame length in bytes for the formats this receiver handles.
    ///
    /// Only ADS-B extended squitters (DF17) are supported; anything else
    /// reports 0.
    pub fn frame_bytes(self) -> usize {
        match self {
            Self::ExtendedSquitter => LONG_FRAME_BYTES,
            _ => 0,
        }
    }
}

/// ICAO 24-bit aircraft address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IcaoAddress(u32);

impl IcaoAddress {
    pub fn new(address: u32) -> Self {
        assert!(address <= 0xFF_FFFF, "ICAO address {:#x} wider than 24 bits", address);
        Self(address)
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for IcaoAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06X}", self.0)
    }
}

impl FromStr for IcaoAddress {
    type Err = ReceiverError;

    /// Parse the canonical 6-digit hex form
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != 6 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ReceiverError::InvalidAddress(s.to_string()));
        }
        u32::from_str_radix(s, 16)
            .map(Self)
            .map_err(|_| ReceiverError::InvalidAddress(s.to_string()))
    }
}

impl Serialize for IcaoAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Geodetic position, angles in radians
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPos {
    /// Longitude in (-π, π]
    pub longitude: f64,
    /// Latitude in [-π/2, π/2]
    pub latitude: f64,
}

impl GeoPos {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self { longitude, latitude }
    }

    pub fn from_degrees(longitude_deg: f64, latitude_deg: f64) -> Self {
        Self::new(longitude_deg.to_radians(), latitude_deg.to_radians())
    }

    pub fn is_valid_latitude(latitude: f64) -> bool {
        (-std::f64::consts::FRAC_PI_2..=std::f64::consts::FRAC_PI_2).contains(&latitude)
    }

    pub fn longitude_deg(&self) -> f64 {
        self.longitude.to_degrees()
    }

    pub fn latitude_deg(&self) -> f64 {
        self.latitude.to_degrees()
    }
}

impl fmt::Display for GeoPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}°, {:.5}°)", self.latitude_deg(), self.longitude_deg())
    }
}

/// Source of the altitude reported in a position message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AltitudeSource {
    /// Type codes 9-18
    Barometric,
    /// Type codes 20-22
    Gnss,
}
