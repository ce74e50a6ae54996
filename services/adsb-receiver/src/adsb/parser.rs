//! ADS-B message dispatch
//!
//! Maps a validated frame to one of the three decoded message kinds by type
//! code. Every other type code is recognised and dropped.

use super::ident::IdentificationMessage;
use super::position::AirbornePositionMessage;
use super::raw_frame::RawFrame;
use super::types::IcaoAddress;
use super::velocity::AirborneVelocityMessage;

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Identification(IdentificationMessage),
    Position(AirbornePositionMessage),
    Velocity(AirborneVelocityMessage),
}

impl Message {
    pub fn timestamp_ns(&self) -> u64 {
        match self {
            Self::Identification(m) => m.timestamp_ns,
            Self::Position(m) => m.timestamp_ns,
            Self::Velocity(m) => m.timestamp_ns,
        }
    }

    pub fn icao(&self) -> IcaoAddress {
        match self {
            Self::Identification(m) => m.icao,
            Self::Position(m) => m.icao,
            Self::Velocity(m) => m.icao,
        }
    }
}

/// Decode a frame into a typed message
pub fn decode(frame: &RawFrame) -> Option<Message> {
    match frame.type_code() {
        // Aircraft identification
        1..=4 => IdentificationMessage::decode(frame).map(Message::Identification),
        // Airborne position (barometric altitude, then GNSS height)
        9..=18 | 20..=22 => Some(Message::Position(AirbornePositionMessage::decode(frame))),
        // Airborne velocity
        19 => AirborneVelocityMessage::decode(frame).map(Message::Velocity),
        _ => None,
    }
}
