//! ADS-B message parsing module
//!
//! Turns CRC-checked 112-bit Mode S frames into typed messages and resolves
//! CPR-encoded positions.

mod byte_string;
mod crc;
pub mod cpr;
mod ident;
pub mod parser;
pub mod position;
mod raw_frame;
mod types;
mod velocity;

pub use byte_string::ByteString;
pub use crc::{Crc24, GENERATOR};
pub use ident::IdentificationMessage;
pub use parser::{decode, Message};
pub use position::{AirbornePositionMessage, Parity};
pub use raw_frame::RawFrame;
pub use types::{AltitudeSource, DownlinkFormat, GeoPos, IcaoAddress, LONG_FRAME_BYTES};
pub use velocity::{AirborneVelocityMessage, VelocityKind};
