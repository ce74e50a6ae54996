//! ADS-B receiver
//!
//! Demodulates 1090 MHz I/Q samples into Mode S frames, decodes extended
//! squitter messages and accumulates per-aircraft state.
//!
//! ```text
//! samples ─▶ sdr (power, preamble, PPM, CRC) ─┐
//!                                             ├─▶ adsb::decode ─▶ AircraftTracker
//! *hex; lines ─▶ decoder::HexFrameRunner ─────┘
//! ```

pub mod adsb;
pub mod aircraft_db;
pub mod aircraft_tracker;
pub mod bits;
pub mod config;
pub mod decoder;
pub mod error;
pub mod output;
pub mod sdr;
pub mod units;

pub use error::{ReceiverError, Result};
