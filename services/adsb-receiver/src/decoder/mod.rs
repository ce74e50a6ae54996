//! Frame sources other than the sample demodulator

pub mod runner;

pub use runner::{parse_hex_line, HexFrameRunner};
