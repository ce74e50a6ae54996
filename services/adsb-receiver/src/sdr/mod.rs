//! Raw I/Q sample demodulation
//!
//! Pipeline:
//! 1. Decode little-endian 12-bit I/Q samples
//! 2. Convert to power, one value per I/Q pair
//! 3. Slide a 120 µs window over the power signal
//! 4. Detect Mode S preambles and extract PPM-encoded frames
//! 5. Verify CRC-24

pub mod capture;
mod detect;
mod power;
mod samples;
mod window;

pub use capture::{CaptureStats, SampleCapture};
pub use detect::{AdsbDemodulator, DetectorStats, NS_PER_POWER_SAMPLE, WINDOW_SIZE};
pub use power::{PowerComputer, SamplePowerSource};
pub use samples::{decode_sample, SamplesDecoder};
pub use window::{PowerSource, PowerWindow, DEFAULT_BATCH_SIZE};
