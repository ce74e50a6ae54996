//! Mode S preamble detection and frame extraction
//!
//! Timing on the power signal (10 MS/s, 100 ns per sample):
//! - Preamble pulses at 0, 1.0, 3.5 and 4.5 µs → samples 0, 10, 35, 45
//! - Quiet periods in between → samples 5, 15, 20, 25, 30, 40
//! - Data starts at 8 µs (sample 80), one bit per µs (10 samples); a pulse
//!   in the first half of the bit period is a 1, in the second half a 0

use std::io::Read;

use tracing::{debug, trace};

use super::power::SamplePowerSource;
use super::window::{PowerSource, PowerWindow};
use crate::adsb::{ByteString, DownlinkFormat, RawFrame};
use crate::error::Result;

/// Power samples spanned by a long frame (8 µs preamble + 112 µs data)
pub const WINDOW_SIZE: usize = 1200;

/// Duration of one power sample
pub const NS_PER_POWER_SAMPLE: u64 = 100;

const PEAKS: [usize; 4] = [0, 10, 35, 45];
const VALLEYS: [usize; 6] = [5, 15, 20, 25, 30, 40];

const DATA_START: usize = 80;
const SAMPLES_PER_BIT: usize = 10;
const HALF_BIT: usize = SAMPLES_PER_BIT / 2;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DetectorStats {
    pub samples_scanned: u64,
    pub preambles_detected: u64,
    pub frames_decoded: u64,
    pub crc_errors: u64,
    pub unsupported_formats: u64,
}

/// Pulls validated long frames out of a power stream
pub struct AdsbDemodulator<S> {
    window: PowerWindow<S>,
    /// Peak sum one position back, 0 right after a frame
    before: u64,
    /// Peak sum at the current position
    current: u64,
    stats: DetectorStats,
}

impl<R: Read> AdsbDemodulator<SamplePowerSource<R>> {
    /// Demodulate raw I/Q samples read from `reader`
    pub fn from_reader(reader: R) -> Result<Self> {
        let window = PowerWindow::new(SamplePowerSource::new(reader), WINDOW_SIZE)?;
        Ok(Self::new(window))
    }
}

impl<S: PowerSource> AdsbDemodulator<S> {
    pub fn new(window: PowerWindow<S>) -> Self {
        assert_eq!(window.window_size(), WINDOW_SIZE, "window must span one long frame");

        let mut demodulator = Self {
            window,
            before: 0,
            current: 0,
            stats: DetectorStats::default(),
        };
        demodulator.current = demodulator.current_peaks();
        demodulator
    }

    /// Scan forward to the next valid frame.
    ///
    /// Returns `Ok(None)` once the stream is exhausted.
    pub fn next_frame(&mut self) -> Result<Option<RawFrame>> {
        while self.window.is_full() {
            self.stats.samples_scanned += 1;

            let next = self.peak_sum(1);
            if self.before < self.current && self.current > next && self.current >= 2 * self.valley_sum() {
                self.stats.preambles_detected += 1;

                if let Some(frame) = self.extract_frame() {
                    self.stats.frames_decoded += 1;
                    trace!("Frame at {} ns: *{};", frame.timestamp_ns, frame.to_hex());

                    self.window.advance_by(WINDOW_SIZE)?;
                    self.before = 0;
                    self.current = self.current_peaks();
                    return Ok(Some(frame));
                }
            }

            self.window.advance()?;
            self.before = self.current;
            self.current = next;
        }
        Ok(None)
    }

    pub fn stats(&self) -> &DetectorStats {
        &self.stats
    }

    pub fn window(&self) -> &PowerWindow<S> {
        &self.window
    }

    /// Timestamp of the current window start
    pub fn timestamp_ns(&self) -> u64 {
        self.window.position() * NS_PER_POWER_SAMPLE
    }

    fn current_peaks(&self) -> u64 {
        if self.window.is_full() {
            self.peak_sum(0)
        } else {
            0
        }
    }

    fn peak_sum(&self, offset: usize) -> u64 {
        PEAKS.iter().map(|&p| self.window.get(offset + p) as u64).sum()
    }

    fn valley_sum(&self) -> u64 {
        VALLEYS.iter().map(|&v| self.window.get(v) as u64).sum()
    }

    /// Decode one PPM bit of the data block
    #[inline]
    fn bit(&self, index: usize) -> u8 {
        let at = DATA_START + index * SAMPLES_PER_BIT;
        if self.window.get(at) < self.window.get(at + HALF_BIT) {
            0
        } else {
            1
        }
    }

    fn byte(&self, index: usize) -> u8 {
        (0..8).fold(0u8, |acc, i| (acc << 1) | self.bit(index * 8 + i))
    }

    fn extract_frame(&mut self) -> Option<RawFrame> {
        let format = DownlinkFormat::of_first_byte(self.byte(0));
        let size = format.frame_bytes();
        if size == 0 {
            self.stats.unsupported_formats += 1;
            trace!("Unsupported downlink format {:?} at {} ns", format, self.timestamp_ns());
            return None;
        }

        let bytes: Vec<u8> = (0..size).map(|k| self.byte(k)).collect();
        let frame = RawFrame::new(self.timestamp_ns(), ByteString::from(bytes));
        if frame.is_none() {
            self.stats.crc_errors += 1;
            debug!(
                "CRC error #{} at {} ns, DF={:?}",
                self.stats.crc_errors,
                self.timestamp_ns(),
                format
            );
        }
        frame
    }
}
