//! Power computation for I/Q samples
//!
//! Each power sample combines the last four I/Q pairs. Alternating the sign
//! of every other pair shifts the signal down by a quarter of the sampling
//! rate before the magnitude is taken, so one power value is produced per
//! I/Q pair (100 ns at 20 MS/s).

use std::io::{self, Read};

use super::samples::SamplesDecoder;
use super::window::PowerSource;

/// Raw samples of history feeding one power value
const HISTORY: usize = 8;

/// Incremental power filter over interleaved I/Q samples
#[derive(Debug, Default, Clone)]
pub struct PowerComputer {
    /// Last eight raw samples, oldest first
    history: [i32; HISTORY],
}

impl PowerComputer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push one I/Q pair and return the resulting power
    #[inline]
    pub fn push(&mut self, i: i16, q: i16) -> u32 {
        self.history.copy_within(2.., 0);
        self.history[HISTORY - 2] = i as i32;
        self.history[HISTORY - 1] = q as i32;

        let h = &self.history;
        let i_sum = (h[6] - h[4] + h[2] - h[0]) as i64;
        let q_sum = (h[7] - h[5] + h[3] - h[1]) as i64;
        // 12-bit samples stay well inside u32; wider input saturates
        u32::try_from(i_sum * i_sum + q_sum * q_sum).unwrap_or(u32::MAX)
    }

    /// Convert interleaved samples to power values.
    ///
    /// Returns the number of values written (one per complete I/Q pair).
    pub fn compute(&mut self, samples: &[i16], out: &mut [u32]) -> usize {
        let mut count = 0;
        for (pair, power) in samples.chunks_exact(2).zip(out.iter_mut()) {
            *power = self.push(pair[0], pair[1]);
            count += 1;
        }
        count
    }
}

/// Power samples computed on the fly from a raw sample stream
pub struct SamplePowerSource<R> {
    samples: SamplesDecoder<R>,
    power: PowerComputer,
    scratch: Vec<i16>,
}

impl<R: Read> SamplePowerSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            samples: SamplesDecoder::new(reader),
            power: PowerComputer::new(),
            scratch: Vec::new(),
        }
    }

    /// Raw samples consumed so far
    pub fn total_samples(&self) -> u64 {
        self.samples.total_samples()
    }
}

impl<R: Read> PowerSource for SamplePowerSource<R> {
    fn read_power(&mut self, out: &mut [u32]) -> io::Result<usize> {
        let wanted = out.len() * 2;
        if self.scratch.len() < wanted {
            self.scratch.resize(wanted, 0);
        }
        let read = self.samples.read_samples(&mut self.scratch[..wanted])?;
        Ok(self.power.compute(&self.scratch[..read], out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_silence_has_no_power() {
        let mut power = PowerComputer::new();
        for _ in 0..16 {
            assert_eq!(power.push(0, 0), 0);
        }
    }

    #[test]
    fn test_constant_carrier_cancels() {
        // a DC offset is removed by the alternating sum once the history is full
        let mut power = PowerComputer::new();
        let values: Vec<u32> = (0..8).map(|_| power.push(100, -50)).collect();
        assert_eq!(&values[..3], &[12_500, 0, 12_500]);
        assert!(values[3..].iter().all(|&p| p == 0));
    }

    #[test]
    fn test_shifted_tone_builds_up() {
        // alternating I passes the filter at full gain
        let mut power = PowerComputer::new();
        let values: Vec<u32> = (0..6)
            .map(|k| power.push(if k % 2 == 0 { 1000 } else { -1000 }, 0))
            .collect();
        assert_eq!(values, vec![1_000_000, 4_000_000, 9_000_000, 16_000_000, 16_000_000, 16_000_000]);
    }

    #[test]
    fn test_full_scale_input_saturates() {
        let mut power = PowerComputer::new();
        let values: Vec<u32> = (0..6)
            .map(|k| {
                if k % 2 == 0 {
                    power.push(i16::MAX, i16::MIN)
                } else {
                    power.push(i16::MIN, i16::MAX)
                }
            })
            .collect();
        assert_eq!(values[0], 2_147_418_113);
        assert!(values[1..].iter().all(|&p| p == u32::MAX));
    }

    #[test]
    fn test_out_of_range_words_are_masked() {
        // I alternates 0x7FFF / 0x0000, Q stays 0x0000
        let mut bytes = Vec::new();
        for k in 0..8 {
            let i: u16 = if k % 2 == 0 { 0x7FFF } else { 0x0000 };
            bytes.extend_from_slice(&i.to_le_bytes());
            bytes.extend_from_slice(&0u16.to_le_bytes());
        }
        let mut source = SamplePowerSource::new(Cursor::new(bytes));
        let mut out = [0u32; 8];
        assert_eq!(source.read_power(&mut out).unwrap(), 8);
        assert_eq!(&out[..4], &[8_384_513, 16_769_025, 41_918_468, 67_076_100]);
        assert!(out[4..].iter().all(|&p| p == 67_076_100));
    }

    #[test]
    fn test_compute_pairs() {
        let mut power = PowerComputer::new();
        let mut out = [0u32; 4];
        let n = power.compute(&[3, 4, 0, 0, 0], &mut out);
        assert_eq!(n, 2);
        assert_eq!(out[0], 25);
    }

    #[test]
    fn test_sample_source() {
        // I = 1000, -1000, ... as little-endian offset words
        let mut bytes = Vec::new();
        for k in 0..4 {
            let i: u16 = if k % 2 == 0 { 3048 } else { 1048 };
            bytes.extend_from_slice(&i.to_le_bytes());
            bytes.extend_from_slice(&2048u16.to_le_bytes());
        }
        let mut source = SamplePowerSource::new(Cursor::new(bytes));
        let mut out = [0u32; 8];
        assert_eq!(source.read_power(&mut out).unwrap(), 4);
        assert_eq!(&out[..4], &[1_000_000, 4_000_000, 9_000_000, 16_000_000]);
        assert_eq!(source.total_samples(), 8);
    }
}
