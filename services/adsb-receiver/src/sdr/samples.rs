//! Raw I/Q sample decoding
//!
//! The receiver delivers interleaved I/Q samples, each a little-endian
//! 16-bit word carrying an unsigned 12-bit value centred on 2048.

use std::io::{self, ErrorKind, Read};

/// Bytes per raw sample
pub const BYTES_PER_SAMPLE: usize = 2;

/// Zero level of the unsigned 12-bit samples
const SAMPLE_OFFSET: i32 = 2048;
const SAMPLE_MASK: u16 = 0x0FFF;

/// Reads raw samples from a byte stream and centres them on zero
pub struct SamplesDecoder<R> {
    reader: R,
    buffer: Vec<u8>,
    total_samples: u64,
}

impl<R: Read> SamplesDecoder<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: Vec::new(),
            total_samples: 0,
        }
    }

    /// Fill `out` with signed samples.
    ///
    /// Returns the number of samples written; anything short of `out.len()`
    /// means the stream ended. A trailing odd byte is discarded.
    pub fn read_samples(&mut self, out: &mut [i16]) -> io::Result<usize> {
        let wanted = out.len() * BYTES_PER_SAMPLE;
        if self.buffer.len() < wanted {
            self.buffer.resize(wanted, 0);
        }

        let mut filled = 0;
        while filled < wanted {
            match self.reader.read(&mut self.buffer[filled..wanted]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        let count = filled / BYTES_PER_SAMPLE;
        for (sample, chunk) in out.iter_mut().zip(self.buffer[..count * BYTES_PER_SAMPLE].chunks_exact(2)) {
            *sample = decode_sample(chunk[0], chunk[1]);
        }

        self.total_samples += count as u64;
        Ok(count)
    }

    /// Samples decoded since the start of the stream
    pub fn total_samples(&self) -> u64 {
        self.total_samples
    }
}

/// Decode one little-endian sample. Bits above the low 12 are ignored.
#[inline]
pub fn decode_sample(low: u8, high: u8) -> i16 {
    ((u16::from_le_bytes([low, high]) & SAMPLE_MASK) as i32 - SAMPLE_OFFSET) as i16
}
