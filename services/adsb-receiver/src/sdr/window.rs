//! Sliding window over the power signal
//!
//! Power samples are loaded batch by batch into a ring holding two batches.
//! The consumer addresses up to `window_size` samples relative to the current
//! position and moves forward without re-reading consumed data.

use std::io;

/// Default number of power samples loaded per read
pub const DEFAULT_BATCH_SIZE: usize = 1 << 16;

/// A stream of power samples
pub trait PowerSource {
    /// Fill `out` with the next power samples, returning how many were
    /// written. Zero means end of stream.
    fn read_power(&mut self, out: &mut [u32]) -> io::Result<usize>;
}

/// Ring-buffered window over a [`PowerSource`]
pub struct PowerWindow<S> {
    source: S,
    ring: Box<[u32]>,
    scratch: Box<[u32]>,
    window_size: usize,
    /// Absolute index of the first sample in the window
    position: u64,
    /// Absolute index one past the last loaded sample
    loaded: u64,
    eof: bool,
}

impl<S: PowerSource> PowerWindow<S> {
    pub fn new(source: S, window_size: usize) -> io::Result<Self> {
        Self::with_batch_size(source, window_size, DEFAULT_BATCH_SIZE)
    }

    pub fn with_batch_size(source: S, window_size: usize, batch_size: usize) -> io::Result<Self> {
        assert!(window_size > 0, "window must not be empty");
        assert!(
            window_size <= batch_size,
            "window of {} exceeds batch of {}",
            window_size,
            batch_size
        );

        let mut window = Self {
            source,
            ring: vec![0; 2 * batch_size].into_boxed_slice(),
            scratch: vec![0; batch_size].into_boxed_slice(),
            window_size,
            position: 0,
            loaded: 0,
            eof: false,
        };
        window.fill()?;
        Ok(window)
    }

    /// Absolute index of the window start
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Samples readable from the current position, 0 at end of stream
    pub fn available(&self) -> usize {
        (self.loaded - self.position) as usize
    }

    pub fn is_full(&self) -> bool {
        self.available() >= self.window_size
    }

    /// Power sample at `index` relative to the window start
    #[inline]
    pub fn get(&self, index: usize) -> u32 {
        assert!(index < self.available(), "index {} outside window", index);
        let slot = (self.position + index as u64) % self.ring.len() as u64;
        self.ring[slot as usize]
    }

    /// Move the window forward by one sample
    pub fn advance(&mut self) -> io::Result<()> {
        self.advance_by(1)
    }

    /// Move the window forward by `count` samples
    pub fn advance_by(&mut self, count: usize) -> io::Result<()> {
        assert!(count <= self.available(), "cannot advance past loaded data");
        self.position += count as u64;
        self.fill()
    }

    /// Load batches until the window is full or the stream has ended
    fn fill(&mut self) -> io::Result<()> {
        while !self.eof && !self.is_full() {
            let read = self.source.read_power(&mut self.scratch)?;
            if read == 0 {
                self.eof = true;
                break;
            }

            // window_size <= batch, so there is room for a whole batch
            let capacity = self.ring.len();
            let start = (self.loaded % capacity as u64) as usize;
            let first = read.min(capacity - start);
            self.ring[start..start + first].copy_from_slice(&self.scratch[..first]);
            self.ring[..read - first].copy_from_slice(&self.scratch[first..read]);
            self.loaded += read as u64;
        }
        Ok(())
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// In-memory power stream handing out at most `chunk` samples per read
    struct VecSource {
        data: Vec<u32>,
        offset: usize,
        chunk: usize,
    }

    impl VecSource {
        fn new(data: Vec<u32>) -> Self {
            Self { data, offset: 0, chunk: usize::MAX }
        }
    }

    impl PowerSource for VecSource {
        fn read_power(&mut self, out: &mut [u32]) -> io::Result<usize> {
            let n = out.len().min(self.chunk).min(self.data.len() - self.offset);
            out[..n].copy_from_slice(&self.data[self.offset..self.offset + n]);
            self.offset += n;
            Ok(n)
        }
    }

    #[test]
    fn test_window_walks_stream() {
        let data: Vec<u32> = (0..1000).collect();
        let mut window = PowerWindow::with_batch_size(VecSource::new(data), 10, 64).unwrap();

        let mut seen = 0;
        while window.is_full() {
            assert_eq!(window.position(), seen);
            for k in 0..10 {
                assert_eq!(window.get(k) as u64, seen + k as u64);
            }
            window.advance().unwrap();
            seen += 1;
        }
        assert_eq!(seen, 991);
        assert_eq!(window.available(), 9);
    }

    #[test]
    fn test_advance_by_and_short_reads() {
        let data: Vec<u32> = (0..500).collect();
        let mut source = VecSource::new(data);
        source.chunk = 7;
        let mut window = PowerWindow::with_batch_size(source, 32, 32).unwrap();

        window.advance_by(32).unwrap();
        assert_eq!(window.get(0), 32);
        window.advance_by(30).unwrap();
        assert_eq!(window.get(31), 93);

        while window.available() > 0 {
            let n = window.available();
            window.advance_by(n).unwrap();
        }
        assert_eq!(window.position(), 500);
    }

    #[test]
    fn test_empty_stream() {
        let window = PowerWindow::with_batch_size(VecSource::new(Vec::new()), 4, 8).unwrap();
        assert_eq!(window.available(), 0);
        assert!(!window.is_full());
    }

    #[test]
    #[should_panic]
    fn test_window_larger_than_batch() {
        let _ = PowerWindow::with_batch_size(VecSource::new(vec![0; 10]), 16, 8);
    }

    #[test]
    #[should_panic]
    fn test_get_outside_window() {
        let window = PowerWindow::with_batch_size(VecSource::new(vec![1, 2, 3]), 2, 8).unwrap();
        window.get(3);
    }
}
