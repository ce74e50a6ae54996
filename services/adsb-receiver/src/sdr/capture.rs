//! Demodulation on a dedicated thread
//!
//! Reads raw I/Q samples from any byte stream (a file, stdin or a pipe from
//! the radio driver), runs them through the demodulator and hands validated
//! frames to the consumer over a bounded channel. A full channel blocks the
//! demodulator, so it never runs ahead of the consumer by more than the
//! channel capacity.

use std::io::Read;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender};
use tracing::{debug, error, info};

use super::detect::{AdsbDemodulator, DetectorStats};
use crate::adsb::RawFrame;
use crate::error::{ReceiverError, Result};

/// Statistics for sample capture (atomic for thread-safe access)
#[derive(Debug, Default)]
pub struct CaptureStats {
    pub samples_scanned: AtomicU64,
    pub preambles_detected: AtomicU64,
    pub frames_decoded: AtomicU64,
    pub crc_errors: AtomicU64,
    pub unsupported_formats: AtomicU64,
}

impl CaptureStats {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn record(&self, stats: &DetectorStats) {
        self.samples_scanned.store(stats.samples_scanned, Ordering::Relaxed);
        self.preambles_detected.store(stats.preambles_detected, Ordering::Relaxed);
        self.frames_decoded.store(stats.frames_decoded, Ordering::Relaxed);
        self.crc_errors.store(stats.crc_errors, Ordering::Relaxed);
        self.unsupported_formats.store(stats.unsupported_formats, Ordering::Relaxed);
    }

    /// Copy of the latest published counters
    pub fn snapshot(&self) -> DetectorStats {
        DetectorStats {
            samples_scanned: self.samples_scanned.load(Ordering::Relaxed),
            preambles_detected: self.preambles_detected.load(Ordering::Relaxed),
            frames_decoded: self.frames_decoded.load(Ordering::Relaxed),
            crc_errors: self.crc_errors.load(Ordering::Relaxed),
            unsupported_formats: self.unsupported_formats.load(Ordering::Relaxed),
        }
    }
}

/// Sample capture controller
pub struct SampleCapture {
    channel_capacity: usize,
    running: Arc<AtomicBool>,
    stats: Arc<CaptureStats>,
    handle: Option<JoinHandle<Result<()>>>,
}

impl SampleCapture {
    pub fn new(channel_capacity: usize) -> Self {
        Self {
            channel_capacity,
            running: Arc::new(AtomicBool::new(false)),
            stats: CaptureStats::new(),
            handle: None,
        }
    }

    /// Start demodulating `reader` and return a receiver for decoded frames
    pub fn start<R: Read + Send + 'static>(&mut self, reader: R) -> Result<Receiver<RawFrame>> {
        info!("Starting sample capture (channel capacity {})", self.channel_capacity);

        let (frame_tx, frame_rx) = bounded::<RawFrame>(self.channel_capacity);

        let running = self.running.clone();
        let stats = self.stats.clone();
        running.store(true, Ordering::SeqCst);

        let handle = thread::Builder::new()
            .name("sample-capture".to_string())
            .spawn(move || {
                let result = run_capture(reader, &running, &stats, frame_tx);
                if let Err(e) = &result {
                    error!("Sample capture error: {}", e);
                }
                running.store(false, Ordering::SeqCst);
                result
            })?;

        self.handle = Some(handle);
        Ok(frame_rx)
    }

    /// Ask the capture thread to stop after the current frame
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            info!("Stopping sample capture...");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> &Arc<CaptureStats> {
        &self.stats
    }

    /// Wait for the capture thread and return how it ended
    pub fn join(&mut self) -> Result<()> {
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .unwrap_or_else(|_| Err(ReceiverError::Io(std::io::Error::other("capture thread panicked")))),
            None => Ok(()),
        }
    }
}

/// Main capture loop (runs in dedicated thread)
fn run_capture<R: Read>(
    reader: R,
    running: &AtomicBool,
    stats: &CaptureStats,
    frame_tx: Sender<RawFrame>,
) -> Result<()> {
    let mut demodulator = AdsbDemodulator::from_reader(reader)?;

    while running.load(Ordering::SeqCst) {
        let next = demodulator.next_frame();
        stats.record(demodulator.stats());

        match next? {
            Some(frame) => {
                if frame_tx.send(frame).is_err() {
                    debug!("Frame receiver dropped, stopping capture");
                    break;
                }
            }
            None => {
                info!("Sample stream ended");
                break;
            }
        }
    }

    let final_stats = demodulator.stats();
    info!(
        "Capture stopped: scanned={} preambles={} frames={} crc_errors={} unsupported={}",
        final_stats.samples_scanned,
        final_stats.preambles_detected,
        final_stats.frames_decoded,
        final_stats.crc_errors,
        final_stats.unsupported_formats
    );
    Ok(())
}

impl Drop for SampleCapture {
    fn drop(&mut self) {
        self.stop();
    }
}
