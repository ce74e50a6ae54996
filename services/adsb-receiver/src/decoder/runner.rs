//! Hex frame runner - reads pre-captured `*<hex>;` lines and forwards frames

use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio_stream::wrappers::LinesStream;
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};

use crate::adsb::{ByteString, DownlinkFormat, RawFrame, LONG_FRAME_BYTES};

/// Hex digits in one long frame
const FRAME_HEX_DIGITS: usize = LONG_FRAME_BYTES * 2;

/// Reads hex frame lines from an async input and sends validated frames
pub struct HexFrameRunner {
    running: Arc<AtomicBool>,
    frames_received: Arc<AtomicU64>,
    parse_errors: Arc<AtomicU64>,
    crc_errors: Arc<AtomicU64>,
    unsupported_formats: Arc<AtomicU64>,
}

impl HexFrameRunner {
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            frames_received: Arc::new(AtomicU64::new(0)),
            parse_errors: Arc::new(AtomicU64::new(0)),
            crc_errors: Arc::new(AtomicU64::new(0)),
            unsupported_formats: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Read `input` to the end, sending every DF17 frame with a valid CRC.
    ///
    /// Frames are stamped with the nanoseconds elapsed since the call.
    pub async fn run<R>(&self, input: R, tx: mpsc::Sender<RawFrame>) -> Result<()>
    where
        R: AsyncRead + Unpin,
    {
        let started = Instant::now();
        let mut lines = LinesStream::new(BufReader::new(input).lines());
        self.running.store(true, Ordering::SeqCst);

        info!("Waiting for hex frames...");
        let mut first_frame = true;

        while self.running.load(Ordering::SeqCst) {
            let line = match lines.next().await {
                Some(line) => line.context("Failed to read hex frame input")?,
                None => {
                    info!("Hex frame input closed");
                    break;
                }
            };

            let Some(bytes) = parse_hex_line(&line) else {
                if line.trim_start().starts_with('*') {
                    self.parse_errors.fetch_add(1, Ordering::Relaxed);
                    debug!("Failed to parse line: {}", line.trim());
                }
                // anything else is a comment or tool chatter
                continue;
            };

            let format = DownlinkFormat::of_first_byte(bytes.byte_at(0));
            if format.frame_bytes() != LONG_FRAME_BYTES {
                self.unsupported_formats.fetch_add(1, Ordering::Relaxed);
                debug!("Unsupported downlink format {:?}: {}", format, line.trim());
                continue;
            }

            let timestamp_ns = started.elapsed().as_nanos() as u64;
            let Some(frame) = RawFrame::new(timestamp_ns, bytes) else {
                self.crc_errors.fetch_add(1, Ordering::Relaxed);
                debug!("CRC error: {}", line.trim());
                continue;
            };

            if first_frame {
                info!("First hex frame received");
                first_frame = false;
            }
            self.frames_received.fetch_add(1, Ordering::Relaxed);
            if tx.send(frame).await.is_err() {
                warn!("Channel closed, stopping hex runner");
                break;
            }
        }

        self.running.store(false, Ordering::SeqCst);
        info!(
            "Hex runner stopped. Frames: {}, Parse errors: {}, CRC errors: {}, Unsupported: {}",
            self.frames_received(),
            self.parse_errors(),
            self.crc_errors(),
            self.unsupported_formats()
        );
        Ok(())
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn frames_received(&self) -> u64 {
        self.frames_received.load(Ordering::Relaxed)
    }

    pub fn parse_errors(&self) -> u64 {
        self.parse_errors.load(Ordering::Relaxed)
    }

    pub fn crc_errors(&self) -> u64 {
        self.crc_errors.load(Ordering::Relaxed)
    }

    pub fn unsupported_formats(&self) -> u64 {
        self.unsupported_formats.load(Ordering::Relaxed)
    }
}

impl Default for HexFrameRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a frame line of the form `*<28 hex digits>;`.
///
/// Surrounding whitespace is ignored; anything else yields `None`.
pub fn parse_hex_line(line: &str) -> Option<ByteString> {
    let hex_str = line.trim().strip_prefix('*')?.strip_suffix(';')?;
    if hex_str.len() != FRAME_HEX_DIGITS {
        return None;
    }
    ByteString::from_hex(hex_str).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_line() {
        let bytes = parse_hex_line("*8D4840D6202CC371C32CE0576098;").unwrap();
        assert_eq!(bytes.len(), 14);
        assert_eq!(bytes.byte_at(0), 0x8D);
    }

    #[test]
    fn test_parse_hex_line_with_crlf() {
        assert!(parse_hex_line("  *8D4840D6202CC371C32CE0576098;\r\n").is_some());
        assert!(parse_hex_line("*8d4840d6202cc371c32ce0576098;").is_some());
    }

    #[test]
    fn test_parse_hex_line_invalid() {
        assert!(parse_hex_line("not a message").is_none());
        assert!(parse_hex_line("*invalid;").is_none());
        // short Mode S frames are not accepted
        assert!(parse_hex_line("*02E197B2F3F9A1;").is_none());
        assert!(parse_hex_line("8D4840D6202CC371C32CE0576098;").is_none());
        assert!(parse_hex_line("*8D4840D6202CC371C32CE0576098").is_none());
        assert!(parse_hex_line("*8D4840D6202CC371C32CE057609Z;").is_none());
        assert!(parse_hex_line("*8D4840D6202CC371C32CE0576098;;").is_none());
    }

    #[tokio::test]
    async fn test_run_forwards_valid_frames() {
        let input = b"# captured frames\n\
            *8D4840D6202CC371C32CE0576098;\n\
            *8D4840D6202CC371C32CE0576099;\n\
            *garbage;\n\
            \n\
            *8D40621D58C382D690C8AC2863A7;\r\n" as &[u8];

        let runner = HexFrameRunner::new();
        let (tx, mut rx) = mpsc::channel(8);
        runner.run(input, tx).await.unwrap();

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert!(rx.recv().await.is_none());

        assert_eq!(first.to_hex(), "8D4840D6202CC371C32CE0576098");
        assert_eq!(second.to_hex(), "8D40621D58C382D690C8AC2863A7");
        assert!(second.timestamp_ns >= first.timestamp_ns);
        assert_eq!(runner.frames_received(), 2);
        assert_eq!(runner.crc_errors(), 1);
        assert_eq!(runner.parse_errors(), 1);
        assert!(!runner.is_running());
    }

    #[tokio::test]
    async fn test_run_drops_non_adsb_formats() {
        // DF18 copy of the DF17 position frame below, parity recomputed
        let input = b"*9040621D58C382D690C8AC76C63F;\n\
            *8D40621D58C382D690C8AC2863A7;\n" as &[u8];

        let runner = HexFrameRunner::new();
        let (tx, mut rx) = mpsc::channel(8);
        runner.run(input, tx).await.unwrap();

        let frame = rx.recv().await.unwrap();
        assert_eq!(frame.downlink_format(), 17);
        assert!(rx.recv().await.is_none());
        assert_eq!(runner.frames_received(), 1);
        assert_eq!(runner.unsupported_formats(), 1);
        assert_eq!(runner.crc_errors(), 0);
    }

    #[tokio::test]
    async fn test_run_stops_when_receiver_dropped() {
        let input = b"*8D4840D6202CC371C32CE0576098;\n*8D40621D58C382D690C8AC2863A7;\n" as &[u8];
        let runner = HexFrameRunner::new();
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        runner.run(input, tx).await.unwrap();
        assert_eq!(runner.frames_received(), 1);
    }
}
