//! ADS-B Receiver - 1090 MHz demodulator and decoder
//!
//! Reads raw I/Q samples (or pre-captured hex frames), decodes Mode S/ADS-B
//! and writes aircraft state as JSON lines on stdout.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::io::AsyncRead;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use adsb_receiver::adsb::{self, RawFrame};
use adsb_receiver::aircraft_db::{AircraftDatabase, CsvAircraftDatabase, EmptyAircraftDatabase};
use adsb_receiver::aircraft_tracker::AircraftTracker;
use adsb_receiver::config::{Config, InputFormat};
use adsb_receiver::decoder::HexFrameRunner;
use adsb_receiver::output::{AircraftEvent, EventWriter};
use adsb_receiver::sdr::SampleCapture;

/// How long to wait for a frame before running periodic tasks
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Where frames come from
enum FrameFeed {
    Samples {
        capture: SampleCapture,
        rx: crossbeam_channel::Receiver<RawFrame>,
    },
    Hex {
        runner: Arc<HexFrameRunner>,
        rx: mpsc::Receiver<RawFrame>,
        handle: JoinHandle<Result<()>>,
    },
}

enum Poll {
    Frame(RawFrame),
    Idle,
    Closed,
}

impl FrameFeed {
    fn start(config: &Config) -> Result<Self> {
        match config.input_format {
            InputFormat::Samples => {
                let reader: Box<dyn Read + Send> = match &config.input_path {
                    Some(path) => Box::new(BufReader::new(
                        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
                    )),
                    None => Box::new(io::stdin()),
                };
                let mut capture = SampleCapture::new(config.frame_channel_capacity);
                let rx = capture.start(reader).context("Failed to start sample capture")?;
                Ok(Self::Samples { capture, rx })
            }
            InputFormat::Hex => {
                let input: Box<dyn AsyncRead + Unpin + Send> = match &config.input_path {
                    Some(path) => Box::new(tokio::fs::File::from_std(
                        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
                    )),
                    None => Box::new(tokio::io::stdin()),
                };
                let (tx, rx) = mpsc::channel(config.frame_channel_capacity);
                let runner = Arc::new(HexFrameRunner::new());
                let task_runner = runner.clone();
                let handle = tokio::spawn(async move { task_runner.run(input, tx).await });
                Ok(Self::Hex { runner, rx, handle })
            }
        }
    }

    async fn next(&mut self) -> Poll {
        match self {
            Self::Samples { rx, .. } => {
                let received = tokio::task::block_in_place(|| rx.recv_timeout(POLL_INTERVAL));
                match received {
                    Ok(frame) => Poll::Frame(frame),
                    Err(crossbeam_channel::RecvTimeoutError::Timeout) => Poll::Idle,
                    Err(crossbeam_channel::RecvTimeoutError::Disconnected) => Poll::Closed,
                }
            }
            Self::Hex { rx, .. } => match tokio::time::timeout(POLL_INTERVAL, rx.recv()).await {
                Ok(Some(frame)) => Poll::Frame(frame),
                Ok(None) => Poll::Closed,
                Err(_) => Poll::Idle,
            },
        }
    }

    fn log_stats(&self) {
        match self {
            Self::Samples { capture, .. } => {
                let stats = capture.stats().snapshot();
                info!(
                    "[Demod] Scanned: {} | Preambles: {} | Frames: {} | CRC errors: {} | Unsupported: {}",
                    stats.samples_scanned,
                    stats.preambles_detected,
                    stats.frames_decoded,
                    stats.crc_errors,
                    stats.unsupported_formats
                );
            }
            Self::Hex { runner, .. } => {
                info!(
                    "[Hex] Frames: {} | Parse errors: {} | CRC errors: {} | Unsupported: {}",
                    runner.frames_received(),
                    runner.parse_errors(),
                    runner.crc_errors(),
                    runner.unsupported_formats()
                );
            }
        }
    }

    fn stop(&self) {
        match self {
            Self::Samples { capture, .. } => capture.stop(),
            Self::Hex { runner, .. } => runner.stop(),
        }
    }

    /// Wait for the reader to finish and surface its error, if any
    async fn finish(self) -> Result<()> {
        match self {
            Self::Samples { mut capture, rx } => {
                capture.stop();
                drop(rx);
                tokio::task::block_in_place(|| capture.join()).context("Sample capture failed")
            }
            Self::Hex { rx, handle, .. } => {
                drop(rx);
                handle.await.context("Hex runner task panicked")?
            }
        }
    }
}

fn open_database(config: &Config) -> Result<Box<dyn AircraftDatabase>> {
    match &config.aircraft_db_path {
        Some(path) => Ok(Box::new(
            CsvAircraftDatabase::open(path).context("Failed to load aircraft database")?,
        )),
        None => Ok(Box::new(EmptyAircraftDatabase)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (stdout carries the event stream)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("adsb_receiver=info")),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    info!("===========================================");
    info!("   ADS-B Receiver - 1090 MHz decoder");
    info!("===========================================");

    let config = Config::from_env();

    info!("Configuration:");
    info!("  Input format: {}", config.input_format);
    info!(
        "  Input: {}",
        config.input_path.as_ref().map_or("stdin".to_string(), |p| p.display().to_string())
    );
    info!(
        "  Aircraft database: {}",
        config.aircraft_db_path.as_ref().map_or("none".to_string(), |p| p.display().to_string())
    );
    info!("  Purge timeout: {} s", config.purge_timeout_secs);
    info!("  Max trajectory: {}", config.max_trajectory);
    info!("  Report interval: {} ms", config.report_interval_ms);

    let database = open_database(&config)?;
    let mut tracker = AircraftTracker::new(database, config.purge_timeout_ns(), config.max_trajectory);
    let mut events = EventWriter::new(io::stdout());

    let shutdown = Arc::new(AtomicBool::new(false));
    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl+C received, shutting down");
            ctrl_c.store(true, Ordering::SeqCst);
        }
    });

    let mut feed = FrameFeed::start(&config)?;

    info!("===========================================");
    info!("  Receiving frames. Press Ctrl+C to stop.");
    info!("===========================================");

    let report_interval = Duration::from_millis(config.report_interval_ms);
    let mut frames_processed = 0u64;
    let mut messages_decoded = 0u64;
    let mut last_report = Instant::now();

    // Main processing loop
    loop {
        match feed.next().await {
            Poll::Frame(frame) => {
                frames_processed += 1;

                if let Some(message) = adsb::decode(&frame) {
                    messages_decoded += 1;
                    let update = tracker.update(&message);
                    if update.is_significant() {
                        let event = AircraftEvent::from_aircraft(update.aircraft);
                        if let Err(e) = events.write(&event) {
                            error!("Failed to write aircraft event: {}", e);
                            break;
                        }
                    }
                }
            }
            Poll::Idle => {}
            Poll::Closed => {
                info!("Frame source finished");
                break;
            }
        }

        // Periodic statistics and purge
        if last_report.elapsed() >= report_interval {
            feed.log_stats();
            let purged = tracker.purge();
            info!("[Tracker] {} | purged {}", tracker.stats_summary(), purged);
            last_report = Instant::now();
        }

        if shutdown.load(Ordering::SeqCst) {
            feed.stop();
            break;
        }
    }

    feed.log_stats();
    let result = feed.finish().await;
    if let Err(e) = &result {
        warn!("{:#}", e);
    }

    info!(
        "Shutdown complete. Frames: {}, messages: {}, events: {}",
        frames_processed,
        messages_decoded,
        events.events_written()
    );
    info!("[Tracker] {}", tracker.stats_summary());
    result
}
