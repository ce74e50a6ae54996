//! Configuration loaded from environment variables

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::aircraft_tracker::DEFAULT_MAX_TRAJECTORY;

/// Kind of data read from the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Raw 12-bit I/Q samples
    Samples,
    /// `*<hex>;` frame lines
    Hex,
}

impl FromStr for InputFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "samples" | "iq" => Ok(Self::Samples),
            "hex" => Ok(Self::Hex),
            _ => Err(()),
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Samples => write!(f, "samples"),
            Self::Hex => write!(f, "hex"),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub input_format: InputFormat,

    /// Input file, `None` reads stdin
    pub input_path: Option<PathBuf>,

    /// CSV aircraft registration database
    pub aircraft_db_path: Option<PathBuf>,

    /// Aircraft silent for longer than this are dropped
    pub purge_timeout_secs: u64,

    /// Trajectory points kept per aircraft
    pub max_trajectory: usize,

    /// Statistics reporting interval in milliseconds
    pub report_interval_ms: u64,

    /// Capacity of the frame channel between reader and decoder
    pub frame_channel_capacity: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            input_format: lookup("INPUT_FORMAT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(InputFormat::Samples),

            input_path: lookup("INPUT_PATH")
                .filter(|s| !s.is_empty() && s != "-")
                .map(PathBuf::from),

            aircraft_db_path: lookup("AIRCRAFT_DB_PATH")
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),

            purge_timeout_secs: parse_var(&lookup, "PURGE_TIMEOUT_SECS").unwrap_or(60),

            max_trajectory: parse_var(&lookup, "MAX_TRAJECTORY").unwrap_or(DEFAULT_MAX_TRAJECTORY),

            report_interval_ms: parse_var(&lookup, "REPORT_INTERVAL_MS")
                .filter(|&ms: &u64| ms > 0)
                .unwrap_or(10_000),

            frame_channel_capacity: parse_var(&lookup, "FRAME_CHANNEL_CAPACITY")
                .filter(|&n: &usize| n > 0)
                .unwrap_or(1000),
        }
    }

    pub fn purge_timeout_ns(&self) -> u64 {
        self.purge_timeout_secs.saturating_mul(1_000_000_000)
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|s| s.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);
        assert_eq!(config.input_format, InputFormat::Samples);
        assert!(config.input_path.is_none());
        assert!(config.aircraft_db_path.is_none());
        assert_eq!(config.purge_timeout_secs, 60);
        assert_eq!(config.purge_timeout_ns(), 60_000_000_000);
        assert_eq!(config.max_trajectory, 512);
        assert_eq!(config.report_interval_ms, 10_000);
        assert_eq!(config.frame_channel_capacity, 1000);
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("INPUT_FORMAT", "HEX"),
            ("INPUT_PATH", "/data/frames.txt"),
            ("AIRCRAFT_DB_PATH", "/data/aircraft.csv"),
            ("PURGE_TIMEOUT_SECS", "120"),
            ("MAX_TRAJECTORY", "0"),
            ("REPORT_INTERVAL_MS", "500"),
            ("FRAME_CHANNEL_CAPACITY", "16"),
        ]);
        assert_eq!(config.input_format, InputFormat::Hex);
        assert_eq!(config.input_path, Some(PathBuf::from("/data/frames.txt")));
        assert_eq!(config.aircraft_db_path, Some(PathBuf::from("/data/aircraft.csv")));
        assert_eq!(config.purge_timeout_secs, 120);
        assert_eq!(config.max_trajectory, 0);
        assert_eq!(config.report_interval_ms, 500);
        assert_eq!(config.frame_channel_capacity, 16);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config(&[
            ("INPUT_FORMAT", "wav"),
            ("INPUT_PATH", "-"),
            ("PURGE_TIMEOUT_SECS", "soon"),
            ("REPORT_INTERVAL_MS", "0"),
            ("FRAME_CHANNEL_CAPACITY", "-3"),
        ]);
        assert_eq!(config.input_format, InputFormat::Samples);
        assert!(config.input_path.is_none());
        assert_eq!(config.purge_timeout_secs, 60);
        assert_eq!(config.report_interval_ms, 10_000);
        assert_eq!(config.frame_channel_capacity, 1000);
    }
}
