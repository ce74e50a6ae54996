//! Error types for the receiver pipeline
//!
//! Malformed radio data never surfaces here: bad frames and undecodable
//! fields are dropped or reported as absent values. Only I/O failures and
//! invalid user-supplied input (addresses, database files) are errors.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReceiverError>;

#[derive(Error, Debug)]
pub enum ReceiverError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("hex decode error: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("invalid ICAO address '{0}'")]
    InvalidAddress(String),

    #[error("aircraft database error: {0}")]
    Database(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
