//! Aircraft registration lookup
//!
//! Maps ICAO addresses to registration data. The CSV form has one aircraft
//! per record and no header row; fields may be quoted:
//!
//! ```text
//! # icao,registration,type_designator,model,description,wtc
//! 4840D6,PH-BXA,B738,"Boeing 737-800, winglets",L2J,M
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::adsb::IcaoAddress;
use crate::error::{ReceiverError, Result};

/// One database row as it appears in the file
#[derive(Debug, Deserialize)]
struct AircraftRecord {
    icao: String,
    registration: String,
    type_designator: String,
    model: String,
    description: String,
    wtc: String,
}

/// ICAO wake turbulence category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum WakeTurbulenceCategory {
    Light,
    Medium,
    Heavy,
    #[default]
    Unknown,
}

impl WakeTurbulenceCategory {
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "L" => Self::Light,
            "M" => Self::Medium,
            "H" => Self::Heavy,
            _ => Self::Unknown,
        }
    }
}

/// Registration record, all fields empty when unknown
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AircraftData {
    pub registration: String,
    pub type_designator: String,
    pub model: String,
    pub description: String,
    pub wake_turbulence: WakeTurbulenceCategory,
}

impl AircraftData {
    pub fn is_empty(&self) -> bool {
        self.registration.is_empty() && self.type_designator.is_empty() && self.model.is_empty()
    }
}

/// Registration lookup. Unknown addresses yield an empty record.
pub trait AircraftDatabase: Send {
    fn get(&self, icao: IcaoAddress) -> AircraftData;
}

/// Database with no entries
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyAircraftDatabase;

impl AircraftDatabase for EmptyAircraftDatabase {
    fn get(&self, _icao: IcaoAddress) -> AircraftData {
        AircraftData::default()
    }
}

/// In-memory database loaded from CSV
#[derive(Debug, Default)]
pub struct CsvAircraftDatabase {
    entries: HashMap<IcaoAddress, AircraftData>,
}

impl CsvAircraftDatabase {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            ReceiverError::Database(format!("cannot open {}: {}", path.display(), e))
        })?;
        let db = Self::from_reader(file)?;
        info!("Loaded {} aircraft from {}", db.len(), path.display());
        Ok(db)
    }

    /// Read all records, skipping `#` comments and malformed records
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .comment(Some(b'#'))
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut entries = HashMap::new();
        for res in csv_reader.records() {
            let record = match res {
                Ok(record) => record,
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    warn!("Skipping unreadable aircraft record: {}", e);
                    continue;
                }
            };
            match parse_record(&record) {
                Some((icao, data)) => {
                    entries.insert(icao, data);
                }
                None => warn!(
                    "Skipping malformed aircraft record at line {}: {:?}",
                    record.position().map_or(0, |p| p.line()),
                    record
                ),
            }
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl AircraftDatabase for CsvAircraftDatabase {
    fn get(&self, icao: IcaoAddress) -> AircraftData {
        self.entries.get(&icao).cloned().unwrap_or_default()
    }
}

fn parse_record(record: &StringRecord) -> Option<(IcaoAddress, AircraftData)> {
    let raw: AircraftRecord = record.deserialize(None).ok()?;
    let icao = raw.icao.parse().ok()?;
    Some((
        icao,
        AircraftData {
            wake_turbulence: WakeTurbulenceCategory::from_code(&raw.wtc),
            registration: raw.registration,
            type_designator: raw.type_designator,
            model: raw.model,
            description: raw.description,
        },
    ))
}
