//! JSON-lines aircraft events

use std::io::Write;

use chrono::Utc;
use serde::Serialize;

use crate::adsb::IcaoAddress;
use crate::aircraft_tracker::TrackedAircraft;
use crate::error::Result;
use crate::units::{meters_to_feet, mps_to_knots, FOOT_PER_MINUTE_MPS};

/// Snapshot of one aircraft, one per output line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AircraftEvent {
    pub icao: IcaoAddress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub callsign: Option<String>,
    pub category: Option<u8>,
    pub altitude_ft: Option<i32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub speed_kts: Option<f64>,
    pub track_deg: Option<f64>,
    pub vertical_rate_fpm: Option<i32>,
    pub message_timestamp_ns: u64,
    /// Wall-clock time the event was produced
    pub timestamp_ms: i64,
}

impl AircraftEvent {
    pub fn from_aircraft(aircraft: &TrackedAircraft) -> Self {
        let state = aircraft.state();
        let registration = &aircraft.registration;
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());

        Self {
            icao: state.icao,
            registration: non_empty(&registration.registration),
            model: non_empty(&registration.model),
            callsign: state.callsign.clone(),
            category: state.category,
            altitude_ft: state.altitude_m.map(|m| meters_to_feet(m).round() as i32),
            latitude: state.position.map(|p| p.latitude_deg()),
            longitude: state.position.map(|p| p.longitude_deg()),
            speed_kts: state.velocity_mps.map(mps_to_knots),
            track_deg: state.track_or_heading.map(f64::to_degrees),
            vertical_rate_fpm: state
                .vertical_rate_mps
                .map(|v| (v / FOOT_PER_MINUTE_MPS).round() as i32),
            message_timestamp_ns: state.last_timestamp_ns,
            timestamp_ms: Utc::now().timestamp_millis(),
        }
    }
}

/// Writes events as newline-delimited JSON
pub struct EventWriter<W> {
    writer: W,
    events_written: u64,
}

impl<W: Write> EventWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            events_written: 0,
        }
    }

    pub fn write(&mut self, event: &AircraftEvent) -> Result<()> {
        serde_json::to_writer(&mut self.writer, event).map_err(std::io::Error::from)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.events_written += 1;
        Ok(())
    }

    pub fn events_written(&self) -> u64 {
        self.events_written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adsb::{decode, RawFrame};
    use crate::aircraft_db::{AircraftData, AircraftDatabase};
    use crate::aircraft_tracker::AircraftTracker;

    struct OneAircraft;

    impl AircraftDatabase for OneAircraft {
        fn get(&self, _icao: IcaoAddress) -> AircraftData {
            AircraftData {
                registration: "PH-BXA".to_string(),
                model: "Boeing 737-8K2".to_string(),
                ..AircraftData::default()
            }
        }
    }

    fn feed(tracker: &mut AircraftTracker, timestamp_ns: u64, hex: &str) {
        let message = decode(&RawFrame::from_hex(timestamp_ns, hex).unwrap()).unwrap();
        tracker.update(&message);
    }

    #[test]
    fn test_event_from_tracked_aircraft() {
        let mut tracker = AircraftTracker::new(Box::new(OneAircraft), 60_000_000_000, 8);
        feed(&mut tracker, 1_000, "8D40621D58C382D690C8AC2863A7");
        feed(&mut tracker, 2_000, "8D40621D58C386435CC412692AD6");

        let event = AircraftEvent::from_aircraft(tracker.get(IcaoAddress::new(0x40621D)).unwrap());
        assert_eq!(event.registration.as_deref(), Some("PH-BXA"));
        assert_eq!(event.altitude_ft, Some(38_000));
        assert!((event.latitude.unwrap() - 52.26578).abs() < 1e-5);
        assert!((event.longitude.unwrap() - 3.93891).abs() < 1e-5);
        assert_eq!(event.message_timestamp_ns, 2_000);
        assert!(event.speed_kts.is_none());
    }

    #[test]
    fn test_writes_json_lines() {
        let mut tracker = AircraftTracker::new(Box::new(crate::aircraft_db::EmptyAircraftDatabase), 60_000_000_000, 8);
        feed(&mut tracker, 5, "8D4840D6202CC371C32CE0576098");
        feed(&mut tracker, 6, "8D485020994409940838175B284F");

        let mut writer = EventWriter::new(Vec::new());
        for icao in [0x4840D6, 0x485020] {
            let aircraft = tracker.get(IcaoAddress::new(icao)).unwrap();
            writer.write(&AircraftEvent::from_aircraft(aircraft)).unwrap();
        }
        assert_eq!(writer.events_written(), 2);

        let output = String::from_utf8(writer.into_inner()).unwrap();
        let lines: Vec<serde_json::Value> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["icao"], "4840D6");
        assert_eq!(lines[0]["callsign"], "KLM1023");
        assert_eq!(lines[0]["category"], 0xA0);
        assert!(lines[0].get("registration").is_none());
        assert_eq!(lines[1]["speed_kts"].as_f64().unwrap().round(), 159.0);
        assert_eq!(lines[1]["track_deg"].as_f64().unwrap().round(), 183.0);
        assert_eq!(lines[1]["vertical_rate_fpm"], -832);
    }
}
