//! Aircraft state tracking and aggregation
//!
//! Fuses the stream of decoded messages into one state per ICAO address.
//! Positions need an even and an odd CPR message no more than
//! [`PAIRING_WINDOW_NS`] apart; a lone position message only updates the
//! altitude.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use tracing::{debug, info};

use crate::adsb::cpr;
use crate::adsb::{
    AirbornePositionMessage, AirborneVelocityMessage, AltitudeSource, GeoPos, IcaoAddress,
    IdentificationMessage, Message, Parity, VelocityKind,
};
use crate::aircraft_db::{AircraftData, AircraftDatabase};
use crate::units::{meters_to_feet, mps_to_knots};

/// Maximum time between the two messages of a CPR pair
pub const PAIRING_WINDOW_NS: u64 = 10_000_000_000;

/// Default bound on trajectory points per aircraft
pub const DEFAULT_MAX_TRAJECTORY: usize = 512;

/// Minimum message time between two position log lines for one aircraft
const POSITION_LOG_INTERVAL_NS: u64 = 5_000_000_000;

/// One resolved position fix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryPoint {
    pub timestamp_ns: u64,
    pub position: GeoPos,
    /// Altitude in meters at the time of the fix, if known
    pub altitude_m: Option<f64>,
}

/// A field of [`AircraftState`] that took a new value
#[derive(Debug, Clone, PartialEq)]
pub enum StateChange {
    LastTimestamp(u64),
    Category(u8),
    Callsign(String),
    Position(GeoPos),
    Altitude(Option<f64>),
    Velocity(f64),
    TrackOrHeading(f64),
    VerticalRate(f64),
}

impl StateChange {
    /// Changes worth reporting downstream
    pub fn is_significant(&self) -> bool {
        matches!(
            self,
            Self::Callsign(_) | Self::Position(_) | Self::Altitude(_) | Self::Velocity(_)
        )
    }
}

/// Aggregated aircraft state
#[derive(Debug, Clone)]
pub struct AircraftState {
    pub icao: IcaoAddress,
    /// Timestamp of the newest message seen
    pub last_timestamp_ns: u64,
    pub category: Option<u8>,
    pub callsign: Option<String>,
    pub position: Option<GeoPos>,
    /// Altitude in meters from the latest position message
    pub altitude_m: Option<f64>,
    pub altitude_source: Option<AltitudeSource>,
    /// Ground speed or airspeed in m/s, see `velocity_kind`
    pub velocity_mps: Option<f64>,
    /// Track or heading in radians
    pub track_or_heading: Option<f64>,
    pub velocity_kind: Option<VelocityKind>,
    /// Vertical rate in m/s, positive climbing
    pub vertical_rate_mps: Option<f64>,
    pub messages: u64,
    pub trajectory: VecDeque<TrajectoryPoint>,
}

impl AircraftState {
    pub fn new(icao: IcaoAddress) -> Self {
        Self {
            icao,
            last_timestamp_ns: 0,
            category: None,
            callsign: None,
            position: None,
            altitude_m: None,
            altitude_source: None,
            velocity_mps: None,
            track_or_heading: None,
            velocity_kind: None,
            vertical_rate_mps: None,
            messages: 0,
            trajectory: VecDeque::new(),
        }
    }

    pub fn has_position(&self) -> bool {
        self.position.is_some()
    }
}

/// Per-aircraft message accumulator
#[derive(Debug, Clone)]
pub struct AircraftStateAccumulator {
    state: AircraftState,
    /// Latest position message per parity
    pending: [Option<AirbornePositionMessage>; 2],
    max_trajectory: usize,
}

impl AircraftStateAccumulator {
    pub fn new(icao: IcaoAddress, max_trajectory: usize) -> Self {
        Self {
            state: AircraftState::new(icao),
            pending: [None, None],
            max_trajectory,
        }
    }

    pub fn state(&self) -> &AircraftState {
        &self.state
    }

    pub fn update(&mut self, message: &Message) {
        self.update_with(message, |_| {});
    }

    /// Apply one message, reporting every field that changed
    pub fn update_with<F: FnMut(StateChange)>(&mut self, message: &Message, mut on_change: F) {
        debug_assert_eq!(message.icao(), self.state.icao);

        self.state.messages += 1;
        let timestamp_ns = message.timestamp_ns();
        if timestamp_ns > self.state.last_timestamp_ns {
            self.state.last_timestamp_ns = timestamp_ns;
            on_change(StateChange::LastTimestamp(timestamp_ns));
        }

        match message {
            Message::Identification(m) => self.apply_identification(m, &mut on_change),
            Message::Position(m) => self.apply_position(m, &mut on_change),
            Message::Velocity(m) => self.apply_velocity(m, &mut on_change),
        }
    }

    fn apply_identification<F: FnMut(StateChange)>(&mut self, m: &IdentificationMessage, on_change: &mut F) {
        if self.state.category != Some(m.category) {
            self.state.category = Some(m.category);
            on_change(StateChange::Category(m.category));
        }
        if self.state.callsign.as_deref() != Some(m.callsign.as_str()) {
            self.state.callsign = Some(m.callsign.clone());
            on_change(StateChange::Callsign(m.callsign.clone()));
        }
    }

    fn apply_position<F: FnMut(StateChange)>(&mut self, m: &AirbornePositionMessage, on_change: &mut F) {
        let altitude = m.has_altitude().then_some(m.altitude_m);
        if self.state.altitude_m != altitude {
            self.state.altitude_m = altitude;
            on_change(StateChange::Altitude(altitude));
        }
        self.state.altitude_source = Some(m.altitude_source);

        let parity = m.parity;
        self.pending[parity.index()] = Some(m.clone());

        let Some(other) = &self.pending[parity.opposite().index()] else {
            return;
        };
        if m.timestamp_ns.abs_diff(other.timestamp_ns) > PAIRING_WINDOW_NS {
            return;
        }

        let (even, odd) = match parity {
            Parity::Even => (m, other),
            Parity::Odd => (other, m),
        };
        let (most_recent, fix_time) = if m.timestamp_ns >= other.timestamp_ns {
            (parity, m.timestamp_ns)
        } else {
            (other.parity, other.timestamp_ns)
        };

        let Some(position) = cpr::decode_global(even.x, even.y, odd.x, odd.y, most_recent) else {
            return;
        };

        if self.state.position != Some(position) {
            self.state.position = Some(position);
            on_change(StateChange::Position(position));
        }
        self.push_trajectory(TrajectoryPoint {
            timestamp_ns: fix_time,
            position,
            altitude_m: self.state.altitude_m,
        });
    }

    fn apply_velocity<F: FnMut(StateChange)>(&mut self, m: &AirborneVelocityMessage, on_change: &mut F) {
        self.state.velocity_kind = Some(m.kind);
        if self.state.velocity_mps != Some(m.speed_mps) {
            self.state.velocity_mps = Some(m.speed_mps);
            on_change(StateChange::Velocity(m.speed_mps));
        }
        if self.state.track_or_heading != Some(m.track_or_heading) {
            self.state.track_or_heading = Some(m.track_or_heading);
            on_change(StateChange::TrackOrHeading(m.track_or_heading));
        }
        if let Some(rate) = m.vertical_rate_mps {
            if self.state.vertical_rate_mps != Some(rate) {
                self.state.vertical_rate_mps = Some(rate);
                on_change(StateChange::VerticalRate(rate));
            }
        }
    }

    fn push_trajectory(&mut self, point: TrajectoryPoint) {
        if self.max_trajectory == 0 {
            return;
        }
        let trajectory = &mut self.state.trajectory;
        if trajectory.back().is_some_and(|last| last.timestamp_ns == point.timestamp_ns) {
            trajectory.pop_back();
        }
        trajectory.push_back(point);
        while trajectory.len() > self.max_trajectory {
            trajectory.pop_front();
        }
    }
}

/// An accumulator together with its registration record
#[derive(Debug)]
pub struct TrackedAircraft {
    pub accumulator: AircraftStateAccumulator,
    pub registration: AircraftData,
    last_position_log_ns: Option<u64>,
}

impl TrackedAircraft {
    pub fn state(&self) -> &AircraftState {
        self.accumulator.state()
    }
}

/// Result of feeding one message to the tracker
#[derive(Debug)]
pub struct TrackerUpdate<'a> {
    pub aircraft: &'a TrackedAircraft,
    pub changes: Vec<StateChange>,
    /// First message from this address
    pub is_new: bool,
}

impl TrackerUpdate<'_> {
    pub fn is_significant(&self) -> bool {
        self.changes.iter().any(StateChange::is_significant)
    }
}

/// Aircraft tracker - manages state for all tracked aircraft
pub struct AircraftTracker {
    aircraft: HashMap<IcaoAddress, TrackedAircraft>,
    database: Box<dyn AircraftDatabase>,
    purge_timeout_ns: u64,
    max_trajectory: usize,
    /// Newest message timestamp across all aircraft
    max_timestamp_ns: u64,
    total_messages: u64,
}

impl AircraftTracker {
    pub fn new(database: Box<dyn AircraftDatabase>, purge_timeout_ns: u64, max_trajectory: usize) -> Self {
        Self {
            aircraft: HashMap::new(),
            database,
            purge_timeout_ns,
            max_trajectory,
            max_timestamp_ns: 0,
            total_messages: 0,
        }
    }

    /// Update aircraft state with a decoded message
    pub fn update(&mut self, message: &Message) -> TrackerUpdate<'_> {
        let icao = message.icao();
        self.total_messages += 1;
        self.max_timestamp_ns = self.max_timestamp_ns.max(message.timestamp_ns());

        let is_new = !self.aircraft.contains_key(&icao);
        let max_trajectory = self.max_trajectory;
        let database = &self.database;
        let tracked = self.aircraft.entry(icao).or_insert_with(|| {
            let registration = database.get(icao);
            debug!(
                "New aircraft tracked: {} {}",
                icao,
                if registration.registration.is_empty() { "-" } else { registration.registration.as_str() }
            );
            TrackedAircraft {
                accumulator: AircraftStateAccumulator::new(icao, max_trajectory),
                registration,
                last_position_log_ns: None,
            }
        });

        let mut changes = Vec::new();
        tracked.accumulator.update_with(message, |change| changes.push(change));

        let timestamp_ns = message.timestamp_ns();
        let new_fix = changes.iter().any(|c| matches!(c, StateChange::Position(_)));
        let log_due = tracked
            .last_position_log_ns
            .map_or(true, |last| timestamp_ns.saturating_sub(last) >= POSITION_LOG_INTERVAL_NS);
        if new_fix && log_due {
            tracked.last_position_log_ns = Some(timestamp_ns);
            log_position(tracked);
        }

        TrackerUpdate {
            aircraft: tracked,
            changes,
            is_new,
        }
    }

    pub fn get(&self, icao: IcaoAddress) -> Option<&TrackedAircraft> {
        self.aircraft.get(&icao)
    }

    pub fn aircraft(&self) -> impl Iterator<Item = &TrackedAircraft> {
        self.aircraft.values()
    }

    pub fn count(&self) -> usize {
        self.aircraft.len()
    }

    pub fn count_with_positions(&self) -> usize {
        self.aircraft.values().filter(|a| a.state().has_position()).count()
    }

    pub fn max_timestamp_ns(&self) -> u64 {
        self.max_timestamp_ns
    }

    /// Drop aircraft silent for longer than the purge timeout, measured
    /// against the newest message seen. Returns how many were removed.
    pub fn purge(&mut self) -> usize {
        let newest = self.max_timestamp_ns;
        let timeout = self.purge_timeout_ns;
        let before = self.aircraft.len();
        self.aircraft.retain(|icao, tracked| {
            let keep = newest.saturating_sub(tracked.state().last_timestamp_ns) <= timeout;
            if !keep {
                debug!("Purged aircraft {} after {} messages", icao, tracked.state().messages);
            }
            keep
        });
        let removed = before - self.aircraft.len();
        if removed > 0 {
            debug!("Purged {} stale aircraft, {} remaining", removed, self.aircraft.len());
        }
        removed
    }

    /// Get summary statistics
    pub fn stats_summary(&self) -> TrackerStats {
        TrackerStats {
            total_aircraft: self.aircraft.len(),
            with_position: self.count_with_positions(),
            with_callsign: self.aircraft.values().filter(|a| a.state().callsign.is_some()).count(),
            total_messages: self.total_messages,
        }
    }
}

fn log_position(tracked: &TrackedAircraft) {
    let state = tracked.state();
    let Some(position) = state.position else {
        return;
    };
    info!(
        "Aircraft {} {} at ({:.4}, {:.4}) alt={} spd={} | msgs={}",
        state.icao,
        state.callsign.as_deref().unwrap_or("-"),
        position.latitude_deg(),
        position.longitude_deg(),
        state.altitude_m.map_or("-".to_string(), |m| format!("{:.0}ft", meters_to_feet(m))),
        state.velocity_mps.map_or("-".to_string(), |v| format!("{:.0}kt", mps_to_knots(v))),
        state.messages
    );
}

/// Tracker statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerStats {
    pub total_aircraft: usize,
    pub with_position: usize,
    pub with_callsign: usize,
    pub total_messages: u64,
}

impl fmt::Display for TrackerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Aircraft: {} total, {} with position, {} with callsign, {} msgs",
            self.total_aircraft, self.with_position, self.with_callsign, self.total_messages
        )
    }
}
