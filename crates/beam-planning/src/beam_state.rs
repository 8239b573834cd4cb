//! Per-satellite beam bookkeeping
//!
//! Every satellite owns one target list per color plus a single beam counter
//! shared by all colors. The counter always equals the summed list lengths.

use crate::config::PlannerConfig;
use crate::geometry::{angle_deg, Position};
use crate::scenario::{SatelliteId, Scenario};
use crate::COLORS_PER_SATELLITE;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Beam channel. Scan order is declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Color {
    A,
    B,
    C,
    D,
}

impl Color {
    pub const ALL: [Color; COLORS_PER_SATELLITE] = [Color::A, Color::B, Color::C, Color::D];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn letter(self) -> char {
        match self {
            Color::A => 'A',
            Color::B => 'B',
            Color::C => 'C',
            Color::D => 'D',
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "A" => Ok(Color::A),
            "B" => Ok(Color::B),
            "C" => Ok(Color::C),
            "D" => Ok(Color::D),
            other => Err(format!("unknown color '{}'", other)),
        }
    }
}

/// Committed beams of one satellite
#[derive(Debug, Clone)]
pub struct SatelliteBeams {
    position: Position,
    targets: [Vec<Position>; COLORS_PER_SATELLITE],
    committed: usize,
}

impl SatelliteBeams {
    pub fn new(position: Position) -> Self {
        Self {
            position,
            targets: Default::default(),
            committed: 0,
        }
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Beams committed across all colors
    pub fn committed(&self) -> usize {
        self.committed
    }

    /// Targets already served on `color`, in commit order
    pub fn targets(&self, color: Color) -> &[Position] {
        &self.targets[color.index()]
    }

    pub fn capacity_remaining(&self, capacity: usize) -> bool {
        self.committed < capacity
    }

    /// True if a beam to `candidate` on `color` would come within
    /// `min_separation_deg` of an existing same-color beam.
    pub fn conflicts(&self, color: Color, candidate: &Position, min_separation_deg: f64) -> bool {
        self.targets[color.index()]
            .iter()
            .any(|target| angle_deg(&self.position, candidate, target) < min_separation_deg)
    }

    /// Record a beam and return its 1-based number on this satellite.
    ///
    /// Callers check `capacity_remaining` and `conflicts` first.
    pub fn commit(&mut self, color: Color, candidate: Position) -> usize {
        self.targets[color.index()].push(candidate);
        self.committed += 1;
        self.committed
    }
}

/// Beam state of every satellite in a scenario, indexed by [`SatelliteId`]
#[derive(Debug, Clone)]
pub struct BeamState {
    satellites: Vec<SatelliteBeams>,
    capacity: usize,
    min_separation_deg: f64,
}

impl BeamState {
    pub fn new(scenario: &Scenario, config: &PlannerConfig) -> Self {
        Self {
            satellites: scenario
                .satellites
                .iter()
                .copied()
                .map(SatelliteBeams::new)
                .collect(),
            capacity: config.beams_per_satellite,
            min_separation_deg: config.self_interference_min_deg,
        }
    }

    pub fn len(&self) -> usize {
        self.satellites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.satellites.is_empty()
    }

    /// # Panics
    ///
    /// This and the other `SatelliteId` methods panic on an id outside the
    /// scenario the state was built from; see [`BeamState::get`].
    pub fn satellite(&self, sat: SatelliteId) -> &SatelliteBeams {
        &self.satellites[sat.0]
    }

    pub fn get(&self, sat: SatelliteId) -> Option<&SatelliteBeams> {
        self.satellites.get(sat.0)
    }

    pub fn capacity_remaining(&self, sat: SatelliteId) -> bool {
        self.satellites[sat.0].capacity_remaining(self.capacity)
    }

    pub fn conflicts(&self, sat: SatelliteId, color: Color, candidate: &Position) -> bool {
        self.satellites[sat.0].conflicts(color, candidate, self.min_separation_deg)
    }

    pub fn commit(&mut self, sat: SatelliteId, color: Color, candidate: Position) -> usize {
        let beams = &mut self.satellites[sat.0];
        debug_assert!(beams.capacity_remaining(self.capacity));
        beams.commit(color, candidate)
    }

    /// Total beams committed across all satellites
    pub fn total_committed(&self) -> usize {
        self.satellites.iter().map(SatelliteBeams::committed).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SatelliteId, &SatelliteBeams)> {
        self.satellites
            .iter()
            .enumerate()
            .map(|(i, beams)| (SatelliteId(i), beams))
    }
}
