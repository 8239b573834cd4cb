//! Greedy beam assignment
//!
//! Users with the fewest usable satellites go first. Each user walks its
//! satellites in ascending id order and takes the first color that does not
//! self-interfere; there is no backtracking.

use crate::beam_state::{BeamState, Color};
use crate::config::PlannerConfig;
use crate::scenario::{SatelliteId, Scenario, UserId};
use crate::visibility::{build_visibility, sort_by_scarcity, VisibilityEntry};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// One committed beam
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentEvent {
    pub satellite: SatelliteId,
    /// Running beam count on the satellite after this commit (1-based)
    pub beam: usize,
    pub user: UserId,
    pub color: Color,
}

impl fmt::Display for AssignmentEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sat {} beam {} user {} color {}",
            self.satellite, self.beam, self.user, self.color
        )
    }
}

/// Receives assignment events in engine order
pub trait AssignmentSink {
    fn emit(&mut self, event: AssignmentEvent) -> Result<()>;
}

impl AssignmentSink for Vec<AssignmentEvent> {
    fn emit(&mut self, event: AssignmentEvent) -> Result<()> {
        self.push(event);
        Ok(())
    }
}

/// Outcome counts of one assignment pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentSummary {
    pub users: usize,
    pub served: usize,
    pub unassigned: usize,
    pub satellites: usize,
    pub saturated_satellites: usize,
}

impl AssignmentSummary {
    /// Share of users served, in percent
    pub fn coverage_pct(&self) -> f64 {
        if self.users == 0 {
            0.0
        } else {
            self.served as f64 / self.users as f64 * 100.0
        }
    }
}

/// First (satellite, color) the user can take, or `None`
fn find_slot(
    scenario: &Scenario,
    state: &BeamState,
    entry: &VisibilityEntry,
) -> Option<(SatelliteId, Color)> {
    let user_pos = scenario.user(entry.user);

    entry
        .satellites
        .iter()
        .filter(|&&sat| state.capacity_remaining(sat))
        .find_map(|&sat| {
            Color::ALL
                .into_iter()
                .find(|&color| !state.conflicts(sat, color, user_pos))
                .map(|color| (sat, color))
        })
}

/// Assign beams to users in the order of `visibility`.
///
/// `visibility` is consumed as given; callers sort it first. Each commit is
/// emitted to `sink` before the next user is considered.
pub fn assign_beams(
    scenario: &Scenario,
    visibility: &[VisibilityEntry],
    state: &mut BeamState,
    sink: &mut impl AssignmentSink,
) -> Result<AssignmentSummary> {
    let mut summary = AssignmentSummary {
        users: visibility.len(),
        satellites: state.len(),
        ..AssignmentSummary::default()
    };

    for entry in visibility {
        match find_slot(scenario, state, entry) {
            Some((satellite, color)) => {
                let beam = state.commit(satellite, color, *scenario.user(entry.user));
                let event = AssignmentEvent {
                    satellite,
                    beam,
                    user: entry.user,
                    color,
                };
                debug!("{}", event);
                sink.emit(event)?;
                summary.served += 1;
            }
            None => {
                debug!(
                    "user {} left unassigned ({} usable satellites)",
                    entry.user,
                    entry.satellites.len()
                );
                summary.unassigned += 1;
            }
        }
    }

    summary.saturated_satellites = state
        .iter()
        .filter(|(sat, _)| !state.capacity_remaining(*sat))
        .count();

    info!(
        "Assigned {}/{} users ({:.2}%), {} of {} satellites at capacity",
        summary.served,
        summary.users,
        summary.coverage_pct(),
        summary.saturated_satellites,
        summary.satellites
    );

    Ok(summary)
}

/// Full planning pass: visibility, scarcity ordering, greedy assignment.
pub fn plan(
    scenario: &Scenario,
    config: &PlannerConfig,
    sink: &mut impl AssignmentSink,
) -> Result<AssignmentSummary> {
    config.validate()?;

    let mut visibility = build_visibility(scenario, config);
    sort_by_scarcity(&mut visibility);

    let mut state = BeamState::new(scenario, config);
    assign_beams(scenario, &visibility, &mut state, sink)
}
