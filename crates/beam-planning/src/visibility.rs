//! Per-user satellite visibility
//!
//! A satellite is usable by a user when it sits inside the user's zenith
//! cone and no non-Starlink satellite appears too close to it from the
//! user's point of view. Users are independent, so lists are built in
//! parallel.

use crate::config::PlannerConfig;
use crate::geometry::{angle_deg, Position, ORIGIN};
use crate::scenario::{SatelliteId, Scenario, UserId};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Satellites a user may connect to, ascending by id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityEntry {
    pub user: UserId,
    pub satellites: Vec<SatelliteId>,
}

/// Elevation test: the origin-user-satellite angle must exceed `180 - max_visible`.
pub fn is_visible(user: &Position, satellite: &Position, config: &PlannerConfig) -> bool {
    angle_deg(user, &ORIGIN, satellite) > config.visibility_threshold_deg()
}

/// True if any interferer lies within the minimum separation of `satellite`, seen from `user`.
pub fn interferer_blocks(
    user: &Position,
    satellite: &Position,
    interferers: &[Position],
    config: &PlannerConfig,
) -> bool {
    interferers
        .iter()
        .any(|interferer| angle_deg(user, interferer, satellite) < config.interferer_separation_min_deg)
}

/// Whether `satellite` may serve `user` at all
pub fn can_serve(
    user: &Position,
    satellite: &Position,
    interferers: &[Position],
    config: &PlannerConfig,
) -> bool {
    is_visible(user, satellite, config) && !interferer_blocks(user, satellite, interferers, config)
}

/// Usable satellites for one user, in ascending id order
pub fn visible_satellites(scenario: &Scenario, user: UserId, config: &PlannerConfig) -> Vec<SatelliteId> {
    let user_pos = scenario.user(user);
    scenario
        .satellite_ids()
        .filter(|&sat| can_serve(user_pos, scenario.satellite(sat), &scenario.interferers, config))
        .collect()
}

/// Visibility list of every user, in user order
pub fn build_visibility(scenario: &Scenario, config: &PlannerConfig) -> Vec<VisibilityEntry> {
    let entries: Vec<VisibilityEntry> = (0..scenario.users.len())
        .into_par_iter()
        .map(|i| {
            let user = UserId(i);
            VisibilityEntry {
                user,
                satellites: visible_satellites(scenario, user, config),
            }
        })
        .collect();

    let unreachable = entries.iter().filter(|e| e.satellites.is_empty()).count();
    let links: usize = entries.iter().map(|e| e.satellites.len()).sum();
    info!(
        "Visibility built for {} users: {} candidate links, {} users see no satellite",
        entries.len(),
        links,
        unreachable
    );
    debug!(
        "Checked {} user/satellite pairs against {} interferers",
        scenario.users.len() * scenario.satellites.len(),
        scenario.interferers.len()
    );

    entries
}

/// Order users by ascending number of usable satellites.
///
/// The sort is stable and `entries` arrive in user order, so ties keep
/// ascending user id.
pub fn sort_by_scarcity(entries: &mut [VisibilityEntry]) {
    entries.sort_by_key(|e| e.satellites.len());
}
