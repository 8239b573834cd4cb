//! Beam Planning Library
//!
//! Assigns each ground user at most one (satellite, color) beam, subject to
//! geometric visibility, non-Starlink interference and per-satellite capacity.
//! One-shot offline planner: positions are static and the pass is greedy.
//!
//! # Pipeline
//!
//! ```text
//! Scenario ─▶ build_visibility (per user, parallel) ─▶ scarcity sort ─▶ assign_beams ─▶ AssignmentEvent*
//! ```
//!
//! # Constraints
//!
//! | Constraint | Default | Measured at |
//! |------------|---------|-------------|
//! | Max angle from user zenith | 45° | user |
//! | Min separation from a non-Starlink satellite | 20° | user |
//! | Min separation between same-color beams | 10° | satellite |
//! | Beams per satellite | 32 | shared by all 4 colors |

use std::path::PathBuf;
use thiserror::Error;

pub mod assignment;
pub mod batch;
pub mod beam_state;
pub mod config;
pub mod evaluate;
pub mod geometry;
pub mod loader;
pub mod render;
pub mod scenario;
pub mod visibility;

pub use assignment::{assign_beams, plan, AssignmentEvent, AssignmentSink, AssignmentSummary};
pub use beam_state::{BeamState, Color};
pub use config::PlannerConfig;
pub use geometry::{angle_deg, Position, ORIGIN};
pub use scenario::{SatelliteId, Scenario, UserId};
pub use visibility::{build_visibility, VisibilityEntry};

/// Beams a single satellite can form across all colors
pub const BEAMS_PER_SATELLITE: usize = 32;

/// Distinct channel colors available on every satellite
pub const COLORS_PER_SATELLITE: usize = 4;

/// Max user-to-satellite angle, degrees from the user's vertical
pub const MAX_USER_VISIBLE_ANGLE_DEG: f64 = 45.0;

/// A satellite closer than this (seen from the user) to a non-Starlink satellite is unusable
pub const NON_STARLINK_INTERFERENCE_MAX_DEG: f64 = 20.0;

/// Same-color beams from one satellite must be at least this far apart
pub const SELF_INTERFERENCE_MAX_DEG: f64 = 10.0;

#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("File '{}' does not exist", .0.display())]
    ScenarioNotFound(PathBuf),
    #[error("Couldn't read line {line}: {reason}: {content:?}")]
    MalformedLine {
        line: usize,
        content: String,
        reason: String,
    },
    #[error("Invalid solution line {line}: {reason}: {content:?}")]
    MalformedSolution {
        line: usize,
        content: String,
        reason: String,
    },
    #[error("Invalid planner config: {0}")]
    InvalidConfig(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PlannerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_count_matches_constant() {
        assert_eq!(Color::ALL.len(), COLORS_PER_SATELLITE);
    }

    #[test]
    fn test_not_found_message() {
        let err = PlannerError::ScenarioNotFound(PathBuf::from("missing.txt"));
        assert_eq!(err.to_string(), "File 'missing.txt' does not exist");
    }
}
