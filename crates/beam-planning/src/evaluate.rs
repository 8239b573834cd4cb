//! Solution validation and coverage metrics
//!
//! Reads assignment lines back (from the planner or any other source) and
//! checks them against the scenario: beam separation per color, interferer
//! separation, user visibility, and single coverage per user.

use crate::assignment::AssignmentEvent;
use crate::beam_state::Color;
use crate::config::PlannerConfig;
use crate::geometry::{angle_deg, Position, ORIGIN};
use crate::scenario::{SatelliteId, Scenario, UserId};
use crate::visibility::is_visible;
use crate::{PlannerError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::io::Read;
use tracing::{info, warn};

/// Parsed assignment lines, in file order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub assignments: Vec<AssignmentEvent>,
}

impl From<Vec<AssignmentEvent>> for Solution {
    fn from(assignments: Vec<AssignmentEvent>) -> Self {
        Self { assignments }
    }
}

fn invalid(line: usize, content: &str, reason: impl Into<String>) -> PlannerError {
    PlannerError::MalformedSolution {
        line,
        content: content.to_string(),
        reason: reason.into(),
    }
}

/// Parse a 1-based id and check it against `count`
fn parse_id(token: &str, count: usize, what: &str, line: usize, content: &str) -> Result<usize> {
    match token.parse::<usize>() {
        Ok(id) if (1..=count).contains(&id) => Ok(id - 1),
        _ => Err(invalid(line, content, format!("referenced an invalid {} id '{}'", what, token))),
    }
}

/// Parse `sat <id> beam <n> user <id> color <c>` lines.
///
/// Blank lines and `#` comments are skipped. Ids must exist in `scenario`,
/// beam numbers must lie within the configured capacity and may not repeat
/// on a satellite.
pub fn parse_solution(text: &str, scenario: &Scenario, config: &PlannerConfig) -> Result<Solution> {
    let mut assignments = Vec::new();
    let mut used_beams: HashSet<(SatelliteId, usize)> = HashSet::new();

    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let content = raw.trim();
        if content.is_empty() || content.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = content.split_whitespace().collect();
        if parts.len() != 8 {
            return Err(invalid(line, content, format!("expected 8 tokens, found {}", parts.len())));
        }
        if parts[0] != "sat" || parts[2] != "beam" || parts[4] != "user" || parts[6] != "color" {
            return Err(invalid(line, content, "missing sat/beam/user/color keyword"));
        }

        let satellite = SatelliteId(parse_id(parts[1], scenario.satellites.len(), "sat", line, content)?);
        let beam = parse_id(parts[3], config.beams_per_satellite, "beam", line, content)? + 1;
        let user = UserId(parse_id(parts[5], scenario.users.len(), "user", line, content)?);
        let color: Color = parts[7]
            .parse()
            .map_err(|reason: String| invalid(line, content, reason))?;

        if !used_beams.insert((satellite, beam)) {
            return Err(invalid(line, content, "beam is allocated multiple times"));
        }

        assignments.push(AssignmentEvent {
            satellite,
            beam,
            user,
            color,
        });
    }

    info!("Read {} assignments", assignments.len());
    Ok(Solution { assignments })
}

/// Parse a solution from any reader (a file or stdin)
pub fn read_solution(mut reader: impl Read, scenario: &Scenario, config: &PlannerConfig) -> Result<Solution> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    parse_solution(&text, scenario, config)
}

/// A constraint broken by a solution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Violation {
    SelfInterference {
        satellite: SatelliteId,
        beams: (usize, usize),
        angle_deg: f64,
    },
    Interferer {
        satellite: SatelliteId,
        beam: usize,
        /// 0-based interferer index
        interferer: usize,
        angle_deg: f64,
    },
    NotVisible {
        satellite: SatelliteId,
        beam: usize,
        user: UserId,
        elevation_deg: f64,
    },
    MultipleCoverage {
        user: UserId,
        satellite: SatelliteId,
        beam: usize,
    },
    /// Satellite or user id not present in the scenario
    UnknownReference {
        satellite: SatelliteId,
        beam: usize,
        user: UserId,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::SelfInterference {
                satellite,
                beams,
                angle_deg,
            } => write!(
                f,
                "Sat {} beams {} and {} interfere ({:.3} degrees apart)",
                satellite, beams.0, beams.1, angle_deg
            ),
            Violation::Interferer {
                satellite,
                beam,
                interferer,
                angle_deg,
            } => write!(
                f,
                "Sat {} beam {} interferes with non-Starlink sat {} ({:.3} degrees apart)",
                satellite,
                beam,
                interferer + 1,
                angle_deg
            ),
            Violation::NotVisible {
                satellite,
                beam,
                user,
                elevation_deg,
            } => write!(
                f,
                "Sat {} beam {} outside of user {}'s field of view ({:.3} degrees elevation)",
                satellite, beam, user, elevation_deg
            ),
            Violation::MultipleCoverage {
                user,
                satellite,
                beam,
            } => write!(
                f,
                "User {} is covered multiple times (again by sat {} beam {})",
                user, satellite, beam
            ),
            Violation::UnknownReference {
                satellite,
                beam,
                user,
            } => write!(
                f,
                "Sat {} beam {} user {} is not in the scenario",
                satellite, beam, user
            ),
        }
    }
}

/// Result of validating a solution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub violations: Vec<Violation>,
    pub covered_users: usize,
    pub total_users: usize,
}

impl Evaluation {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Covered users as a percentage of all users
    pub fn coverage_pct(&self) -> f64 {
        if self.total_users == 0 {
            0.0
        } else {
            self.covered_users as f64 / self.total_users as f64 * 100.0
        }
    }
}

/// Assignment with both ends resolved against the scenario
struct Resolved<'a> {
    event: &'a AssignmentEvent,
    satellite: &'a Position,
    user: &'a Position,
}

/// Resolve every assignment, reporting those that reference missing ids
fn check_references<'a>(
    scenario: &'a Scenario,
    solution: &'a Solution,
    violations: &mut Vec<Violation>,
) -> Vec<Resolved<'a>> {
    let mut resolved = Vec::with_capacity(solution.assignments.len());
    for a in &solution.assignments {
        match (scenario.get_satellite(a.satellite), scenario.get_user(a.user)) {
            (Some(satellite), Some(user)) => resolved.push(Resolved {
                event: a,
                satellite,
                user,
            }),
            _ => violations.push(Violation::UnknownReference {
                satellite: a.satellite,
                beam: a.beam,
                user: a.user,
            }),
        }
    }
    resolved
}

fn check_self_interference(
    assignments: &[Resolved<'_>],
    config: &PlannerConfig,
    violations: &mut Vec<Violation>,
) {
    let mut by_slot: BTreeMap<(SatelliteId, Color), Vec<&Resolved<'_>>> = BTreeMap::new();
    for r in assignments {
        by_slot.entry((r.event.satellite, r.event.color)).or_default().push(r);
    }

    for ((sat, _), beams) in &by_slot {
        for (i, a) in beams.iter().enumerate() {
            for b in &beams[i + 1..] {
                let angle = angle_deg(a.satellite, a.user, b.user);
                if angle < config.self_interference_min_deg {
                    violations.push(Violation::SelfInterference {
                        satellite: *sat,
                        beams: (a.event.beam, b.event.beam),
                        angle_deg: angle,
                    });
                }
            }
        }
    }
}

fn check_interferers(
    scenario: &Scenario,
    assignments: &[Resolved<'_>],
    config: &PlannerConfig,
    violations: &mut Vec<Violation>,
) {
    for r in assignments {
        for (idx, interferer) in scenario.interferers.iter().enumerate() {
            let angle = angle_deg(r.user, r.satellite, interferer);
            if angle < config.interferer_separation_min_deg {
                violations.push(Violation::Interferer {
                    satellite: r.event.satellite,
                    beam: r.event.beam,
                    interferer: idx,
                    angle_deg: angle,
                });
            }
        }
    }
}

fn check_visibility(
    assignments: &[Resolved<'_>],
    config: &PlannerConfig,
    violations: &mut Vec<Violation>,
) {
    for r in assignments {
        if !is_visible(r.user, r.satellite, config) {
            // Origin-user-sat angle to elevation above the horizon
            let elevation = angle_deg(r.user, &ORIGIN, r.satellite) - 90.0;
            violations.push(Violation::NotVisible {
                satellite: r.event.satellite,
                beam: r.event.beam,
                user: r.event.user,
                elevation_deg: elevation,
            });
        }
    }
}

fn check_coverage(assignments: &[Resolved<'_>], violations: &mut Vec<Violation>) -> usize {
    let mut covered: HashMap<UserId, usize> = HashMap::new();
    for r in assignments {
        let a = r.event;
        let count = covered.entry(a.user).or_insert(0);
        *count += 1;
        if *count > 1 {
            violations.push(Violation::MultipleCoverage {
                user: a.user,
                satellite: a.satellite,
                beam: a.beam,
            });
        }
    }
    covered.len()
}

/// Check every constraint and report coverage.
///
/// Assignments naming a satellite or user missing from `scenario` are
/// reported as [`Violation::UnknownReference`] and excluded from the other
/// checks and from coverage.
pub fn evaluate(scenario: &Scenario, solution: &Solution, config: &PlannerConfig) -> Evaluation {
    let mut violations = Vec::new();

    let resolved = check_references(scenario, solution, &mut violations);
    check_self_interference(&resolved, config, &mut violations);
    check_interferers(scenario, &resolved, config, &mut violations);
    check_visibility(&resolved, config, &mut violations);
    let covered_users = check_coverage(&resolved, &mut violations);

    for v in &violations {
        warn!("{}", v);
    }

    let evaluation = Evaluation {
        violations,
        covered_users,
        total_users: scenario.users.len(),
    };

    info!(
        "{:.2}% of {} total users covered, {} violations",
        evaluation.coverage_pct(),
        evaluation.total_users,
        evaluation.violations.len()
    );

    evaluation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::plan;

    const EARTH_KM: f64 = 6371.0;
    const ORBIT_KM: f64 = 6921.0;

    fn at(radius: f64, deg: f64) -> Position {
        let r = deg.to_radians();
        Position::new(radius * r.sin(), 0.0, radius * r.cos())
    }

    fn scenario() -> Scenario {
        Scenario {
            users: vec![at(EARTH_KM, 0.0), at(EARTH_KM, 0.1), at(EARTH_KM, -60.0)],
            satellites: vec![at(ORBIT_KM, 0.0)],
            interferers: vec![],
        }
    }

    #[test]
    fn test_parse_solution() {
        let text = "# header\nsat 1 beam 1 user 1 color A\n\nsat 1 beam 2 user 2 color B\n";
        let solution = parse_solution(text, &scenario(), &PlannerConfig::default()).unwrap();

        assert_eq!(solution.assignments.len(), 2);
        assert_eq!(solution.assignments[1].user, UserId(1));
        assert_eq!(solution.assignments[1].beam, 2);
        assert_eq!(solution.assignments[1].color, Color::B);
    }

    #[test]
    fn test_parse_rejects_bad_references() {
        let config = PlannerConfig::default();
        let s = scenario();
        for text in [
            "sat 2 beam 1 user 1 color A",
            "sat 1 beam 33 user 1 color A",
            "sat 1 beam 1 user 9 color A",
            "sat 1 beam 1 user 1 color E",
            "sat 1 beam 1 user 1 colour A",
            "sat 1 beam 1 user 1",
            "sat 1 beam 1 user 1 color A\nsat 1 beam 1 user 2 color B",
        ] {
            assert!(
                matches!(
                    parse_solution(text, &s, &config),
                    Err(PlannerError::MalformedSolution { .. })
                ),
                "accepted {:?}",
                text
            );
        }
    }

    #[test]
    fn test_planner_output_is_valid() {
        let s = scenario();
        let config = PlannerConfig::default();
        let mut events = Vec::new();
        plan(&s, &config, &mut events).unwrap();

        let evaluation = evaluate(&s, &Solution::from(events), &config);
        assert!(evaluation.is_valid());
        assert_eq!(evaluation.covered_users, 2);
        assert!((evaluation.coverage_pct() - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_detects_self_interference() {
        let text = "sat 1 beam 1 user 1 color A\nsat 1 beam 2 user 2 color A\n";
        let s = scenario();
        let config = PlannerConfig::default();
        let solution = parse_solution(text, &s, &config).unwrap();
        let evaluation = evaluate(&s, &solution, &config);

        assert_eq!(evaluation.violations.len(), 1);
        assert!(matches!(
            evaluation.violations[0],
            Violation::SelfInterference { beams: (1, 2), .. }
        ));
    }

    #[test]
    fn test_detects_invisible_and_double_coverage() {
        let text = "sat 1 beam 1 user 3 color A\nsat 1 beam 2 user 1 color B\nsat 1 beam 3 user 1 color C\n";
        let s = scenario();
        let config = PlannerConfig::default();
        let solution = parse_solution(text, &s, &config).unwrap();
        let evaluation = evaluate(&s, &solution, &config);

        assert!(!evaluation.is_valid());
        assert!(evaluation
            .violations
            .iter()
            .any(|v| matches!(v, Violation::NotVisible { user: UserId(2), .. })));
        assert!(evaluation
            .violations
            .iter()
            .any(|v| matches!(v, Violation::MultipleCoverage { user: UserId(0), beam: 3, .. })));
    }

    #[test]
    fn test_detects_interferer() {
        let mut s = scenario();
        s.interferers.push(at(ORBIT_KM + 1000.0, 0.5));
        let config = PlannerConfig::default();
        let solution = parse_solution("sat 1 beam 1 user 1 color A\n", &s, &config).unwrap();
        let evaluation = evaluate(&s, &solution, &config);

        assert_eq!(evaluation.violations.len(), 1);
        assert!(matches!(
            evaluation.violations[0],
            Violation::Interferer { interferer: 0, .. }
        ));
    }

    #[test]
    fn test_unknown_ids_reported_not_panicking() {
        let s = scenario();
        let config = PlannerConfig::default();
        let solution = Solution::from(vec![
            AssignmentEvent { satellite: SatelliteId(0), beam: 1, user: UserId(0), color: Color::A },
            AssignmentEvent { satellite: SatelliteId(5), beam: 1, user: UserId(1), color: Color::A },
            AssignmentEvent { satellite: SatelliteId(0), beam: 2, user: UserId(9), color: Color::B },
        ]);
        let evaluation = evaluate(&s, &solution, &config);

        assert_eq!(evaluation.violations.len(), 2);
        assert!(evaluation
            .violations
            .iter()
            .all(|v| matches!(v, Violation::UnknownReference { .. })));
        assert_eq!(evaluation.covered_users, 1);
        assert_eq!(
            evaluation.violations[1].to_string(),
            "Sat 1 beam 2 user 10 is not in the scenario"
        );
    }

    #[test]
    fn test_empty_scenario_coverage() {
        let evaluation = evaluate(&Scenario::default(), &Solution::default(), &PlannerConfig::default());
        assert!(evaluation.is_valid());
        assert_eq!(evaluation.coverage_pct(), 0.0);
    }
}
