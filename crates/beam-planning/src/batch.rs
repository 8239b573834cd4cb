//! Batch runs over a directory of scenario files

use crate::assignment::plan;
use crate::config::PlannerConfig;
use crate::evaluate::{evaluate, Solution};
use crate::loader::load_scenario;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

const SCENARIO_EXTENSION: &str = "txt";

/// Result of planning and validating one scenario file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub path: PathBuf,
    pub users: usize,
    pub satellites: usize,
    pub interferers: usize,
    pub assignments: usize,
    pub coverage_pct: f64,
    pub valid: bool,
    pub elapsed_ms: f64,
    /// Set when the scenario could not be loaded or planned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchOutcome {
    fn failed(path: PathBuf, error: String, elapsed_ms: f64) -> Self {
        Self {
            path,
            users: 0,
            satellites: 0,
            interferers: 0,
            assignments: 0,
            coverage_pct: 0.0,
            valid: false,
            elapsed_ms,
            error: Some(error),
        }
    }

    pub fn passed(&self) -> bool {
        self.valid && self.error.is_none()
    }
}

/// Scenario files in `dir`, sorted by path
pub fn scenario_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir.as_ref())? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == SCENARIO_EXTENSION) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Plan and validate a single scenario file
pub fn run_scenario(path: &Path, config: &PlannerConfig) -> BatchOutcome {
    let start = Instant::now();
    let elapsed_ms = |start: Instant| start.elapsed().as_secs_f64() * 1000.0;

    let scenario = match load_scenario(path) {
        Ok(s) => s,
        Err(e) => return BatchOutcome::failed(path.to_path_buf(), e.to_string(), elapsed_ms(start)),
    };

    let mut events = Vec::new();
    if let Err(e) = plan(&scenario, config, &mut events) {
        return BatchOutcome::failed(path.to_path_buf(), e.to_string(), elapsed_ms(start));
    }
    let assignments = events.len();
    let evaluation = evaluate(&scenario, &Solution::from(events), config);

    BatchOutcome {
        path: path.to_path_buf(),
        users: scenario.users.len(),
        satellites: scenario.satellites.len(),
        interferers: scenario.interferers.len(),
        assignments,
        coverage_pct: evaluation.coverage_pct(),
        valid: evaluation.is_valid(),
        elapsed_ms: elapsed_ms(start),
        error: None,
    }
}

/// Plan and validate every scenario in `dir`
pub fn run_batch(dir: impl AsRef<Path>, config: &PlannerConfig) -> Result<Vec<BatchOutcome>> {
    config.validate()?;

    let files = scenario_files(&dir)?;
    info!("Running {} scenarios from {:?}", files.len(), dir.as_ref());

    let outcomes: Vec<BatchOutcome> = files
        .iter()
        .map(|path| {
            info!("testing {:?}", path);
            let outcome = run_scenario(path, config);
            match &outcome.error {
                Some(e) => warn!("  {}", e),
                None => info!(
                    "  {:.2}% of {} users covered, valid={}, {:.3} ms",
                    outcome.coverage_pct, outcome.users, outcome.valid, outcome.elapsed_ms
                ),
            }
            outcome
        })
        .collect();

    let passed = outcomes.iter().filter(|o| o.passed()).count();
    info!("{}/{} scenarios passed", passed, outcomes.len());

    Ok(outcomes)
}
