//! Fuzz run configuration

use beam_planning::Scenario;
use serde::{Deserialize, Serialize};

/// Fuzz test configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuzzConfig {
    /// Number of test cases to run
    pub cases: u32,
    /// Maximum shrink iterations on failure
    pub max_shrink_iters: u32,
}

impl Default for FuzzConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl FuzzConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cases(mut self, n: u32) -> Self {
        self.cases = n;
        self
    }

    /// Generate proptest config from this
    pub fn to_proptest_config(&self) -> proptest::test_runner::Config {
        proptest::test_runner::Config {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..proptest::test_runner::Config::default()
        }
    }
}

/// Failing scenario as JSON, for attaching to a report or bug
pub fn export_case(scenario: &Scenario) -> serde_json::Result<String> {
    serde_json::to_string(scenario)
}

#[cfg(test)]
mod tests {
    use super::*;
    use beam_planning::Position;

    #[test]
    fn test_to_proptest_config() {
        let config = FuzzConfig::new().cases(32).to_proptest_config();
        assert_eq!(config.cases, 32);
        assert_eq!(config.max_shrink_iters, 1000);
    }

    #[test]
    fn test_export_case() {
        let scenario = Scenario {
            users: vec![Position::new(1.0, 2.0, 3.0)],
            ..Scenario::default()
        };
        let json = export_case(&scenario).unwrap();
        let back: Scenario = serde_json::from_str(&json).unwrap();
        assert_eq!(back, scenario);
    }
}
