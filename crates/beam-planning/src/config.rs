//! Planner configuration
//!
//! Defaults are the published Starlink beam-planning constraints.

use crate::{
    PlannerError, Result, BEAMS_PER_SATELLITE, MAX_USER_VISIBLE_ANGLE_DEG,
    NON_STARLINK_INTERFERENCE_MAX_DEG, SELF_INTERFERENCE_MAX_DEG,
};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// Constraint thresholds for one planning run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Beams per satellite, shared across all colors
    pub beams_per_satellite: usize,
    /// Max angle (degrees) between a user's vertical and the serving satellite
    pub max_user_visible_angle_deg: f64,
    /// Min angle (degrees, at the user) between serving satellite and any interferer
    pub interferer_separation_min_deg: f64,
    /// Min angle (degrees, at the satellite) between two same-color beams
    pub self_interference_min_deg: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            beams_per_satellite: BEAMS_PER_SATELLITE,
            max_user_visible_angle_deg: MAX_USER_VISIBLE_ANGLE_DEG,
            interferer_separation_min_deg: NON_STARLINK_INTERFERENCE_MAX_DEG,
            self_interference_min_deg: SELF_INTERFERENCE_MAX_DEG,
        }
    }
}

fn check_angle(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && (0.0..=180.0).contains(&value) {
        Ok(())
    } else {
        Err(PlannerError::InvalidConfig(format!(
            "{} must be within [0, 180] degrees, got {}",
            name, value
        )))
    }
}

impl PlannerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn beams_per_satellite(mut self, n: usize) -> Self {
        self.beams_per_satellite = n;
        self
    }

    pub fn max_user_visible_angle_deg(mut self, deg: f64) -> Self {
        self.max_user_visible_angle_deg = deg;
        self
    }

    pub fn interferer_separation_min_deg(mut self, deg: f64) -> Self {
        self.interferer_separation_min_deg = deg;
        self
    }

    pub fn self_interference_min_deg(mut self, deg: f64) -> Self {
        self.self_interference_min_deg = deg;
        self
    }

    /// Smallest origin-user-satellite angle that still counts as not visible.
    ///
    /// A satellite is visible only when the angle strictly exceeds this.
    pub fn visibility_threshold_deg(&self) -> f64 {
        180.0 - self.max_user_visible_angle_deg
    }

    pub fn validate(&self) -> Result<()> {
        if self.beams_per_satellite == 0 {
            return Err(PlannerError::InvalidConfig(
                "beams_per_satellite must be at least 1".to_string(),
            ));
        }
        check_angle("max_user_visible_angle_deg", self.max_user_visible_angle_deg)?;
        check_angle(
            "interferer_separation_min_deg",
            self.interferer_separation_min_deg,
        )?;
        check_angle("self_interference_min_deg", self.self_interference_min_deg)?;
        Ok(())
    }

    /// Read a config from JSON without validating it. Missing fields keep their defaults.
    pub fn read_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading planner config from {:?}", path);

        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Load and validate a config from JSON
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::read_json_file(path)?;
        config.validate()?;
        Ok(config)
    }
}

/// Individually set fields that replace those of a base config
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConfigOverrides {
    pub beams_per_satellite: Option<usize>,
    pub max_user_visible_angle_deg: Option<f64>,
    pub interferer_separation_min_deg: Option<f64>,
    pub self_interference_min_deg: Option<f64>,
}

impl ConfigOverrides {
    pub fn apply(&self, mut config: PlannerConfig) -> PlannerConfig {
        if let Some(n) = self.beams_per_satellite {
            config = config.beams_per_satellite(n);
        }
        if let Some(deg) = self.max_user_visible_angle_deg {
            config = config.max_user_visible_angle_deg(deg);
        }
        if let Some(deg) = self.interferer_separation_min_deg {
            config = config.interferer_separation_min_deg(deg);
        }
        if let Some(deg) = self.self_interference_min_deg {
            config = config.self_interference_min_deg(deg);
        }
        config
    }

    /// Base config from `base` (or the defaults), overridden, then validated once.
    pub fn resolve(&self, base: Option<&Path>) -> Result<PlannerConfig> {
        let base = match base {
            Some(path) => PlannerConfig::read_json_file(path)?,
            None => PlannerConfig::default(),
        };
        let config = self.apply(base);
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = PlannerConfig::default();
        assert_eq!(config.beams_per_satellite, 32);
        assert_eq!(config.visibility_threshold_deg(), 135.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let config = PlannerConfig::new().beams_per_satellite(0);
        assert!(matches!(
            config.validate(),
            Err(PlannerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_out_of_range_angles() {
        assert!(PlannerConfig::new()
            .self_interference_min_deg(-1.0)
            .validate()
            .is_err());
        assert!(PlannerConfig::new()
            .max_user_visible_angle_deg(f64::NAN)
            .validate()
            .is_err());
        assert!(PlannerConfig::new()
            .interferer_separation_min_deg(181.0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"beams_per_satellite": 8}"#).unwrap();

        let config = PlannerConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.beams_per_satellite, 8);
        assert_eq!(config.self_interference_min_deg, SELF_INTERFERENCE_MAX_DEG);
    }

    #[test]
    fn test_invalid_file_rejected_without_overrides() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"beams_per_satellite": 0}"#).unwrap();

        assert!(PlannerConfig::from_json_file(file.path()).is_err());
        assert!(ConfigOverrides::default().resolve(Some(file.path())).is_err());
    }

    #[test]
    fn test_override_fixes_invalid_file_field() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"beams_per_satellite": 0, "self_interference_min_deg": 12.5}"#)
            .unwrap();

        let overrides = ConfigOverrides {
            beams_per_satellite: Some(4),
            ..ConfigOverrides::default()
        };
        let config = overrides.resolve(Some(file.path())).unwrap();
        assert_eq!(config.beams_per_satellite, 4);
        assert_eq!(config.self_interference_min_deg, 12.5);
    }

    #[test]
    fn test_override_wins_over_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"beams_per_satellite": 2}"#).unwrap();

        let overrides = ConfigOverrides {
            beams_per_satellite: Some(3),
            max_user_visible_angle_deg: Some(30.0),
            ..ConfigOverrides::default()
        };
        let config = overrides.resolve(Some(file.path())).unwrap();
        assert_eq!(config.beams_per_satellite, 3);
        assert_eq!(config.max_user_visible_angle_deg, 30.0);
    }

    #[test]
    fn test_override_can_invalidate_config() {
        let overrides = ConfigOverrides {
            interferer_separation_min_deg: Some(200.0),
            ..ConfigOverrides::default()
        };
        assert!(matches!(
            overrides.resolve(None),
            Err(PlannerError::InvalidConfig(_))
        ));
    }
}
