//! Beam Planning Fuzz Harness
//!
//! Proptest strategies for positions, scenarios and planner configurations,
//! shared by the property tests in `tests/`.
//!
//! # Usage
//!
//! ```ignore
//! use fuzz_harness::prelude::*;
//!
//! proptest! {
//!     #[test]
//!     fn my_fuzz_test(scenario in scenario(8, 4, 2)) {
//!         prop_assert!(scenario.users.len() <= 8);
//!     }
//! }
//! ```

pub mod config;
pub mod generators;

pub mod prelude {
    pub use crate::config::FuzzConfig;
    pub use crate::generators::*;
    pub use beam_planning::{PlannerConfig, Position, Scenario};
    pub use proptest::prelude::*;
}

// Re-export proptest for convenience
pub use proptest;
