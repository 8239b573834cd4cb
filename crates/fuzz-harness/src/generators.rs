//! Scenario generators for property-based testing
//!
//! Users and satellites are placed over a small patch of the globe so that
//! generated scenarios actually exercise visibility, color reuse and
//! capacity rather than producing empty plans.

use beam_planning::{PlannerConfig, Position, Scenario};
use proptest::prelude::*;

// ============================================================================
// Geometry Generators
// ============================================================================

/// Mean Earth radius (km)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Starlink shell altitude range (km)
pub const LEO_ALTITUDE_KM: (f64, f64) = (540.0, 570.0);

/// Half-width of the lat/lon patch scenarios are drawn from (degrees)
pub const PATCH_HALF_WIDTH_DEG: f64 = 6.0;

/// Point at `radius` km above the Earth center at the given lat/lon (degrees)
pub fn spherical(radius: f64, lat_deg: f64, lon_deg: f64) -> Position {
    let (lat, lon) = (lat_deg.to_radians(), lon_deg.to_radians());
    Position::new(
        radius * lat.cos() * lon.cos(),
        radius * lat.cos() * lon.sin(),
        radius * lat.sin(),
    )
}

/// Latitude/longitude pair inside the scenario patch
pub fn patch_lat_lon() -> impl Strategy<Value = (f64, f64)> {
    (
        -PATCH_HALF_WIDTH_DEG..=PATCH_HALF_WIDTH_DEG,
        -PATCH_HALF_WIDTH_DEG..=PATCH_HALF_WIDTH_DEG,
    )
}

/// User terminal on the Earth surface
pub fn user_position() -> impl Strategy<Value = Position> {
    patch_lat_lon().prop_map(|(lat, lon)| spherical(EARTH_RADIUS_KM, lat, lon))
}

/// Starlink satellite in the LEO shell
pub fn satellite_position() -> impl Strategy<Value = Position> {
    (patch_lat_lon(), LEO_ALTITUDE_KM.0..=LEO_ALTITUDE_KM.1)
        .prop_map(|((lat, lon), alt)| spherical(EARTH_RADIUS_KM + alt, lat, lon))
}

/// Non-Starlink satellite, anywhere from LEO to GEO altitude
pub fn interferer_position() -> impl Strategy<Value = Position> {
    (patch_lat_lon(), 600.0f64..=35_786.0)
        .prop_map(|((lat, lon), alt)| spherical(EARTH_RADIUS_KM + alt, lat, lon))
}

/// Arbitrary point in a 20,000 km cube
pub fn any_position() -> impl Strategy<Value = Position> {
    (-1.0e4f64..1.0e4, -1.0e4f64..1.0e4, -1.0e4f64..1.0e4)
        .prop_map(|(x, y, z)| Position::new(x, y, z))
}

// ============================================================================
// Composite Generators
// ============================================================================

/// Scenario with up to the given number of each entity
pub fn scenario(
    max_users: usize,
    max_satellites: usize,
    max_interferers: usize,
) -> impl Strategy<Value = Scenario> {
    (
        prop::collection::vec(user_position(), 0..=max_users),
        prop::collection::vec(satellite_position(), 0..=max_satellites),
        prop::collection::vec(interferer_position(), 0..=max_interferers),
    )
        .prop_map(|(users, satellites, interferers)| Scenario {
            users,
            satellites,
            interferers,
        })
}

/// Dense scenario: many users competing for few satellites
pub fn crowded_scenario() -> impl Strategy<Value = Scenario> {
    scenario(120, 3, 1)
}

/// Valid planner config with small capacities so saturation happens
pub fn planner_config() -> impl Strategy<Value = PlannerConfig> {
    (1usize..=32, 20.0f64..=60.0, 0.0f64..=30.0, 0.0f64..=20.0).prop_map(
        |(beams, visible, interferer, separation)| {
            PlannerConfig::new()
                .beams_per_satellite(beams)
                .max_user_visible_angle_deg(visible)
                .interferer_separation_min_deg(interferer)
                .self_interference_min_deg(separation)
        },
    )
}
