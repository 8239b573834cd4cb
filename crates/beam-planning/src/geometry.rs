//! Angle calculations shared by every constraint check
//!
//! Positions are Earth-centered cartesian coordinates in km.

use nalgebra::Vector3;

/// Earth-centered position (km)
pub type Position = Vector3<f64>;

/// Center of the Earth
pub const ORIGIN: Position = Vector3::new(0.0, 0.0, 0.0);

/// Angle in degrees, within [0, 180], between rays `vertex -> a` and `vertex -> b`.
///
/// Neither `a` nor `b` may coincide with `vertex`; the result is NaN if one does.
pub fn angle_deg(vertex: &Position, a: &Position, b: &Position) -> f64 {
    let va = (a - vertex).normalize();
    let vb = (b - vertex).normalize();

    // Rounding can push the dot product just past ±1
    let dot = va.dot(&vb).clamp(-1.0, 1.0);

    dot.acos().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_right_angle() {
        let angle = angle_deg(
            &ORIGIN,
            &Position::new(1.0, 0.0, 0.0),
            &Position::new(0.0, 5.0, 0.0),
        );
        assert!((angle - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_opposite_rays() {
        let vertex = Position::new(6371.0, 0.0, 0.0);
        let angle = angle_deg(&vertex, &ORIGIN, &Position::new(7000.0, 0.0, 0.0));
        assert!((angle - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_same_point_is_zero() {
        let vertex = Position::new(1.0, 2.0, 3.0);
        let a = Position::new(-4.0, 8.0, 100.0);
        assert!(angle_deg(&vertex, &a, &a).abs() < 1e-6);
    }

    #[test]
    fn test_symmetric() {
        let vertex = Position::new(6371.0, 10.0, -3.0);
        let a = Position::new(6900.0, 300.0, 12.0);
        let b = Position::new(6800.0, -250.0, 400.0);
        assert_eq!(angle_deg(&vertex, &a, &b), angle_deg(&vertex, &b, &a));
    }

    #[test]
    fn test_scale_invariant() {
        let a = Position::new(1.0, 1.0, 0.0);
        let b = Position::new(1.0, 0.0, 0.0);
        let near = angle_deg(&ORIGIN, &a, &b);
        let far = angle_deg(&ORIGIN, &(a * 1000.0), &b);
        assert!((near - 45.0).abs() < 1e-9);
        assert!((near - far).abs() < 1e-9);
    }
}
