//! Geometric helpers on top of nalgebra.
//!
//! Geometry here is total: operations that would divide by a vanishing
//! length fall back to a defined result instead of signalling an error.

use nalgebra::{Unit, UnitQuaternion, Vector3};

/// Length below which a vector is treated as degenerate.
pub const DEGENERATE_LENGTH: f64 = 1e-6;

/// Normalize `v`, returning the input unchanged when its length is below
/// [`DEGENERATE_LENGTH`].
pub fn safe_normalize(v: Vector3<f64>) -> Vector3<f64> {
    let length = v.norm();
    if length < DEGENERATE_LENGTH {
        v
    } else {
        v / length
    }
}

/// Rotation of `theta` radians about `axis`.
///
/// The axis is normalized first. A degenerate axis yields the identity
/// rotation, keeping the unit-norm invariant of the result.
pub fn rotation_about(axis: Vector3<f64>, theta: f64) -> UnitQuaternion<f64> {
    let length = axis.norm();
    if length < DEGENERATE_LENGTH {
        return UnitQuaternion::identity();
    }
    UnitQuaternion::from_axis_angle(&Unit::new_unchecked(axis / length), theta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn normalize_is_idempotent() {
        let v = Vector3::new(3.0, -4.0, 12.0);
        let once = safe_normalize(v);
        let twice = safe_normalize(once);

        assert_relative_eq!(once.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(once, twice, epsilon = 1e-12);
    }

    #[test]
    fn normalize_leaves_degenerate_vectors_unchanged() {
        let v = Vector3::new(1e-9, -2e-9, 0.0);
        assert_eq!(safe_normalize(v), v);
        assert_eq!(safe_normalize(Vector3::zeros()), Vector3::zeros());
    }

    #[test]
    fn rotation_round_trips() {
        let axes = [
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, -1.0),
            Vector3::new(1.0, 2.0, 3.0),
            Vector3::new(-0.3, 0.5, 0.1),
        ];
        let v = Vector3::new(0.7, -1.3, 2.1);

        for axis in axes {
            for i in -8..=8 {
                let theta = 0.25 * PI * i as f64;
                let forward = rotation_about(axis, theta);
                let back = rotation_about(axis, -theta);
                let round_trip = back * (forward * v);

                assert_relative_eq!(round_trip, v, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn rotation_normalizes_axis_first() {
        let v = Vector3::new(1.0, 0.0, 0.0);
        let from_unit = rotation_about(Vector3::new(0.0, 0.0, 1.0), 0.5);
        let from_scaled = rotation_about(Vector3::new(0.0, 0.0, 17.0), 0.5);

        assert_relative_eq!(from_unit * v, from_scaled * v, epsilon = 1e-12);
    }

    #[test]
    fn degenerate_axis_yields_identity() {
        let q = rotation_about(Vector3::zeros(), 1.3);
        let v = Vector3::new(0.2, 0.4, -0.6);
        assert_relative_eq!(q * v, v, epsilon = 1e-12);
    }
}
