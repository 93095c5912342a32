//! Rigid-body frame composition on framework [`Pose`]s.
//!
//! Poses are lifted into [`Isometry3`] for the math and lowered back into
//! plain [`Pose`] values, so callers never handle `nalgebra` types directly.
//!
//! # Example
//!
//! ```rust
//! use magician_pose::frames::{make_pose_abs, make_pose_rel};
//! use magician_types::{Orientation, Pose, Position};
//!
//! let base = Pose::new(Position::new(1.0, 0.0, 0.0), Orientation::identity());
//! let tool = Pose::new(Position::new(0.5, 0.0, 0.0), Orientation::identity());
//!
//! let world = make_pose_abs(&base, &tool);
//! assert!((world.position.x - 1.5).abs() < 1e-9);
//!
//! let back = make_pose_rel(&base, &world);
//! assert!((back.position.x - 0.5).abs() < 1e-9);
//! ```

use nalgebra::{Isometry3, Quaternion, Translation3, UnitQuaternion};

use magician_types::{Orientation, Pose, Position};

/// Lift a [`Pose`] into an isometry. The orientation is normalised on the way
/// in; a zero quaternion yields NaNs.
pub fn isometry_from_pose(pose: &Pose) -> Isometry3<f64> {
    let trans = Translation3::new(pose.position.x, pose.position.y, pose.position.z);
    Isometry3::from_parts(trans, unit_quaternion_from(&pose.orientation))
}

pub fn isometry_to_pose(iso: &Isometry3<f64>) -> Pose {
    Pose::new(
        Position::new(iso.translation.x, iso.translation.y, iso.translation.z),
        orientation_from(&iso.rotation),
    )
}

pub fn unit_quaternion_from(orientation: &Orientation) -> UnitQuaternion<f64> {
    UnitQuaternion::new_normalize(Quaternion::new(
        orientation.w,
        orientation.x,
        orientation.y,
        orientation.z,
    ))
}

pub fn orientation_from(rotation: &UnitQuaternion<f64>) -> Orientation {
    Orientation::new(rotation.i, rotation.j, rotation.k, rotation.w)
}

/// Express `child` (given relative to `parent`) in the frame `parent` lives in.
pub fn make_pose_abs(parent: &Pose, child: &Pose) -> Pose {
    isometry_to_pose(&(isometry_from_pose(parent) * isometry_from_pose(child)))
}

/// Express `child` (given in the same frame as `parent`) relative to `parent`.
pub fn make_pose_rel(parent: &Pose, child: &Pose) -> Pose {
    isometry_to_pose(&(isometry_from_pose(parent).inverse() * isometry_from_pose(child)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_2};

    fn yawed(x: f64, y: f64, z: f64, yaw: f64) -> Pose {
        let q = UnitQuaternion::from_euler_angles(0.0, 0.0, yaw);
        Pose::new(Position::new(x, y, z), orientation_from(&q))
    }

    #[test]
    fn identity_parent_is_noop() {
        let child = yawed(0.1, 0.2, 0.3, 0.4);
        let abs = make_pose_abs(&Pose::identity(), &child);
        assert!((abs.position.x - 0.1).abs() < 1e-12);
        assert!((abs.position.y - 0.2).abs() < 1e-12);
        assert!((abs.position.z - 0.3).abs() < 1e-12);
        assert!((abs.orientation.z - child.orientation.z).abs() < 1e-12);
        assert!((abs.orientation.w - child.orientation.w).abs() < 1e-12);
    }

    #[test]
    fn rotated_parent_rotates_child_offset() {
        // Parent yawed 90°; a child 1 m along the parent's +X lands on world +Y.
        let parent = Pose::new(
            Position::new(0.0, 0.0, 0.0),
            Orientation::new(0.0, 0.0, FRAC_1_SQRT_2, FRAC_1_SQRT_2),
        );
        let child = Pose::new(Position::new(1.0, 0.0, 0.0), Orientation::identity());
        let abs = make_pose_abs(&parent, &child);
        assert!(abs.position.x.abs() < 1e-9, "x={}", abs.position.x);
        assert!((abs.position.y - 1.0).abs() < 1e-9, "y={}", abs.position.y);
        assert!(abs.position.z.abs() < 1e-9);
    }

    #[test]
    fn rel_inverts_abs() {
        let parent = yawed(0.5, -0.25, 0.1, FRAC_PI_2 / 3.0);
        let child = yawed(0.2, 0.1, -0.05, -0.7);
        let back = make_pose_rel(&parent, &make_pose_abs(&parent, &child));
        assert!((back.position.x - 0.2).abs() < 1e-9);
        assert!((back.position.y - 0.1).abs() < 1e-9);
        assert!((back.position.z + 0.05).abs() < 1e-9);
        let angle = unit_quaternion_from(&back.orientation)
            .angle_to(&unit_quaternion_from(&child.orientation));
        assert!(angle < 1e-9, "angle={angle}");
    }

    #[test]
    fn isometry_roundtrip_preserves_quaternion_components() {
        let pose = Pose::new(
            Position::new(1.0, 2.0, 3.0),
            Orientation::new(0.0, 0.0, FRAC_1_SQRT_2, FRAC_1_SQRT_2),
        );
        let back = isometry_to_pose(&isometry_from_pose(&pose));
        assert_eq!(back.position, pose.position);
        assert!((back.orientation.z - FRAC_1_SQRT_2).abs() < 1e-12);
        assert!((back.orientation.w - FRAC_1_SQRT_2).abs() < 1e-12);
    }
}
