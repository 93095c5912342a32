//! Pose Adapter: world-frame [`Pose`] ⇄ Magician native `(x, y, z, r)`.
//!
//! The native frame uses millimetres and a single rotation `r` about the
//! vertical axis. The world frame uses metres and a full quaternion. Both
//! conversions go through the arm's mounting pose.
//!
//! The arm has four controllable degrees of freedom. Roll and pitch of a
//! target pose are dropped when converting to the native frame.

use nalgebra::UnitQuaternion;
use tracing::debug;

use magician_types::{MoveType, NativeMotionMode, Orientation, Pose, Position};

use crate::frames::{make_pose_abs, make_pose_rel, orientation_from, unit_quaternion_from};

/// Millimetres per metre.
pub const MM_PER_M: f64 = 1000.0;

/// Roll/pitch magnitude (radians) above which dropping them is logged.
const PLANAR_TOLERANCE: f64 = 1e-6;

/// Native cartesian target: millimetres plus yaw in radians.
pub type Xyzr = (f64, f64, f64, f64);

/// Pure yaw rotation (roll = 0, pitch = 0, yaw = `r`).
pub fn yaw_to_quaternion(r: f64) -> Orientation {
    orientation_from(&UnitQuaternion::from_euler_angles(0.0, 0.0, r))
}

/// Yaw component of a roll-pitch-yaw decomposition.
pub fn quaternion_to_yaw(orientation: &Orientation) -> f64 {
    let (_, _, yaw) = unit_quaternion_from(orientation).euler_angles();
    yaw
}

/// Convert a native reading into a world-frame pose.
///
/// `r` is not range-checked.
pub fn to_absolute_pose(mounting: &Pose, (x, y, z, r): Xyzr) -> Pose {
    let relative = Pose::new(
        Position::new(x / MM_PER_M, y / MM_PER_M, z / MM_PER_M),
        yaw_to_quaternion(r),
    );
    make_pose_abs(mounting, &relative)
}

/// Convert a world-frame target into a native `(x, y, z, r)` command.
///
/// Any roll or pitch in `target` relative to the mounting pose is discarded.
pub fn to_relative_pose(mounting: &Pose, target: &Pose) -> Xyzr {
    let relative = make_pose_rel(mounting, target);
    let (roll, pitch, yaw) = unit_quaternion_from(&relative.orientation).euler_angles();
    if roll.abs() > PLANAR_TOLERANCE || pitch.abs() > PLANAR_TOLERANCE {
        debug!(roll, pitch, yaw, "dropping roll/pitch from non-planar target");
    }
    (
        relative.position.x * MM_PER_M,
        relative.position.y * MM_PER_M,
        relative.position.z * MM_PER_M,
        yaw,
    )
}

pub fn map_move_type(move_type: MoveType) -> NativeMotionMode {
    match move_type {
        MoveType::Jump => NativeMotionMode::PtpJumpXyz,
        MoveType::Joints => NativeMotionMode::PtpMovjXyz,
        MoveType::Linear => NativeMotionMode::PtpMovlXyz,
    }
}
