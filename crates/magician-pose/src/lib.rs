//! `magician-pose` – coordinate conversions for the Dobot Magician.
//!
//! # Modules
//!
//! - [`frames`] – composition and inversion of framework [`Pose`]s via
//!   `nalgebra` isometries.
//! - [`adapter`] – the Pose Adapter: world [`Pose`] ⇄ native millimetre
//!   `(x, y, z, r)` tuples relative to the arm's mounting pose, plus the
//!   [`MoveType`] → [`NativeMotionMode`] mapping.
//!
//! [`Pose`]: magician_types::Pose
//! [`MoveType`]: magician_types::MoveType
//! [`NativeMotionMode`]: magician_types::NativeMotionMode

pub mod adapter;
pub mod frames;

pub use adapter::{
    MM_PER_M, Xyzr, map_move_type, quaternion_to_yaw, to_absolute_pose, to_relative_pose,
    yaw_to_quaternion,
};
