//! `MagicianSdk` – the vendor motion-control SDK as seen by this crate.
//!
//! The wire protocol, command queueing and firmware handshake all live behind
//! this trait. [`Dobot`][crate::dobot::Dobot] only talks to the trait, so a
//! real binding and [`SimMagician`][crate::sim::SimMagician] are
//! interchangeable.

use magician_types::{ArmError, NativeMotionMode, NativePose};

/// Identifier of a queued device command, used with
/// [`MagicianSdk::wait_for_cmd`].
pub type CommandId = u64;

/// Command set of an open Magician connection.
///
/// Cartesian values are millimetres; `r` is radians. Every method propagates
/// the SDK's own failure as an [`ArmError`].
pub trait MagicianSdk: Send {
    /// Queue the homing procedure.
    fn home(&mut self) -> Result<CommandId, ArmError>;

    /// Queue a point-to-point move to `(x, y, z, r)` using `mode`.
    fn move_to(
        &mut self,
        x: f64,
        y: f64,
        z: f64,
        r: f64,
        mode: NativeMotionMode,
    ) -> Result<CommandId, ArmError>;

    /// Set velocity and acceleration for subsequent moves, both in percent.
    fn speed(&mut self, velocity: f64, acceleration: f64) -> Result<(), ArmError>;

    /// Queue switching the suction cup on or off.
    fn suck(&mut self, enable: bool) -> Result<CommandId, ArmError>;

    /// Current pose: `x, y, z, r` followed by the joint values.
    fn pose(&mut self) -> Result<NativePose, ArmError>;

    /// Block until the command `id` has been executed.
    fn wait_for_cmd(&mut self, id: CommandId) -> Result<(), ArmError>;

    /// Release the underlying serial connection.
    fn close(&mut self) -> Result<(), ArmError>;
}

impl<S: MagicianSdk + ?Sized> MagicianSdk for Box<S> {
    fn home(&mut self) -> Result<CommandId, ArmError> {
        (**self).home()
    }

    fn move_to(
        &mut self,
        x: f64,
        y: f64,
        z: f64,
        r: f64,
        mode: NativeMotionMode,
    ) -> Result<CommandId, ArmError> {
        (**self).move_to(x, y, z, r, mode)
    }

    fn speed(&mut self, velocity: f64, acceleration: f64) -> Result<(), ArmError> {
        (**self).speed(velocity, acceleration)
    }

    fn suck(&mut self, enable: bool) -> Result<CommandId, ArmError> {
        (**self).suck(enable)
    }

    fn pose(&mut self) -> Result<NativePose, ArmError> {
        (**self).pose()
    }

    fn wait_for_cmd(&mut self, id: CommandId) -> Result<(), ArmError> {
        (**self).wait_for_cmd(id)
    }

    fn close(&mut self) -> Result<(), ArmError> {
        (**self).close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dobot::Dobot;
    use crate::sim::SimMagician;
    use magician_types::{MoveType, Pose};

    #[test]
    fn boxed_sdk_drives_a_dobot() {
        let sim = SimMagician::new();
        let sdk: Box<dyn MagicianSdk> = Box::new(sim.clone());
        let mut dobot = Dobot::new("boxed", Pose::identity(), sdk);
        dobot
            .move_to(&Pose::identity(), MoveType::Linear, 10.0, 10.0)
            .unwrap();
        assert_eq!(sim.native_pose().xyzr(), (0.0, 0.0, 0.0, 0.0));
        drop(dobot);
        assert!(sim.is_closed());
    }
}
