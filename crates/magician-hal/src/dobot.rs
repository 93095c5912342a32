//! [`Dobot`] – the Magician as a robot object.
//!
//! Wraps an open [`MagicianSdk`] connection together with the arm's mounting
//! pose. Reads are converted into world-frame [`Pose`]s and motion targets are
//! converted back into the native frame through the Pose Adapter in
//! `magician-pose`. Every action blocks until the device reports the command
//! as executed.
//!
//! The connection is closed when the [`Dobot`] is dropped.

use tracing::{debug, info, warn};

use magician_pose::{map_move_type, to_absolute_pose, to_relative_pose};
use magician_types::{ArmError, ArmIntent, Joint, MoveType, Pose};

use crate::discovery::{SerialPortLister, resolve_port};
use crate::sdk::MagicianSdk;

/// The only end effector the Magician exposes.
pub const DEFAULT_END_EFFECTOR: &str = "default";

const END_EFFECTORS: [&str; 1] = [DEFAULT_END_EFFECTOR];

/// A Dobot Magician mounted at a fixed pose in the world frame.
pub struct Dobot<S: MagicianSdk> {
    id: String,
    pose: Pose,
    sdk: S,
}

impl<S: MagicianSdk> Dobot<S> {
    /// Wrap an already-open SDK connection.
    pub fn new(id: impl Into<String>, pose: Pose, sdk: S) -> Self {
        let id = id.into();
        info!(robot = %id, "Dobot attached");
        Self { id, pose, sdk }
    }

    /// Find the arm on the serial bus (unless `port` is given) and open it
    /// with `open`.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::DeviceNotFound`] when no Magician is attached, or
    /// whatever `open` returns.
    pub fn connect<F>(
        id: impl Into<String>,
        pose: Pose,
        port: Option<&str>,
        lister: &dyn SerialPortLister,
        open: F,
    ) -> Result<Self, ArmError>
    where
        F: FnOnce(&str) -> Result<S, ArmError>,
    {
        let port = resolve_port(port, lister)?;
        let sdk = open(&port)?;
        info!(port = %port, "serial connection opened");
        Ok(Self::new(id, pose, sdk))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Mounting pose of the arm base in the world frame.
    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    /// End effectors that can be passed to
    /// [`end_effector_pose`][Self::end_effector_pose].
    pub fn end_effector_ids(&self) -> &'static [&'static str] {
        &END_EFFECTORS
    }

    /// Current world-frame pose of `end_effector_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::UnknownEndEffector`] for any id other than
    /// [`DEFAULT_END_EFFECTOR`], or the SDK's error.
    pub fn end_effector_pose(&mut self, end_effector_id: &str) -> Result<Pose, ArmError> {
        if !END_EFFECTORS.contains(&end_effector_id) {
            return Err(ArmError::UnknownEndEffector(end_effector_id.to_string()));
        }
        let native = self.sdk.pose()?;
        debug!(robot = %self.id, native = ?native.xyzr(), "read end effector pose");
        Ok(to_absolute_pose(&self.pose, native.xyzr()))
    }

    /// Joint readings named `joint1`, `joint2`, … in device order.
    pub fn robot_joints(&mut self) -> Result<Vec<Joint>, ArmError> {
        let native = self.sdk.pose()?;
        Ok(native
            .joints
            .iter()
            .enumerate()
            .map(|(idx, value)| Joint::new(format!("joint{}", idx + 1), *value))
            .collect())
    }

    /// Run the homing procedure.
    pub fn home(&mut self) -> Result<(), ArmError> {
        info!(robot = %self.id, "homing");
        let cmd = self.sdk.home()?;
        self.sdk.wait_for_cmd(cmd)
    }

    /// Move the end effector to the world-frame `target`.
    ///
    /// `velocity` and `acceleration` are percentages of the arm's maximum.
    /// Roll and pitch of `target` are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::InvalidParameter`] when a percentage lies outside
    /// `0..=100`, otherwise the SDK's error.
    pub fn move_to(
        &mut self,
        target: &Pose,
        move_type: MoveType,
        velocity: f64,
        acceleration: f64,
    ) -> Result<(), ArmError> {
        check_percent("velocity", velocity)?;
        check_percent("acceleration", acceleration)?;

        let (x, y, z, r) = to_relative_pose(&self.pose, target);
        let mode = map_move_type(move_type);
        debug!(robot = %self.id, x, y, z, r, ?mode, "moving");

        self.sdk.speed(velocity, acceleration)?;
        let cmd = self.sdk.move_to(x, y, z, r, mode)?;
        self.sdk.wait_for_cmd(cmd)
    }

    /// Switch the suction cup on.
    pub fn suck(&mut self) -> Result<(), ArmError> {
        self.set_suction(true)
    }

    /// Switch the suction cup off.
    pub fn release(&mut self) -> Result<(), ArmError> {
        self.set_suction(false)
    }

    /// Execute an [`ArmIntent`] issued by the orchestration layer.
    pub fn dispatch(&mut self, intent: ArmIntent) -> Result<(), ArmError> {
        match intent {
            ArmIntent::Home => self.home(),
            ArmIntent::Move {
                pose,
                move_type,
                velocity,
                acceleration,
            } => self.move_to(&pose, move_type, velocity, acceleration),
            ArmIntent::Suck => self.suck(),
            ArmIntent::Release => self.release(),
        }
    }

    fn set_suction(&mut self, enable: bool) -> Result<(), ArmError> {
        debug!(robot = %self.id, enable, "suction");
        let cmd = self.sdk.suck(enable)?;
        self.sdk.wait_for_cmd(cmd)
    }
}

impl<S: MagicianSdk> Drop for Dobot<S> {
    fn drop(&mut self) {
        match self.sdk.close() {
            Ok(()) => info!(robot = %self.id, "Dobot connection closed"),
            Err(e) => warn!(robot = %self.id, error = %e, "failed to close Dobot connection"),
        }
    }
}

fn check_percent(name: &str, value: f64) -> Result<(), ArmError> {
    if (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(ArmError::InvalidParameter {
            name: name.to_string(),
            details: format!("{value} is not a percentage in 0..=100"),
        })
    }
}
