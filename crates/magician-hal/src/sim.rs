//! In-process simulated Magician for tests and headless runs.
//!
//! [`SimMagician`] implements [`MagicianSdk`] without a serial port. It
//! records every call, keeps a plausible native pose and hands out command
//! ids. Clones share the same state, so a test can keep one clone for
//! inspection after moving another into a [`Dobot`][crate::dobot::Dobot].
//!
//! # Example
//!
//! ```rust
//! use magician_hal::dobot::Dobot;
//! use magician_hal::sim::SimMagician;
//! use magician_types::{MoveType, Pose, Position};
//!
//! let sim = SimMagician::new();
//! let mut dobot = Dobot::new("dobot", Pose::identity(), sim.clone());
//!
//! let target = Pose::new(Position::new(0.2, 0.05, 0.0), Default::default());
//! dobot.move_to(&target, MoveType::Linear, 50.0, 50.0).expect("sim move must succeed");
//!
//! let pose = sim.native_pose();
//! assert!((pose.x - 200.0).abs() < 1e-9);
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use magician_types::{ArmError, NativeMotionMode, NativePose};

use crate::sdk::{CommandId, MagicianSdk};

/// Native pose the simulated arm reports after homing, in millimetres.
pub const SIM_HOME: (f64, f64, f64, f64) = (200.0, 0.0, 0.0, 0.0);

/// A call received by the simulator.
#[derive(Debug, Clone, PartialEq)]
pub enum SimCommand {
    Home,
    MoveTo {
        x: f64,
        y: f64,
        z: f64,
        r: f64,
        mode: NativeMotionMode,
    },
    Speed {
        velocity: f64,
        acceleration: f64,
    },
    Suck(bool),
    WaitForCmd(CommandId),
    Close,
}

#[derive(Debug)]
struct SimState {
    pose: NativePose,
    suction: bool,
    speed: Option<(f64, f64)>,
    commands: Vec<SimCommand>,
    last_id: CommandId,
    closed: bool,
    fail_on: Option<String>,
}

impl Default for SimState {
    fn default() -> Self {
        let mut state = Self {
            pose: NativePose::default(),
            suction: false,
            speed: None,
            commands: Vec::new(),
            last_id: 0,
            closed: false,
            fail_on: None,
        };
        let (x, y, z, r) = SIM_HOME;
        state.place(x, y, z, r);
        state
    }
}

impl SimState {
    // Joint 1 follows the base bearing of the target; joint 4 carries r.
    fn place(&mut self, x: f64, y: f64, z: f64, r: f64) {
        self.pose = NativePose {
            x,
            y,
            z,
            r,
            joints: vec![y.atan2(x), 0.0, 0.0, r],
        };
    }

    fn check(&mut self, operation: &str) -> Result<(), ArmError> {
        if self.closed {
            return Err(sdk_error(operation, "connection closed"));
        }
        if self.fail_on.as_deref() == Some(operation) {
            self.fail_on = None;
            return Err(sdk_error(operation, "injected failure"));
        }
        Ok(())
    }

    fn issue(&mut self, command: SimCommand) -> CommandId {
        self.commands.push(command);
        self.last_id += 1;
        self.last_id
    }
}

fn sdk_error(operation: &str, details: &str) -> ArmError {
    ArmError::Sdk {
        operation: operation.to_string(),
        details: details.to_string(),
    }
}

/// Simulated Magician connection. Always succeeds unless a failure is
/// injected with [`fail_on`][Self::fail_on] or the connection was closed.
#[derive(Debug, Clone, Default)]
pub struct SimMagician {
    state: Arc<Mutex<SimState>>,
}

impl SimMagician {
    /// A fresh simulator standing at [`SIM_HOME`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call named `operation` (e.g. `"move_to"`) fail.
    pub fn fail_on(&self, operation: &str) {
        self.state().fail_on = Some(operation.to_string());
    }

    /// Every call received so far, in order.
    pub fn commands(&self) -> Vec<SimCommand> {
        self.state().commands.clone()
    }

    pub fn native_pose(&self) -> NativePose {
        self.state().pose.clone()
    }

    pub fn suction(&self) -> bool {
        self.state().suction
    }

    /// Last `(velocity, acceleration)` pair set, if any.
    pub fn speed_setting(&self) -> Option<(f64, f64)> {
        self.state().speed
    }

    pub fn is_closed(&self) -> bool {
        self.state().closed
    }

    // Inspection and failure injection read through a poisoned lock; only
    // SDK calls report the poison.
    fn state(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self, operation: &str) -> Result<MutexGuard<'_, SimState>, ArmError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| sdk_error(operation, "simulator state poisoned"))?;
        state.check(operation)?;
        Ok(state)
    }
}

impl MagicianSdk for SimMagician {
    fn home(&mut self) -> Result<CommandId, ArmError> {
        let mut state = self.lock("home")?;
        let (x, y, z, r) = SIM_HOME;
        state.place(x, y, z, r);
        Ok(state.issue(SimCommand::Home))
    }

    fn move_to(
        &mut self,
        x: f64,
        y: f64,
        z: f64,
        r: f64,
        mode: NativeMotionMode,
    ) -> Result<CommandId, ArmError> {
        let mut state = self.lock("move_to")?;
        state.place(x, y, z, r);
        Ok(state.issue(SimCommand::MoveTo { x, y, z, r, mode }))
    }

    fn speed(&mut self, velocity: f64, acceleration: f64) -> Result<(), ArmError> {
        let mut state = self.lock("speed")?;
        state.speed = Some((velocity, acceleration));
        state.commands.push(SimCommand::Speed {
            velocity,
            acceleration,
        });
        Ok(())
    }

    fn suck(&mut self, enable: bool) -> Result<CommandId, ArmError> {
        let mut state = self.lock("suck")?;
        state.suction = enable;
        Ok(state.issue(SimCommand::Suck(enable)))
    }

    fn pose(&mut self) -> Result<NativePose, ArmError> {
        let state = self.lock("pose")?;
        Ok(state.pose.clone())
    }

    fn wait_for_cmd(&mut self, id: CommandId) -> Result<(), ArmError> {
        let mut state = self.lock("wait_for_cmd")?;
        if id == 0 || id > state.last_id {
            return Err(sdk_error(
                "wait_for_cmd",
                &format!("command {id} was never queued"),
            ));
        }
        state.commands.push(SimCommand::WaitForCmd(id));
        Ok(())
    }

    fn close(&mut self) -> Result<(), ArmError> {
        let mut state = self.lock("close")?;
        state.closed = true;
        state.commands.push(SimCommand::Close);
        Ok(())
    }
}
