use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Cartesian position in metres.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Orientation as a quaternion (x, y, z, w). Expected to be of unit length;
/// nothing in this workspace normalises or validates it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Orientation {
    pub fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// The identity rotation.
    pub fn identity() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Self::identity()
    }
}

/// A pose in the framework's world frame: position in metres plus a unit
/// quaternion orientation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub position: Position,
    pub orientation: Orientation,
}

impl Pose {
    pub fn new(position: Position, orientation: Orientation) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Origin with no rotation.
    pub fn identity() -> Self {
        Self::default()
    }
}

/// A named joint reading, e.g. `joint1 = 0.35`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    pub name: String,
    pub value: f64,
}

impl Joint {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// How the arm travels to a cartesian target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MoveType {
    /// Lift, travel, then lower onto the target.
    Jump,
    /// Joint-interpolated motion.
    Joints,
    /// Straight-line motion of the end effector.
    Linear,
}

impl MoveType {
    pub const ALL: [MoveType; 3] = [MoveType::Jump, MoveType::Joints, MoveType::Linear];
}

impl std::fmt::Display for MoveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MoveType::Jump => write!(f, "JUMP"),
            MoveType::Joints => write!(f, "JOINTS"),
            MoveType::Linear => write!(f, "LINEAR"),
        }
    }
}

impl std::str::FromStr for MoveType {
    type Err = ArmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "JUMP" => Ok(MoveType::Jump),
            "JOINTS" => Ok(MoveType::Joints),
            "LINEAR" => Ok(MoveType::Linear),
            other => Err(ArmError::InvalidParameter {
                name: "move_type".to_string(),
                details: format!("unknown move type '{other}'"),
            }),
        }
    }
}

/// Point-to-point mode constants understood by the Magician firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NativeMotionMode {
    PtpJumpXyz = 0x00,
    PtpMovjXyz = 0x01,
    PtpMovlXyz = 0x02,
}

impl NativeMotionMode {
    /// Raw mode byte as sent to the device.
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Pose reported by the vendor SDK in the arm's own frame.
///
/// `x`, `y`, `z` are millimetres and `r` is the end-effector rotation in
/// radians. `joints` holds the remaining values in SDK order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NativePose {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub r: f64,
    pub joints: Vec<f64>,
}

impl NativePose {
    /// The leading `(x, y, z, r)` tuple.
    pub fn xyzr(&self) -> (f64, f64, f64, f64) {
        (self.x, self.y, self.z, self.r)
    }
}

/// Actions the robot object exposes to the orchestration framework.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "payload")]
pub enum ArmIntent {
    /// Run the homing procedure.
    Home,
    /// Move the end effector to a world-frame pose.
    Move {
        pose: Pose,
        move_type: MoveType,
        /// Percent of maximum speed.
        velocity: f64,
        /// Percent of maximum acceleration.
        acceleration: f64,
    },
    /// Switch the suction cup on.
    Suck,
    /// Switch the suction cup off.
    Release,
}

/// Errors raised by the arm driver and the SDK it wraps.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArmError {
    #[error("Dobot not found")]
    DeviceNotFound,

    #[error("Serial discovery failed: {0}")]
    Discovery(String),

    #[error("SDK call '{operation}' failed: {details}")]
    Sdk { operation: String, details: String },

    #[error("Unknown end effector: {0}")]
    UnknownEndEffector(String),

    #[error("Invalid parameter '{name}': {details}")]
    InvalidParameter { name: String, details: String },
}
