//! `magician-hal` – hardware layer for the Dobot Magician.
//!
//! # Modules
//!
//! - [`sdk`] – [`MagicianSdk`][sdk::MagicianSdk]: the vendor SDK command set
//!   the rest of the crate talks to.
//! - [`discovery`] – locates the arm on the USB serial bus by vendor and
//!   product id.
//! - [`dobot`] – [`Dobot`][dobot::Dobot]: the robot object. Converts between
//!   world-frame poses and native commands and closes the connection on drop.
//! - [`sim`] – [`SimMagician`][sim::SimMagician]: an in-process simulator
//!   for tests and headless runs.

pub mod discovery;
pub mod dobot;
pub mod sdk;
pub mod sim;

pub use discovery::{PortInfo, SerialPortLister, SystemPorts, resolve_port};
pub use dobot::{DEFAULT_END_EFFECTOR, Dobot};
pub use sdk::{CommandId, MagicianSdk};
pub use sim::SimMagician;
