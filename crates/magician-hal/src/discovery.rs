//! USB serial discovery of the Magician.
//!
//! The arm enumerates through a CH340 USB-serial bridge, identified by its
//! vendor/product id pair. Enumeration is behind [`SerialPortLister`] so the
//! matching logic can be exercised without hardware.

use magician_types::ArmError;
use serialport::SerialPortType;
use tracing::{debug, info};

/// USB vendor id of the Magician's serial bridge (`0x1A86`).
pub const MAGICIAN_VID: u16 = 6790;
/// USB product id of the Magician's serial bridge (`0x7523`).
pub const MAGICIAN_PID: u16 = 29987;

/// A serial port as reported by the operating system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    /// Device path, e.g. `/dev/ttyUSB0` or `COM3`.
    pub name: String,
    /// USB vendor id, when the port is a USB device.
    pub vid: Option<u16>,
    /// USB product id, when the port is a USB device.
    pub pid: Option<u16>,
}

impl PortInfo {
    pub fn is_magician(&self) -> bool {
        self.vid == Some(MAGICIAN_VID) && self.pid == Some(MAGICIAN_PID)
    }
}

/// Source of the serial ports currently attached to the host.
pub trait SerialPortLister {
    /// # Errors
    ///
    /// Returns [`ArmError::Discovery`] if enumeration itself fails.
    fn list(&self) -> Result<Vec<PortInfo>, ArmError>;
}

/// Enumerates ports through the `serialport` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemPorts;

impl SerialPortLister for SystemPorts {
    fn list(&self) -> Result<Vec<PortInfo>, ArmError> {
        let ports =
            serialport::available_ports().map_err(|e| ArmError::Discovery(e.to_string()))?;
        Ok(ports
            .into_iter()
            .map(|p| match p.port_type {
                SerialPortType::UsbPort(usb) => PortInfo {
                    name: p.port_name,
                    vid: Some(usb.vid),
                    pid: Some(usb.pid),
                },
                _ => PortInfo {
                    name: p.port_name,
                    vid: None,
                    pid: None,
                },
            })
            .collect())
    }
}

/// Return the first port that belongs to a Magician.
///
/// # Errors
///
/// Returns [`ArmError::DeviceNotFound`] when no port matches.
pub fn find_magician_port(ports: &[PortInfo]) -> Result<String, ArmError> {
    ports
        .iter()
        .find(|p| p.is_magician())
        .map(|p| p.name.clone())
        .ok_or(ArmError::DeviceNotFound)
}

/// Pick the port to open: `explicit` when given, otherwise the first
/// discovered Magician.
pub fn resolve_port(
    explicit: Option<&str>,
    lister: &dyn SerialPortLister,
) -> Result<String, ArmError> {
    if let Some(port) = explicit {
        debug!(port, "using configured serial port");
        return Ok(port.to_string());
    }
    let ports = lister.list()?;
    debug!(count = ports.len(), "enumerated serial ports");
    let port = find_magician_port(&ports)?;
    info!(port = %port, "found Dobot Magician");
    Ok(port)
}
