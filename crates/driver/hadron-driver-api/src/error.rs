//! Errors reported by driver collaborators.

use core::fmt;

/// Failure reported by the PCI subsystem or the UART core.
///
/// Carried verbatim inside the probe driver's own error type, so the cause of
/// a failed probe survives into the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverError {
    /// The device went away or never answered config cycles.
    DeviceNotFound,
    /// A board-specific initialization step failed.
    InitFailed,
    /// The device or port is in the wrong state for the request.
    InvalidState,
    /// Config space or register access failed.
    IoError,
    /// No free tty line, mapping window or interrupt vector.
    OutOfResources,
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::DeviceNotFound => "no such device",
            Self::InitFailed => "board initialization failed",
            Self::InvalidState => "device in wrong state",
            Self::IoError => "device I/O error",
            Self::OutOfResources => "no free resources",
        })
    }
}
