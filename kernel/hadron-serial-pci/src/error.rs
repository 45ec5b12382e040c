//! Errors of the board configuration engine.

use core::fmt;

use hadron_driver_api::DriverError;

/// Errors that can occur while configuring or registering a serial board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialPciError {
    /// The device class or the board table index is not supported.
    Unsupported,
    /// The device's resources could not be enabled.
    ResourceUnavailable(DriverError),
    /// The heuristics could not infer a board layout.
    GuessFailed,
    /// A board-specific probe hook refused the device.
    QuirkProbeRejected(DriverError),
    /// A board-specific init hook failed.
    QuirkInitFailed(DriverError),
    /// The port does not fit in its region; no further ports exist.
    PortResolutionExhausted,
    /// The UART core rejected a port.
    PortRegistrationFailed(DriverError),
    /// A port resolved to a BAR index that does not exist.
    OutOfRange {
        /// The offending BAR index.
        bar: usize,
    },
}

impl fmt::Display for SerialPciError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported => f.write_str("unsupported device"),
            Self::ResourceUnavailable(e) => write!(f, "cannot enable device: {e}"),
            Self::GuessFailed => f.write_str("cannot determine board layout"),
            Self::QuirkProbeRejected(e) => write!(f, "board probe rejected device: {e}"),
            Self::QuirkInitFailed(e) => write!(f, "board init failed: {e}"),
            Self::PortResolutionExhausted => f.write_str("no more ports in region"),
            Self::PortRegistrationFailed(e) => write!(f, "port registration failed: {e}"),
            Self::OutOfRange { bar } => write!(f, "BAR {bar} out of range"),
        }
    }
}
