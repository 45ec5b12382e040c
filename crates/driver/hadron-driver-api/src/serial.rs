//! 8250 UART core interface.
//!
//! Probe drivers describe each discovered UART with a [`UartPortConfig`] and
//! hand it to the [`UartCore`], which owns the register-level driver and the
//! tty lines. The core answers with a [`UartLine`] handle used for every later
//! call about that port.

use core::fmt;

use bitflags::bitflags;

use crate::error::DriverError;

bitflags! {
    /// Port flags passed to the UART core at registration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct UpfFlags: u32 {
        /// Skip the loopback/scratch register presence test.
        const SKIP_TEST     = 1 << 6;
        /// The interrupt line may be shared with other ports.
        const SHARE_IRQ     = 1 << 24;
        /// Autoconfigure the UART type when the port is registered.
        const BOOT_AUTOCONF = 1 << 28;
    }
}

/// How the UART core reaches a port's registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UartIo {
    /// Registers live in x86 I/O port space.
    Port {
        /// First I/O port of the register block.
        iobase: u64,
    },
    /// Registers are memory mapped.
    Mem {
        /// Physical address of the register block.
        mapbase: u64,
        /// Kernel virtual address of the register block.
        membase: u64,
    },
}

/// Everything the UART core needs to drive one port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UartPortConfig {
    /// Register access method and base.
    pub io: UartIo,
    /// Register index is shifted left by this amount to get the byte offset.
    pub regshift: u32,
    /// Input clock of the UART in Hz (`base_baud * 16`).
    pub uartclk: u32,
    /// Interrupt line, 0 for polled operation.
    pub irq: u32,
    /// Registration flags.
    pub flags: UpfFlags,
}

/// Handle for a port registered with the UART core (its tty line number).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UartLine(pub u32);

impl fmt::Display for UartLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ttyS{}", self.0)
    }
}

/// The shared 8250 UART driver core.
///
/// Shared by every probe driver in the system, so implementations must be
/// safe to call for different devices concurrently.
pub trait UartCore: Send + Sync {
    /// Registers a port and returns the line it was assigned.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] if the port could not be registered (no free
    /// line, UART not responding, ...).
    fn register_port(&self, config: &UartPortConfig) -> Result<UartLine, DriverError>;

    /// Unregisters a previously registered port.
    fn unregister_port(&self, line: UartLine);

    /// Quiesces a port for system suspend, leaving it registered.
    fn suspend_port(&self, line: UartLine);

    /// Reprograms and restarts a port suspended with
    /// [`suspend_port`](Self::suspend_port).
    fn resume_port(&self, line: UartLine);
}
