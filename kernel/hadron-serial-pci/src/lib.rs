//! Probe driver for PCI multi-port 8250 serial boards.
//!
//! Binds to ADDI-DATA communication boards, a few third-party boards and any
//! 16550-compatible serial or modem function, works out where each UART
//! lives, and registers the ports with the system's 8250 UART core:
//!
//! - [`board`] -- the board catalog: port count, clock and register layout.
//! - [`ids`] -- the PCI ID table mapping devices to catalog entries.
//! - [`quirk`] -- per-board hooks overriding the generic sequence.
//! - [`guess`] -- layout heuristics for boards missing from the catalog.
//! - [`resolve`] -- port index to BAR/offset resolution.
//! - [`ports`] -- port registration and the per-device session.
//! - [`driver`] -- probe, remove, power management and error recovery.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod board;
pub mod config;
pub mod driver;
pub mod error;
pub mod guess;
pub mod ids;
pub mod ports;
pub mod quirk;
pub mod resolve;

#[cfg(test)]
mod testutil;

pub use board::{BoardDescriptor, BoardFlags, BoardId};
pub use driver::SerialPciDriver;
pub use error::SerialPciError;
pub use ports::{DeviceSession, SessionState};
pub use quirk::{InitOutcome, QuirkEntry, SerialQuirk};
pub use resolve::{AddressSpace, ResolvedPortAddress};
