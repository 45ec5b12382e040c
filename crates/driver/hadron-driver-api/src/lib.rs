//! Driver API types and collaborator traits for Hadron PCI serial drivers.
//!
//! This crate defines the boundary between a PCI serial probe driver and the
//! rest of the kernel:
//!
//! - **PCI types** -- [`PciDeviceId`], [`PciDeviceInfo`], [`PciBar`] and the
//!   error-recovery states ([`PciChannelState`], [`PciErsResult`]).
//! - **Resources** -- [`MmioRegion`] describing a mapped BAR.
//! - **Collaborators** -- [`PciFunction`] (resource enablement, config-space
//!   snapshots, BAR mapping) and [`UartCore`] (8250 port registration).
//! - **Errors** -- [`DriverError`], the error type collaborators report.

#![cfg_attr(not(test), no_std)]

pub mod error;
pub mod pci;
pub mod resource;
pub mod serial;
pub mod services;

// Re-export all public types at the crate root for ergonomic imports.
pub use error::DriverError;
pub use pci::{
    PCI_ANY_ID, PCI_NUM_BARS, PciAddress, PciBar, PciChannelState, PciDeviceId, PciDeviceInfo,
    PciErsResult,
};
pub use resource::MmioRegion;
pub use serial::{UartCore, UartIo, UartLine, UartPortConfig, UpfFlags};
pub use services::PciFunction;
