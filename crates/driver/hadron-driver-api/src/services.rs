//! PCI function services for drivers.
//!
//! Drivers use [`PciFunction`] to claim and release the resources of the
//! device they were bound to, without depending on the PCI subsystem
//! directly.

use crate::error::DriverError;
use crate::pci::PciDeviceInfo;
use crate::resource::MmioRegion;

/// Trait providing per-device PCI services to a driver.
///
/// Implemented by the PCI subsystem and handed to the driver on every
/// probe, remove, power-management and error-recovery callback. Calls for
/// one device are serialized by the caller.
pub trait PciFunction {
    /// Returns the decoded configuration header of the device.
    fn info(&self) -> &PciDeviceInfo;

    /// Enables I/O and memory decoding for the device.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] if the device resources cannot be claimed.
    fn enable(&self) -> Result<(), DriverError>;

    /// Disables the device. Best-effort.
    fn disable(&self);

    /// Snapshots the device's configuration space for a later
    /// [`restore_state`](Self::restore_state).
    fn save_state(&self);

    /// Writes back the last configuration space snapshot.
    fn restore_state(&self);

    /// Maps memory BAR `bar` into kernel virtual address space.
    ///
    /// Mapping the same BAR twice returns the existing mapping.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] if the BAR is not a memory BAR or the mapping
    /// cannot be created.
    fn map_bar(&self, bar: usize) -> Result<MmioRegion, DriverError>;
}
