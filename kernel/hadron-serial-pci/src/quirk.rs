//! Board-specific quirks.
//!
//! A quirk overrides parts of the generic probe sequence for the boards it
//! matches: a go/no-go `probe` before any resource is claimed, an `init` that
//! configures the board and may change the port count, a `setup` that places
//! each port, and an `exit` undoing `init`. Every hook has a default, so a
//! quirk only implements what its board needs.
//!
//! The registry describes quirks only, not the general nature of a board
//! (see [`crate::board`] for that). It is searched in order, so specific
//! entries come before generic ones, and it ends with an entry matching every
//! device.

use core::fmt;
use core::num::NonZeroU32;

use hadron_driver_api::{DriverError, PCI_ANY_ID, PciDeviceInfo, PciFunction};

use crate::board::BoardDescriptor;
use crate::error::SerialPciError;
use crate::ids::{device, vendor};
use crate::resolve::{self, ResolvedPortAddress};

/// How many ports a board's `init` hook wants registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// Register the number of ports in the board descriptor.
    UseBoard,
    /// Register exactly this many ports.
    Ports(NonZeroU32),
}

/// Hooks a board can override.
pub trait SerialQuirk: Sync {
    /// Decides whether the driver should bind to the device at all.
    ///
    /// Runs before any resource is claimed.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] to refuse the device.
    fn probe(&self, _dev: &dyn PciFunction) -> Result<(), DriverError> {
        Ok(())
    }

    /// Prepares the board for use. Also runs again on resume.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] if the board cannot be configured.
    fn init(&self, _dev: &dyn PciFunction) -> Result<InitOutcome, DriverError> {
        Ok(InitOutcome::UseBoard)
    }

    /// Locates port `idx` of the board.
    ///
    /// # Errors
    ///
    /// See [`resolve::default_setup`].
    fn setup(
        &self,
        info: &PciDeviceInfo,
        board: &BoardDescriptor,
        idx: u32,
    ) -> Result<ResolvedPortAddress, SerialPciError> {
        resolve::default_setup(info, board, idx)
    }

    /// Undoes [`init`](Self::init).
    fn exit(&self, _dev: &dyn PciFunction) {}
}

/// A quirk registry entry: an ID pattern and the hooks it selects.
#[derive(Clone, Copy)]
pub struct QuirkEntry {
    /// Name used in log messages.
    pub name: &'static str,
    /// Vendor ID (`PCI_ANY_ID` = wildcard).
    pub vendor: u16,
    /// Device ID (`PCI_ANY_ID` = wildcard).
    pub device: u16,
    /// Subsystem vendor ID (`PCI_ANY_ID` = wildcard).
    pub subvendor: u16,
    /// Subsystem device ID (`PCI_ANY_ID` = wildcard).
    pub subdevice: u16,
    /// Hooks applied to matching devices.
    pub hooks: &'static dyn SerialQuirk,
}

impl QuirkEntry {
    /// Creates an entry for a vendor/device pair, any subsystem.
    #[must_use]
    pub const fn new(
        name: &'static str,
        vendor: u16,
        device: u16,
        hooks: &'static dyn SerialQuirk,
    ) -> Self {
        Self {
            name,
            vendor,
            device,
            subvendor: PCI_ANY_ID,
            subdevice: PCI_ANY_ID,
            hooks,
        }
    }

    /// Returns `true` if every field of the pattern matches.
    #[must_use]
    pub fn matches(&self, vendor: u16, device: u16, subvendor: u16, subdevice: u16) -> bool {
        fn id_matches(pattern: u16, id: u16) -> bool {
            pattern == PCI_ANY_ID || pattern == id
        }
        id_matches(self.vendor, vendor)
            && id_matches(self.device, device)
            && id_matches(self.subvendor, subvendor)
            && id_matches(self.subdevice, subdevice)
    }
}

impl fmt::Debug for QuirkEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuirkEntry")
            .field("name", &self.name)
            .field("vendor", &format_args!("{:#06x}", self.vendor))
            .field("device", &format_args!("{:#06x}", self.device))
            .field("subvendor", &format_args!("{:#06x}", self.subvendor))
            .field("subdevice", &format_args!("{:#06x}", self.subdevice))
            .finish_non_exhaustive()
    }
}

/// Generic boards: every hook keeps its default.
struct DefaultQuirk;

impl SerialQuirk for DefaultQuirk {}

/// ADDI-DATA APCI-7800: eight ports spread two per BAR.
struct Apci7800Quirk;

impl SerialQuirk for Apci7800Quirk {
    fn setup(
        &self,
        info: &PciDeviceInfo,
        board: &BoardDescriptor,
        idx: u32,
    ) -> Result<ResolvedPortAddress, SerialPciError> {
        resolve::apci7800_setup(info, board, idx)
    }
}

const MATCH_ALL: QuirkEntry = QuirkEntry::new("default", PCI_ANY_ID, PCI_ANY_ID, &DefaultQuirk);

/// The quirk registry, ordered by vendor then device, ending in [`MATCH_ALL`].
pub static QUIRKS: [QuirkEntry; 2] = [
    QuirkEntry::new(
        "addidata-apci7800",
        vendor::AMCC,
        device::AMCC_ADDIDATA_APCI7800,
        &Apci7800Quirk,
    ),
    MATCH_ALL,
];

static FALLBACK: QuirkEntry = MATCH_ALL;

/// Returns the first entry of `table` matching the given IDs.
///
/// Falls back to the match-all entry if `table` has no terminator of its own.
#[must_use]
pub fn find_quirk_in(
    table: &'static [QuirkEntry],
    vendor: u16,
    device: u16,
    subvendor: u16,
    subdevice: u16,
) -> &'static QuirkEntry {
    table
        .iter()
        .find(|q| q.matches(vendor, device, subvendor, subdevice))
        .unwrap_or(&FALLBACK)
}

/// Returns the first entry of [`QUIRKS`] matching the given IDs.
#[must_use]
pub fn find_quirk(vendor: u16, device: u16, subvendor: u16, subdevice: u16) -> &'static QuirkEntry {
    find_quirk_in(&QUIRKS, vendor, device, subvendor, subdevice)
}

/// Returns the entry of `table` matching a device's identity.
#[must_use]
pub fn find_quirk_for(table: &'static [QuirkEntry], info: &PciDeviceInfo) -> &'static QuirkEntry {
    find_quirk_in(
        table,
        info.vendor_id,
        info.device_id,
        info.subsystem_vendor_id,
        info.subsystem_device_id,
    )
}
