//! PCI bus types for device identification, driver matching and error recovery.

/// PCI bus/device/function address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PciAddress {
    /// Bus number (0-255).
    pub bus: u8,
    /// Device number (0-31).
    pub device: u8,
    /// Function number (0-7).
    pub function: u8,
}

impl core::fmt::Display for PciAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:02x}:{:02x}.{}", self.bus, self.device, self.function)
    }
}

/// Wildcard value for PCI ID matching: matches any vendor/device ID.
pub const PCI_ANY_ID: u16 = 0xFFFF;

/// Number of Base Address Registers in a type 0 configuration header.
pub const PCI_NUM_BARS: usize = 6;

/// PCI class codes (`class << 8 | subclass`) relevant to serial drivers.
pub mod class {
    /// Simple communication controller: serial (16x50 compatible).
    pub const COMMUNICATION_SERIAL: u16 = 0x0700;
    /// Simple communication controller: multiport serial.
    pub const COMMUNICATION_MULTISERIAL: u16 = 0x0702;
    /// Simple communication controller: modem.
    pub const COMMUNICATION_MODEM: u16 = 0x0703;
}

/// PCI device ID for driver-to-device matching.
#[derive(Debug, Clone, Copy)]
pub struct PciDeviceId {
    /// Vendor ID (`PCI_ANY_ID` = wildcard).
    pub vendor: u16,
    /// Device ID (`PCI_ANY_ID` = wildcard).
    pub device: u16,
    /// Subsystem vendor ID (`PCI_ANY_ID` = wildcard).
    pub subvendor: u16,
    /// Subsystem device ID (`PCI_ANY_ID` = wildcard).
    pub subdevice: u16,
    /// Class code: `(class << 16) | (subclass << 8) | prog_if`.
    pub class: u32,
    /// Mask applied to class before comparison (0 = ignore class).
    pub class_mask: u32,
    /// Driver-private data attached to the entry (e.g. a board table index).
    pub driver_data: usize,
}

impl PciDeviceId {
    /// Creates an ID entry matching a specific vendor/device pair.
    #[must_use]
    pub const fn new(vendor: u16, device: u16) -> Self {
        Self {
            vendor,
            device,
            subvendor: PCI_ANY_ID,
            subdevice: PCI_ANY_ID,
            class: 0,
            class_mask: 0,
            driver_data: 0,
        }
    }

    /// Creates an ID entry matching a vendor/device pair and a specific subsystem.
    #[must_use]
    pub const fn with_subsystem(vendor: u16, device: u16, subvendor: u16, subdevice: u16) -> Self {
        Self {
            vendor,
            device,
            subvendor,
            subdevice,
            class: 0,
            class_mask: 0,
            driver_data: 0,
        }
    }

    /// Creates an ID entry matching a PCI class/subclass.
    #[must_use]
    pub const fn with_class(class: u8, subclass: u8) -> Self {
        Self {
            vendor: PCI_ANY_ID,
            device: PCI_ANY_ID,
            subvendor: PCI_ANY_ID,
            subdevice: PCI_ANY_ID,
            class: ((class as u32) << 16) | ((subclass as u32) << 8),
            class_mask: 0xFFFF00,
            driver_data: 0,
        }
    }

    /// Returns a copy of this entry carrying `data` as its driver data.
    #[must_use]
    pub const fn with_data(mut self, data: usize) -> Self {
        self.driver_data = data;
        self
    }

    /// Returns `true` if this ID entry matches the given device info.
    #[must_use]
    pub fn matches(&self, info: &PciDeviceInfo) -> bool {
        if self.vendor != PCI_ANY_ID && self.vendor != info.vendor_id {
            return false;
        }
        if self.device != PCI_ANY_ID && self.device != info.device_id {
            return false;
        }
        if self.subvendor != PCI_ANY_ID && self.subvendor != info.subsystem_vendor_id {
            return false;
        }
        if self.subdevice != PCI_ANY_ID && self.subdevice != info.subsystem_device_id {
            return false;
        }
        if self.class_mask != 0
            && (info.class_code() & self.class_mask) != (self.class & self.class_mask)
        {
            return false;
        }
        true
    }
}

/// Decoded PCI Base Address Register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PciBar {
    /// Memory-mapped BAR.
    Memory {
        /// Base physical address.
        base: u64,
        /// Size in bytes.
        size: u64,
        /// Whether the region is prefetchable.
        prefetchable: bool,
        /// Whether this is a 64-bit BAR (consumes two BAR slots).
        is_64bit: bool,
    },
    /// I/O port BAR.
    Io {
        /// Base I/O port address.
        base: u32,
        /// Size in bytes.
        size: u32,
    },
    /// BAR slot is unused or consumed by the upper half of a 64-bit BAR.
    Unused,
}

impl PciBar {
    /// Returns `true` for an I/O port BAR.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Returns `true` for a memory-mapped BAR.
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory { .. })
    }

    /// Returns the start address of the region (0 for unused slots).
    #[must_use]
    pub const fn start(&self) -> u64 {
        match *self {
            Self::Memory { base, .. } => base,
            Self::Io { base, .. } => base as u64,
            Self::Unused => 0,
        }
    }

    /// Returns the region length in bytes (0 for unused slots).
    #[must_use]
    pub const fn size(&self) -> u64 {
        match *self {
            Self::Memory { size, .. } => size,
            Self::Io { size, .. } => size as u64,
            Self::Unused => 0,
        }
    }
}

/// Full information about a discovered PCI device.
#[derive(Debug, Clone, Copy)]
pub struct PciDeviceInfo {
    /// Bus/device/function address.
    pub address: PciAddress,
    /// Vendor ID.
    pub vendor_id: u16,
    /// Device ID.
    pub device_id: u16,
    /// Revision ID.
    pub revision: u8,
    /// Programming interface byte.
    pub prog_if: u8,
    /// Subclass code.
    pub subclass: u8,
    /// Class code.
    pub class: u8,
    /// Header type (bits 0-6), multi-function flag (bit 7).
    pub header_type: u8,
    /// Subsystem vendor ID.
    pub subsystem_vendor_id: u16,
    /// Subsystem device ID.
    pub subsystem_device_id: u16,
    /// Interrupt line (IRQ number configured by firmware).
    pub interrupt_line: u8,
    /// Interrupt pin (0 = none, 1 = INTA, ..., 4 = INTD).
    pub interrupt_pin: u8,
    /// Base Address Registers.
    pub bars: [PciBar; PCI_NUM_BARS],
}

impl PciDeviceInfo {
    /// Returns the 24-bit class code: `(class << 16) | (subclass << 8) | prog_if`.
    #[must_use]
    pub const fn class_code(&self) -> u32 {
        ((self.class as u32) << 16) | ((self.subclass as u32) << 8) | (self.prog_if as u32)
    }

    /// Returns `class << 8 | subclass`, the form used by [`class`] constants.
    #[must_use]
    pub const fn class_subclass(&self) -> u16 {
        ((self.class as u16) << 8) | (self.subclass as u16)
    }

    /// Returns the BAR at `index`, or `None` past the last BAR slot.
    #[must_use]
    pub fn bar(&self, index: usize) -> Option<&PciBar> {
        self.bars.get(index)
    }

    /// Returns the length of BAR `index`, or 0 if it does not exist.
    #[must_use]
    pub fn bar_size(&self, index: usize) -> u64 {
        self.bar(index).map_or(0, PciBar::size)
    }
}

/// State of the PCI channel reported to an error-recovery handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PciChannelState {
    /// I/O channel is in normal state.
    Normal,
    /// I/O to the channel is blocked until reset.
    Frozen,
    /// The device is gone; recovery is impossible.
    PermanentFailure,
}

/// Result returned by a driver's error-recovery handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PciErsResult {
    /// The driver cannot recover; the device should be disconnected.
    Disconnect,
    /// The driver needs a slot reset to recover.
    NeedReset,
    /// The device recovered and is ready for the resume phase.
    Recovered,
}
