//! Device fixtures shared by the unit tests.

use hadron_driver_api::{PCI_NUM_BARS, PciAddress, PciBar, PciDeviceInfo};

/// Builds a device with no BARs; `class` is `class << 8 | subclass`.
pub fn make_info(vendor: u16, device: u16, class: u16) -> PciDeviceInfo {
    let [class, subclass] = class.to_be_bytes();
    PciDeviceInfo {
        address: PciAddress {
            bus: 1,
            device: 0,
            function: 0,
        },
        vendor_id: vendor,
        device_id: device,
        revision: 0,
        prog_if: 0x02,
        subclass,
        class,
        header_type: 0,
        subsystem_vendor_id: 0,
        subsystem_device_id: 0,
        interrupt_line: 11,
        interrupt_pin: 1,
        bars: [PciBar::Unused; PCI_NUM_BARS],
    }
}

/// An I/O BAR of `size` bytes.
pub fn io(base: u32, size: u32) -> PciBar {
    PciBar::Io { base, size }
}

/// A 32-bit non-prefetchable memory BAR of `size` bytes.
pub fn mem(base: u64, size: u64) -> PciBar {
    PciBar::Memory {
        base,
        size,
        prefetchable: false,
        is_64bit: false,
    }
}
