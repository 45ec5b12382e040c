//! Device ID table mapping PCI identities to board table entries.

use hadron_driver_api::{PciDeviceId, PciDeviceInfo};

use crate::board::BoardId;

/// PCI vendor IDs.
pub mod vendor {
    /// Applied Micro Circuits Corp (bridge vendor of the first APCI-7800).
    pub const AMCC: u16 = 0x10E8;
    /// IBM.
    pub const IBM: u16 = 0x1014;
    /// ADDI-DATA GmbH.
    pub const ADDIDATA: u16 = 0x15B8;
    /// NetMos Technology.
    pub const NETMOS: u16 = 0x9710;
}

/// PCI device IDs.
#[allow(missing_docs)]
pub mod device {
    pub const ADDIDATA_APCI7500: u16 = 0x7000;
    pub const ADDIDATA_APCI7420: u16 = 0x7001;
    pub const ADDIDATA_APCI7300: u16 = 0x7002;
    pub const ADDIDATA_APCI7500_D3: u16 = 0x7003;
    pub const ADDIDATA_APCI7500_2: u16 = 0x7009;
    pub const ADDIDATA_APCI7420_2: u16 = 0x700A;
    pub const ADDIDATA_APCI7300_2: u16 = 0x700B;
    pub const ADDIDATA_APCI7500_3: u16 = 0x700C;
    pub const ADDIDATA_APCI7420_3: u16 = 0x700D;
    pub const ADDIDATA_APCI7300_3: u16 = 0x700E;
    pub const ADDIDATA_APCI7800_3: u16 = 0x700F;
    pub const ADDIDATA_APCIE7300: u16 = 0x7010;
    pub const ADDIDATA_APCIE7420: u16 = 0x7011;
    pub const ADDIDATA_APCIE7500: u16 = 0x7012;
    pub const ADDIDATA_APCIE7800: u16 = 0x7013;
    /// APCI-7800 behind an AMCC bridge (vendor [`super::vendor::AMCC`]).
    pub const AMCC_ADDIDATA_APCI7800: u16 = 0x818E;
    pub const NETMOS_9835: u16 = 0x9835;
}

const fn entry(vendor: u16, device: u16, board: BoardId) -> PciDeviceId {
    PciDeviceId::new(vendor, device).with_data(board as usize)
}

/// Devices handled by this driver, most specific first.
///
/// The `driver_data` of each entry is a [`BoardId`] discriminant. The two
/// class entries at the end bind any other 16550-compatible serial or modem
/// function to [`BoardId::Default`], whose layout is guessed.
pub static SERIAL_PCI_IDS: [PciDeviceId; 19] = [
    entry(vendor::ADDIDATA, device::ADDIDATA_APCI7500, BoardId::B0_4_115200),
    entry(vendor::ADDIDATA, device::ADDIDATA_APCI7500_D3, BoardId::B0_4_115200),
    entry(vendor::ADDIDATA, device::ADDIDATA_APCI7420, BoardId::B0_2_115200),
    entry(vendor::ADDIDATA, device::ADDIDATA_APCI7300, BoardId::B0_1_115200),
    entry(vendor::AMCC, device::AMCC_ADDIDATA_APCI7800, BoardId::B1_8_115200),
    entry(vendor::ADDIDATA, device::ADDIDATA_APCI7500_2, BoardId::B0_4_115200),
    entry(vendor::ADDIDATA, device::ADDIDATA_APCI7420_2, BoardId::B0_2_115200),
    entry(vendor::ADDIDATA, device::ADDIDATA_APCI7300_2, BoardId::B0_1_115200),
    entry(vendor::ADDIDATA, device::ADDIDATA_APCI7500_3, BoardId::B0_4_115200),
    entry(vendor::ADDIDATA, device::ADDIDATA_APCI7420_3, BoardId::B0_2_115200),
    entry(vendor::ADDIDATA, device::ADDIDATA_APCI7300_3, BoardId::B0_1_115200),
    entry(vendor::ADDIDATA, device::ADDIDATA_APCI7800_3, BoardId::B0_8_115200),
    entry(vendor::ADDIDATA, device::ADDIDATA_APCIE7500, BoardId::AddiDataPcie_4_3906250),
    entry(vendor::ADDIDATA, device::ADDIDATA_APCIE7420, BoardId::AddiDataPcie_2_3906250),
    entry(vendor::ADDIDATA, device::ADDIDATA_APCIE7300, BoardId::AddiDataPcie_1_3906250),
    entry(vendor::ADDIDATA, device::ADDIDATA_APCIE7800, BoardId::AddiDataPcie_8_3906250),
    PciDeviceId::with_subsystem(vendor::NETMOS, device::NETMOS_9835, vendor::IBM, 0x0299)
        .with_data(BoardId::B0_bt_2_115200 as usize),
    PciDeviceId::with_class(0x07, 0x00).with_data(BoardId::Default as usize),
    PciDeviceId::with_class(0x07, 0x03).with_data(BoardId::Default as usize),
];

/// Returns the first ID table entry matching `info`.
#[must_use]
pub fn match_id(info: &PciDeviceInfo) -> Option<&'static PciDeviceId> {
    SERIAL_PCI_IDS.iter().find(|id| id.matches(info))
}
