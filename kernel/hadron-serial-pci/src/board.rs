//! Board descriptor table.
//!
//! Describes the general nature of each supported board: number of ports,
//! UART clock, and where the ports live. The table is indexed by [`BoardId`],
//! whose discriminant is stored as `driver_data` in the device ID table.

use bitflags::bitflags;
use hadron_driver_api::PciDeviceInfo;

use crate::config::{UART_CLOCK_MULTIPLIER, UART_REGISTER_BLOCK};

bitflags! {
    /// Addressing flags of a board.
    ///
    /// The low three bits hold the index of the first BAR used by the board
    /// (see [`BoardFlags::base`]); the remaining bits select the addressing
    /// scheme.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BoardFlags: u32 {
        /// Bits holding the first BAR index.
        const BASE_MASK     = 0x0007;
        /// Each port has its own BAR, starting at the base BAR.
        const BASE_BARS     = 0x0008;
        /// Ports are polled; no interrupt line is passed to the UART core.
        const NO_IRQ        = 0x0080;
        /// Never register more ports than the base region can hold.
        const REGION_SZ_CAP = 0x0100;
    }
}

impl BoardFlags {
    /// Flags selecting `bar` as the base BAR and no other options.
    #[must_use]
    pub const fn base(bar: u32) -> Self {
        Self::from_bits_retain(bar & Self::BASE_MASK.bits())
    }

    /// Returns the base BAR index.
    #[must_use]
    pub const fn base_bar(self) -> usize {
        (self.bits() & Self::BASE_MASK.bits()) as usize
    }
}

/// Static configuration of a serial board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardDescriptor {
    /// Base BAR and addressing scheme.
    pub flags: BoardFlags,
    /// Number of UART channels on the board.
    pub port_count: u32,
    /// Maximum baud rate; the UART clock is 16 times this.
    pub base_baud: u32,
    /// Byte distance between consecutive ports in the same BAR.
    pub register_stride: u32,
    /// Register index is shifted left by this amount to get the byte offset.
    pub register_shift: u32,
    /// Byte offset of the first port inside its BAR.
    pub first_block_offset: u32,
}

impl BoardDescriptor {
    /// Creates a descriptor with 8-byte register blocks packed from offset 0.
    #[must_use]
    pub const fn new(flags: BoardFlags, port_count: u32, base_baud: u32) -> Self {
        Self {
            flags,
            port_count,
            base_baud,
            register_stride: UART_REGISTER_BLOCK,
            register_shift: 0,
            first_block_offset: 0,
        }
    }

    /// Returns a copy with the given spacing between ports.
    #[must_use]
    pub const fn with_stride(mut self, stride: u32) -> Self {
        self.register_stride = stride;
        self
    }

    /// Returns a copy with port 0 starting at `offset` in its BAR.
    #[must_use]
    pub const fn with_first_offset(mut self, offset: u32) -> Self {
        self.first_block_offset = offset;
        self
    }

    /// Returns the first BAR used by the board.
    #[must_use]
    pub const fn base_bar(&self) -> usize {
        self.flags.base_bar()
    }

    /// Returns `true` if every port has a BAR of its own.
    #[must_use]
    pub const fn is_base_indexed(&self) -> bool {
        self.flags.contains(BoardFlags::BASE_BARS)
    }

    /// Returns `true` if the base region size limits the port count.
    #[must_use]
    pub const fn caps_by_region_size(&self) -> bool {
        self.flags.contains(BoardFlags::REGION_SZ_CAP)
    }

    /// UART input clock in Hz.
    #[must_use]
    pub const fn uart_clock(&self) -> u32 {
        self.base_baud * UART_CLOCK_MULTIPLIER
    }

    /// Interrupt line to hand to the UART core for ports of this board.
    #[must_use]
    pub fn irq_for(&self, info: &PciDeviceInfo) -> u32 {
        if self.flags.contains(BoardFlags::NO_IRQ) {
            0
        } else {
            u32::from(info.interrupt_line)
        }
    }

    /// Returns `true` if `other` describes the same port layout and clock.
    ///
    /// Flags are not compared: a guessed board and a cataloged board with a
    /// different base BAR encoding are still the same board.
    #[must_use]
    pub fn same_layout(&self, other: &Self) -> bool {
        self.port_count == other.port_count
            && self.base_baud == other.base_baud
            && self.register_stride == other.register_stride
            && self.register_shift == other.register_shift
            && self.first_block_offset == other.first_block_offset
    }
}

/// Index into the board table.
///
/// Names follow `B<bar>[_bt]_<ports>_<baud>`: `bar` is the base BAR, `_bt`
/// means one BAR per port, `ports` the number of ports and `baud` the base
/// baud rate.
#[allow(missing_docs, non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum BoardId {
    /// Unknown board; the layout is guessed from the BARs.
    Default = 0,

    B0_1_115200,
    B0_2_115200,
    B0_4_115200,
    B0_5_115200,
    B0_8_115200,

    B0_1_921600,
    B0_2_921600,
    B0_4_921600,

    B0_2_1130000,

    B0_4_1152000,

    B0_4_1250000,

    B0_2_1843200,
    B0_4_1843200,

    B0_1_4000000,

    B0_bt_1_115200,
    B0_bt_2_115200,
    B0_bt_4_115200,
    B0_bt_8_115200,

    B0_bt_1_460800,
    B0_bt_2_460800,
    B0_bt_4_460800,

    B0_bt_1_921600,
    B0_bt_2_921600,
    B0_bt_4_921600,
    B0_bt_8_921600,

    B1_8_115200,

    /// ADDI-DATA APCIe-7300.
    AddiDataPcie_1_3906250,
    /// ADDI-DATA APCIe-7420.
    AddiDataPcie_2_3906250,
    /// ADDI-DATA APCIe-7500.
    AddiDataPcie_4_3906250,
    /// ADDI-DATA APCIe-7800.
    AddiDataPcie_8_3906250,
}

impl BoardId {
    /// Number of boards in the table.
    pub const COUNT: usize = Self::AddiDataPcie_8_3906250 as usize + 1;

    /// Returns the descriptor for this board.
    #[must_use]
    pub const fn descriptor(self) -> &'static BoardDescriptor {
        &BOARDS[self as usize]
    }
}

const B0: BoardFlags = BoardFlags::base(0);
const B0_BT: BoardFlags = BoardFlags::base(0).union(BoardFlags::BASE_BARS);
const B1: BoardFlags = BoardFlags::base(1);

/// ADDI-DATA PCI-Express boards: 0x200 between ports, first port at 0x1000.
const fn addidata_pcie(port_count: u32) -> BoardDescriptor {
    BoardDescriptor::new(B0, port_count, 3_906_250)
        .with_stride(0x200)
        .with_first_offset(0x1000)
}

static BOARDS: [BoardDescriptor; BoardId::COUNT] = [
    // Default
    BoardDescriptor::new(B0, 1, 115_200),
    // B0_*_115200
    BoardDescriptor::new(B0, 1, 115_200),
    BoardDescriptor::new(B0, 2, 115_200),
    BoardDescriptor::new(B0, 4, 115_200),
    BoardDescriptor::new(B0, 5, 115_200),
    BoardDescriptor::new(B0, 8, 115_200),
    // B0_*_921600
    BoardDescriptor::new(B0, 1, 921_600),
    BoardDescriptor::new(B0, 2, 921_600),
    BoardDescriptor::new(B0, 4, 921_600),
    BoardDescriptor::new(B0, 2, 1_130_000),
    BoardDescriptor::new(B0, 4, 1_152_000),
    BoardDescriptor::new(B0, 4, 1_250_000),
    BoardDescriptor::new(B0, 2, 1_843_200),
    BoardDescriptor::new(B0, 4, 1_843_200),
    BoardDescriptor::new(B0, 1, 4_000_000),
    // B0_bt_*_115200
    BoardDescriptor::new(B0_BT, 1, 115_200),
    BoardDescriptor::new(B0_BT, 2, 115_200),
    BoardDescriptor::new(B0_BT, 4, 115_200),
    BoardDescriptor::new(B0_BT, 8, 115_200),
    // B0_bt_*_460800
    BoardDescriptor::new(B0_BT, 1, 460_800),
    BoardDescriptor::new(B0_BT, 2, 460_800),
    BoardDescriptor::new(B0_BT, 4, 460_800),
    // B0_bt_*_921600
    BoardDescriptor::new(B0_BT, 1, 921_600),
    BoardDescriptor::new(B0_BT, 2, 921_600),
    BoardDescriptor::new(B0_BT, 4, 921_600),
    BoardDescriptor::new(B0_BT, 8, 921_600),
    // B1_8_115200
    BoardDescriptor::new(B1, 8, 115_200),
    // ADDI-DATA PCI-Express
    addidata_pcie(1),
    addidata_pcie(2),
    addidata_pcie(4),
    addidata_pcie(8),
];

/// Looks up a board by its table index (the `driver_data` of an ID entry).
#[must_use]
pub fn board(index: usize) -> Option<&'static BoardDescriptor> {
    BOARDS.get(index)
}
