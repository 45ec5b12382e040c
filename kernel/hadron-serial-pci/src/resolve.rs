//! Port address resolution.
//!
//! Turns a board descriptor and a port index into the BAR, byte offset and
//! register shift of that port. [`default_setup`] covers every board whose
//! ports are either packed into one BAR or spread one per BAR; boards with
//! other layouts provide their own setup hook (see [`crate::quirk`]).

use hadron_driver_api::{PCI_NUM_BARS, PciDeviceInfo};

use crate::board::BoardDescriptor;
use crate::config::UART_REGISTER_BLOCK_SHIFT;
use crate::error::SerialPciError;

/// Address space a port's registers live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressSpace {
    /// x86 I/O port space.
    Io,
    /// Memory-mapped registers.
    Memory,
}

/// Location of one port's register block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPortAddress {
    /// Space of the BAR holding the port.
    pub space: AddressSpace,
    /// BAR index.
    pub bar: usize,
    /// Byte offset of the register block inside the BAR.
    pub offset: u64,
    /// Register shift; always 0 for I/O ports.
    pub register_shift: u32,
}

/// Describes the port at `offset` bytes into BAR `bar`.
///
/// I/O BARs are byte addressed, so `register_shift` only applies to memory
/// BARs.
///
/// # Errors
///
/// Returns [`SerialPciError::OutOfRange`] if `bar` is not a populated BAR.
pub fn port_at_bar(
    info: &PciDeviceInfo,
    bar: usize,
    offset: u64,
    register_shift: u32,
) -> Result<ResolvedPortAddress, SerialPciError> {
    let region = info
        .bar(bar)
        .filter(|r| r.is_io() || r.is_memory())
        .ok_or(SerialPciError::OutOfRange { bar })?;

    Ok(if region.is_memory() {
        ResolvedPortAddress {
            space: AddressSpace::Memory,
            bar,
            offset,
            register_shift,
        }
    } else {
        ResolvedPortAddress {
            space: AddressSpace::Io,
            bar,
            offset,
            register_shift: 0,
        }
    })
}

/// Resolves port `idx` of `board` using the board's flags alone.
///
/// Base-indexed boards put port `n` at the start of BAR `base + n`; all other
/// boards pack ports into the base BAR, `register_stride` bytes apart.
///
/// # Errors
///
/// - [`SerialPciError::PortResolutionExhausted`] if the board caps its ports
///   by region size and port `idx` does not fit.
/// - [`SerialPciError::OutOfRange`] if the port's BAR does not exist.
pub fn default_setup(
    info: &PciDeviceInfo,
    board: &BoardDescriptor,
    idx: u32,
) -> Result<ResolvedPortAddress, SerialPciError> {
    let mut bar = board.base_bar();
    let mut offset = u64::from(board.first_block_offset);
    if board.is_base_indexed() {
        bar += idx as usize;
    } else {
        offset += u64::from(idx) * u64::from(board.register_stride);
    }

    if bar >= PCI_NUM_BARS {
        return Err(SerialPciError::OutOfRange { bar });
    }

    if board.caps_by_region_size() {
        let max_ports = info
            .bar_size(bar)
            .saturating_sub(u64::from(board.first_block_offset))
            >> (board.register_shift + UART_REGISTER_BLOCK_SHIFT);
        if u64::from(idx) >= max_ports {
            return Err(SerialPciError::PortResolutionExhausted);
        }
    }

    port_at_bar(info, bar, offset, board.register_shift)
}

/// Resolves port `idx` of an ADDI-DATA APCI-7800.
///
/// The eight ports sit two per BAR in four consecutive BARs starting at the
/// board's base BAR; any port past the sixth stays in the last BAR.
///
/// # Errors
///
/// Returns [`SerialPciError::OutOfRange`] if the port's BAR does not exist.
pub fn apci7800_setup(
    info: &PciDeviceInfo,
    board: &BoardDescriptor,
    idx: u32,
) -> Result<ResolvedPortAddress, SerialPciError> {
    const PORTS_PER_BAR: u32 = 2;
    const LAST_PAIR: u32 = 3;

    let pair = (idx / PORTS_PER_BAR).min(LAST_PAIR);
    let bar = board.base_bar() + pair as usize;
    let offset = u64::from(board.first_block_offset)
        + u64::from(idx - pair * PORTS_PER_BAR) * u64::from(board.register_stride);

    port_at_bar(info, bar, offset, board.register_shift)
}
