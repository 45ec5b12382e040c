//! Board layout heuristics for serial functions missing from the ID table.
//!
//! Most generic boards put all their 16550s either into a single I/O BAR,
//! 8 bytes apart, or into a run of consecutive 8-byte I/O BARs, one port
//! each. The single-BAR case is checked first.

use hadron_driver_api::pci::class;
use hadron_driver_api::PciDeviceInfo;

use crate::board::{BoardDescriptor, BoardFlags, BoardId};
use crate::config::{MAX_GUESSABLE_PROG_IF, UART_REGISTER_BLOCK};
use crate::error::SerialPciError;

/// Checks that `info` is a serial, multiport serial or modem function with a
/// 16550-compatible programming interface.
///
/// # Errors
///
/// Returns [`SerialPciError::Unsupported`] for any other class or programming
/// interface.
pub fn check_communication_class(info: &PciDeviceInfo) -> Result<(), SerialPciError> {
    let is_comm = matches!(
        info.class_subclass(),
        class::COMMUNICATION_SERIAL | class::COMMUNICATION_MULTISERIAL | class::COMMUNICATION_MODEM
    );
    if !is_comm || info.prog_if > MAX_GUESSABLE_PROG_IF {
        return Err(SerialPciError::Unsupported);
    }
    Ok(())
}

/// Infers a board layout from the BARs of `info`.
///
/// The result is the default board with its base BAR, addressing mode and
/// port count replaced; clock, stride and offsets keep their defaults.
///
/// # Errors
///
/// - [`SerialPciError::Unsupported`] if the function is not a 16550-style
///   communication device.
/// - [`SerialPciError::GuessFailed`] for multiport serial functions (too
///   varied to guess) and for BAR layouts matching neither heuristic.
pub fn guess_board(info: &PciDeviceInfo) -> Result<BoardDescriptor, SerialPciError> {
    check_communication_class(info)?;

    if info.class_subclass() == class::COMMUNICATION_MULTISERIAL {
        return Err(SerialPciError::GuessFailed);
    }

    let mut board = *BoardId::Default.descriptor();

    let num_iomem = info.bars.iter().filter(|b| b.is_memory()).count();
    let mut io_bars = info.bars.iter().enumerate().filter(|(_, b)| b.is_io());
    let first_port = io_bars.next().map(|(i, _)| i);
    let num_port = first_port.map_or(0, |_| 1 + io_bars.count());

    // One I/O BAR (and at most one memory BAR): every 8 bytes is a port.
    if let Some(bar) = first_port.filter(|_| num_iomem <= 1 && num_port == 1) {
        let ports = info.bar_size(bar) / u64::from(UART_REGISTER_BLOCK);
        if ports == 0 {
            return Err(SerialPciError::GuessFailed);
        }
        board.flags = BoardFlags::base(bar as u32);
        board.port_count = u32::try_from(ports).map_err(|_| SerialPciError::GuessFailed)?;
        return Ok(board);
    }

    // A run of consecutive 8-byte I/O BARs: one port per BAR.
    let mut first = None;
    let mut count = 0;
    for (i, bar) in info.bars.iter().enumerate() {
        if bar.is_io()
            && bar.size() == u64::from(UART_REGISTER_BLOCK)
            && first.is_none_or(|f| f + count == i)
        {
            count += 1;
            first.get_or_insert(i);
        }
    }

    match first {
        Some(bar) if count > 1 => {
            board.flags = BoardFlags::base(bar as u32) | BoardFlags::BASE_BARS;
            board.port_count = count as u32;
            Ok(board)
        }
        _ => Err(SerialPciError::GuessFailed),
    }
}
