//! Compile-time configuration of the PCI serial probe driver.
//!
//! A single source of truth for the constants the board tables, the
//! heuristics and the port setup code agree on.

/// Driver name reported to the PCI core and used in log messages.
pub const DRIVER_NAME: &str = "addi_serial";

/// The UART input clock is this many times the board's base baud rate.
pub const UART_CLOCK_MULTIPLIER: u32 = 16;

/// Size of one 16550 register block in bytes, at register shift 0.
pub const UART_REGISTER_BLOCK: u32 = 8;

/// `log2(UART_REGISTER_BLOCK)`, used when capping port counts by region size.
pub const UART_REGISTER_BLOCK_SHIFT: u32 = 3;

/// Highest programming interface byte the heuristics accept (16950-compatible).
pub const MAX_GUESSABLE_PROG_IF: u8 = 6;

/// Whether explicit catalog entries are cross-checked against the heuristics.
pub const REDUNDANT_ENTRY_CHECK: bool = cfg!(feature = "redundant-entry-check");

const _: () = assert!(1 << UART_REGISTER_BLOCK_SHIFT == UART_REGISTER_BLOCK);
