//! Port registration and the per-device session.
//!
//! [`init_ports`] runs a board's init hook and then registers as many of its
//! ports with the UART core as it can. The resulting [`DeviceSession`] owns
//! the registered lines until it is detached.

use alloc::vec::Vec;

use hadron_driver_api::{
    PciDeviceInfo, PciFunction, UartCore, UartIo, UartLine, UartPortConfig, UpfFlags,
};

use crate::board::BoardDescriptor;
use crate::config::DRIVER_NAME;
use crate::error::SerialPciError;
use crate::quirk::{InitOutcome, QuirkEntry};
use crate::resolve::{AddressSpace, ResolvedPortAddress};

/// Lifecycle state of a [`DeviceSession`].
///
/// `Active → Suspended ↔ Active`, and any state `→ Detached`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Ports are registered and running.
    Active,
    /// Ports are registered but quiesced; the board's init was undone.
    Suspended,
    /// Ports were unregistered; the session holds no lines.
    Detached,
}

/// Runtime state of one bound device.
#[derive(Debug)]
pub struct DeviceSession {
    board: BoardDescriptor,
    quirk: &'static QuirkEntry,
    lines: Vec<UartLine>,
    state: SessionState,
}

impl DeviceSession {
    /// The board the session was built for (after guessing, if any).
    #[must_use]
    pub const fn board(&self) -> &BoardDescriptor {
        &self.board
    }

    /// The quirk applied to the device.
    #[must_use]
    pub const fn quirk(&self) -> &'static QuirkEntry {
        self.quirk
    }

    /// Registered lines, in port order.
    #[must_use]
    pub fn lines(&self) -> &[UartLine] {
        &self.lines
    }

    /// Number of ports that were registered.
    #[must_use]
    pub fn registered_count(&self) -> usize {
        self.lines.len()
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Unregisters every port, then undoes the board's init.
    ///
    /// Does nothing on a session that is already detached.
    pub fn detach(&mut self, dev: &dyn PciFunction, uart: &dyn UartCore) {
        if self.state == SessionState::Detached {
            return;
        }
        for line in self.lines.drain(..) {
            uart.unregister_port(line);
        }
        self.quirk.hooks.exit(dev);
        self.state = SessionState::Detached;
        log::debug!("{DRIVER_NAME}: {}: ports detached", dev.info().address);
    }

    /// Quiesces every port, then undoes the board's init.
    ///
    /// The ports stay registered so [`resume_ports`](Self::resume_ports) can
    /// restart them.
    pub fn suspend_ports(&mut self, dev: &dyn PciFunction, uart: &dyn UartCore) {
        if self.state != SessionState::Active {
            return;
        }
        for &line in &self.lines {
            uart.suspend_port(line);
        }
        self.quirk.hooks.exit(dev);
        self.state = SessionState::Suspended;
    }

    /// Reconfigures the board and restarts every port in order.
    pub fn resume_ports(&mut self, dev: &dyn PciFunction, uart: &dyn UartCore) {
        if self.state != SessionState::Suspended {
            return;
        }
        if let Err(e) = self.quirk.hooks.init(dev) {
            let addr = dev.info().address;
            log::warn!("{DRIVER_NAME}: {addr}: board init failed on resume: {e}");
        }
        for &line in &self.lines {
            uart.resume_port(line);
        }
        self.state = SessionState::Active;
    }
}

/// Builds the registration record for a resolved port.
fn port_config(
    dev: &dyn PciFunction,
    template: &UartPortConfig,
    addr: &ResolvedPortAddress,
) -> Result<UartPortConfig, SerialPciError> {
    let io = match addr.space {
        AddressSpace::Memory => {
            let region = dev
                .map_bar(addr.bar)
                .map_err(SerialPciError::ResourceUnavailable)?;
            let (mapbase, membase) = region
                .addr_at(addr.offset)
                .ok_or(SerialPciError::OutOfRange { bar: addr.bar })?;
            UartIo::Mem { mapbase, membase }
        }
        AddressSpace::Io => {
            let start = dev
                .info()
                .bar(addr.bar)
                .ok_or(SerialPciError::OutOfRange { bar: addr.bar })?
                .start();
            UartIo::Port {
                iobase: start + addr.offset,
            }
        }
    };
    Ok(UartPortConfig {
        io,
        regshift: addr.register_shift,
        ..*template
    })
}

fn template_for(board: &BoardDescriptor, info: &PciDeviceInfo) -> UartPortConfig {
    UartPortConfig {
        io: UartIo::Port { iobase: 0 },
        regshift: 0,
        uartclk: board.uart_clock(),
        irq: board.irq_for(info),
        flags: UpfFlags::SKIP_TEST | UpfFlags::BOOT_AUTOCONF | UpfFlags::SHARE_IRQ,
    }
}

/// Configures `board` on `dev` and registers its ports with `uart`.
///
/// Enumeration stops at the first port that cannot be resolved, mapped or
/// registered; the ports before it stay registered. A session with zero
/// ports is not an error.
///
/// # Errors
///
/// Returns [`SerialPciError::QuirkInitFailed`] if the board's init hook
/// fails. The exit hook has run by then and nothing is registered.
pub fn init_ports(
    dev: &dyn PciFunction,
    board: &BoardDescriptor,
    quirk: &'static QuirkEntry,
    uart: &dyn UartCore,
) -> Result<DeviceSession, SerialPciError> {
    let info = dev.info();
    let addr = info.address;

    let nr_ports = match quirk.hooks.init(dev) {
        Ok(InitOutcome::UseBoard) => board.port_count,
        Ok(InitOutcome::Ports(n)) => n.get(),
        Err(e) => {
            log::error!("{DRIVER_NAME}: {addr}: board init failed: {e}");
            quirk.hooks.exit(dev);
            return Err(SerialPciError::QuirkInitFailed(e));
        }
    };

    let template = template_for(board, info);
    let mut lines = Vec::with_capacity(nr_ports as usize);

    for idx in 0..nr_ports {
        let config = match quirk
            .hooks
            .setup(info, board, idx)
            .and_then(|resolved| port_config(dev, &template, &resolved))
        {
            Ok(config) => config,
            Err(SerialPciError::PortResolutionExhausted) => break,
            Err(e) => {
                log::error!("{DRIVER_NAME}: {addr}: cannot set up port {idx}: {e}");
                break;
            }
        };

        log::debug!(
            "{DRIVER_NAME}: {addr}: setup port {idx}: {:?}, irq {}",
            config.io,
            config.irq
        );

        match uart.register_port(&config) {
            Ok(line) => lines.push(line),
            Err(e) => {
                log::error!(
                    "{DRIVER_NAME}: {addr}: couldn't register serial port {:?}, irq {}: {}",
                    config.io,
                    config.irq,
                    SerialPciError::PortRegistrationFailed(e)
                );
                break;
            }
        }
    }

    log::info!(
        "{DRIVER_NAME}: {addr}: {} of {nr_ports} ports registered",
        lines.len()
    );

    Ok(DeviceSession {
        board: *board,
        quirk,
        lines,
        state: SessionState::Active,
    })
}

#[cfg(test)]
mod tests {
    use core::num::NonZeroU32;
    use core::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use hadron_driver_api::{DriverError, MmioRegion};

    use super::*;
    use crate::board::{BoardFlags, BoardId};
    use crate::quirk::{QUIRKS, SerialQuirk, find_quirk};
    use crate::testutil::{io, make_info, mem};

    struct Dev {
        info: PciDeviceInfo,
    }

    impl PciFunction for Dev {
        fn info(&self) -> &PciDeviceInfo {
            &self.info
        }
        fn enable(&self) -> Result<(), DriverError> {
            Ok(())
        }
        fn disable(&self) {}
        fn save_state(&self) {}
        fn restore_state(&self) {}
        fn map_bar(&self, bar: usize) -> Result<MmioRegion, DriverError> {
            let b = self.info.bar(bar).ok_or(DriverError::DeviceNotFound)?;
            // SAFETY: test-only fake mapping; nothing dereferences it.
            Ok(unsafe { MmioRegion::new(b.start(), 0xFFFF_8000_0000_0000 + b.start(), b.size()) })
        }
    }

    #[derive(Default)]
    struct Uart {
        registered: Mutex<Vec<UartPortConfig>>,
        fail_at: Option<usize>,
        unregistered: Mutex<Vec<UartLine>>,
        suspended: AtomicUsize,
    }

    impl UartCore for Uart {
        fn register_port(&self, config: &UartPortConfig) -> Result<UartLine, DriverError> {
            let mut regs = self.registered.lock().unwrap();
            if Some(regs.len()) == self.fail_at {
                return Err(DriverError::OutOfResources);
            }
            regs.push(*config);
            Ok(UartLine(regs.len() as u32 - 1))
        }
        fn unregister_port(&self, line: UartLine) {
            self.unregistered.lock().unwrap().push(line);
        }
        fn suspend_port(&self, _line: UartLine) {
            self.suspended.fetch_add(1, Ordering::Relaxed);
        }
        fn resume_port(&self, _line: UartLine) {}
    }

    fn apci7500() -> Dev {
        let mut info = make_info(0x15B8, 0x7000, 0x0700);
        info.bars[0] = io(0xE000, 32);
        Dev { info }
    }

    #[test]
    fn io_ports_get_bar_start_plus_offset() {
        let dev = apci7500();
        let uart = Uart::default();
        let board = BoardId::B0_4_115200.descriptor();
        let session = init_ports(&dev, board, find_quirk(0x15B8, 0x7000, 0, 0), &uart).unwrap();
        assert_eq!(session.registered_count(), 4);
        let regs = uart.registered.lock().unwrap();
        let bases: Vec<UartIo> = regs.iter().map(|c| c.io).collect();
        assert_eq!(
            bases,
            [0xE000, 0xE008, 0xE010, 0xE018].map(|iobase| UartIo::Port { iobase })
        );
        assert!(regs.iter().all(|c| c.uartclk == 1_843_200 && c.irq == 11));
        assert!(regs[0].flags.contains(UpfFlags::SHARE_IRQ | UpfFlags::SKIP_TEST));
    }

    #[test]
    fn mmio_ports_carry_both_addresses() {
        let mut info = make_info(0x15B8, 0x7012, 0x0700);
        info.bars[0] = mem(0xFEB0_0000, 0x2000);
        let dev = Dev { info };
        let uart = Uart::default();
        let board = BoardId::AddiDataPcie_2_3906250.descriptor();
        init_ports(&dev, board, &QUIRKS[1], &uart).unwrap();
        let regs = uart.registered.lock().unwrap();
        assert_eq!(
            regs[1].io,
            UartIo::Mem {
                mapbase: 0xFEB0_1200,
                membase: 0xFFFF_8000_FEB0_1200,
            }
        );
        assert_eq!(regs[1].uartclk, 3_906_250 * 16);
    }

    #[test]
    fn no_irq_board_registers_irq_zero() {
        let dev = apci7500();
        let uart = Uart::default();
        let mut board = *BoardId::B0_1_115200.descriptor();
        board.flags |= BoardFlags::NO_IRQ;
        init_ports(&dev, &board, &QUIRKS[1], &uart).unwrap();
        assert_eq!(uart.registered.lock().unwrap()[0].irq, 0);
    }

    #[test]
    fn rejected_port_truncates_session() {
        let dev = apci7500();
        let uart = Uart {
            fail_at: Some(2),
            ..Uart::default()
        };
        let session =
            init_ports(&dev, BoardId::B0_4_115200.descriptor(), &QUIRKS[1], &uart).unwrap();
        assert_eq!(session.lines(), &[UartLine(0), UartLine(1)]);
    }

    #[test]
    fn out_of_range_bar_truncates_session() {
        let mut info = make_info(0x15B8, 0x7000, 0x0700);
        info.bars[4] = io(0xE000, 8);
        info.bars[5] = io(0xE008, 8);
        let dev = Dev { info };
        let uart = Uart::default();
        let board = BoardDescriptor::new(BoardFlags::base(4) | BoardFlags::BASE_BARS, 4, 115_200);
        let session = init_ports(&dev, &board, &QUIRKS[1], &uart).unwrap();
        assert_eq!(session.registered_count(), 2);
    }

    struct TwoPorts;
    impl SerialQuirk for TwoPorts {
        fn init(&self, _dev: &dyn PciFunction) -> Result<InitOutcome, DriverError> {
            Ok(InitOutcome::Ports(NonZeroU32::new(2).unwrap()))
        }
    }
    static TWO_PORTS: QuirkEntry = QuirkEntry::new("two", 0x15B8, 0x7000, &TwoPorts);

    #[test]
    fn init_override_limits_port_count() {
        let dev = apci7500();
        let uart = Uart::default();
        let session =
            init_ports(&dev, BoardId::B0_4_115200.descriptor(), &TWO_PORTS, &uart).unwrap();
        assert_eq!(session.registered_count(), 2);
    }

    #[test]
    fn detach_is_idempotent() {
        let dev = apci7500();
        let uart = Uart::default();
        let mut session =
            init_ports(&dev, BoardId::B0_2_115200.descriptor(), &QUIRKS[1], &uart).unwrap();
        session.detach(&dev, &uart);
        session.detach(&dev, &uart);
        assert_eq!(*uart.unregistered.lock().unwrap(), [UartLine(0), UartLine(1)]);
        assert_eq!(session.state(), SessionState::Detached);
        assert_eq!(session.registered_count(), 0);
    }

    #[test]
    fn second_suspend_is_ignored() {
        let dev = apci7500();
        let uart = Uart::default();
        let mut session =
            init_ports(&dev, BoardId::B0_2_115200.descriptor(), &QUIRKS[1], &uart).unwrap();
        session.suspend_ports(&dev, &uart);
        session.suspend_ports(&dev, &uart);
        assert_eq!(uart.suspended.load(Ordering::Relaxed), 2);
        assert_eq!(session.state(), SessionState::Suspended);
        session.resume_ports(&dev, &uart);
        assert_eq!(session.state(), SessionState::Active);
    }
}
