//! PCI driver entry points.
//!
//! [`SerialPciDriver`] is what the PCI subsystem binds to matching
//! functions. Probe returns a [`DeviceSession`] that the platform stores with
//! the device and hands back on every later callback.

use hadron_driver_api::{
    PciChannelState, PciDeviceId, PciDeviceInfo, PciErsResult, PciFunction, UartCore,
};

use crate::board::{self, BoardDescriptor, BoardId};
use crate::config::{DRIVER_NAME, REDUNDANT_ENTRY_CHECK};
use crate::error::SerialPciError;
use crate::guess::guess_board;
use crate::ids::{self, SERIAL_PCI_IDS};
use crate::ports::{self, DeviceSession, SessionState};
use crate::quirk::{self, QUIRKS, QuirkEntry};

/// Probe driver for PCI 8250-compatible serial boards.
pub struct SerialPciDriver<U> {
    uart: U,
    quirks: &'static [QuirkEntry],
}

impl<U: UartCore> SerialPciDriver<U> {
    /// Driver name.
    pub const NAME: &'static str = DRIVER_NAME;

    /// Devices this driver binds to.
    #[must_use]
    pub fn id_table() -> &'static [PciDeviceId] {
        &SERIAL_PCI_IDS
    }

    /// Creates the driver on top of the system UART core.
    #[must_use]
    pub const fn new(uart: U) -> Self {
        Self::with_quirks(uart, &QUIRKS)
    }

    /// Creates the driver with a custom quirk registry.
    #[must_use]
    pub const fn with_quirks(uart: U, quirks: &'static [QuirkEntry]) -> Self {
        Self { uart, quirks }
    }

    /// The UART core ports are registered with.
    #[must_use]
    pub const fn uart(&self) -> &U {
        &self.uart
    }

    /// Binds to `dev`, which matched the ID table entry whose `driver_data`
    /// is `board_index`.
    ///
    /// # Errors
    ///
    /// - [`SerialPciError::QuirkProbeRejected`] if the board's probe hook
    ///   refuses the device. No resource was claimed.
    /// - [`SerialPciError::Unsupported`] if `board_index` is not a board, or
    ///   the device is not a serial function the heuristics understand.
    /// - [`SerialPciError::ResourceUnavailable`] if the device cannot be
    ///   enabled.
    /// - [`SerialPciError::GuessFailed`] if the layout of an uncataloged board
    ///   cannot be inferred.
    /// - [`SerialPciError::QuirkInitFailed`] if the board's init hook fails.
    pub fn probe(
        &self,
        dev: &dyn PciFunction,
        board_index: usize,
    ) -> Result<DeviceSession, SerialPciError> {
        let info = dev.info();
        let quirk = quirk::find_quirk_for(self.quirks, info);

        quirk
            .hooks
            .probe(dev)
            .map_err(SerialPciError::QuirkProbeRejected)?;

        let Some(catalog) = board::board(board_index) else {
            log::error!("{DRIVER_NAME}: {}: invalid driver_data: {board_index}", info.address);
            return Err(SerialPciError::Unsupported);
        };

        dev.enable().map_err(SerialPciError::ResourceUnavailable)?;
        dev.save_state();

        let result = self.configure(dev, info, catalog, board_index, quirk);
        if result.is_err() {
            dev.disable();
        }
        result
    }

    fn configure(
        &self,
        dev: &dyn PciFunction,
        info: &PciDeviceInfo,
        catalog: &BoardDescriptor,
        board_index: usize,
        quirk: &'static QuirkEntry,
    ) -> Result<DeviceSession, SerialPciError> {
        let board = if board_index == BoardId::Default as usize {
            guess_board(info).inspect_err(|e| {
                log::warn!("{DRIVER_NAME}: {}: {e}", info.address);
            })?
        } else {
            // Diagnostic only: the catalog entry always wins.
            if REDUNDANT_ENTRY_CHECK && is_redundant_entry(info, catalog) {
                report_redundant_entry(info);
            }
            *catalog
        };

        ports::init_ports(dev, &board, quirk, &self.uart)
    }

    /// Looks `dev` up in the ID table and probes it.
    ///
    /// # Errors
    ///
    /// Returns [`SerialPciError::Unsupported`] if no entry matches, otherwise
    /// see [`probe`](Self::probe).
    pub fn probe_matched(&self, dev: &dyn PciFunction) -> Result<DeviceSession, SerialPciError> {
        let id = ids::match_id(dev.info()).ok_or(SerialPciError::Unsupported)?;
        self.probe(dev, id.driver_data)
    }

    /// Unbinds from `dev`, unregistering all its ports.
    pub fn remove(&self, dev: &dyn PciFunction, mut session: DeviceSession) {
        session.detach(dev, &self.uart);
    }

    /// Quiesces the device's ports for system sleep.
    #[cfg(feature = "pm-sleep")]
    pub fn suspend(&self, dev: &dyn PciFunction, session: Option<&mut DeviceSession>) {
        if let Some(session) = session {
            session.suspend_ports(dev, &self.uart);
        }
    }

    /// Re-enables the device and restarts its ports after system sleep.
    #[cfg(feature = "pm-sleep")]
    pub fn resume(&self, dev: &dyn PciFunction, session: Option<&mut DeviceSession>) {
        let Some(session) = session else {
            return;
        };
        // The device may have been disabled while asleep.
        if let Err(e) = dev.enable() {
            log::error!(
                "{DRIVER_NAME}: {}: unable to re-enable ports, trying to continue: {e}",
                dev.info().address
            );
        }
        session.resume_ports(dev, &self.uart);
    }

    /// Reacts to a PCI channel error on `dev`.
    #[must_use]
    pub fn io_error_detected(
        &self,
        dev: &dyn PciFunction,
        session: Option<&mut DeviceSession>,
        state: PciChannelState,
    ) -> PciErsResult {
        if state == PciChannelState::PermanentFailure {
            return PciErsResult::Disconnect;
        }
        if let Some(session) = session {
            session.detach(dev, &self.uart);
        }
        dev.disable();
        PciErsResult::NeedReset
    }

    /// Brings the device back after a slot reset.
    #[must_use]
    pub fn slot_reset(&self, dev: &dyn PciFunction) -> PciErsResult {
        if let Err(e) = dev.enable() {
            log::error!("{DRIVER_NAME}: {}: cannot re-enable after reset: {e}", dev.info().address);
            return PciErsResult::Disconnect;
        }
        dev.restore_state();
        dev.save_state();
        PciErsResult::Recovered
    }

    /// Re-registers the device's ports once traffic may flow again.
    ///
    /// A session that still holds ports is detached first. The session is
    /// replaced only if the new one could be built; otherwise the old,
    /// detached session stays in place.
    pub fn io_resume(&self, dev: &dyn PciFunction, session: Option<&mut DeviceSession>) {
        let Some(session) = session else {
            return;
        };
        if session.state() != SessionState::Detached {
            log::warn!(
                "{DRIVER_NAME}: {}: resumed without a prior error report, releasing ports",
                dev.info().address
            );
            session.detach(dev, &self.uart);
        }
        match ports::init_ports(dev, session.board(), session.quirk(), &self.uart) {
            Ok(fresh) => *session = fresh,
            Err(e) => log::error!(
                "{DRIVER_NAME}: {}: cannot restore ports after error recovery: {e}",
                dev.info().address
            ),
        }
    }
}

/// Whether the heuristics alone would describe `info` the way `catalog` does.
fn is_redundant_entry(info: &PciDeviceInfo, catalog: &BoardDescriptor) -> bool {
    guess_board(info).is_ok_and(|guess| guess.same_layout(catalog))
}

/// Logs a catalog entry that the heuristics would have detected anyway.
fn report_redundant_entry(info: &PciDeviceInfo) {
    log::warn!(
        "{DRIVER_NAME}: {}: redundant entry in serial PCI table; please report \
         ({:#06x},{:#06x},{:#06x},{:#06x}) with the board's manufacturer and name",
        info.address,
        info.vendor_id,
        info.device_id,
        info.subsystem_vendor_id,
        info.subsystem_device_id
    );
}
