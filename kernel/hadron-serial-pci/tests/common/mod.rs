//! Recording fakes of the PCI and UART collaborators.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use hadron_driver_api::{
    DriverError, MmioRegion, PCI_NUM_BARS, PciAddress, PciBar, PciDeviceInfo, PciFunction,
    UartCore, UartLine, UartPortConfig,
};

/// A collaborator call, in the order it happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Enable,
    Disable,
    SaveState,
    RestoreState,
    MapBar(usize),
    Register(UartLine),
    Unregister(UartLine),
    Suspend(UartLine),
    Resume(UartLine),
}

/// Event log shared by a [`FakeDevice`] and a [`FakeUart`].
pub type Log = Arc<Mutex<Vec<Event>>>;

pub fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn init_logging() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Debug)
        .try_init();
}

pub struct FakeDevice {
    pub info: PciDeviceInfo,
    pub fail_enable: AtomicBool,
    log: Log,
}

impl FakeDevice {
    /// A device with no BARs; `class` is `class << 8 | subclass`.
    pub fn new(vendor: u16, device: u16, class: u16, log: &Log) -> Self {
        let [class, subclass] = class.to_be_bytes();
        Self {
            info: PciDeviceInfo {
                address: PciAddress {
                    bus: 3,
                    device: 4,
                    function: 0,
                },
                vendor_id: vendor,
                device_id: device,
                revision: 1,
                prog_if: 0x02,
                subclass,
                class,
                header_type: 0,
                subsystem_vendor_id: vendor,
                subsystem_device_id: device,
                interrupt_line: 17,
                interrupt_pin: 1,
                bars: [PciBar::Unused; PCI_NUM_BARS],
            },
            fail_enable: AtomicBool::new(false),
            log: Arc::clone(log),
        }
    }

    pub fn with_io_bar(mut self, bar: usize, base: u32, size: u32) -> Self {
        self.info.bars[bar] = PciBar::Io { base, size };
        self
    }

    pub fn with_mem_bar(mut self, bar: usize, base: u64, size: u64) -> Self {
        self.info.bars[bar] = PciBar::Memory {
            base,
            size,
            prefetchable: false,
            is_64bit: false,
        };
        self
    }

    fn record(&self, event: Event) {
        self.log.lock().unwrap().push(event);
    }
}

impl PciFunction for FakeDevice {
    fn info(&self) -> &PciDeviceInfo {
        &self.info
    }

    fn enable(&self) -> Result<(), DriverError> {
        self.record(Event::Enable);
        if self.fail_enable.load(Ordering::SeqCst) {
            Err(DriverError::IoError)
        } else {
            Ok(())
        }
    }

    fn disable(&self) {
        self.record(Event::Disable);
    }

    fn save_state(&self) {
        self.record(Event::SaveState);
    }

    fn restore_state(&self) {
        self.record(Event::RestoreState);
    }

    fn map_bar(&self, bar: usize) -> Result<MmioRegion, DriverError> {
        self.record(Event::MapBar(bar));
        match self.info.bars.get(bar) {
            // SAFETY: the fake mapping is never dereferenced.
            Some(&PciBar::Memory { base, size, .. }) => {
                Ok(unsafe { MmioRegion::new(base, 0xFFFF_9000_0000_0000 | base, size) })
            }
            _ => Err(DriverError::InvalidState),
        }
    }
}

/// A UART core handing out ever-increasing line numbers.
pub struct FakeUart {
    next_line: AtomicU32,
    attempts: AtomicU32,
    /// Registration attempts (0-based) that are rejected.
    pub reject: Mutex<Vec<u32>>,
    pub configs: Mutex<Vec<UartPortConfig>>,
    log: Log,
}

impl FakeUart {
    pub fn new(log: &Log) -> Self {
        Self {
            next_line: AtomicU32::new(0),
            attempts: AtomicU32::new(0),
            reject: Mutex::new(Vec::new()),
            configs: Mutex::new(Vec::new()),
            log: Arc::clone(log),
        }
    }

    pub fn rejecting(self, attempt: u32) -> Self {
        self.reject.lock().unwrap().push(attempt);
        self
    }

    fn record(&self, event: Event) {
        self.log.lock().unwrap().push(event);
    }
}

impl UartCore for FakeUart {
    fn register_port(&self, config: &UartPortConfig) -> Result<UartLine, DriverError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.reject.lock().unwrap().contains(&attempt) {
            return Err(DriverError::OutOfResources);
        }
        let line = UartLine(self.next_line.fetch_add(1, Ordering::SeqCst));
        self.configs.lock().unwrap().push(*config);
        self.record(Event::Register(line));
        Ok(line)
    }

    fn unregister_port(&self, line: UartLine) {
        self.record(Event::Unregister(line));
    }

    fn suspend_port(&self, line: UartLine) {
        self.record(Event::Suspend(line));
    }

    fn resume_port(&self, line: UartLine) {
        self.record(Event::Resume(line));
    }
}

/// Returns the logged events that satisfy `pred`.
pub fn events(log: &Log, pred: impl Fn(&Event) -> bool) -> Vec<Event> {
    log.lock().unwrap().iter().copied().filter(|e| pred(e)).collect()
}
