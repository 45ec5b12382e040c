//! Mapped BAR windows.

/// A memory BAR mapped into the kernel address space by
/// [`PciFunction::map_bar`](crate::PciFunction::map_bar).
///
/// UART ports behind a memory BAR are registered with both addresses: the
/// physical one for the core's bookkeeping and the virtual one for register
/// access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MmioRegion {
    phys_base: u64,
    virt_base: u64,
    size: u64,
}

impl MmioRegion {
    /// Describes a mapping of `size` bytes.
    ///
    /// # Safety
    ///
    /// `virt_base` must map `phys_base` for `size` bytes and stay mapped while
    /// any port registered from this region exists.
    #[must_use]
    pub const unsafe fn new(phys_base: u64, virt_base: u64, size: u64) -> Self {
        Self {
            phys_base,
            virt_base,
            size,
        }
    }

    /// Physical start of the BAR.
    #[must_use]
    pub const fn phys_base(&self) -> u64 {
        self.phys_base
    }

    /// Virtual start of the mapping.
    #[must_use]
    pub const fn virt_base(&self) -> u64 {
        self.virt_base
    }

    /// Length of the mapping in bytes.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Physical and virtual address of the byte at `offset`, or `None` past
    /// the end of the window.
    #[must_use]
    pub const fn addr_at(&self, offset: u64) -> Option<(u64, u64)> {
        if offset >= self.size {
            return None;
        }
        match (
            self.phys_base.checked_add(offset),
            self.virt_base.checked_add(offset),
        ) {
            (Some(phys), Some(virt)) => Some((phys, virt)),
            _ => None,
        }
    }
}
