//! Register access layer
//!
//! The controller is driven entirely through 32-bit registers at fixed byte
//! offsets from a memory-mapped base. Accesses are synchronous, uncached and
//! never retried. A bus fault on a real mapping is fatal to the access path
//! and is not modelled as an error.
//!
//! All methods take `&self`: an MMIO window is shared between the
//! interrupt handler and task context the same way the hardware is. Callers
//! serialise logically related sequences with their own locks.

use core::ptr::NonNull;

/// 32-bit register space addressed by byte offset.
pub trait RegisterSpace {
    /// Read the register at `offset`.
    fn read(&self, offset: u32) -> u32;

    /// Write `value` to the register at `offset`.
    fn write(&self, offset: u32, value: u32);

    /// Read-modify-write: bits in `mask` take the corresponding bits of
    /// `value`, all other bits keep their current state.
    ///
    /// Bits of `value` outside `mask` are ignored.
    fn modify(&self, offset: u32, mask: u32, value: u32) {
        let current = self.read(offset);
        self.write(offset, (current & !mask) | (value & mask));
    }
}

impl<T: RegisterSpace + ?Sized> RegisterSpace for &T {
    fn read(&self, offset: u32) -> u32 {
        (**self).read(offset)
    }

    fn write(&self, offset: u32, value: u32) {
        (**self).write(offset, value);
    }

    fn modify(&self, offset: u32, mask: u32, value: u32) {
        (**self).modify(offset, mask, value);
    }
}

/// Memory-mapped register window.
///
/// Offsets beyond `max_register` or not 4-byte aligned are rejected the way
/// a regmap with a `max_register` bound rejects them: reads return 0 and
/// writes are dropped.
pub struct Mmio {
    base: NonNull<u32>,
    max_register: u32,
}

// SAFETY: the window is device memory; every access is a single volatile
// 32-bit load or store, which the interconnect serialises.
unsafe impl Send for Mmio {}
// SAFETY: see `Send`. No Rust-visible state is mutated through `&self`.
unsafe impl Sync for Mmio {}

impl Mmio {
    /// Wrap a mapped register window.
    ///
    /// Returns `None` for a null or misaligned base.
    ///
    /// # Safety
    ///
    /// `base` must point to a device mapping of at least
    /// `max_register + 4` bytes that stays valid for the lifetime of the
    /// returned value, and nothing else may treat that range as normal memory.
    pub unsafe fn new(base: *mut u32, max_register: u32) -> Option<Self> {
        if base.align_offset(core::mem::align_of::<u32>()) != 0 {
            return None;
        }
        NonNull::new(base).map(|base| Self { base, max_register })
    }

    /// Highest valid register offset.
    pub fn max_register(&self) -> u32 {
        self.max_register
    }

    fn slot(&self, offset: u32) -> Option<*mut u32> {
        if offset > self.max_register || offset % 4 != 0 {
            return None;
        }
        let index = usize::try_from(offset / 4).ok()?;
        // SAFETY: `index * 4 <= max_register`, which the constructor's
        // contract places inside the mapping.
        Some(unsafe { self.base.as_ptr().add(index) })
    }
}

impl RegisterSpace for Mmio {
    fn read(&self, offset: u32) -> u32 {
        match self.slot(offset) {
            // SAFETY: `slot` only yields in-bounds, aligned pointers.
            Some(ptr) => unsafe { ptr.read_volatile() },
            None => 0,
        }
    }

    fn write(&self, offset: u32, value: u32) {
        if let Some(ptr) = self.slot(offset) {
            // SAFETY: `slot` only yields in-bounds, aligned pointers.
            unsafe { ptr.write_volatile(value) }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use core::cell::RefCell;

    struct Regs(RefCell<[u32; 4]>);

    impl RegisterSpace for Regs {
        fn read(&self, offset: u32) -> u32 {
            self.0.borrow()[offset as usize / 4]
        }
        fn write(&self, offset: u32, value: u32) {
            self.0.borrow_mut()[offset as usize / 4] = value;
        }
    }

    #[test]
    fn modify_only_touches_masked_bits() {
        let regs = Regs(RefCell::new([0xffff_0000, 0, 0, 0]));
        regs.modify(0, 0x0000_00f0, 0xffff_ff50);
        assert_eq!(regs.read(0), 0xffff_0050);
    }

    #[test]
    fn modify_through_reference() {
        let regs = Regs(RefCell::new([0; 4]));
        let by_ref = &regs;
        by_ref.modify(4, 0x3, 0x1);
        assert_eq!(regs.read(4), 0x1);
    }

    #[test]
    fn mmio_bounds_and_alignment() {
        let mut backing = [0u32; 4];
        let mmio = unsafe { Mmio::new(backing.as_mut_ptr(), 0xc) }.unwrap();
        mmio.write(0x8, 0xdead_beef);
        assert_eq!(mmio.read(0x8), 0xdead_beef);
        // out of range: dropped / zero
        mmio.write(0x10, 1);
        assert_eq!(mmio.read(0x10), 0);
        // misaligned
        assert_eq!(mmio.read(0x6), 0);
        assert_eq!(mmio.max_register(), 0xc);
        drop(mmio);
        assert_eq!(backing[2], 0xdead_beef);
    }

    #[test]
    fn mmio_rejects_null() {
        assert!(unsafe { Mmio::new(core::ptr::null_mut(), 0x10) }.is_none());
    }
}
