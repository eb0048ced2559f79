//! Interrupt acknowledgement
//!
//! The interrupt side only ever sets bits; the main loop takes and clears
//! them. Nothing else is shared, so a single atomic is enough.

use std::sync::atomic::{AtomicU16, Ordering};
use std::time::Duration;

/// Sleep between pending-register polls in [`InterruptFlags::wait_vblank`]
const VBLANK_POLL: Duration = Duration::from_micros(250);

bitflags::bitflags! {
    /// Interrupt sources
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Interrupts: u16 {
        const VBLANK = 1 << 0;
        const TIMER1 = 1 << 4;
    }
}

/// Pending interrupt register
#[derive(Debug, Default)]
pub struct InterruptFlags {
    pending: AtomicU16,
}

impl InterruptFlags {
    pub const fn new() -> Self {
        Self {
            pending: AtomicU16::new(0),
        }
    }

    /// Mark interrupts as pending (interrupt side)
    pub fn raise(&self, flags: Interrupts) {
        self.pending.fetch_or(flags.bits(), Ordering::Release);
    }

    /// Take and clear everything pending
    pub fn acknowledge(&self) -> Interrupts {
        Interrupts::from_bits_truncate(self.pending.swap(0, Ordering::AcqRel))
    }

    /// Peek without clearing
    pub fn pending(&self) -> Interrupts {
        Interrupts::from_bits_truncate(self.pending.load(Ordering::Acquire))
    }

    /// Block until a vertical blank has been acknowledged
    ///
    /// Sleeps between polls.
    pub fn wait_vblank(&self) {
        while !self.acknowledge().contains(Interrupts::VBLANK) {
            std::thread::sleep(VBLANK_POLL);
        }
    }
}
