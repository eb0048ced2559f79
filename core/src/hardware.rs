//! Hardware capability
//!
//! The engine never touches registers directly. Everything it needs from the
//! machine goes through [`HardwareIo`], so the same scheduler runs against the
//! real-time host and against [`SimulatedHardware`](crate::sim::SimulatedHardware).

use crate::input::Buttons;

bitflags::bitflags! {
    /// Transfer channel mode bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TransferMode: u16 {
        /// Destination address does not advance
        const DEST_FIXED = 1 << 0;
        /// Source address advances after each unit
        const SOURCE_INCREMENT = 1 << 1;
        /// Re-arm after each request
        const REPEAT = 1 << 2;
        /// 32-bit units
        const WORD32 = 1 << 3;
        /// Triggered by the sound FIFO instead of immediately
        const SPECIAL_TIMING = 1 << 4;

        /// Mode used to feed the sound FIFO
        const AUDIO_FIFO = Self::DEST_FIXED.bits()
            | Self::SOURCE_INCREMENT.bits()
            | Self::REPEAT.bits()
            | Self::WORD32.bits()
            | Self::SPECIAL_TIMING.bits();
    }
}

/// One of the two output buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferId {
    First,
    Second,
}

impl BufferId {
    pub fn index(self) -> usize {
        match self {
            BufferId::First => 0,
            BufferId::Second => 1,
        }
    }

    pub fn other(self) -> Self {
        match self {
            BufferId::First => BufferId::Second,
            BufferId::Second => BufferId::First,
        }
    }
}

/// Parameters written to the transfer channel on commit
#[derive(Debug, Clone, Copy)]
pub struct TransferConfig<'a> {
    /// Which buffer `source` is
    pub buffer: BufferId,
    /// Fully written samples the hardware will stream
    pub source: &'a [i8],
    /// Fixed destination register
    pub destination: u32,
    /// Units moved per FIFO request
    pub unit_count: u16,
    pub mode: TransferMode,
}

/// Machine services the scheduler depends on
pub trait HardwareIo {
    /// Current button state, read once per tick
    fn poll_input(&mut self) -> Buttons;

    /// Block until the next display refresh
    fn await_next_tick(&mut self);

    /// Stop the audio transfer
    fn disable_transfer(&mut self);

    /// Point the stopped transfer at a new source
    fn configure_transfer(&mut self, config: &TransferConfig<'_>);

    /// Restart the audio transfer
    fn enable_transfer(&mut self);
}
