//! Double-buffered output sink
//!
//! One buffer streams to the sound FIFO while the engine fills the other.
//! [`OutputSink::commit`] hands the filled buffer to the hardware and returns
//! the other one to the engine.

use crate::hardware::{BufferId, HardwareIo, TransferConfig, TransferMode};
use crate::specs::{FIFO_A_ADDRESS, OUTPUT_SAMPLES_PER_TICK};

/// Who owns a buffer right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferRole {
    /// Engine is writing it
    Filling,
    /// Hardware is reading it
    Streaming,
    /// Never committed yet
    Idle,
}

/// Two fixed buffers, allocated once
pub struct OutputSink {
    buffers: [Box<[i8; OUTPUT_SAMPLES_PER_TICK]>; 2],
    filling: BufferId,
    streaming: Option<BufferId>,
    commits: u64,
}

impl Default for OutputSink {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputSink {
    pub fn new() -> Self {
        Self {
            buffers: [
                Box::new([0; OUTPUT_SAMPLES_PER_TICK]),
                Box::new([0; OUTPUT_SAMPLES_PER_TICK]),
            ],
            filling: BufferId::First,
            streaming: None,
            commits: 0,
        }
    }

    /// The buffer the engine may write
    pub fn filling_mut(&mut self) -> &mut [i8; OUTPUT_SAMPLES_PER_TICK] {
        &mut self.buffers[self.filling.index()]
    }

    pub fn filling_index(&self) -> BufferId {
        self.filling
    }

    pub fn streaming_index(&self) -> Option<BufferId> {
        self.streaming
    }

    pub fn role(&self, id: BufferId) -> BufferRole {
        if id == self.filling {
            BufferRole::Filling
        } else if self.streaming == Some(id) {
            BufferRole::Streaming
        } else {
            BufferRole::Idle
        }
    }

    /// Read-only view of either buffer
    pub fn buffer(&self, id: BufferId) -> &[i8; OUTPUT_SAMPLES_PER_TICK] {
        &self.buffers[id.index()]
    }

    /// Number of swaps so far
    pub fn commits(&self) -> u64 {
        self.commits
    }

    /// Point the transfer at the filled buffer and swap roles
    ///
    /// The channel is disabled for the whole reconfiguration so it never
    /// runs with a half-written source.
    pub fn commit<H: HardwareIo + ?Sized>(&mut self, hw: &mut H) {
        let committed = self.filling;

        hw.disable_transfer();
        hw.configure_transfer(&TransferConfig {
            buffer: committed,
            source: &self.buffers[committed.index()][..],
            destination: FIFO_A_ADDRESS,
            unit_count: 1,
            mode: TransferMode::AUDIO_FIFO,
        });
        hw.enable_transfer();

        self.streaming = Some(committed);
        self.filling = committed.other();
        self.commits += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimulatedHardware;

    #[test]
    fn test_initial_roles() {
        let sink = OutputSink::new();
        assert_eq!(sink.role(BufferId::First), BufferRole::Filling);
        assert_eq!(sink.role(BufferId::Second), BufferRole::Idle);
        assert_eq!(sink.streaming_index(), None);
    }

    #[test]
    fn test_commit_swaps_roles() {
        let mut sink = OutputSink::new();
        let mut hw = SimulatedHardware::new();

        sink.filling_mut().fill(5);
        sink.commit(&mut hw);

        assert_eq!(sink.role(BufferId::First), BufferRole::Streaming);
        assert_eq!(sink.role(BufferId::Second), BufferRole::Filling);
        assert_eq!(hw.streaming_buffer(), Some(BufferId::First));
        assert_eq!(hw.commits()[0].samples, vec![5; OUTPUT_SAMPLES_PER_TICK]);

        sink.filling_mut().fill(-5);
        sink.commit(&mut hw);

        assert_eq!(sink.filling_index(), BufferId::First);
        assert_eq!(hw.streaming_buffer(), Some(BufferId::Second));
        assert_eq!(sink.commits(), 2);
    }

    #[test]
    fn test_handshake_registers() {
        let mut sink = OutputSink::new();
        let mut hw = SimulatedHardware::new();

        for _ in 0..4 {
            sink.commit(&mut hw);
            let last = hw.commits().last().unwrap();
            assert_eq!(last.destination, FIFO_A_ADDRESS);
            assert_eq!(last.unit_count, 1);
            assert_eq!(last.mode, TransferMode::AUDIO_FIFO);
            assert_ne!(Some(sink.filling_index()), hw.streaming_buffer());
        }
        assert_eq!(hw.unsafe_reconfigurations(), 0);
        assert!(hw.transfer_enabled());
    }
}
