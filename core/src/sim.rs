//! Simulated hardware
//!
//! Counter-driven ticks, scripted buttons and a log of every transfer the
//! engine committed. Used by the tests and by the headless renderer.

use crate::hardware::{BufferId, HardwareIo, TransferConfig, TransferMode};
use crate::input::Buttons;

/// One transfer reconfiguration as seen by the hardware
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedTransfer {
    /// Tick counter when the transfer was configured
    pub tick: u64,
    pub buffer: BufferId,
    /// Copy of the source buffer at commit time
    pub samples: Vec<i8>,
    pub destination: u32,
    pub unit_count: u16,
    pub mode: TransferMode,
}

#[derive(Debug, Default)]
pub struct SimulatedHardware {
    /// `(tick, buttons)` sorted by tick; each entry holds until the next
    script: Vec<(u64, Buttons)>,
    tick: u64,
    enabled: bool,
    streaming: Option<BufferId>,
    commits: Vec<CommittedTransfer>,
    unsafe_reconfigurations: u32,
}

impl SimulatedHardware {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hardware that replays `script`
    pub fn with_script(mut script: Vec<(u64, Buttons)>) -> Self {
        script.sort_by_key(|&(tick, _)| tick);
        Self {
            script,
            ..Self::default()
        }
    }

    /// Hold `buttons` from `tick` until the next scripted change
    pub fn press(&mut self, tick: u64, buttons: Buttons) {
        let at = self.script.partition_point(|&(t, _)| t <= tick);
        self.script.insert(at, (tick, buttons));
    }

    /// Ticks elapsed so far
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn commits(&self) -> &[CommittedTransfer] {
        &self.commits
    }

    /// Buffer the running transfer reads from
    pub fn streaming_buffer(&self) -> Option<BufferId> {
        if self.enabled { self.streaming } else { None }
    }

    pub fn transfer_enabled(&self) -> bool {
        self.enabled
    }

    /// Reconfigurations made while the channel was running
    pub fn unsafe_reconfigurations(&self) -> u32 {
        self.unsafe_reconfigurations
    }

    /// Everything the speaker received, in order
    pub fn output(&self) -> Vec<i8> {
        self.commits
            .iter()
            .flat_map(|c| c.samples.iter().copied())
            .collect()
    }

    /// Drop the transfer log, keeping the clock and script
    pub fn clear_commits(&mut self) {
        self.commits.clear();
    }
}

impl HardwareIo for SimulatedHardware {
    fn poll_input(&mut self) -> Buttons {
        let at = self.script.partition_point(|&(t, _)| t <= self.tick);
        at.checked_sub(1)
            .map(|i| self.script[i].1)
            .unwrap_or_default()
    }

    fn await_next_tick(&mut self) {
        self.tick += 1;
    }

    fn disable_transfer(&mut self) {
        self.enabled = false;
    }

    fn configure_transfer(&mut self, config: &TransferConfig<'_>) {
        if self.enabled {
            tracing::warn!("transfer reconfigured while running");
            self.unsafe_reconfigurations += 1;
        }
        self.streaming = Some(config.buffer);
        self.commits.push(CommittedTransfer {
            tick: self.tick,
            buffer: config.buffer,
            samples: config.source.to_vec(),
            destination: config.destination,
            unit_count: config.unit_count,
            mode: config.mode,
        });
    }

    fn enable_transfer(&mut self) {
        self.enabled = true;
    }
}
