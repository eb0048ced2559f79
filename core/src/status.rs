//! Status display
//!
//! Fire-and-forget: the engine pushes status out and never reads it back.

use std::fmt;

use crate::specs::{CYCLES_PER_DECODED_SAMPLE, FRAME_BYTES, FRAME_SAMPLES, SYSTEM_CLOCK_HZ};

/// Seconds per compressed byte as 32.32 fixed point
const SECONDS_PER_BYTE_FX32: u64 = ((FRAME_SAMPLES as u64 * CYCLES_PER_DECODED_SAMPLE as u64)
    << 32)
    / (FRAME_BYTES as u64 * SYSTEM_CLOCK_HZ as u64);

/// Largest time a two-digit minutes field can show (99:59)
pub const CLOCK_CEILING_SECS: u32 = 99 * 60 + 59;

/// Elapsed playback time, saturating at [`CLOCK_CEILING_SECS`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Clock(u32);

impl Clock {
    pub fn from_secs(secs: u32) -> Self {
        Self(secs.min(CLOCK_CEILING_SECS))
    }

    /// Time taken to play `bytes` of compressed stream
    pub fn from_stream_bytes(bytes: usize) -> Self {
        let secs = (bytes as u64).saturating_mul(SECONDS_PER_BYTE_FX32) >> 32;
        Self(secs.min(CLOCK_CEILING_SECS as u64) as u32)
    }

    pub fn secs(&self) -> u32 {
        self.0
    }

    pub fn minutes(&self) -> u32 {
        self.0 / 60
    }

    pub fn seconds(&self) -> u32 {
        self.0 % 60
    }
}

impl fmt::Display for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes(), self.seconds())
    }
}

/// Per-tick snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusFrame {
    pub paused: bool,
    pub locked: bool,
    pub track_index: usize,
    pub track_count: usize,
    pub elapsed: Clock,
    /// Played fraction of the current track
    pub progress: f32,
}

/// Receiver of status updates
pub trait StatusDisplay {
    fn show_track_change(&mut self, index: usize, count: usize, name: &str);

    fn show_frame(&mut self, frame: &StatusFrame);
}

/// Discards everything
#[derive(Debug, Default)]
pub struct NullStatus;

impl StatusDisplay for NullStatus {
    fn show_track_change(&mut self, _index: usize, _count: usize, _name: &str) {}

    fn show_frame(&mut self, _frame: &StatusFrame) {}
}

/// Logs status through `tracing`
#[derive(Debug, Default)]
pub struct TracingStatus {
    last: Option<(Clock, bool, bool)>,
}

impl StatusDisplay for TracingStatus {
    fn show_track_change(&mut self, index: usize, count: usize, name: &str) {
        tracing::info!("track {}/{}: {}", index + 1, count, name);
        self.last = None;
    }

    fn show_frame(&mut self, frame: &StatusFrame) {
        let now = (frame.elapsed, frame.paused, frame.locked);
        if self.last == Some(now) {
            return;
        }
        self.last = Some(now);
        tracing::trace!(
            "{} {}{}",
            frame.elapsed,
            if frame.paused { "paused" } else { "playing" },
            if frame.locked { " (locked)" } else { "" }
        );
    }
}
