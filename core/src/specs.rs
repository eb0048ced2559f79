//! Fixed timing of the target handheld
//!
//! Every rate in the engine is derived from the 2^24 Hz system clock. One
//! output buffer holds exactly one display refresh worth of audio:
//! 608 samples × 462 cycles = 280 896 cycles = one tick.

use std::time::Duration;

pub use cartvox_codec::{FRAME_BYTES, FRAME_SAMPLES};

/// CPU cycles per second
pub const SYSTEM_CLOCK_HZ: u32 = 1 << 24;

/// Cycles per display refresh (≈59.73 Hz)
pub const CYCLES_PER_TICK: u32 = 280_896;

/// Timer reload of the audio FIFO (≈36 314 Hz output)
pub const CYCLES_PER_OUTPUT_SAMPLE: u32 = 462;

/// Two output samples per decoded sample
pub const CYCLES_PER_DECODED_SAMPLE: u32 = CYCLES_PER_OUTPUT_SAMPLE * 2;

/// Signed 8-bit samples per output buffer
pub const OUTPUT_SAMPLES_PER_TICK: usize = 608;

/// Decoded samples consumed per tick
pub const DECODED_SAMPLES_PER_TICK: usize = OUTPUT_SAMPLES_PER_TICK / 2;

/// Fixed destination of the audio transfer (sound FIFO A)
pub const FIFO_A_ADDRESS: u32 = 0x0400_00A0;

/// Hardware timing summary, for display and for host pacing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HardwareSpecs {
    /// Hardware name
    pub name: &'static str,
    /// CPU cycles per second
    pub system_clock_hz: u32,
    /// Cycles per display refresh
    pub cycles_per_tick: u32,
    /// Cycles between output samples
    pub cycles_per_output_sample: u32,
    /// Output samples per tick
    pub output_samples_per_tick: usize,
    /// Samples per decoded frame
    pub frame_samples: usize,
    /// Bytes per compressed frame
    pub frame_bytes: usize,
}

impl HardwareSpecs {
    /// Display refresh rate in Hz
    pub fn tick_rate_hz(&self) -> f64 {
        self.system_clock_hz as f64 / self.cycles_per_tick as f64
    }

    /// Wall-clock duration of one tick
    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs_f64(self.cycles_per_tick as f64 / self.system_clock_hz as f64)
    }

    /// Output FIFO rate in Hz
    pub fn output_rate_hz(&self) -> f64 {
        self.system_clock_hz as f64 / self.cycles_per_output_sample as f64
    }

    /// Rate the codec output is consumed at
    pub fn decoded_rate_hz(&self) -> f64 {
        self.output_rate_hz() / 2.0
    }

    /// Playback length of `bytes` of compressed data
    pub fn stream_duration(&self, bytes: usize) -> Duration {
        let samples = (bytes / self.frame_bytes * self.frame_samples) as f64;
        Duration::from_secs_f64(samples / self.decoded_rate_hz())
    }
}

/// The handheld this engine targets
pub const fn handheld_specs() -> &'static HardwareSpecs {
    &HardwareSpecs {
        name: "cartvox handheld",
        system_clock_hz: SYSTEM_CLOCK_HZ,
        cycles_per_tick: CYCLES_PER_TICK,
        cycles_per_output_sample: CYCLES_PER_OUTPUT_SAMPLE,
        output_samples_per_tick: OUTPUT_SAMPLES_PER_TICK,
        frame_samples: FRAME_SAMPLES,
        frame_bytes: FRAME_BYTES,
    }
}
