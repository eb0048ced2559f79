//! Headless rendering to WAV
//!
//! Drives the engine on [`SimulatedHardware`] and writes every committed
//! output buffer, in commit order, as 16-bit mono PCM.

use anyhow::{Context, Result};
use cartvox_codec::SpeechDecoder;
use cartvox_core::specs::{DECODED_SAMPLES_PER_TICK, FRAME_SAMPLES};
use cartvox_core::{Buttons, EngineConfig, Player, SimulatedHardware, TracingStatus, handheld_specs};
use cartvox_pack::TrackPack;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Output sample rate of the rendered file
pub fn output_rate() -> u32 {
    handheld_specs().output_rate_hz().round() as u32
}

/// Ticks needed to play every track once, plus one per track for the switch
pub fn full_pass_ticks(pack: &TrackPack) -> u64 {
    pack.tracks()
        .iter()
        .map(|track| {
            let samples = track.frame_count() * FRAME_SAMPLES;
            samples.div_ceil(DECODED_SAMPLES_PER_TICK) as u64 + 1
        })
        .sum()
}

/// Render `ticks` ticks (default: a full pass) of `pack_path` to `out`
///
/// Returns the number of ticks rendered.
pub fn render(
    pack_path: &Path,
    out: &Path,
    ticks: Option<u64>,
    script: Vec<(u64, Buttons)>,
    engine: &EngineConfig,
) -> Result<u64> {
    let pack = TrackPack::load(pack_path)
        .with_context(|| format!("Failed to load pack: {}", pack_path.display()))?;
    let ticks = ticks.unwrap_or_else(|| full_pass_ticks(&pack));

    let mut player = Player::new(&pack, SpeechDecoder::new(), engine.clone())?;
    let mut hw = SimulatedHardware::with_script(script);
    let mut status = TracingStatus::default();

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: output_rate(),
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let file = File::create(out).with_context(|| format!("Failed to create output: {}", out.display()))?;
    let mut writer = hound::WavWriter::new(BufWriter::new(file), spec)?;

    for _ in 0..ticks {
        player.tick(&mut hw, &mut status);
        for commit in hw.commits() {
            for &sample in &commit.samples {
                writer.write_sample((sample as i16) << 8)?;
            }
        }
        hw.clear_commits();
    }
    writer.finalize()?;

    tracing::info!(
        "Rendered {} ticks ({:.1}s) to {} ({} decode failures)",
        ticks,
        ticks as f64 / handheld_specs().tick_rate_hz(),
        out.display(),
        player.adapter().decode_failures()
    );

    Ok(ticks)
}
