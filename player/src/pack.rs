//! Track pack building and listing (WAV -> .cvxp)

use anyhow::{Context, Result, bail};
use cartvox_codec::SpeechEncoder;
use cartvox_core::{Clock, handheld_specs};
use cartvox_pack::{PackedTrack, TrackPack};
use std::path::{Path, PathBuf};

/// Sample rate tracks are encoded at
pub fn decoded_rate() -> u32 {
    handheld_specs().decoded_rate_hz().round() as u32
}

/// Encode every input WAV and write the pack to `out`
pub fn build(out: &Path, inputs: &[PathBuf]) -> Result<TrackPack> {
    let mut pack = TrackPack::new();

    for input in inputs {
        let name = input
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .with_context(|| format!("No file name: {}", input.display()))?;

        let pcm = load_wav(input, decoded_rate())?;
        let data = SpeechEncoder::new().encode_stream(&pcm);

        tracing::info!(
            "Encoded '{}': {} samples -> {} bytes ({:.1}:1 vs PCM)",
            name,
            pcm.len(),
            data.len(),
            (pcm.len() * 2) as f64 / data.len().max(1) as f64
        );

        pack.push_track(PackedTrack::new(name, data))
            .with_context(|| format!("Cannot add {}", input.display()))?;
    }

    pack.save(out)
        .with_context(|| format!("Failed to write pack: {}", out.display()))?;
    tracing::info!("Wrote {} tracks to {}", pack.len(), out.display());

    Ok(pack)
}

/// Read a WAV file as mono 16-bit PCM at `target_rate`
pub fn load_wav(path: &Path, target_rate: u32) -> Result<Vec<i16>> {
    let mut reader = hound::WavReader::open(path)
        .with_context(|| format!("Failed to load WAV: {}", path.display()))?;
    let spec = reader.spec();

    let samples: Vec<i16> = match spec.sample_format {
        hound::SampleFormat::Int => match spec.bits_per_sample {
            16 => reader.samples::<i16>().collect::<Result<_, _>>()?,
            8 => reader
                .samples::<i8>()
                .map(|s| s.map(|s| (s as i16) << 8))
                .collect::<Result<_, _>>()?,
            24 | 32 => reader
                .samples::<i32>()
                .map(|s| s.map(|s| (s >> (spec.bits_per_sample - 16)) as i16))
                .collect::<Result<_, _>>()?,
            _ => bail!("Unsupported bit depth: {}", spec.bits_per_sample),
        },
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map(|s| (s.clamp(-1.0, 1.0) * 32767.0) as i16))
            .collect::<Result<_, _>>()?,
    };

    if spec.channels == 0 {
        bail!("WAV has no channels: {}", path.display());
    }
    let mono = downmix(&samples, spec.channels as usize);

    Ok(if spec.sample_rate != target_rate {
        resample(&mono, spec.sample_rate, target_rate)
    } else {
        mono
    })
}

/// Average interleaved channels into one
fn downmix(samples: &[i16], channels: usize) -> Vec<i16> {
    if channels == 1 {
        return samples.to_vec();
    }
    samples
        .chunks_exact(channels)
        .map(|frame| (frame.iter().map(|&s| s as i32).sum::<i32>() / channels as i32) as i16)
        .collect()
}

/// Simple linear resampling
fn resample(samples: &[i16], src_rate: u32, dst_rate: u32) -> Vec<i16> {
    if samples.is_empty() {
        return Vec::new();
    }

    let ratio = src_rate as f64 / dst_rate as f64;
    let output_len = (samples.len() as f64 / ratio) as usize;
    let last = samples.len() - 1;

    (0..output_len)
        .map(|i| {
            let src_pos = i as f64 * ratio;
            let idx = (src_pos as usize).min(last);
            let next = (idx + 1).min(last);
            let frac = src_pos - idx as f64;
            let a = samples[idx] as f64;
            let b = samples[next] as f64;
            (a + (b - a) * frac).round() as i16
        })
        .collect()
}

/// One display line per track
pub fn describe(pack: &TrackPack) -> Vec<String> {
    let specs = handheld_specs();
    pack.tracks()
        .iter()
        .enumerate()
        .map(|(index, track)| {
            let secs = specs.stream_duration(track.data.len()).as_secs();
            format!(
                "{:3}  {:<24} {:6} frames  {}",
                index,
                track.name,
                track.frame_count(),
                Clock::from_secs(secs.min(u32::MAX as u64) as u32)
            )
        })
        .collect()
}

pub fn list(path: &Path) -> Result<()> {
    let pack = TrackPack::load(path)
        .with_context(|| format!("Failed to load pack: {}", path.display()))?;

    println!("{} ({} tracks)", path.display(), pack.len());
    for line in describe(&pack) {
        println!("{}", line);
    }
    Ok(())
}
