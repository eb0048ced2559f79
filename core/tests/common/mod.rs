//! Shared fixtures for the playback tests
//!
//! `FakeDecoder` reads its output straight out of the frame bytes, so a test
//! can see exactly which frame was decoded and what it produced.
//!
//! Frame layout:
//! - byte 0: 0xD0 if valid, anything else fails
//! - byte 1: track tag
//! - bytes 2-3: frame index (BE)
//! - bytes 4-5: first sample (BE)
//! - bytes 6-7: per-sample step (BE)

#![allow(dead_code)]

use cartvox_core::specs::{FRAME_BYTES, FRAME_SAMPLES};
use cartvox_core::{DecodeError, FrameDecoder};
use cartvox_pack::{PackedTrack, TrackPack};

const VALID: u8 = 0xD0;

pub fn fake_frame(tag: u8, index: u16, base: i16, step: i16, valid: bool) -> Vec<u8> {
    let mut frame = vec![0u8; FRAME_BYTES];
    frame[0] = if valid { VALID } else { 0x00 };
    frame[1] = tag;
    frame[2..4].copy_from_slice(&index.to_be_bytes());
    frame[4..6].copy_from_slice(&base.to_be_bytes());
    frame[6..8].copy_from_slice(&step.to_be_bytes());
    frame
}

/// `frames` valid frames, each one a constant `level`
pub fn fake_track(tag: u8, frames: u16, level: i16) -> Vec<u8> {
    (0..frames)
        .flat_map(|i| fake_frame(tag, i, level, 0, true))
        .collect()
}

pub fn pack_of(tracks: Vec<(&str, Vec<u8>)>) -> TrackPack {
    TrackPack::with_tracks(
        tracks
            .into_iter()
            .map(|(name, data)| PackedTrack::new(name, data))
            .collect(),
    )
    .unwrap()
}

/// Sample `i` of a frame built by [`fake_frame`]
pub fn fake_sample(base: i16, step: i16, i: usize) -> i16 {
    base.wrapping_add(step.wrapping_mul(i as i16))
}

#[derive(Debug, Default)]
pub struct FakeDecoder {
    /// `(tag, index)` of every frame handed to `decode`, failures included
    pub seen: Vec<(u8, u16)>,
    pub resets: u32,
}

impl FrameDecoder for FakeDecoder {
    fn reset(&mut self) {
        self.resets += 1;
    }

    fn decode(&mut self, frame: &[u8], out: &mut [i16; FRAME_SAMPLES]) -> Result<(), DecodeError> {
        assert_eq!(frame.len(), FRAME_BYTES, "decoder got a partial frame");
        self.seen
            .push((frame[1], u16::from_be_bytes([frame[2], frame[3]])));

        if frame[0] != VALID {
            return Err(DecodeError::Rejected(format!("header 0x{:02x}", frame[0])));
        }

        let base = i16::from_be_bytes([frame[4], frame[5]]);
        let step = i16::from_be_bytes([frame[6], frame[7]]);
        for (i, sample) in out.iter_mut().enumerate() {
            *sample = fake_sample(base, step, i);
        }
        Ok(())
    }
}
