//! Interpolating resampler
//!
//! Each decoded sample becomes two output samples: the midpoint with the
//! previous sample, then the sample itself. Output is narrowed to 8 bits by
//! arithmetic right shift (truncation, no rounding or dither).

use crate::decode::{DecodeAdapter, DecodedFrame, FrameDecoder, FrameStatus};
use crate::specs::FRAME_SAMPLES;
use crate::stream::CompressedStream;

/// Interpolation state carried between fills
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResamplerCursor {
    /// Next sample to read from the current frame; `FRAME_SAMPLES` when spent
    pub decode_pos: usize,
    /// Last decoded sample consumed
    pub last_sample: i16,
}

impl Default for ResamplerCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl ResamplerCursor {
    /// Spent cursor at silence
    pub fn new() -> Self {
        Self {
            decode_pos: FRAME_SAMPLES,
            last_sample: 0,
        }
    }

    /// Force a decode before the next read, keeping `last_sample`
    pub fn mark_exhausted(&mut self) {
        self.decode_pos = FRAME_SAMPLES;
    }

    pub fn is_exhausted(&self) -> bool {
        self.decode_pos >= FRAME_SAMPLES
    }
}

/// Supplies decoded frames in stream order
pub trait FrameSource {
    /// Make the next frame current; `false` at end of stream
    fn advance(&mut self, hold: i16) -> bool;

    fn current(&self) -> &DecodedFrame;
}

/// Frames pulled from a live stream through the decode adapter
pub struct StreamSource<'s, 'a, D> {
    pub adapter: &'s mut DecodeAdapter<D>,
    pub stream: &'s mut CompressedStream<'a>,
}

impl<D: FrameDecoder> FrameSource for StreamSource<'_, '_, D> {
    fn advance(&mut self, hold: i16) -> bool {
        self.adapter.decode_next(self.stream, hold) != FrameStatus::Exhausted
    }

    fn current(&self) -> &DecodedFrame {
        self.adapter.frame()
    }
}

/// Narrow a decoded sample to the output width
#[inline]
pub fn quantize(sample: i16) -> i8 {
    (sample >> 8) as i8
}

/// Narrowed average of two decoded samples
#[inline]
pub fn midpoint(a: i16, b: i16) -> i8 {
    ((a as i32 + b as i32) >> 9) as i8
}

/// Fill `out` completely from `source`
///
/// When the source runs dry the rest of `out` holds the last sample and the
/// cursor stays spent.
pub fn fill(out: &mut [i8], cursor: &mut ResamplerCursor, source: &mut impl FrameSource) {
    let mut i = 0;
    while i < out.len() {
        if cursor.is_exhausted() {
            if !source.advance(cursor.last_sample) {
                cursor.mark_exhausted();
                fill_hold(&mut out[i..], cursor.last_sample);
                return;
            }
            cursor.decode_pos = 0;
        }

        let current = source.current().0[cursor.decode_pos];
        out[i] = midpoint(cursor.last_sample, current);
        i += 1;
        if i < out.len() {
            out[i] = quantize(current);
            i += 1;
        }

        cursor.decode_pos += 1;
        cursor.last_sample = current;
    }
}

/// Silence-hold: repeat the last sample instead of dropping to zero
pub fn fill_hold(out: &mut [i8], last_sample: i16) {
    out.fill(quantize(last_sample));
}
