//! cartvox-codec: fixed-frame speech codec for cartvox cartridges
//!
//! Speech is stored as a sequence of equally sized frames so that a player can
//! seek by plain byte arithmetic. Every frame decodes to exactly
//! [`FRAME_SAMPLES`] signed 16-bit samples at the decoded rate.
//!
//! The predictor is the 4-tap LMS filter from QOA (Quite OK Audio), but unlike
//! QOA the predictor state is **not** stored in each frame. It carries over from
//! one frame to the next, which saves 16 bytes per frame and makes the decoder
//! stateful: after any discontinuous jump the decoder must be [reset](SpeechDecoder::reset).
//!
//! # Frame Format
//!
//! ```text
//! 0x00: header (u8)
//!         bits 4-7: magic 0xD
//!         bits 0-3: reserved (0)
//! 0x01: 8 slices, 8 bytes each (u64 BE)
//!         bits 60-63: scalefactor index
//!         bits 0-59:  20 quantized residuals (3 bits each)
//! ```
//!
//! 65 bytes per 160 samples, 3.25 bits per sample.
//!
//! # Usage
//!
//! ```
//! use cartvox_codec::{FRAME_BYTES, FRAME_SAMPLES, SpeechDecoder, SpeechEncoder};
//!
//! let pcm = vec![0i16; FRAME_SAMPLES * 3];
//! let stream = SpeechEncoder::new().encode_stream(&pcm);
//! assert_eq!(stream.len(), FRAME_BYTES * 3);
//!
//! let mut decoder = SpeechDecoder::new();
//! let mut out = [0i16; FRAME_SAMPLES];
//! for frame in stream.chunks_exact(FRAME_BYTES) {
//!     decoder.decode_frame(frame, &mut out).unwrap();
//! }
//! ```

mod decode;
mod encode;
mod lms;

pub use decode::{SpeechDecoder, decode_slice, decode_stream};
pub use encode::{SpeechEncoder, encode_slice};
pub use lms::Lms;

// =============================================================================
// Constants
// =============================================================================

/// Samples per slice (each slice is 64 bits)
pub const SLICE_LEN: usize = 20;

/// Slices per frame
pub const SLICES_PER_FRAME: usize = 8;

/// Decoded samples per frame
pub const FRAME_SAMPLES: usize = SLICE_LEN * SLICES_PER_FRAME;

/// Frame header size (magic nibble + reserved nibble)
pub const FRAME_HEADER_SIZE: usize = 1;

/// Encoded size of one frame in bytes
pub const FRAME_BYTES: usize = FRAME_HEADER_SIZE + SLICES_PER_FRAME * 8;

/// Magic value stored in the high nibble of every frame header
pub const FRAME_MAGIC: u8 = 0xD;

/// LMS filter history/weight length
pub const LMS_LEN: usize = 4;

/// Scalefactor table (16 entries)
/// Used to scale residuals during quantization
pub const SCALEFACTOR_TAB: [i32; 16] = [
    1, 7, 21, 45, 84, 138, 211, 304, 421, 562, 731, 928, 1157, 1419, 1715, 2048,
];

/// Quantization table (17 entries)
/// Maps residual / scalefactor result (-8..8) to 3-bit index
pub const QUANT_TAB: [u8; 17] = [
    7, 7, 7, 5, 5, 3, 3, 1, // -8..-1
    0, // 0
    0, 2, 2, 4, 4, 6, 6, 6, // 1..8
];

/// Dequantization table (16 scalefactors x 8 quantized values)
/// Pre-computed: dequant_tab[sf][qval] = round(scalefactor * dequant_mul[qval])
/// where dequant_mul = [0.75, -0.75, 2.5, -2.5, 4.5, -4.5, 7.0, -7.0]
pub const DEQUANT_TAB: [[i32; 8]; 16] = [
    [1, -1, 3, -3, 5, -5, 7, -7],
    [5, -5, 18, -18, 32, -32, 49, -49],
    [16, -16, 53, -53, 95, -95, 147, -147],
    [34, -34, 113, -113, 203, -203, 315, -315],
    [63, -63, 210, -210, 378, -378, 588, -588],
    [104, -104, 345, -345, 621, -621, 966, -966],
    [158, -158, 528, -528, 950, -950, 1477, -1477],
    [228, -228, 760, -760, 1368, -1368, 2128, -2128],
    [316, -316, 1053, -1053, 1895, -1895, 2947, -2947],
    [422, -422, 1405, -1405, 2529, -2529, 3934, -3934],
    [548, -548, 1828, -1828, 3290, -3290, 5117, -5117],
    [696, -696, 2320, -2320, 4176, -4176, 6496, -6496],
    [868, -868, 2893, -2893, 5207, -5207, 8099, -8099],
    [1064, -1064, 3548, -3548, 6386, -6386, 9933, -9933],
    [1286, -1286, 4288, -4288, 7718, -7718, 12005, -12005],
    [1536, -1536, 5120, -5120, 9216, -9216, 14336, -14336],
];

// =============================================================================
// Error Type
// =============================================================================

/// Errors that can occur while decoding a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// Fewer than [`FRAME_BYTES`] bytes were supplied
    Truncated { len: usize },
    /// Frame header does not carry the magic nibble
    BadMagic(u8),
}

impl core::fmt::Display for CodecError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CodecError::Truncated { len } => {
                write!(f, "truncated frame ({} of {} bytes)", len, FRAME_BYTES)
            }
            CodecError::BadMagic(header) => {
                write!(f, "bad frame header 0x{:02x} (expected magic 0x{:x}_)", header, FRAME_MAGIC)
            }
        }
    }
}

impl std::error::Error for CodecError {}

// =============================================================================
// Helper Functions
// =============================================================================

/// Clamp value to 16-bit signed range
#[inline]
pub(crate) fn clamp_i16(v: i32) -> i32 {
    v.clamp(-32768, 32767)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn generate_sine(freq: f32, sample_rate: u32, duration_sec: f32) -> Vec<i16> {
        let num_samples = (sample_rate as f32 * duration_sec) as usize;
        (0..num_samples)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                (f32::sin(t * freq * std::f32::consts::TAU) * 16000.0) as i16
            })
            .collect()
    }

    #[test]
    fn test_frame_constants() {
        assert_eq!(FRAME_SAMPLES, 160);
        assert_eq!(FRAME_BYTES, 65);
    }

    #[test]
    fn test_stream_length_is_frame_multiple() {
        for len in [1usize, 159, 160, 161, 320, 18157] {
            let pcm: Vec<i16> = (0..len).map(|i| (i as i16).wrapping_mul(7)).collect();
            let encoded = SpeechEncoder::new().encode_stream(&pcm);
            assert_eq!(encoded.len() % FRAME_BYTES, 0, "len {}", len);
            assert_eq!(encoded.len() / FRAME_BYTES, len.div_ceil(FRAME_SAMPLES));
        }
    }

    #[test]
    fn test_sine_tracks_source() {
        let original = generate_sine(440.0, 18157, 0.5);
        let encoded = SpeechEncoder::new().encode_stream(&original);
        let decoded = decode_stream(&encoded).unwrap();

        assert!(decoded.len() >= original.len());

        // Skip the first frame while the predictor converges
        let errors: Vec<i64> = original
            .iter()
            .zip(&decoded)
            .skip(FRAME_SAMPLES)
            .map(|(a, b)| (*a as i64 - *b as i64).abs())
            .collect();
        let mean = errors.iter().sum::<i64>() / errors.len() as i64;
        assert!(mean < 1600, "Mean error too high: {}", mean);
    }

    #[test]
    fn test_silence_stays_quiet() {
        let original = vec![0i16; FRAME_SAMPLES * 4];
        let encoded = SpeechEncoder::new().encode_stream(&original);
        let decoded = decode_stream(&encoded).unwrap();

        let max_error = decoded.iter().map(|s| s.unsigned_abs()).max().unwrap_or(0);
        assert!(max_error < 100, "Silence max error too high: {}", max_error);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            CodecError::Truncated { len: 10 }.to_string(),
            "truncated frame (10 of 65 bytes)"
        );
        assert!(CodecError::BadMagic(0x20).to_string().contains("0x20"));
    }
}
