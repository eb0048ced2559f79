//! Frame encoder
//!
//! Used by the pack builder. The encoder mirrors the decoder's predictor
//! exactly, so frames must be decoded in the order they were encoded.

use crate::{
    DEQUANT_TAB, FRAME_BYTES, FRAME_HEADER_SIZE, FRAME_MAGIC, FRAME_SAMPLES, Lms, QUANT_TAB,
    SCALEFACTOR_TAB, SLICE_LEN, clamp_i16,
};

/// Encode a slice of up to 20 samples
///
/// Tries all 16 scalefactors and picks the one with lowest squared error.
///
/// # Returns
/// The 64-bit encoded slice
pub fn encode_slice(samples: &[i16], lms: &mut Lms) -> u64 {
    let mut best_slice = 0u64;
    let mut best_error = i64::MAX;
    let mut best_lms = *lms;

    for sf in 0..16 {
        let mut test_lms = *lms;
        let mut slice = (sf as u64) << 60;
        let mut total_error = 0i64;

        for (i, &sample) in samples.iter().enumerate().take(SLICE_LEN) {
            let predicted = test_lms.predict();
            let residual = sample as i32 - predicted;

            // Quantize: divide by scalefactor, clamp to -8..8, lookup index
            let scaled = residual / SCALEFACTOR_TAB[sf].max(1);
            let clamped = scaled.clamp(-8, 8);
            let quantized = QUANT_TAB[(clamped + 8) as usize];

            let dequantized = DEQUANT_TAB[sf][quantized as usize];
            let reconstructed = clamp_i16(predicted + dequantized);

            test_lms.update(reconstructed, dequantized);

            let error = (sample as i32 - reconstructed).abs() as i64;
            total_error += error * error;

            slice |= (quantized as u64) << (57 - i * 3);
        }

        if total_error < best_error {
            best_error = total_error;
            best_slice = slice;
            best_lms = test_lms;
        }
    }

    *lms = best_lms;
    best_slice
}

/// Stateful frame encoder
#[derive(Debug, Clone, Default)]
pub struct SpeechEncoder {
    lms: Lms,
}

impl SpeechEncoder {
    /// Create an encoder in the starting configuration
    pub fn new() -> Self {
        Self { lms: Lms::new() }
    }

    /// Encode up to [`FRAME_SAMPLES`] samples into one frame
    ///
    /// Short input is padded with silence. Extra samples are ignored.
    pub fn encode_frame(&mut self, samples: &[i16]) -> [u8; FRAME_BYTES] {
        let mut padded = [0i16; FRAME_SAMPLES];
        let len = samples.len().min(FRAME_SAMPLES);
        padded[..len].copy_from_slice(&samples[..len]);

        let mut frame = [0u8; FRAME_BYTES];
        frame[0] = FRAME_MAGIC << 4;

        let slices = frame[FRAME_HEADER_SIZE..].chunks_exact_mut(8);
        for (out, chunk) in slices.zip(padded.chunks_exact(SLICE_LEN)) {
            let slice = encode_slice(chunk, &mut self.lms);
            out.copy_from_slice(&slice.to_be_bytes());
        }

        frame
    }

    /// Encode a whole PCM buffer into back-to-back frames
    pub fn encode_stream(&mut self, samples: &[i16]) -> Vec<u8> {
        let frames = samples.len().div_ceil(FRAME_SAMPLES);
        let mut output = Vec::with_capacity(frames * FRAME_BYTES);
        for chunk in samples.chunks(FRAME_SAMPLES) {
            output.extend_from_slice(&self.encode_frame(chunk));
        }
        output
    }
}
