//! Frame decoder
//!
//! Validation happens before any predictor state is touched, so a rejected
//! frame leaves the decoder exactly where it was.

use crate::{
    CodecError, DEQUANT_TAB, FRAME_BYTES, FRAME_HEADER_SIZE, FRAME_MAGIC, FRAME_SAMPLES, Lms,
    SLICE_LEN, clamp_i16,
};

/// Decode a single slice (8 bytes = 20 samples)
///
/// # Slice format (64 bits, big-endian)
/// - Bits 60-63: Scalefactor index (4 bits)
/// - Bits 0-59:  20 quantized residuals (3 bits each)
///
/// # Returns
/// Number of samples decoded (up to 20, or `output.len()` if smaller)
pub fn decode_slice(slice: u64, lms: &mut Lms, output: &mut [i16]) -> usize {
    let scalefactor = ((slice >> 60) & 0xF) as usize;
    let mut sample_count = 0;

    for i in 0..SLICE_LEN {
        if sample_count >= output.len() {
            break;
        }

        // Extract 3-bit quantized value (from high bits down)
        let quantized = ((slice >> (57 - i * 3)) & 0x7) as usize;

        let predicted = lms.predict();
        let dequantized = DEQUANT_TAB[scalefactor][quantized];
        let sample = clamp_i16(predicted + dequantized);

        lms.update(sample, dequantized);

        output[sample_count] = sample as i16;
        sample_count += 1;
    }

    sample_count
}

/// Stateful frame decoder
///
/// Holds the LMS predictor that carries from one frame to the next.
#[derive(Debug, Clone, Default)]
pub struct SpeechDecoder {
    lms: Lms,
}

impl SpeechDecoder {
    /// Create a decoder in the starting configuration
    pub fn new() -> Self {
        Self { lms: Lms::new() }
    }

    /// Return to the starting configuration
    ///
    /// Required whenever the next frame does not directly follow the last one.
    pub fn reset(&mut self) {
        self.lms.reset();
    }

    /// Current predictor state
    pub fn lms(&self) -> &Lms {
        &self.lms
    }

    /// Decode exactly one frame
    ///
    /// Only the first [`FRAME_BYTES`] bytes of `frame` are read.
    ///
    /// # Errors
    /// [`CodecError::Truncated`] if `frame` is short, [`CodecError::BadMagic`]
    /// if the header is wrong. `out` and the predictor are untouched on error.
    pub fn decode_frame(
        &mut self,
        frame: &[u8],
        out: &mut [i16; FRAME_SAMPLES],
    ) -> Result<(), CodecError> {
        if frame.len() < FRAME_BYTES {
            return Err(CodecError::Truncated { len: frame.len() });
        }
        if frame[0] >> 4 != FRAME_MAGIC {
            return Err(CodecError::BadMagic(frame[0]));
        }

        let slices = frame[FRAME_HEADER_SIZE..FRAME_BYTES].chunks_exact(8);
        for (chunk, samples) in slices.zip(out.chunks_exact_mut(SLICE_LEN)) {
            let mut word = [0u8; 8];
            word.copy_from_slice(chunk);
            decode_slice(u64::from_be_bytes(word), &mut self.lms, samples);
        }

        Ok(())
    }
}

/// Decode a whole stream of frames from the starting configuration
///
/// # Errors
/// Fails on the first bad frame, or if the data ends in a partial frame.
pub fn decode_stream(data: &[u8]) -> Result<Vec<i16>, CodecError> {
    let mut decoder = SpeechDecoder::new();
    let mut output = Vec::with_capacity(data.len() / FRAME_BYTES * FRAME_SAMPLES);
    let mut frame_out = [0i16; FRAME_SAMPLES];

    let frames = data.chunks(FRAME_BYTES);
    for frame in frames {
        decoder.decode_frame(frame, &mut frame_out)?;
        output.extend_from_slice(&frame_out);
    }

    Ok(output)
}
