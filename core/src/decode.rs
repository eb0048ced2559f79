//! Decode adapter
//!
//! Wraps a stateful frame decoder and the most recently decoded frame. The
//! adapter is the only thing that advances the stream cursor during playback,
//! always by exactly one frame.

use cartvox_codec::{CodecError, SpeechDecoder};

use crate::specs::FRAME_SAMPLES;
use crate::stream::CompressedStream;

/// Log a summary every this many decode failures
const FAILURE_SUMMARY_INTERVAL: u64 = 64;

/// A frame that could not be decoded
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("decoder rejected frame: {0}")]
    Rejected(String),
}

/// Speech decoder as seen by the engine
pub trait FrameDecoder {
    /// Return to the fixed starting configuration
    fn reset(&mut self);

    /// Decode one compressed frame into `out`
    fn decode(&mut self, frame: &[u8], out: &mut [i16; FRAME_SAMPLES]) -> Result<(), DecodeError>;
}

impl FrameDecoder for SpeechDecoder {
    fn reset(&mut self) {
        SpeechDecoder::reset(self);
    }

    fn decode(&mut self, frame: &[u8], out: &mut [i16; FRAME_SAMPLES]) -> Result<(), DecodeError> {
        Ok(self.decode_frame(frame, out)?)
    }
}

/// One frame of decoded samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedFrame(pub [i16; FRAME_SAMPLES]);

impl Default for DecodedFrame {
    fn default() -> Self {
        Self([0; FRAME_SAMPLES])
    }
}

impl DecodedFrame {
    pub fn samples(&self) -> &[i16; FRAME_SAMPLES] {
        &self.0
    }

    /// Overwrite every sample with `value`
    pub fn fill(&mut self, value: i16) {
        self.0.fill(value);
    }
}

/// What `decode_next` produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// The frame decoded normally
    Decoded,
    /// The frame was corrupt; the held sample was substituted
    Substituted,
    /// No complete frame left
    Exhausted,
}

/// Owns the decoder state and the current frame
#[derive(Debug)]
pub struct DecodeAdapter<D> {
    decoder: D,
    frame: DecodedFrame,
    frames_decoded: u64,
    decode_failures: u64,
}

impl<D: FrameDecoder> DecodeAdapter<D> {
    pub fn new(decoder: D) -> Self {
        Self {
            decoder,
            frame: DecodedFrame::default(),
            frames_decoded: 0,
            decode_failures: 0,
        }
    }

    /// Re-initialize the decoder after a jump
    pub fn reset(&mut self) {
        self.decoder.reset();
    }

    /// Decode the frame at the cursor and step past it
    ///
    /// A failed frame becomes `hold` repeated, so playback continues at the
    /// last emitted level.
    pub fn decode_next(&mut self, stream: &mut CompressedStream<'_>, hold: i16) -> FrameStatus {
        let Some(bytes) = stream.current_frame() else {
            return FrameStatus::Exhausted;
        };
        let offset = stream.position();
        stream.advance_frame();

        match self.decoder.decode(bytes, &mut self.frame.0) {
            Ok(()) => {
                self.frames_decoded += 1;
                FrameStatus::Decoded
            }
            Err(e) => {
                self.decode_failures += 1;
                self.frame.fill(hold);
                tracing::debug!("frame at offset {} failed to decode: {}", offset, e);
                if self.decode_failures % FAILURE_SUMMARY_INTERVAL == 0 {
                    tracing::warn!("{} frames failed to decode so far", self.decode_failures);
                }
                FrameStatus::Substituted
            }
        }
    }

    pub fn frame(&self) -> &DecodedFrame {
        &self.frame
    }

    pub fn frames_decoded(&self) -> u64 {
        self.frames_decoded
    }

    pub fn decode_failures(&self) -> u64 {
        self.decode_failures
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::specs::FRAME_BYTES;
    use cartvox_codec::SpeechEncoder;

    #[test]
    fn test_decodes_encoded_track() {
        let pcm: Vec<i16> = (0..FRAME_SAMPLES * 3).map(|i| (i as i16) * 20).collect();
        let data = SpeechEncoder::new().encode_stream(&pcm);
        let mut stream = CompressedStream::new(&data);
        let mut adapter = DecodeAdapter::new(SpeechDecoder::new());

        for _ in 0..3 {
            assert_eq!(adapter.decode_next(&mut stream, 0), FrameStatus::Decoded);
        }
        assert_eq!(adapter.decode_next(&mut stream, 0), FrameStatus::Exhausted);
        assert_eq!(adapter.frames_decoded(), 3);
        assert_eq!(stream.position(), data.len());
    }

    #[test]
    fn test_corrupt_frame_holds_and_advances() {
        let mut data = SpeechEncoder::new().encode_stream(&[500; FRAME_SAMPLES * 2]);
        data[0] = 0x00;
        let mut stream = CompressedStream::new(&data);
        let mut adapter = DecodeAdapter::new(SpeechDecoder::new());

        assert_eq!(adapter.decode_next(&mut stream, -1234), FrameStatus::Substituted);
        assert!(adapter.frame().samples().iter().all(|&s| s == -1234));
        assert_eq!(stream.position(), FRAME_BYTES);
        assert_eq!(adapter.decode_failures(), 1);

        assert_eq!(adapter.decode_next(&mut stream, 0), FrameStatus::Decoded);
    }
}
