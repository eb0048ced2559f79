//! Compressed stream cursor
//!
//! A stream borrows the selected track's bytes. The cursor only ever sits on
//! frame boundaries and is clamped to the track length; bytes past the last
//! complete frame are never handed out.

use crate::specs::FRAME_BYTES;

/// Result of a coarse seek
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekOutcome {
    /// Cursor moved and is still inside the track
    Moved,
    /// Seek would pass the first byte
    PastStart,
    /// Seek would reach or pass the last complete frame
    PastEnd,
}

/// Byte range of the current track plus a read cursor
#[derive(Debug, Clone, Copy)]
pub struct CompressedStream<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> CompressedStream<'a> {
    /// Cursor at the first frame
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Empty stream, exhausted from the start
    pub fn empty() -> Self {
        Self { data: &[], pos: 0 }
    }

    /// Track length in bytes, including any partial trailing frame
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Offset of the next frame to decode
    pub fn position(&self) -> usize {
        self.pos
    }

    /// End of the last complete frame
    pub fn playable_end(&self) -> usize {
        self.data.len() - self.data.len() % FRAME_BYTES
    }

    /// No complete frame left at the cursor
    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.playable_end()
    }

    /// Bytes of the frame at the cursor
    pub fn current_frame(&self) -> Option<&'a [u8]> {
        if self.is_exhausted() {
            return None;
        }
        Some(&self.data[self.pos..self.pos + FRAME_BYTES])
    }

    /// Step past the frame at the cursor
    pub fn advance_frame(&mut self) {
        self.pos = (self.pos + FRAME_BYTES).min(self.data.len());
    }

    /// Jump to `pos`, rounded down to a frame boundary
    ///
    /// This is a discontinuity; the caller must reset the decoder.
    pub fn rewind_to(&mut self, pos: usize) {
        let pos = pos.min(self.data.len());
        self.pos = pos - pos % FRAME_BYTES;
    }

    /// Move forward by `bytes`
    ///
    /// The cursor is left untouched when the seek leaves the track.
    pub fn seek_forward(&mut self, bytes: usize) -> SeekOutcome {
        let target = self.pos.saturating_add(bytes);
        if target >= self.playable_end() {
            return SeekOutcome::PastEnd;
        }
        self.rewind_to(target);
        SeekOutcome::Moved
    }

    /// Move backward by `bytes`
    ///
    /// Landing exactly on the start is still inside the track.
    pub fn seek_backward(&mut self, bytes: usize) -> SeekOutcome {
        match self.pos.checked_sub(bytes) {
            Some(target) => {
                self.rewind_to(target);
                SeekOutcome::Moved
            }
            None => SeekOutcome::PastStart,
        }
    }

    /// Played fraction of the track in `[0, 1]`
    pub fn progress(&self) -> f32 {
        match self.playable_end() {
            0 => 0.0,
            end => (self.pos.min(end) as f32 / end as f32).min(1.0),
        }
    }
}
