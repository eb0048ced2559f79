//! Engine configuration
//!
//! Lives in the `[engine]` table of the player's `config.toml`.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::input::Buttons;
use crate::specs::FRAME_BYTES;

/// Navigation tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Frames skipped by one coarse seek (default: 50)
    #[serde(default = "default_seek_frames")]
    pub seek_frames: usize,
    /// Frames before the end a backward wrap lands on (default: 60)
    #[serde(default = "default_rewind_tail_frames")]
    pub rewind_tail_frames: usize,
    /// Keep seeking while L/R is held (default: true)
    #[serde(default = "default_true")]
    pub repeat_seek: bool,
}

fn default_seek_frames() -> usize {
    50
}
fn default_rewind_tail_frames() -> usize {
    60
}
fn default_true() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seek_frames: default_seek_frames(),
            rewind_tail_frames: default_rewind_tail_frames(),
            repeat_seek: default_true(),
        }
    }
}

impl EngineConfig {
    /// Bytes moved by one seek
    ///
    /// Saturates for configs that skipped [`EngineConfig::validate`].
    pub fn seek_bytes(&self) -> usize {
        self.seek_frames.saturating_mul(FRAME_BYTES)
    }

    /// Bytes kept before the end when wrapping backward
    pub fn rewind_tail_bytes(&self) -> usize {
        self.rewind_tail_frames.saturating_mul(FRAME_BYTES)
    }

    /// Buttons that act on every held tick
    pub fn repeat_mask(&self) -> Buttons {
        if self.repeat_seek {
            Buttons::L | Buttons::R
        } else {
            Buttons::empty()
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.seek_frames == 0 {
            return Err(EngineError::Config(
                "engine.seek_frames must be at least 1".to_string(),
            ));
        }
        for (key, frames) in [
            ("seek_frames", self.seek_frames),
            ("rewind_tail_frames", self.rewind_tail_frames),
        ] {
            if frames.checked_mul(FRAME_BYTES).is_none() {
                return Err(EngineError::Config(format!(
                    "engine.{} is too large: {}",
                    key, frames
                )));
            }
        }
        Ok(())
    }
}
