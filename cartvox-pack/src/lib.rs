//! cartvox track pack format (`.cvxp`)
//!
//! A pack is the cartridge's asset container: an ordered list of named,
//! pre-compressed speech tracks. Tracks are enumerated by index for playback
//! navigation; names are for display and for lookup by the tooling.
//!
//! # Layout
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  Magic (4 bytes): "CVXP"                 │
//! ├──────────────────────────────────────────┤
//! │  TrackPack (bitcode serialized)          │
//! │  ├── version: u32                        │
//! │  └── tracks: Vec<PackedTrack>            │
//! │        ├── name: String                  │
//! │        └── data: Vec<u8>  ← codec frames │
//! └──────────────────────────────────────────┘
//! ```

use std::path::Path;
use std::sync::OnceLock;

use bitcode::{Decode, Encode};
use cartvox_codec::FRAME_BYTES;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// File magic
pub const PACK_MAGIC: &[u8; 4] = b"CVXP";

/// Current pack format version
pub const PACK_VERSION: u32 = 1;

/// File extension used by the tooling
pub const PACK_EXTENSION: &str = "cvxp";

/// Errors produced while reading or writing a pack
#[derive(Debug, thiserror::Error)]
pub enum PackError {
    #[error("invalid pack magic (expected \"CVXP\")")]
    BadMagic,

    #[error("unsupported pack version {found} (max supported: {max})", max = PACK_VERSION)]
    UnsupportedVersion { found: u32 },

    #[error("failed to decode pack: {0}")]
    Decode(String),

    #[error("duplicate track name: {0}")]
    DuplicateName(String),

    #[error("pack i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// One compressed speech track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct PackedTrack {
    /// Display name (usually the source file stem)
    pub name: String,

    /// Back-to-back codec frames
    pub data: Vec<u8>,
}

impl PackedTrack {
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Number of complete frames in the track
    pub fn frame_count(&self) -> usize {
        self.data.len() / FRAME_BYTES
    }

    /// Whether the data ends on a frame boundary
    pub fn is_frame_aligned(&self) -> bool {
        self.data.len() % FRAME_BYTES == 0
    }
}

/// Ordered collection of tracks
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
pub struct TrackPack {
    /// Pack format version
    pub version: u32,

    tracks: Vec<PackedTrack>,

    // Name lookup cache (built lazily on first access)
    #[serde(skip)]
    #[bitcode(skip)]
    name_index: OnceLock<HashMap<String, usize>>,
}

impl Default for TrackPack {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackPack {
    /// Create an empty pack at the current version
    pub fn new() -> Self {
        Self {
            version: PACK_VERSION,
            tracks: Vec::new(),
            name_index: OnceLock::new(),
        }
    }

    /// Build a pack from tracks, rejecting duplicate names
    pub fn with_tracks(tracks: Vec<PackedTrack>) -> Result<Self, PackError> {
        let mut pack = Self::new();
        for track in tracks {
            pack.push_track(track)?;
        }
        Ok(pack)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Track by playback index
    pub fn track(&self, index: usize) -> Option<&PackedTrack> {
        self.tracks.get(index)
    }

    pub fn tracks(&self) -> &[PackedTrack] {
        &self.tracks
    }

    /// Find a track by name (O(1) lookup via lazy-initialized hash index)
    pub fn find_track(&self, name: &str) -> Option<&PackedTrack> {
        let index = self.name_index.get_or_init(|| build_index(&self.tracks));
        index.get(name).map(|&i| &self.tracks[i])
    }

    /// Append a track
    ///
    /// Invalidates the name index.
    pub fn push_track(&mut self, track: PackedTrack) -> Result<(), PackError> {
        if self.tracks.iter().any(|t| t.name == track.name) {
            return Err(PackError::DuplicateName(track.name));
        }
        self.tracks.push(track);
        self.name_index = OnceLock::new();
        Ok(())
    }

    /// Serialize to bytes with magic header
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = PACK_MAGIC.to_vec();
        bytes.extend(bitcode::encode(self));
        bytes
    }

    /// Deserialize from bytes and validate
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PackError> {
        if bytes.len() < PACK_MAGIC.len() || &bytes[..PACK_MAGIC.len()] != PACK_MAGIC {
            return Err(PackError::BadMagic);
        }

        let pack: TrackPack = bitcode::decode(&bytes[PACK_MAGIC.len()..])
            .map_err(|e| PackError::Decode(e.to_string()))?;

        pack.validate()?;
        Ok(pack)
    }

    /// Check version and names, warn about partial trailing frames
    pub fn validate(&self) -> Result<(), PackError> {
        if self.version > PACK_VERSION {
            return Err(PackError::UnsupportedVersion {
                found: self.version,
            });
        }

        let mut seen = hashbrown::HashSet::with_capacity(self.tracks.len());
        for track in &self.tracks {
            if !seen.insert(track.name.as_str()) {
                return Err(PackError::DuplicateName(track.name.clone()));
            }
            if !track.is_frame_aligned() {
                tracing::warn!(
                    "track '{}' has {} trailing bytes that will not be played",
                    track.name,
                    track.data.len() % FRAME_BYTES
                );
            }
        }

        Ok(())
    }

    /// Read and validate a pack file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PackError> {
        let bytes = std::fs::read(path.as_ref())?;
        let pack = Self::from_bytes(&bytes)?;
        tracing::debug!(
            "loaded pack {} ({} tracks)",
            path.as_ref().display(),
            pack.len()
        );
        Ok(pack)
    }

    /// Write the pack to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PackError> {
        std::fs::write(path, self.to_bytes())?;
        Ok(())
    }
}

fn build_index(tracks: &[PackedTrack]) -> HashMap<String, usize> {
    tracks
        .iter()
        .enumerate()
        .map(|(i, track)| (track.name.clone(), i))
        .collect()
}
