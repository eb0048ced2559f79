//! Asset store interface
//!
//! The engine enumerates tracks by index. Names are only shown to the user.

use cartvox_pack::TrackPack;

/// A track as handed to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetEntry<'a> {
    pub name: &'a str,
    pub data: &'a [u8],
}

/// Indexed collection of compressed tracks
pub trait AssetStore {
    fn count(&self) -> usize;

    fn get_by_index(&self, index: usize) -> Option<AssetEntry<'_>>;
}

impl AssetStore for TrackPack {
    fn count(&self) -> usize {
        self.len()
    }

    fn get_by_index(&self, index: usize) -> Option<AssetEntry<'_>> {
        self.track(index).map(|track| AssetEntry {
            name: &track.name,
            data: &track.data,
        })
    }
}
