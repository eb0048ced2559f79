//! Engine errors
//!
//! Only startup can fail. Once the scheduler runs, decode failures and stream
//! boundaries are handled in place.

use cartvox_pack::PackError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("no playable tracks found")]
    AssetMissing,

    #[error(transparent)]
    Pack(#[from] PackError),

    #[error("invalid configuration: {0}")]
    Config(String),
}
