//! cartvox core - streaming speech playback engine
//!
//! Streams pre-compressed speech from cartridge storage to fixed-rate sound
//! hardware, one display refresh at a time, while the operator browses tracks.
//!
//! # Architecture
//!
//! - [`DecodeAdapter`] - Stateful frame decoder plus the current decoded frame
//! - [`resample`] - 2:1 interpolating resampler with silence-hold
//! - [`OutputSink`] - Double-buffered output with the transfer handshake
//! - [`Player`] - Per-tick scheduler and track navigation state machine
//!
//! The machine itself is behind [`HardwareIo`]; [`SimulatedHardware`] stands
//! in for it in tests and headless rendering.

pub mod config;
pub mod decode;
pub mod error;
pub mod hardware;
pub mod input;
pub mod irq;
pub mod nav;
pub mod resample;
pub mod scheduler;
pub mod sim;
pub mod sink;
pub mod specs;
pub mod status;
pub mod store;
pub mod stream;

pub use config::EngineConfig;
pub use decode::{DecodeAdapter, DecodeError, DecodedFrame, FrameDecoder, FrameStatus};
pub use error::EngineError;
pub use hardware::{BufferId, HardwareIo, TransferConfig, TransferMode};
pub use input::{Buttons, InputEdges, NavCommand};
pub use irq::{InterruptFlags, Interrupts};
pub use nav::NavigationState;
pub use resample::{FrameSource, ResamplerCursor};
pub use scheduler::{Player, TrackStart};
pub use sim::SimulatedHardware;
pub use sink::{BufferRole, OutputSink};
pub use specs::{HardwareSpecs, handheld_specs};
pub use status::{Clock, NullStatus, StatusDisplay, StatusFrame, TracingStatus};
pub use store::{AssetEntry, AssetStore};
pub use stream::{CompressedStream, SeekOutcome};
