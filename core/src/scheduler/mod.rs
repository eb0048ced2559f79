//! Playback scheduler
//!
//! The top-level loop. Each tick reads input once, applies at most one
//! navigation command, fills the idle output buffer, waits for the display
//! refresh and swaps buffers.
//!
//! # Tick order
//!
//! ```text
//! poll input ─► edges ─► command ─► auto-advance ─► fill ─► await tick ─► commit ─► status
//! ```
//!
//! All engine state lives in [`Player`] and is passed by exclusive reference;
//! nothing is shared with the interrupt side.

use crate::config::EngineConfig;
use crate::decode::{DecodeAdapter, FrameDecoder};
use crate::error::EngineError;
use crate::hardware::HardwareIo;
use crate::input::{Buttons, NavCommand};
use crate::nav::NavigationState;
use crate::resample::{self, ResamplerCursor, StreamSource};
use crate::sink::OutputSink;
use crate::status::{Clock, StatusDisplay, StatusFrame};
use crate::store::AssetStore;
use crate::stream::{CompressedStream, SeekOutcome};


/// Where a newly loaded track starts playing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackStart {
    Beginning,
    /// A fixed number of frames before the end (backward scrub into the track)
    Tail,
}

impl TrackStart {
    fn from_tail(tail: bool) -> Self {
        if tail { Self::Tail } else { Self::Beginning }
    }
}

/// The streaming playback engine
pub struct Player<'a, S: AssetStore + ?Sized, D: FrameDecoder> {
    store: &'a S,
    config: EngineConfig,
    repeat_mask: Buttons,
    nav: NavigationState,
    stream: CompressedStream<'a>,
    track_name: &'a str,
    adapter: DecodeAdapter<D>,
    cursor: ResamplerCursor,
    sink: OutputSink,
    ticks: u64,
    announce_track: bool,
}

impl<'a, S: AssetStore + ?Sized, D: FrameDecoder> Player<'a, S, D> {
    /// Create a player positioned at the start of the first track
    ///
    /// # Errors
    /// [`EngineError::AssetMissing`] when the store is empty.
    pub fn new(store: &'a S, decoder: D, config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;

        let count = store.count();
        if count == 0 {
            return Err(EngineError::AssetMissing);
        }

        let mut player = Self {
            store,
            repeat_mask: config.repeat_mask(),
            config,
            nav: NavigationState::new(count),
            stream: CompressedStream::empty(),
            track_name: "",
            adapter: DecodeAdapter::new(decoder),
            cursor: ResamplerCursor::new(),
            sink: OutputSink::new(),
            ticks: 0,
            announce_track: false,
        };
        player.load_track(0, TrackStart::Beginning);
        Ok(player)
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Run one display refresh worth of work
    pub fn tick<H, T>(&mut self, hw: &mut H, status: &mut T)
    where
        H: HardwareIo + ?Sized,
        T: StatusDisplay + ?Sized,
    {
        let input = hw.poll_input();
        if let Some(command) = self.nav.observe(input, self.repeat_mask) {
            self.apply(command);
        }

        if !self.nav.paused && self.stream.is_exhausted() && self.cursor.is_exhausted() {
            self.load_track(self.nav.next_track(), TrackStart::Beginning);
        }

        if self.announce_track {
            self.announce_track = false;
            status.show_track_change(self.nav.current_track, self.nav.track_count, self.track_name);
        }

        let out = self.sink.filling_mut();
        if self.nav.paused {
            resample::fill_hold(out, self.cursor.last_sample);
        } else {
            let mut source = StreamSource {
                adapter: &mut self.adapter,
                stream: &mut self.stream,
            };
            resample::fill(out, &mut self.cursor, &mut source);
        }

        hw.await_next_tick();
        self.sink.commit(hw);
        self.ticks += 1;

        status.show_frame(&self.status_frame());
    }

    /// Tick for the lifetime of the process
    pub fn run<H, T>(&mut self, hw: &mut H, status: &mut T) -> !
    where
        H: HardwareIo + ?Sized,
        T: StatusDisplay + ?Sized,
    {
        loop {
            self.tick(hw, status);
        }
    }

    /// Tick a fixed number of times
    pub fn run_for<H, T>(&mut self, hw: &mut H, status: &mut T, ticks: u64)
    where
        H: HardwareIo + ?Sized,
        T: StatusDisplay + ?Sized,
    {
        for _ in 0..ticks {
            self.tick(hw, status);
        }
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    fn apply(&mut self, command: NavCommand) {
        match command {
            NavCommand::ToggleLock => {
                let locked = self.nav.toggle_lock();
                tracing::debug!("input {}", if locked { "locked" } else { "unlocked" });
            }
            NavCommand::TogglePause => {
                let paused = self.nav.toggle_pause();
                tracing::debug!("{}", if paused { "paused" } else { "resumed" });
            }
            NavCommand::NextTrack { tail } => {
                self.load_track(self.nav.next_track(), TrackStart::from_tail(tail))
            }
            NavCommand::PreviousTrack { tail } => {
                self.load_track(self.nav.previous_track(), TrackStart::from_tail(tail))
            }
            NavCommand::SeekForward => match self.stream.seek_forward(self.config.seek_bytes()) {
                SeekOutcome::Moved => self.after_jump(),
                SeekOutcome::PastEnd | SeekOutcome::PastStart => {
                    self.load_track(self.nav.next_track(), TrackStart::Beginning)
                }
            },
            NavCommand::SeekBackward => match self.stream.seek_backward(self.config.seek_bytes()) {
                SeekOutcome::Moved => self.after_jump(),
                SeekOutcome::PastStart | SeekOutcome::PastEnd => {
                    self.load_track(self.nav.previous_track(), TrackStart::Tail)
                }
            },
        }
    }

    fn after_jump(&mut self) {
        self.adapter.reset();
        self.cursor.mark_exhausted();
        tracing::debug!("seek to byte {}", self.stream.position());
    }

    /// Replace the stream with track `index`
    pub fn load_track(&mut self, index: usize, start: TrackStart) {
        let store = self.store;
        let (name, data) = match store.get_by_index(index) {
            Some(entry) => (entry.name, entry.data),
            None => {
                tracing::warn!("track {} missing from store, playing silence", index);
                ("", &[][..])
            }
        };

        self.stream = CompressedStream::new(data);
        if start == TrackStart::Tail {
            let end = self.stream.playable_end();
            self.stream
                .rewind_to(end.saturating_sub(self.config.rewind_tail_bytes()));
        }

        self.adapter.reset();
        self.cursor.mark_exhausted();
        self.nav.current_track = index;
        self.track_name = name;
        self.announce_track = true;

        tracing::info!(
            "track {} '{}' ({} bytes) from byte {}",
            index,
            name,
            data.len(),
            self.stream.position()
        );
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn status_frame(&self) -> StatusFrame {
        StatusFrame {
            paused: self.nav.paused,
            locked: self.nav.input_locked,
            track_index: self.nav.current_track,
            track_count: self.nav.track_count,
            elapsed: Clock::from_stream_bytes(self.stream.position()),
            progress: self.stream.progress(),
        }
    }

    pub fn nav(&self) -> &NavigationState {
        &self.nav
    }

    pub fn stream(&self) -> &CompressedStream<'a> {
        &self.stream
    }

    pub fn cursor(&self) -> &ResamplerCursor {
        &self.cursor
    }

    pub fn sink(&self) -> &OutputSink {
        &self.sink
    }

    pub fn adapter(&self) -> &DecodeAdapter<D> {
        &self.adapter
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn current_track(&self) -> usize {
        self.nav.current_track
    }

    pub fn track_name(&self) -> &str {
        self.track_name
    }

    pub fn is_paused(&self) -> bool {
        self.nav.paused
    }

    pub fn is_locked(&self) -> bool {
        self.nav.input_locked
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
