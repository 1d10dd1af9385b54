//! Audio backend abstraction
//!
//! The registry never decodes or mixes audio itself. It drives an
//! [`AudioBackend`], which owns the output engine and hands out
//! [`SoundResource`]s that the registry stores in its slots.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │        SoundRegistry         │
//! │  handles, free list, slots   │
//! └──────────────┬───────────────┘
//!                │ init_sound_from_file / start / stop / ...
//!                ▼
//! ┌──────────────────────────────┐
//! │      trait AudioBackend      │
//! └──────┬───────────┬───────────┘
//!        ▼           ▼           ▼
//!    Headless      Mock        Rodio
//!  (clock only) (call ledger) (output device)
//! ```

pub mod headless;
pub mod mock;
#[cfg(feature = "rodio")]
pub mod rodio_output;
pub mod select;

use std::path::Path;

use crate::error::Result;

pub use headless::{ClockHandle, EngineClock, HeadlessBackend, HeadlessSound};
pub use mock::{MockBackend, MockCall, MockLedger, MockSound};
pub use select::{SelectedBackend, SelectedSound};

/// Flags passed when initializing a sound from a file
///
/// The registry always loads with [`InitFlags::WAIT_INIT`]; backends log the
/// bits they were given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InitFlags(u32);

impl InitFlags {
    /// Block the calling thread until the sound is ready to play
    pub const WAIT_INIT: InitFlags = InitFlags(1 << 0);

    pub const fn bits(self) -> u32 {
        self.0
    }
}

/// A single loaded sound owned by a registry slot
///
/// Setters for looping, volume and the play range cannot fail; transport
/// operations may, and the registry absorbs those failures.
pub trait SoundResource {
    /// Start playback from the current position
    fn start(&mut self) -> Result<()>;

    /// Stop playback, keeping the current position
    fn stop(&mut self) -> Result<()>;

    fn seek_to_pcm_frame(&mut self, frame: u64) -> Result<()>;

    fn is_playing(&self) -> bool;

    /// True once a non-looping sound has played through its range
    fn at_end(&self) -> bool;

    fn set_volume(&mut self, volume: f32);

    fn volume(&self) -> f32;

    fn set_looping(&mut self, looping: bool);

    fn is_looping(&self) -> bool;

    /// Offset into the clip where playback begins
    fn set_start_time_ms(&mut self, ms: u32);

    /// Offset where playback ends
    fn set_stop_time_ms(&mut self, ms: u32);

    /// The explicit stop point, `None` when playing to the natural end
    fn stop_time_ms(&self) -> Option<u32>;

    /// Release backend resources. Consumes the sound so it runs at most once.
    fn uninit(self)
    where
        Self: Sized;
}

/// The external mixing engine
pub trait AudioBackend {
    type Sound: SoundResource;

    /// Backend name for diagnostics (e.g. "headless", "rodio")
    fn name(&self) -> &'static str;

    /// Bring up the engine. Called once by the registry at construction.
    fn init(&mut self) -> Result<()>;

    /// Tear the engine down. Called once at registry teardown, after every
    /// live sound has been uninitialized.
    fn uninit(&mut self);

    /// Create a sound from a file on disk
    fn init_sound_from_file(&mut self, path: &Path, flags: InitFlags) -> Result<Self::Sound>;
}

/// Convert milliseconds into PCM frames at `sample_rate`
pub(crate) fn ms_to_frames(ms: u32, sample_rate: u32) -> u64 {
    u64::from(ms) * u64::from(sample_rate) / 1000
}
