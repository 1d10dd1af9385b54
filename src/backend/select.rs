//! Backend chosen at runtime from [`EngineConfig`]
//!
//! The host layer needs one concrete registry type regardless of which backend
//! the configuration asks for, so the variants are wrapped in enums that
//! forward every call.

use std::path::Path;

use super::headless::{HeadlessBackend, HeadlessSound};
#[cfg(feature = "rodio")]
use super::rodio_output::{RodioBackend, RodioSound};
use super::{AudioBackend, InitFlags, SoundResource};
use crate::config::{BackendKind, EngineConfig};
use crate::error::Result;
#[cfg(not(feature = "rodio"))]
use crate::error::SoundError;

pub enum SelectedBackend {
    Headless(HeadlessBackend),
    #[cfg(feature = "rodio")]
    Rodio(RodioBackend),
}

pub enum SelectedSound {
    Headless(HeadlessSound),
    #[cfg(feature = "rodio")]
    Rodio(RodioSound),
}

macro_rules! forward {
    ($value:expr, $enum:ident, $inner:ident => $body:expr) => {
        match $value {
            $enum::Headless($inner) => $body,
            #[cfg(feature = "rodio")]
            $enum::Rodio($inner) => $body,
        }
    };
}

impl SelectedBackend {
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        Self::from_kind(config.backend)
    }

    pub fn from_kind(kind: BackendKind) -> Result<Self> {
        match kind {
            BackendKind::Headless => Ok(SelectedBackend::Headless(HeadlessBackend::new())),
            #[cfg(feature = "rodio")]
            BackendKind::Rodio => Ok(SelectedBackend::Rodio(RodioBackend::new())),
            #[cfg(not(feature = "rodio"))]
            BackendKind::Rodio => Err(SoundError::Config {
                reason: "built without the `rodio` feature".to_string(),
            }),
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            SelectedBackend::Headless(_) => BackendKind::Headless,
            #[cfg(feature = "rodio")]
            SelectedBackend::Rodio(_) => BackendKind::Rodio,
        }
    }
}

impl AudioBackend for SelectedBackend {
    type Sound = SelectedSound;

    fn name(&self) -> &'static str {
        forward!(self, SelectedBackend, backend => backend.name())
    }

    fn init(&mut self) -> Result<()> {
        forward!(self, SelectedBackend, backend => backend.init())
    }

    fn uninit(&mut self) {
        forward!(self, SelectedBackend, backend => backend.uninit())
    }

    fn init_sound_from_file(&mut self, path: &Path, flags: InitFlags) -> Result<SelectedSound> {
        match self {
            SelectedBackend::Headless(backend) => backend
                .init_sound_from_file(path, flags)
                .map(SelectedSound::Headless),
            #[cfg(feature = "rodio")]
            SelectedBackend::Rodio(backend) => backend
                .init_sound_from_file(path, flags)
                .map(SelectedSound::Rodio),
        }
    }
}

impl SoundResource for SelectedSound {
    fn start(&mut self) -> Result<()> {
        forward!(self, SelectedSound, sound => sound.start())
    }

    fn stop(&mut self) -> Result<()> {
        forward!(self, SelectedSound, sound => sound.stop())
    }

    fn seek_to_pcm_frame(&mut self, frame: u64) -> Result<()> {
        forward!(self, SelectedSound, sound => sound.seek_to_pcm_frame(frame))
    }

    fn is_playing(&self) -> bool {
        forward!(self, SelectedSound, sound => sound.is_playing())
    }

    fn at_end(&self) -> bool {
        forward!(self, SelectedSound, sound => sound.at_end())
    }

    fn set_volume(&mut self, volume: f32) {
        forward!(self, SelectedSound, sound => sound.set_volume(volume))
    }

    fn volume(&self) -> f32 {
        forward!(self, SelectedSound, sound => sound.volume())
    }

    fn set_looping(&mut self, looping: bool) {
        forward!(self, SelectedSound, sound => sound.set_looping(looping))
    }

    fn is_looping(&self) -> bool {
        forward!(self, SelectedSound, sound => sound.is_looping())
    }

    fn set_start_time_ms(&mut self, ms: u32) {
        forward!(self, SelectedSound, sound => sound.set_start_time_ms(ms))
    }

    fn set_stop_time_ms(&mut self, ms: u32) {
        forward!(self, SelectedSound, sound => sound.set_stop_time_ms(ms))
    }

    fn stop_time_ms(&self) -> Option<u32> {
        forward!(self, SelectedSound, sound => sound.stop_time_ms())
    }

    fn uninit(self) {
        forward!(self, SelectedSound, sound => sound.uninit())
    }
}
