//! Sound registry
//!
//! A sparse set of loaded sounds addressed by [`SoundHandle`]. Slots live in a
//! `Vec`; released indices go on a LIFO free list and are handed out again by
//! the next load, so handle values stay small and storage is never leaked.
//!
//! Every index in `0..slot_count()` is in exactly one of two places: on the
//! free list with an empty slot, or holding a live backend sound.
//!
//! Two API flavours sit on the same core:
//! - `load`, `unload`, `play`, `stop`, ... return [`Result`] and tell the
//!   caller exactly what went wrong;
//! - `request_sound`, `release_sound`, `play_sound`, ... follow the host
//!   contract: failed loads return [`SoundHandle::INVALID`] and bad handles
//!   produce `false` or nothing.

use std::path::Path;
use std::sync::Arc;

use log::debug;

use super::handle::SoundHandle;
use super::params::LoadParameters;
use crate::backend::{AudioBackend, InitFlags, SoundResource};
use crate::error::{Result, SoundError};
use crate::logger::LogSink;

/// Handle-addressed collection of backend sounds
pub struct SoundRegistry<B: AudioBackend> {
    backend: B,
    logger: Arc<dyn LogSink>,
    /// `None` marks a free slot; its index is on `free_handles`
    slots: Vec<Option<B::Sound>>,
    free_handles: Vec<u32>,
    operational: bool,
}

impl<B: AudioBackend> SoundRegistry<B> {
    /// Bring up the backend engine and create an empty registry
    ///
    /// Never fails. If the backend cannot start, the error is reported on the
    /// logger's error channel and the registry comes back non-operational:
    /// every load returns [`SoundHandle::INVALID`] and every other call is a
    /// no-op.
    ///
    /// # Example
    /// ```
    /// use std::sync::Arc;
    /// use soundslot::backend::MockBackend;
    /// use soundslot::logger::NullSink;
    /// use soundslot::SoundRegistry;
    ///
    /// let registry = SoundRegistry::new(MockBackend::new(), Arc::new(NullSink));
    /// assert!(registry.is_operational());
    ///
    /// let broken = SoundRegistry::new(MockBackend::failing_init(), Arc::new(NullSink));
    /// assert!(!broken.is_operational());
    /// ```
    pub fn new(backend: B, logger: Arc<dyn LogSink>) -> Self {
        Self::with_capacity(backend, logger, 0)
    }

    /// Like [`SoundRegistry::new`], reserving room for `capacity` slots
    ///
    /// A reservation the allocator refuses is reported as a warning and the
    /// registry starts empty, growing on demand.
    pub fn with_capacity(mut backend: B, logger: Arc<dyn LogSink>, capacity: usize) -> Self {
        let operational = match backend.init() {
            Ok(()) => true,
            Err(e) => {
                logger.error("AudioEngine failed to initialize!");
                logger.error(&format!("{} backend: {}", backend.name(), e));
                false
            }
        };

        let mut slots = Vec::new();
        if let Err(e) = slots.try_reserve(capacity) {
            logger.warn(&format!("Could not reserve {} sound slots: {}", capacity, e));
        }

        Self {
            backend,
            logger,
            slots,
            free_handles: Vec::new(),
            operational,
        }
    }

    /// Bring up the backend engine, returning the failure instead of logging it
    pub fn try_new(mut backend: B, logger: Arc<dyn LogSink>) -> Result<Self> {
        backend.init().map_err(|e| SoundError::EngineInit {
            reason: format!("{} backend: {}", backend.name(), e),
        })?;

        Ok(Self {
            backend,
            logger,
            slots: Vec::new(),
            free_handles: Vec::new(),
            operational: true,
        })
    }

    pub fn is_operational(&self) -> bool {
        self.operational
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn logger(&self) -> &Arc<dyn LogSink> {
        &self.logger
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Load a sound and apply `params`
    ///
    /// Reuses the most recently released index if there is one, otherwise
    /// grows by one slot. On failure the index goes straight back on the free
    /// list.
    pub fn load(&mut self, path: &Path, params: LoadParameters) -> Result<SoundHandle> {
        if !self.operational {
            return Err(SoundError::EngineUnavailable);
        }

        let index = self.allocate_index()?;

        match self.backend.init_sound_from_file(path, InitFlags::WAIT_INIT) {
            Ok(mut sound) => {
                apply_parameters(&mut sound, &params);
                self.slots[index as usize] = Some(sound);
                debug!("[REGISTRY] Loaded {} as #{}", path.display(), index);
                Ok(SoundHandle::from_raw(index))
            }
            Err(e) => {
                self.free_handles.push(index);
                debug!("[REGISTRY] Load of {} failed: {}", path.display(), e);
                Err(e)
            }
        }
    }

    /// Stop (if playing) and uninitialize a sound, freeing its handle
    ///
    /// Releasing an already-released handle is rejected with
    /// [`SoundError::StaleHandle`] and a warning; the backend sound is never
    /// uninitialized twice.
    pub fn unload(&mut self, handle: SoundHandle) -> Result<()> {
        let slot = self
            .slots
            .get_mut(handle.index())
            .ok_or(SoundError::InvalidHandle {
                handle: handle.raw(),
            })?;

        let Some(mut sound) = slot.take() else {
            self.logger.warn(&format!(
                "Ignoring release of sound handle {} which is not loaded",
                handle.raw()
            ));
            return Err(SoundError::StaleHandle {
                handle: handle.raw(),
            });
        };

        if sound.is_playing() {
            if let Err(e) = sound.stop() {
                debug!("[REGISTRY] Stop before release of {} failed: {}", handle, e);
            }
        }
        sound.uninit();

        self.free_handles.push(handle.raw());
        debug!("[REGISTRY] Released {}", handle);
        Ok(())
    }

    fn allocate_index(&mut self) -> Result<u32> {
        if let Some(index) = self.free_handles.pop() {
            return Ok(index);
        }
        if self.slots.len() >= SoundHandle::MAX_SLOTS {
            return Err(SoundError::CapacityExhausted);
        }
        let index = self.slots.len() as u32;
        self.slots.push(None);
        Ok(index)
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Resolve a handle to its live sound
    ///
    /// The single place that decides what a handle means: out of range (the
    /// sentinel included) is [`SoundError::InvalidHandle`], a released slot
    /// is [`SoundError::StaleHandle`].
    pub fn try_get_sound(&mut self, handle: SoundHandle) -> Result<&mut B::Sound> {
        match self.slots.get_mut(handle.index()) {
            Some(Some(sound)) => Ok(sound),
            Some(None) => Err(SoundError::StaleHandle {
                handle: handle.raw(),
            }),
            None => Err(SoundError::InvalidHandle {
                handle: handle.raw(),
            }),
        }
    }

    /// Shared-borrow counterpart of [`SoundRegistry::try_get_sound`]
    pub fn get_sound(&self, handle: SoundHandle) -> Result<&B::Sound> {
        match self.slots.get(handle.index()) {
            Some(Some(sound)) => Ok(sound),
            Some(None) => Err(SoundError::StaleHandle {
                handle: handle.raw(),
            }),
            None => Err(SoundError::InvalidHandle {
                handle: handle.raw(),
            }),
        }
    }

    pub fn is_live(&self, handle: SoundHandle) -> bool {
        self.get_sound(handle).is_ok()
    }

    // ========================================================================
    // Playback
    // ========================================================================

    /// Start playback from the current position
    pub fn play(&mut self, handle: SoundHandle) -> Result<()> {
        self.try_get_sound(handle)?.start()
    }

    /// Stop playback, optionally seeking back to the first frame
    pub fn stop(&mut self, handle: SoundHandle, rewind: bool) -> Result<()> {
        let sound = self.try_get_sound(handle)?;
        sound.stop()?;
        if rewind {
            sound.seek_to_pcm_frame(0)?;
        }
        Ok(())
    }

    pub fn set_volume(&mut self, handle: SoundHandle, volume: f32) -> Result<()> {
        self.try_get_sound(handle)?.set_volume(volume);
        Ok(())
    }

    pub fn is_playing(&self, handle: SoundHandle) -> Result<bool> {
        Ok(self.get_sound(handle)?.is_playing())
    }

    /// Whether the sound has played to its end (never true while looping)
    pub fn is_finished(&self, handle: SoundHandle) -> Result<bool> {
        Ok(self.get_sound(handle)?.at_end())
    }

    // ========================================================================
    // Host contract
    // ========================================================================

    /// Load a sound, returning [`SoundHandle::INVALID`] on any failure
    pub fn request_sound(&mut self, path: &Path, params: LoadParameters) -> SoundHandle {
        self.load(path, params).unwrap_or(SoundHandle::INVALID)
    }

    pub fn release_sound(&mut self, handle: SoundHandle) {
        let result = self.unload(handle);
        absorb(result, "release_sound")
    }

    pub fn play_sound(&mut self, handle: SoundHandle) {
        let result = self.play(handle);
        absorb(result, "play_sound")
    }

    pub fn stop_sound(&mut self, handle: SoundHandle, rewind: bool) {
        let result = self.stop(handle, rewind);
        absorb(result, "stop_sound")
    }

    pub fn set_sound_volume(&mut self, handle: SoundHandle, volume: f32) {
        let result = self.set_volume(handle, volume);
        absorb(result, "set_sound_volume")
    }

    pub fn is_sound_playing(&self, handle: SoundHandle) -> bool {
        absorb(self.is_playing(handle), "is_sound_playing")
    }

    pub fn is_sound_finished(&self, handle: SoundHandle) -> bool {
        absorb(self.is_finished(handle), "is_sound_finished")
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    /// Number of released indices waiting for reuse
    pub fn free_slot_count(&self) -> usize {
        self.free_handles.len()
    }

    /// Total slots ever allocated, live or free
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn live_handles(&self) -> Vec<SoundHandle> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(index, _)| SoundHandle::from_raw(index as u32))
            .collect()
    }

    /// Free indices, most recently released last
    pub fn free_handles(&self) -> &[u32] {
        &self.free_handles
    }

    // ========================================================================
    // Teardown
    // ========================================================================

    /// Uninitialize every live sound, then the backend engine
    ///
    /// Dropping the registry does the same; this just makes the point of
    /// release explicit.
    pub fn shutdown(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        for sound in self.slots.drain(..).flatten() {
            sound.uninit();
        }
        self.free_handles.clear();

        if self.operational {
            self.backend.uninit();
            self.operational = false;
            self.logger.info("Successfully released AudioEngine.");
        }
    }
}

impl<B: AudioBackend> Drop for SoundRegistry<B> {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn apply_parameters<S: SoundResource>(sound: &mut S, params: &LoadParameters) {
    sound.set_looping(params.is_looping);
    sound.set_volume(params.volume);
    sound.set_start_time_ms(params.start_time);
    if let Some(stop_time) = params.stop_time() {
        sound.set_stop_time_ms(stop_time);
    }
}

/// Collapse an error into the host-facing default
fn absorb<T: Default>(result: Result<T>, op: &str) -> T {
    result.unwrap_or_else(|e| {
        debug!("[REGISTRY] {} absorbed: {}", op, e);
        T::default()
    })
}
