//! Host-owned engine instance
//!
//! Wraps an optional [`SoundRegistry`] with the init-once / release-once
//! lifecycle a managed host expects. Calls made before initialization (or
//! after release) are reported on the error channel and return the same
//! defaults as an invalid handle.

use std::path::Path;
use std::sync::Arc;

use crate::backend::{AudioBackend, SelectedBackend};
use crate::config::EngineConfig;
use crate::engine::{LoadParameters, SoundHandle, SoundRegistry};
use crate::error::{Result, SoundError};
use crate::logger::LogSink;

const NOT_INITIALIZED: &str = "AudioEngine is not initialized! Call InitializeEngine first.";

/// Process-level owner of the registry
pub struct HostEngine<B: AudioBackend = SelectedBackend> {
    registry: Option<SoundRegistry<B>>,
    logger: Arc<dyn LogSink>,
}

impl HostEngine<SelectedBackend> {
    /// Initialize from the default config plus `SOUNDSLOT_*` overrides
    ///
    /// A malformed override is reported and the defaults are used instead.
    pub fn initialize(&mut self) -> Result<()> {
        let config = match EngineConfig::default().with_env_overrides() {
            Ok(config) => config,
            Err(e) => {
                self.logger.warn(&format!("Ignoring environment overrides: {}", e));
                EngineConfig::default()
            }
        };
        self.initialize_with(&config)
    }

    pub fn initialize_with(&mut self, config: &EngineConfig) -> Result<()> {
        if self.registry.is_some() {
            return self.reject_reinitialize();
        }
        let backend = match SelectedBackend::from_config(config) {
            Ok(backend) => backend,
            Err(e) => {
                self.logger.error(&format!("AudioEngine backend unavailable: {}", e));
                return Err(e);
            }
        };
        self.install(backend, config.initial_capacity)
    }
}

impl<B: AudioBackend> HostEngine<B> {
    pub fn new(logger: Arc<dyn LogSink>) -> Self {
        Self {
            registry: None,
            logger,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.registry.is_some()
    }

    /// Initialize around an explicit backend
    pub fn initialize_with_backend(&mut self, backend: B) -> Result<()> {
        if self.registry.is_some() {
            return self.reject_reinitialize();
        }
        self.install(backend, 0)
    }

    fn reject_reinitialize(&self) -> Result<()> {
        self.logger.error("You are trying to reinitialize the AudioEngine!");
        Err(SoundError::AlreadyInitialized)
    }

    fn install(&mut self, backend: B, capacity: usize) -> Result<()> {
        let registry = SoundRegistry::with_capacity(backend, self.logger.clone(), capacity);
        // A failed backend still leaves an (inert) instance in place; the
        // registry has already reported why.
        if registry.is_operational() {
            self.logger.info("Successfully initialized AudioEngine.");
        }
        self.registry = Some(registry);
        Ok(())
    }

    /// Drop the registry, tearing down every live sound. No-op when not initialized.
    pub fn release(&mut self) {
        if let Some(registry) = self.registry.take() {
            registry.shutdown();
        }
    }

    pub fn registry(&self) -> Option<&SoundRegistry<B>> {
        self.registry.as_ref()
    }

    pub fn registry_mut(&mut self) -> Option<&mut SoundRegistry<B>> {
        self.registry.as_mut()
    }

    fn with_registry<T: Default>(&mut self, op: impl FnOnce(&mut SoundRegistry<B>) -> T) -> T {
        match self.registry.as_mut() {
            Some(registry) => op(registry),
            None => {
                self.logger.error(NOT_INITIALIZED);
                T::default()
            }
        }
    }

    pub fn load_sound(&mut self, path: &Path, params: LoadParameters) -> SoundHandle {
        match self.registry.as_mut() {
            Some(registry) => registry.request_sound(path, params),
            None => {
                self.logger.error(NOT_INITIALIZED);
                SoundHandle::INVALID
            }
        }
    }

    pub fn unload_sound(&mut self, handle: SoundHandle) {
        self.with_registry(|registry| registry.release_sound(handle))
    }

    pub fn play_sound(&mut self, handle: SoundHandle) {
        self.with_registry(|registry| registry.play_sound(handle))
    }

    pub fn stop_sound(&mut self, handle: SoundHandle, rewind: bool) {
        self.with_registry(|registry| registry.stop_sound(handle, rewind))
    }

    pub fn set_sound_volume(&mut self, handle: SoundHandle, volume: f32) {
        self.with_registry(|registry| registry.set_sound_volume(handle, volume))
    }

    pub fn is_sound_playing(&mut self, handle: SoundHandle) -> bool {
        self.with_registry(|registry| registry.is_sound_playing(handle))
    }

    pub fn is_sound_finished(&mut self, handle: SoundHandle) -> bool {
        self.with_registry(|registry| registry.is_sound_finished(handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use crate::logger::{LogLevel, MemorySink};

    fn host() -> (HostEngine<MockBackend>, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        (HostEngine::new(sink.clone()), sink)
    }

    #[test]
    fn test_init_and_release() {
        let (mut host, sink) = host();
        assert!(!host.is_initialized());

        host.initialize_with_backend(MockBackend::new()).unwrap();
        assert!(host.is_initialized());
        assert!(sink.contains(LogLevel::Info, "Successfully initialized AudioEngine."));

        host.release();
        assert!(!host.is_initialized());
        assert!(sink.contains(LogLevel::Info, "Successfully released AudioEngine."));

        // Releasing twice is harmless
        host.release();
    }

    #[test]
    fn test_reinitialize_preserves_instance() {
        let (mut host, sink) = host();
        let first = MockBackend::new();
        let ledger = first.ledger();
        host.initialize_with_backend(first).unwrap();
        let handle = host.load_sound(Path::new("a.wav"), LoadParameters::default());

        let err = host.initialize_with_backend(MockBackend::new()).unwrap_err();
        assert!(matches!(err, SoundError::AlreadyInitialized));
        assert!(sink.contains(LogLevel::Error, "reinitialize"));

        // Same instance: the handle is still live and the original backend untouched
        assert!(host.registry().unwrap().is_live(handle));
        assert_eq!(ledger.uninit_count(0), 0);
    }

    #[test]
    fn test_use_before_init() {
        let (mut host, sink) = host();
        let handle = host.load_sound(Path::new("a.wav"), LoadParameters::default());
        assert!(handle.is_invalid());
        assert!(!host.is_sound_playing(SoundHandle::from_raw(0)));
        host.play_sound(SoundHandle::from_raw(0));
        assert_eq!(sink.messages(LogLevel::Error).len(), 3);
    }

    #[test]
    fn test_failed_backend_still_counts_as_initialized() {
        let (mut host, sink) = host();
        host.initialize_with_backend(MockBackend::failing_init()).unwrap();
        assert!(host.is_initialized());
        assert!(!sink.contains(LogLevel::Info, "Successfully initialized"));
        assert!(host
            .load_sound(Path::new("a.wav"), LoadParameters::default())
            .is_invalid());
    }

    #[test]
    fn test_selected_backend_from_config() {
        let sink = Arc::new(MemorySink::new());
        let mut host: HostEngine = HostEngine::new(sink.clone());
        host.initialize_with(&EngineConfig::default()).unwrap();
        assert_eq!(host.registry().unwrap().backend().name(), "headless");
    }

    #[test]
    fn test_oversized_capacity_does_not_abort() {
        let sink = Arc::new(MemorySink::new());
        let mut host: HostEngine = HostEngine::new(sink.clone());
        let config = EngineConfig {
            initial_capacity: usize::MAX,
            ..EngineConfig::default()
        };

        host.initialize_with(&config).unwrap();
        assert!(host.is_initialized());
        assert!(sink.contains(LogLevel::Warn, "Could not reserve"));
        assert!(sink.contains(LogLevel::Info, "Successfully initialized AudioEngine."));
    }
}
