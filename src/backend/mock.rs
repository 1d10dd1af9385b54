//! Mock backend for testing
//!
//! Never touches the file system or an output device. Every call lands in a
//! shared [`MockLedger`] so tests can assert on exactly what the registry asked
//! the backend to do, including how often each sound was uninitialized.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::{AudioBackend, InitFlags, SoundResource};
use crate::error::{Result, SoundError};

/// One recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    EngineInit,
    EngineUninit,
    SoundInit { id: u64, path: PathBuf, flags: InitFlags },
    SoundUninit { id: u64 },
    Start { id: u64 },
    Stop { id: u64 },
    Seek { id: u64, frame: u64 },
    SetVolume { id: u64, volume: f32 },
    SetLooping { id: u64, looping: bool },
    SetStartTime { id: u64, ms: u32 },
    SetStopTime { id: u64, ms: u32 },
}

/// Shared call log
#[derive(Debug, Default)]
pub struct MockLedger {
    calls: Mutex<Vec<MockCall>>,
}

impl MockLedger {
    pub fn calls(&self) -> Vec<MockCall> {
        match self.calls.lock() {
            Ok(calls) => calls.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn count(&self, predicate: impl Fn(&MockCall) -> bool) -> usize {
        self.calls().iter().filter(|c| predicate(c)).count()
    }

    /// Number of times sound `id` was uninitialized
    pub fn uninit_count(&self, id: u64) -> usize {
        self.count(|c| matches!(c, MockCall::SoundUninit { id: i } if *i == id))
    }

    /// Ids of every sound successfully created, in creation order
    pub fn created_ids(&self) -> Vec<u64> {
        self.calls()
            .iter()
            .filter_map(|c| match c {
                MockCall::SoundInit { id, .. } => Some(*id),
                _ => None,
            })
            .collect()
    }

    /// Whether a stop time was ever configured on sound `id`
    pub fn stop_time_set(&self, id: u64) -> bool {
        self.count(|c| matches!(c, MockCall::SetStopTime { id: i, .. } if *i == id)) > 0
    }

    pub fn clear(&self) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.clear();
        }
    }

    fn record(&self, call: MockCall) {
        let mut calls = match self.calls.lock() {
            Ok(calls) => calls,
            Err(poisoned) => poisoned.into_inner(),
        };
        calls.push(call);
    }
}

/// Backend that records calls instead of producing sound
#[derive(Debug, Default)]
pub struct MockBackend {
    ledger: Arc<MockLedger>,
    fail_engine_init: bool,
    rejected: HashSet<PathBuf>,
    next_id: u64,
    initialized: bool,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `init` fail, leaving any registry built on it non-operational
    pub fn failing_init() -> Self {
        Self {
            fail_engine_init: true,
            ..Self::default()
        }
    }

    /// Make loads of `path` fail as if the file were missing
    pub fn reject(mut self, path: impl Into<PathBuf>) -> Self {
        self.rejected.insert(path.into());
        self
    }

    pub fn ledger(&self) -> Arc<MockLedger> {
        self.ledger.clone()
    }
}

impl AudioBackend for MockBackend {
    type Sound = MockSound;

    fn name(&self) -> &'static str {
        "mock"
    }

    fn init(&mut self) -> Result<()> {
        if self.fail_engine_init {
            return Err(SoundError::backend("mock engine configured to fail"));
        }
        self.initialized = true;
        self.ledger.record(MockCall::EngineInit);
        Ok(())
    }

    fn uninit(&mut self) {
        self.initialized = false;
        self.ledger.record(MockCall::EngineUninit);
    }

    fn init_sound_from_file(&mut self, path: &Path, flags: InitFlags) -> Result<MockSound> {
        if !self.initialized {
            return Err(SoundError::EngineUnavailable);
        }
        if self.rejected.contains(path) {
            return Err(SoundError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let id = self.next_id;
        self.next_id += 1;
        self.ledger.record(MockCall::SoundInit {
            id,
            path: path.to_path_buf(),
            flags,
        });

        Ok(MockSound {
            id,
            ledger: self.ledger.clone(),
            playing: false,
            finished: false,
            frame: 0,
            volume: 1.0,
            looping: false,
            start_time_ms: 0,
            stop_time_ms: None,
        })
    }
}

/// Sound that tracks its settings and logs every call
#[derive(Debug)]
pub struct MockSound {
    id: u64,
    ledger: Arc<MockLedger>,
    playing: bool,
    finished: bool,
    frame: u64,
    volume: f32,
    looping: bool,
    start_time_ms: u32,
    stop_time_ms: Option<u32>,
}

impl MockSound {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn start_time_ms(&self) -> u32 {
        self.start_time_ms
    }

    /// Simulate the sound running off its end
    pub fn finish(&mut self) {
        if !self.looping {
            self.playing = false;
            self.finished = true;
        }
    }
}

impl SoundResource for MockSound {
    fn start(&mut self) -> Result<()> {
        self.ledger.record(MockCall::Start { id: self.id });
        self.playing = true;
        self.finished = false;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.ledger.record(MockCall::Stop { id: self.id });
        self.playing = false;
        Ok(())
    }

    fn seek_to_pcm_frame(&mut self, frame: u64) -> Result<()> {
        self.ledger.record(MockCall::Seek { id: self.id, frame });
        self.frame = frame;
        self.finished = false;
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn at_end(&self) -> bool {
        self.finished
    }

    fn set_volume(&mut self, volume: f32) {
        self.ledger.record(MockCall::SetVolume {
            id: self.id,
            volume,
        });
        self.volume = volume;
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_looping(&mut self, looping: bool) {
        self.ledger.record(MockCall::SetLooping {
            id: self.id,
            looping,
        });
        self.looping = looping;
    }

    fn is_looping(&self) -> bool {
        self.looping
    }

    fn set_start_time_ms(&mut self, ms: u32) {
        self.ledger.record(MockCall::SetStartTime { id: self.id, ms });
        self.start_time_ms = ms;
    }

    fn set_stop_time_ms(&mut self, ms: u32) {
        self.ledger.record(MockCall::SetStopTime { id: self.id, ms });
        self.stop_time_ms = Some(ms);
    }

    fn stop_time_ms(&self) -> Option<u32> {
        self.stop_time_ms
    }

    fn uninit(self) {
        self.ledger.record(MockCall::SoundUninit { id: self.id });
    }
}
