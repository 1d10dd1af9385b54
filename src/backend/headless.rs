//! Headless backend
//!
//! Reads WAV headers with `hound` and tracks each sound's playhead against an
//! [`EngineClock`] without opening an output device. Useful on servers, in CI,
//! and anywhere the host only needs timing and state.
//!
//! The clock is either real time or advanced by hand through a
//! [`ClockHandle`], which makes playback fully deterministic in tests.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use hound::WavReader;
use log::debug;

use super::{ms_to_frames, AudioBackend, InitFlags, SoundResource};
use crate::error::{Result, SoundError};

/// Time source shared by the backend and every sound it creates
#[derive(Debug, Clone)]
pub enum EngineClock {
    /// Wall clock, measured from backend creation
    Realtime(Instant),
    /// Microseconds advanced explicitly through a [`ClockHandle`]
    Manual(Arc<AtomicU64>),
}

impl EngineClock {
    pub fn realtime() -> Self {
        EngineClock::Realtime(Instant::now())
    }

    pub fn manual() -> (Self, ClockHandle) {
        let ticks = Arc::new(AtomicU64::new(0));
        (EngineClock::Manual(ticks.clone()), ClockHandle(ticks))
    }

    pub fn now_micros(&self) -> u64 {
        match self {
            EngineClock::Realtime(origin) => origin.elapsed().as_micros() as u64,
            EngineClock::Manual(ticks) => ticks.load(Ordering::Acquire),
        }
    }
}

/// Drives a manual [`EngineClock`]
#[derive(Debug, Clone)]
pub struct ClockHandle(Arc<AtomicU64>);

impl ClockHandle {
    pub fn advance(&self, by: Duration) {
        self.0.fetch_add(by.as_micros() as u64, Ordering::AcqRel);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_micros(self.0.load(Ordering::Acquire))
    }
}

/// Transport state of a headless sound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Finished,
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackState::Stopped => write!(f, "Stopped"),
            PlaybackState::Playing => write!(f, "Playing"),
            PlaybackState::Finished => write!(f, "Finished"),
        }
    }
}

/// Backend that validates WAV files and simulates playback timing
#[derive(Debug)]
pub struct HeadlessBackend {
    clock: EngineClock,
    initialized: bool,
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessBackend {
    /// Backend driven by the wall clock
    pub fn new() -> Self {
        Self::with_clock(EngineClock::realtime())
    }

    /// Backend driven by hand; advance time through the returned handle
    ///
    /// # Example
    /// ```
    /// use soundslot::backend::HeadlessBackend;
    /// let (backend, clock) = HeadlessBackend::manual();
    /// clock.advance_ms(20);
    /// assert_eq!(backend.clock().now_micros(), 20_000);
    /// ```
    pub fn manual() -> (Self, ClockHandle) {
        let (clock, handle) = EngineClock::manual();
        (Self::with_clock(clock), handle)
    }

    pub fn with_clock(clock: EngineClock) -> Self {
        Self {
            clock,
            initialized: false,
        }
    }

    pub fn clock(&self) -> &EngineClock {
        &self.clock
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

impl AudioBackend for HeadlessBackend {
    type Sound = HeadlessSound;

    fn name(&self) -> &'static str {
        "headless"
    }

    fn init(&mut self) -> Result<()> {
        self.initialized = true;
        debug!("[HEADLESS] Engine initialized");
        Ok(())
    }

    fn uninit(&mut self) {
        self.initialized = false;
        debug!("[HEADLESS] Engine released");
    }

    /// Headers are always read synchronously, so `WAIT_INIT` is implied
    fn init_sound_from_file(&mut self, path: &Path, flags: InitFlags) -> Result<HeadlessSound> {
        if !self.initialized {
            return Err(SoundError::EngineUnavailable);
        }

        if !path.exists() {
            return Err(SoundError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let reader = WavReader::open(path).map_err(|e| SoundError::InvalidAudio {
            reason: format!("Failed to open WAV file: {}", e),
            source: Some(Box::new(e)),
        })?;

        let spec = reader.spec();
        if spec.channels == 0 || spec.sample_rate == 0 {
            return Err(SoundError::UnsupportedFormat {
                format: format!("{} channels at {} Hz", spec.channels, spec.sample_rate),
            });
        }

        let length_frames = u64::from(reader.duration());
        debug!(
            "[HEADLESS] Loaded {} ({} frames, {} Hz, {} ch, flags {:#x})",
            path.display(),
            length_frames,
            spec.sample_rate,
            spec.channels,
            flags.bits()
        );

        Ok(HeadlessSound {
            path: path.to_path_buf(),
            clock: self.clock.clone(),
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            length_frames,
            cursor: 0,
            playing_since: None,
            volume: 1.0,
            looping: false,
            start_frame: 0,
            stop_frame: None,
            stop_time_ms: None,
        })
    }
}

/// A WAV file's timing, tracked against the engine clock
#[derive(Debug)]
pub struct HeadlessSound {
    path: PathBuf,
    clock: EngineClock,
    sample_rate: u32,
    channels: u16,
    length_frames: u64,

    /// Playhead in frames as of `playing_since` (or now, when stopped)
    cursor: u64,
    /// Clock reading when the current run started
    playing_since: Option<u64>,

    volume: f32,
    looping: bool,
    start_frame: u64,
    stop_frame: Option<u64>,
    stop_time_ms: Option<u32>,
}

impl HeadlessSound {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn length_frames(&self) -> u64 {
        self.length_frames
    }

    pub fn duration(&self) -> Duration {
        frames_to_duration(self.length_frames, self.sample_rate)
    }

    /// Current playhead in frames
    pub fn position_frames(&self) -> u64 {
        let end = self.range_end();
        let start = self.range_start();
        let raw = self.cursor.saturating_add(self.elapsed_frames());

        if raw < end {
            raw
        } else if self.looping && self.playing_since.is_some() && end > start && raw >= start {
            start + (raw - start) % (end - start)
        } else {
            end
        }
    }

    pub fn position(&self) -> Duration {
        frames_to_duration(self.position_frames(), self.sample_rate)
    }

    pub fn state(&self) -> PlaybackState {
        if self.at_end() {
            PlaybackState::Finished
        } else if self.playing_since.is_some() {
            PlaybackState::Playing
        } else {
            PlaybackState::Stopped
        }
    }

    fn range_end(&self) -> u64 {
        self.stop_frame
            .map_or(self.length_frames, |stop| stop.min(self.length_frames))
    }

    fn range_start(&self) -> u64 {
        self.start_frame.min(self.range_end())
    }

    fn elapsed_frames(&self) -> u64 {
        match self.playing_since {
            Some(since) => {
                let micros = self.clock.now_micros().saturating_sub(since);
                (u128::from(micros) * u128::from(self.sample_rate) / 1_000_000) as u64
            }
            None => 0,
        }
    }

    /// Fold elapsed time into the cursor so settings apply from now on
    fn checkpoint(&mut self) {
        if self.playing_since.is_some() {
            self.cursor = self.position_frames();
            self.playing_since = Some(self.clock.now_micros());
        }
    }
}

impl SoundResource for HeadlessSound {
    fn start(&mut self) -> Result<()> {
        if self.playing_since.is_some() && !self.at_end() {
            return Ok(());
        }

        self.cursor = self.position_frames();
        if !self.looping && self.cursor >= self.range_end() {
            self.cursor = self.range_start();
        }
        if self.cursor < self.range_start() {
            self.cursor = self.range_start();
        }
        self.playing_since = Some(self.clock.now_micros());
        debug!(
            "[HEADLESS] Play {} from frame {}",
            self.path.display(),
            self.cursor
        );
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.cursor = self.position_frames();
        self.playing_since = None;
        Ok(())
    }

    fn seek_to_pcm_frame(&mut self, frame: u64) -> Result<()> {
        self.cursor = frame.min(self.length_frames);
        if self.playing_since.is_some() {
            self.playing_since = Some(self.clock.now_micros());
        }
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.playing_since.is_some() && !self.at_end()
    }

    fn at_end(&self) -> bool {
        !self.looping && self.position_frames() >= self.range_end()
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_looping(&mut self, looping: bool) {
        self.checkpoint();
        self.looping = looping;
    }

    fn is_looping(&self) -> bool {
        self.looping
    }

    fn set_start_time_ms(&mut self, ms: u32) {
        self.checkpoint();
        self.start_frame = ms_to_frames(ms, self.sample_rate);
        if self.playing_since.is_none() && self.cursor < self.start_frame {
            self.cursor = self.range_start();
        }
    }

    fn set_stop_time_ms(&mut self, ms: u32) {
        self.checkpoint();
        self.stop_frame = Some(ms_to_frames(ms, self.sample_rate));
        self.stop_time_ms = Some(ms);
    }

    fn stop_time_ms(&self) -> Option<u32> {
        self.stop_time_ms
    }

    fn uninit(self) {
        debug!("[HEADLESS] Released {}", self.path.display());
    }
}

fn frames_to_duration(frames: u64, sample_rate: u32) -> Duration {
    if sample_rate == 0 {
        return Duration::ZERO;
    }
    Duration::from_micros((u128::from(frames) * 1_000_000 / u128::from(sample_rate)) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{SampleFormat, WavSpec, WavWriter};
    use tempfile::tempdir;

    /// One frame per millisecond keeps the arithmetic readable
    const RATE: u32 = 1000;

    fn write_wav(path: &Path, frames: u32) {
        let spec = WavSpec {
            channels: 1,
            sample_rate: RATE,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec).unwrap();
        for i in 0..frames {
            writer.write_sample((i % 100) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    fn loaded(frames: u32) -> (tempfile::TempDir, HeadlessBackend, ClockHandle, HeadlessSound) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clip.wav");
        write_wav(&path, frames);

        let (mut backend, clock) = HeadlessBackend::manual();
        backend.init().unwrap();
        let sound = backend
            .init_sound_from_file(&path, InitFlags::WAIT_INIT)
            .unwrap();
        (dir, backend, clock, sound)
    }

    #[test]
    fn test_reads_header() {
        let (_dir, _backend, _clock, sound) = loaded(1000);
        assert_eq!(sound.sample_rate(), RATE);
        assert_eq!(sound.channels(), 1);
        assert_eq!(sound.length_frames(), 1000);
        assert_eq!(sound.duration(), Duration::from_secs(1));
        assert_eq!(sound.state(), PlaybackState::Stopped);
    }

    #[test]
    fn test_missing_file() {
        let (mut backend, _clock) = HeadlessBackend::manual();
        backend.init().unwrap();
        let err = backend
            .init_sound_from_file(Path::new("/nonexistent/clip.wav"), InitFlags::WAIT_INIT)
            .unwrap_err();
        assert_eq!(err.error_code(), "FILE_NOT_FOUND");
    }

    #[test]
    fn test_not_a_wav_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"definitely not RIFF data").unwrap();

        let (mut backend, _clock) = HeadlessBackend::manual();
        backend.init().unwrap();
        let err = backend
            .init_sound_from_file(&path, InitFlags::WAIT_INIT)
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_AUDIO");
    }

    #[test]
    fn test_requires_engine_init() {
        let (mut backend, _clock) = HeadlessBackend::manual();
        let err = backend
            .init_sound_from_file(Path::new("whatever.wav"), InitFlags::WAIT_INIT)
            .unwrap_err();
        assert!(matches!(err, SoundError::EngineUnavailable));
    }

    #[test]
    fn test_plays_to_end() {
        let (_dir, _backend, clock, mut sound) = loaded(1000);
        sound.start().unwrap();
        assert!(sound.is_playing());

        clock.advance_ms(400);
        assert_eq!(sound.position_frames(), 400);
        assert!(sound.is_playing());

        clock.advance_ms(700);
        assert_eq!(sound.position_frames(), 1000);
        assert!(!sound.is_playing());
        assert!(sound.at_end());
        assert_eq!(sound.state(), PlaybackState::Finished);
    }

    #[test]
    fn test_stop_keeps_position_and_rewind_resets() {
        let (_dir, _backend, clock, mut sound) = loaded(1000);
        sound.start().unwrap();
        clock.advance_ms(300);
        sound.stop().unwrap();
        clock.advance_ms(500);
        assert_eq!(sound.position_frames(), 300);
        assert!(!sound.is_playing());

        sound.start().unwrap();
        clock.advance_ms(100);
        assert_eq!(sound.position_frames(), 400);

        sound.stop().unwrap();
        sound.seek_to_pcm_frame(0).unwrap();
        assert_eq!(sound.position_frames(), 0);
    }

    #[test]
    fn test_play_range() {
        let (_dir, _backend, clock, mut sound) = loaded(1000);
        sound.set_start_time_ms(250);
        sound.set_stop_time_ms(500);
        assert_eq!(sound.position_frames(), 250);
        assert_eq!(sound.stop_time_ms(), Some(500));

        sound.start().unwrap();
        clock.advance_ms(200);
        assert_eq!(sound.position_frames(), 450);
        clock.advance_ms(100);
        assert!(sound.at_end());
        assert_eq!(sound.position_frames(), 500);
    }

    #[test]
    fn test_looping_wraps_and_never_finishes() {
        let (_dir, _backend, clock, mut sound) = loaded(1000);
        sound.set_looping(true);
        sound.start().unwrap();

        clock.advance_ms(2500);
        assert_eq!(sound.position_frames(), 500);
        assert!(sound.is_playing());
        assert!(!sound.at_end());
    }

    #[test]
    fn test_restart_after_finish() {
        let (_dir, _backend, clock, mut sound) = loaded(100);
        sound.start().unwrap();
        clock.advance_ms(150);
        assert!(sound.at_end());

        sound.start().unwrap();
        assert_eq!(sound.position_frames(), 0);
        assert!(sound.is_playing());
    }
}
