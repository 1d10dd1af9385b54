//! Rodio output backend
//!
//! The output stream lives on a dedicated thread for as long as the backend is
//! initialized, since `OutputStream` cannot leave the thread that opened it.
//! Everything else talks to the device through the stream's handle, which
//! every sound gets a clone of to build its own `Sink`.
//!
//! Files are decoded into memory at init time, so loads block until the whole
//! clip is available and later seeks are cheap.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, warn};
use rodio::buffer::SamplesBuffer;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

use super::{ms_to_frames, AudioBackend, InitFlags, SoundResource};
use crate::error::{Result, SoundError};

/// Thread owning the open output stream
struct OutputThread {
    handle: OutputStreamHandle,
    shutdown: Sender<()>,
    thread: JoinHandle<()>,
}

impl OutputThread {
    fn spawn() -> Result<Self> {
        let (ready_tx, ready_rx) = mpsc::channel();
        let (shutdown, shutdown_rx) = mpsc::channel::<()>();

        let thread = thread::Builder::new()
            .name("soundslot-output".to_string())
            .spawn(move || match OutputStream::try_default() {
                Ok((stream, handle)) => {
                    if ready_tx.send(Ok(handle)).is_ok() {
                        // Returns on the shutdown signal or when the sender is dropped
                        let _ = shutdown_rx.recv();
                    }
                    drop(stream);
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e.to_string()));
                }
            })?;

        let opened = ready_rx.recv().map_err(|_| SoundError::EngineInit {
            reason: "Output thread exited before opening the device".to_string(),
        });
        match opened {
            Ok(Ok(handle)) => Ok(Self {
                handle,
                shutdown,
                thread,
            }),
            Ok(Err(reason)) => {
                let _ = thread.join();
                Err(SoundError::EngineInit {
                    reason: format!("Failed to open default output device: {}", reason),
                })
            }
            Err(e) => Err(e),
        }
    }

    fn close(self) {
        let _ = self.shutdown.send(());
        if self.thread.join().is_err() {
            warn!("[RODIO] Output thread panicked");
        }
    }
}

/// Backend playing through the system's default output device
#[derive(Default)]
pub struct RodioBackend {
    // Must outlive every sink created from its handle
    output: Option<OutputThread>,
}

impl RodioBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioBackend for RodioBackend {
    type Sound = RodioSound;

    fn name(&self) -> &'static str {
        "rodio"
    }

    fn init(&mut self) -> Result<()> {
        self.output = Some(OutputThread::spawn()?);
        debug!("[RODIO] Output stream opened");
        Ok(())
    }

    fn uninit(&mut self) {
        if let Some(output) = self.output.take() {
            output.close();
            debug!("[RODIO] Output stream closed");
        }
    }

    fn init_sound_from_file(&mut self, path: &Path, flags: InitFlags) -> Result<RodioSound> {
        let handle = match &self.output {
            Some(output) => output.handle.clone(),
            None => return Err(SoundError::EngineUnavailable),
        };

        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => SoundError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => SoundError::Io(e),
        })?;

        let decoder = Decoder::new(BufReader::new(file)).map_err(|e| SoundError::InvalidAudio {
            reason: format!("Failed to decode {}: {}", path.display(), e),
            source: Some(Box::new(e)),
        })?;

        let channels = decoder.channels();
        let sample_rate = decoder.sample_rate();
        if channels == 0 || sample_rate == 0 {
            return Err(SoundError::UnsupportedFormat {
                format: format!("{} channels at {} Hz", channels, sample_rate),
            });
        }

        let samples: Vec<i16> = decoder.collect();
        debug!(
            "[RODIO] Decoded {} ({} samples, {} Hz, {} ch, flags {:#x})",
            path.display(),
            samples.len(),
            sample_rate,
            channels,
            flags.bits()
        );

        Ok(RodioSound {
            path: path.to_path_buf(),
            handle,
            sink: None,
            samples: Arc::new(samples),
            channels,
            sample_rate,
            cursor: 0,
            volume: 1.0,
            looping: false,
            start_frame: 0,
            stop_frame: None,
            stop_time_ms: None,
        })
    }
}

/// Decoded clip plus the sink currently playing it
pub struct RodioSound {
    path: PathBuf,
    handle: OutputStreamHandle,
    sink: Option<Sink>,
    samples: Arc<Vec<i16>>,
    channels: u16,
    sample_rate: u32,

    /// Frame the next queued run starts from
    cursor: u64,
    volume: f32,
    looping: bool,
    start_frame: u64,
    stop_frame: Option<u64>,
    stop_time_ms: Option<u32>,
}

impl RodioSound {
    fn length_frames(&self) -> u64 {
        self.samples.len() as u64 / u64::from(self.channels)
    }

    fn range_end(&self) -> u64 {
        self.stop_frame
            .map_or(self.length_frames(), |stop| stop.min(self.length_frames()))
    }

    fn range_start(&self) -> u64 {
        self.start_frame.min(self.range_end())
    }

    fn buffer(&self, from: u64, to: u64) -> SamplesBuffer<i16> {
        let channels = usize::from(self.channels);
        let from = from as usize * channels;
        let to = (to as usize * channels).max(from);
        SamplesBuffer::new(
            self.channels,
            self.sample_rate,
            self.samples[from..to].to_vec(),
        )
    }

    /// Build a fresh sink holding the clip from the cursor onwards
    fn queue(&mut self) -> Result<()> {
        let sink = Sink::try_new(&self.handle).map_err(|e| SoundError::backend(e.to_string()))?;
        sink.pause();
        sink.set_volume(self.volume);

        let start = self.range_start();
        let end = self.range_end();
        let from = self.cursor.clamp(start, end);

        sink.append(self.buffer(from, end));
        if self.looping && end > start {
            sink.append(self.buffer(start, end).repeat_infinite());
        }

        self.sink = Some(sink);
        Ok(())
    }

    fn drop_sink(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }
}

impl SoundResource for RodioSound {
    fn start(&mut self) -> Result<()> {
        if self.at_end() {
            self.drop_sink();
            self.cursor = self.range_start();
        }
        if self.sink.is_none() {
            self.queue()?;
        }
        if let Some(sink) = &self.sink {
            sink.play();
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
        Ok(())
    }

    fn seek_to_pcm_frame(&mut self, frame: u64) -> Result<()> {
        let was_playing = self.is_playing();
        self.drop_sink();
        self.cursor = frame.min(self.length_frames());
        if was_playing {
            self.start()?;
        }
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.sink
            .as_ref()
            .map_or(false, |sink| !sink.is_paused() && !sink.empty())
    }

    fn at_end(&self) -> bool {
        !self.looping && self.sink.as_ref().map_or(false, |sink| sink.empty())
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        if let Some(sink) = &self.sink {
            sink.set_volume(volume);
        }
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn is_looping(&self) -> bool {
        self.looping
    }

    fn set_start_time_ms(&mut self, ms: u32) {
        self.start_frame = ms_to_frames(ms, self.sample_rate);
        if self.cursor < self.start_frame {
            self.cursor = self.start_frame;
        }
    }

    fn set_stop_time_ms(&mut self, ms: u32) {
        self.stop_frame = Some(ms_to_frames(ms, self.sample_rate));
        self.stop_time_ms = Some(ms);
    }

    fn stop_time_ms(&self) -> Option<u32> {
        self.stop_time_ms
    }

    fn uninit(mut self) {
        self.drop_sink();
        debug!("[RODIO] Released {}", self.path.display());
    }
}
