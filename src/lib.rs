//! Soundslot - Handle-Based Sound Playback
//!
//! Soundslot keeps loaded sounds in a sparse set addressed by small integer
//! handles and drives them through a pluggable audio backend. It offers two
//! surfaces over the same registry:
//! 1. An owned Rust API ([`SoundRegistry`]) returning explicit results
//! 2. A flat C ABI ([`host::ffi`]) for managed hosts such as game engines
//!
//! # Architecture
//!
//! - `engine`: handles, load parameters and the registry
//! - `backend`: the backend traits plus headless, mock and rodio backends
//! - `logger`: the info/warn/error channels injected into the registry
//! - `host`: process-wide engine instance and the exported C functions

pub mod backend;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod logger;

pub use backend::{AudioBackend, SoundResource};
pub use config::{BackendKind, EngineConfig};
pub use engine::{LoadParameters, SoundHandle, SoundRegistry};
pub use error::{Result, SoundError};
pub use logger::LogSink;
