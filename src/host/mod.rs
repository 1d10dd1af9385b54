//! Host integration
//!
//! Glue between a managed host (a game engine's scripting runtime, typically)
//! and the registry: a lifecycle wrapper, log callbacks, wide-string paths and
//! the exported C functions.

pub mod callbacks;
pub mod engine;
pub mod ffi;
pub mod wide;

pub use callbacks::{register_callbacks, CallbackSink, DebugCallback};
pub use engine::HostEngine;
pub use wide::{encode_wide, path_from_wide, WideChar};
