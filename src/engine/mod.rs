//! Sound Engine Module
//!
//! The handle-based registry and the value types it trades in:
//! - Sound handles and the failed-load sentinel
//! - Per-load playback parameters
//! - The registry itself

pub mod handle;
pub mod params;
pub mod registry;

pub use handle::SoundHandle;
pub use params::LoadParameters;
pub use registry::SoundRegistry;
