//! Per-load playback parameters
//!
//! The layout is `#[repr(C)]` so managed hosts can pass the struct by value.

use serde::{Deserialize, Serialize};

/// Parameters applied to a sound right after it is initialized
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadParameters {
    /// Restart from the start time when the end is reached
    #[serde(alias = "IsLooping")]
    pub is_looping: bool,
    /// Linear volume, 0.0 to 1.0 expected but not enforced
    #[serde(alias = "Volume")]
    pub volume: f32,
    /// Offset into the clip where playback begins (ms)
    #[serde(alias = "StartTime")]
    pub start_time: u32,
    /// Offset where playback stops (ms); `<= start_time` plays to the natural end
    #[serde(alias = "EndTime")]
    pub end_time: u32,
}

impl Default for LoadParameters {
    fn default() -> Self {
        Self {
            is_looping: false,
            volume: 1.0,
            start_time: 0,
            end_time: 0,
        }
    }
}

impl LoadParameters {
    pub fn looping(mut self, is_looping: bool) -> Self {
        self.is_looping = is_looping;
        self
    }

    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume;
        self
    }

    /// Set the play range in milliseconds
    pub fn with_range(mut self, start_time: u32, end_time: u32) -> Self {
        self.start_time = start_time;
        self.end_time = end_time;
        self
    }

    /// The explicit stop point, if the range asks for one
    ///
    /// An empty or inverted range means "play to the natural end".
    pub fn stop_time(&self) -> Option<u32> {
        (self.end_time > self.start_time).then_some(self.end_time)
    }
}
