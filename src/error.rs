//! Error handling for Soundslot
//!
//! The Rust API reports every failure through [`SoundError`]. The host layer
//! maps these onto sentinel handles and `false` defaults.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for Soundslot operations
pub type Result<T> = std::result::Result<T, SoundError>;

/// Main error type for Soundslot operations
#[derive(Error, Debug)]
pub enum SoundError {
    // Engine Errors
    #[error("Audio engine failed to initialize: {reason}")]
    EngineInit { reason: String },

    #[error("Audio engine is not operational")]
    EngineUnavailable,

    #[error("Audio engine is already initialized")]
    AlreadyInitialized,

    #[error("Audio engine is not initialized")]
    NotInitialized,

    // File Errors
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Invalid audio file: {reason}")]
    InvalidAudio {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    // Handle Errors
    #[error("Invalid sound handle: {handle}")]
    InvalidHandle { handle: u32 },

    #[error("Sound handle {handle} refers to a released slot")]
    StaleHandle { handle: u32 },

    #[error("Sound slot capacity exhausted")]
    CapacityExhausted,

    // Backend Errors
    #[error("Backend error: {reason}")]
    Backend { reason: String },

    // Configuration Errors
    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SoundError {
    /// Shorthand for a backend failure with a formatted reason
    pub fn backend(reason: impl Into<String>) -> Self {
        SoundError::Backend {
            reason: reason.into(),
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            SoundError::EngineInit { .. } => "ENGINE_INIT",
            SoundError::EngineUnavailable => "ENGINE_UNAVAILABLE",
            SoundError::AlreadyInitialized => "ALREADY_INITIALIZED",
            SoundError::NotInitialized => "NOT_INITIALIZED",
            SoundError::FileNotFound { .. } => "FILE_NOT_FOUND",
            SoundError::InvalidAudio { .. } => "INVALID_AUDIO",
            SoundError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            SoundError::InvalidHandle { .. } => "INVALID_HANDLE",
            SoundError::StaleHandle { .. } => "STALE_HANDLE",
            SoundError::CapacityExhausted => "CAPACITY_EXHAUSTED",
            SoundError::Backend { .. } => "BACKEND_ERROR",
            SoundError::Config { .. } => "CONFIG_ERROR",
            SoundError::Io(_) => "IO_ERROR",
            SoundError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if the caller can retry or carry on after this error
    ///
    /// Per-sound failures leave the registry fully usable. Engine-level
    /// failures do not.
    pub fn is_recoverable(&self) -> bool {
        match self {
            SoundError::FileNotFound { .. } => true,
            SoundError::InvalidAudio { .. } => true,
            SoundError::UnsupportedFormat { .. } => true,
            SoundError::InvalidHandle { .. } => true,
            SoundError::StaleHandle { .. } => true,
            SoundError::AlreadyInitialized => true,
            SoundError::Backend { .. } => true,
            _ => false,
        }
    }

    /// True for the two handle lookup failures
    pub fn is_handle_error(&self) -> bool {
        matches!(
            self,
            SoundError::InvalidHandle { .. } | SoundError::StaleHandle { .. }
        )
    }
}
