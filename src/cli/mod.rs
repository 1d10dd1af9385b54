//! CLI Module
//!
//! Command-line interface for exercising the sound registry.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::BackendKind;

/// Soundslot - handle-based sound playback
#[derive(Parser, Debug)]
#[command(name = "soundslot")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend override (headless or rodio)
    #[arg(short, long, global = true)]
    pub backend: Option<BackendKind>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load a sound, play it to the end and release it
    #[command(name = "play")]
    Play {
        /// Audio file to play
        path: PathBuf,

        /// Loop until the timeout expires
        #[arg(short, long)]
        looping: bool,

        /// Linear volume
        #[arg(long, default_value_t = 1.0)]
        volume: f32,

        /// Start offset in milliseconds
        #[arg(long, default_value_t = 0)]
        start_ms: u32,

        /// Stop offset in milliseconds (0 plays to the end)
        #[arg(long, default_value_t = 0)]
        end_ms: u32,

        /// Give up after this many seconds
        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,
    },

    /// Load every file and report the handle each one gets
    #[command(name = "probe")]
    Probe {
        /// Audio files to load
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}
