//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use log::{info, warn};

use crate::backend::SelectedBackend;
use crate::config::{BackendKind, EngineConfig};
use crate::engine::{LoadParameters, SoundRegistry};
use crate::logger::LogFacade;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Resolve the config file (if any), environment, then command-line overrides.
pub fn resolve_config(path: Option<&Path>, backend: Option<BackendKind>) -> Result<EngineConfig> {
    let config = match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let mut config = config
        .with_env_overrides()
        .context("Invalid SOUNDSLOT_* environment override")?;
    if let Some(backend) = backend {
        config.backend = backend;
    }
    Ok(config)
}

fn open_registry(config: &EngineConfig) -> Result<SoundRegistry<SelectedBackend>> {
    let backend = SelectedBackend::from_config(config)?;
    let registry = SoundRegistry::try_new(backend, Arc::new(LogFacade))?;
    Ok(registry)
}

/// Play one file until it finishes or the timeout expires.
pub fn play(
    config: &EngineConfig,
    path: &Path,
    params: LoadParameters,
    timeout: Duration,
) -> Result<()> {
    info!("Playing {} with {} backend", path.display(), config.backend);

    let mut registry = open_registry(config)?;
    let handle = registry
        .load(path, params)
        .with_context(|| format!("Failed to load {}", path.display()))?;

    registry.play(handle)?;
    println!("Playing {} as {}", path.display(), handle);

    let started = Instant::now();
    while !registry.is_finished(handle)? {
        if started.elapsed() >= timeout {
            if !params.is_looping {
                warn!("Timed out after {:?}", timeout);
            }
            break;
        }
        thread::sleep(POLL_INTERVAL);
    }

    registry.stop(handle, true)?;
    registry.unload(handle)?;
    println!("Done after {:.2}s", started.elapsed().as_secs_f64());

    Ok(())
}

/// Load each file, print the handle it receives, then release them all.
pub fn probe(config: &EngineConfig, paths: &[PathBuf]) -> Result<()> {
    info!("Probing {} file(s)", paths.len());

    let mut registry = open_registry(config)?;
    let mut loaded = Vec::new();
    let mut failures = 0;

    for path in paths {
        match registry.load(path, LoadParameters::default()) {
            Ok(handle) => {
                println!("{:>10}  {}", handle.to_string(), path.display());
                loaded.push(handle);
            }
            Err(e) => {
                println!("{:>10}  {} ({})", e.error_code(), path.display(), e);
                failures += 1;
            }
        }
    }

    println!("{:-<60}", "");
    println!(
        "Slots: {} | Live: {} | Free: {}",
        registry.slot_count(),
        registry.live_count(),
        registry.free_slot_count()
    );

    for handle in loaded {
        registry.unload(handle)?;
    }

    if failures == paths.len() {
        bail!("No file could be loaded");
    }
    Ok(())
}
