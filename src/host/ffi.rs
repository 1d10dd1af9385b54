//! Exported C functions
//!
//! Names follow the host's UpperPascal convention. There is one engine per
//! process, shared by every thread that calls these functions; each call
//! holds the engine lock for its whole duration.
//!
//! Every function is total: panics are caught at the boundary, and a call
//! re-entering the engine from inside a log callback gets the default result.

#![allow(non_snake_case)]

use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};

use log::debug;

use super::callbacks::{register_callbacks, CallbackSink, DebugCallback};
use super::engine::HostEngine;
use super::wide::{path_from_wide_parts, path_from_wide_ptr, WideChar};
use crate::engine::{LoadParameters, SoundHandle};

static HOST: Mutex<Option<HostEngine>> = Mutex::new(None);

thread_local! {
    // Set while this thread holds HOST
    static IN_EXPORT: Cell<bool> = const { Cell::new(false) };
}

fn with_host<T>(fallback: T, op: impl FnOnce(&mut HostEngine) -> T) -> T {
    if IN_EXPORT.with(Cell::get) {
        debug!("[FFI] Re-entrant call ignored");
        return fallback;
    }

    IN_EXPORT.with(|flag| flag.set(true));
    let result = panic::catch_unwind(AssertUnwindSafe(move || {
        let mut guard = HOST.lock().unwrap_or_else(PoisonError::into_inner);
        let host = guard.get_or_insert_with(|| HostEngine::new(Arc::new(CallbackSink)));
        op(host)
    }));
    IN_EXPORT.with(|flag| flag.set(false));

    result.unwrap_or(fallback)
}

/// Register the host's info, warning and error sinks
///
/// Each channel keeps the first non-null callback it is given.
#[no_mangle]
pub extern "C" fn InitializeLogger(
    log_ptr: Option<DebugCallback>,
    warn_ptr: Option<DebugCallback>,
    error_ptr: Option<DebugCallback>,
) {
    register_callbacks(log_ptr, warn_ptr, error_ptr);
}

#[no_mangle]
pub extern "C" fn IsEngineInitialized() -> bool {
    with_host(false, |host| host.is_initialized())
}

/// Create the engine. A second call reports an error and keeps the first instance.
#[no_mangle]
pub extern "C" fn InitializeEngine() {
    with_host((), |host| {
        if let Err(e) = host.initialize() {
            debug!("[FFI] InitializeEngine: {}", e);
        }
    })
}

/// Load a sound from a NUL-terminated wide path
///
/// Returns `UINT32_MAX` if the path is null or the load fails.
///
/// # Safety
/// `path` must be null or point to a NUL-terminated `wchar_t` string.
#[no_mangle]
pub unsafe extern "C" fn LoadSound(path: *const WideChar, load_params: LoadParameters) -> u32 {
    if path.is_null() {
        return SoundHandle::INVALID.raw();
    }
    let path = path_from_wide_ptr(path);
    with_host(SoundHandle::INVALID.raw(), |host| {
        host.load_sound(&path, load_params).raw()
    })
}

/// Load a sound from a wide path of explicit length, parameters by pointer
///
/// Returns `UINT32_MAX` if either pointer is null or the load fails.
///
/// # Safety
/// `path` must be null or valid for `size` reads; `load_params` must be null
/// or point to a valid `LoadParameters`.
#[no_mangle]
pub unsafe extern "C" fn UnsafeLoadSound(
    path: *const WideChar,
    size: u32,
    load_params: *const LoadParameters,
) -> u32 {
    if path.is_null() || load_params.is_null() {
        return SoundHandle::INVALID.raw();
    }
    let path = path_from_wide_parts(path, size as usize);
    let load_params = *load_params;
    with_host(SoundHandle::INVALID.raw(), |host| {
        host.load_sound(&path, load_params).raw()
    })
}

#[no_mangle]
pub extern "C" fn UnloadSound(handle: u32) {
    with_host((), |host| host.unload_sound(SoundHandle::from_raw(handle)))
}

#[no_mangle]
pub extern "C" fn PlaySound(handle: u32) {
    with_host((), |host| host.play_sound(SoundHandle::from_raw(handle)))
}

#[no_mangle]
pub extern "C" fn StopSound(handle: u32, rewind: bool) {
    with_host((), |host| host.stop_sound(SoundHandle::from_raw(handle), rewind))
}

#[no_mangle]
pub extern "C" fn SetSoundVolume(handle: u32, volume: f32) {
    with_host((), |host| {
        host.set_sound_volume(SoundHandle::from_raw(handle), volume)
    })
}

#[no_mangle]
pub extern "C" fn IsSoundPlaying(handle: u32) -> bool {
    with_host(false, |host| host.is_sound_playing(SoundHandle::from_raw(handle)))
}

#[no_mangle]
pub extern "C" fn IsSoundFinished(handle: u32) -> bool {
    with_host(false, |host| {
        host.is_sound_finished(SoundHandle::from_raw(handle))
    })
}

/// Tear the engine down. Safe to call when not initialized.
#[no_mangle]
pub extern "C" fn ReleaseEngine() {
    with_host((), |host| host.release())
}
