//! Host Interface Tests
//!
//! Drives the exported C functions the way a managed host would. The engine is
//! shared by the whole process, so tests hold a session lock and release the
//! engine when the session ends.

use std::ffi::{c_char, CStr};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread;

use hound::{SampleFormat, WavSpec, WavWriter};
use tempfile::tempdir;

use soundslot::host::ffi::*;
use soundslot::host::encode_wide;
use soundslot::LoadParameters;

const INVALID: u32 = u32::MAX;

static ERRORS: Mutex<Vec<String>> = Mutex::new(Vec::new());
static SESSION: Mutex<()> = Mutex::new(());

/// Serializes tests and leaves no engine behind, even on failure
struct Session {
    _guard: MutexGuard<'static, ()>,
}

impl Drop for Session {
    fn drop(&mut self) {
        ReleaseEngine();
    }
}

fn session() -> Session {
    let guard = SESSION.lock().unwrap_or_else(PoisonError::into_inner);
    ReleaseEngine();
    ERRORS.lock().unwrap_or_else(PoisonError::into_inner).clear();
    Session { _guard: guard }
}

extern "C" fn capture_error(message: *const c_char) {
    let text = unsafe { CStr::from_ptr(message) }
        .to_string_lossy()
        .into_owned();
    ERRORS.lock().unwrap().push(text);
}

fn write_wav(dir: &Path, name: &str, seconds: u32) -> PathBuf {
    let path = dir.join(name);
    let spec = WavSpec {
        channels: 2,
        sample_rate: 8000,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(&path, spec).unwrap();
    for _ in 0..(8000 * seconds) {
        writer.write_sample(0i16).unwrap();
        writer.write_sample(0i16).unwrap();
    }
    writer.finalize().unwrap();
    path
}

fn load(path: &Path, params: LoadParameters) -> u32 {
    let wide = encode_wide(&path.to_string_lossy());
    unsafe { LoadSound(wide.as_ptr(), params) }
}

#[test]
fn test_full_host_session() {
    let _session = session();
    let dir = tempdir().unwrap();
    let long = write_wav(dir.path(), "long.wav", 30);
    let short = write_wav(dir.path(), "short.wav", 1);

    assert!(!IsEngineInitialized());
    InitializeEngine();
    assert!(IsEngineInitialized());

    let h0 = load(&long, LoadParameters::default());
    assert_eq!(h0, 0);

    PlaySound(h0);
    assert!(IsSoundPlaying(h0));
    assert!(!IsSoundFinished(h0));

    SetSoundVolume(h0, 0.5);
    StopSound(h0, true);
    assert!(!IsSoundPlaying(h0));

    UnloadSound(h0);
    let h1 = load(&short, LoadParameters::default());
    assert_eq!(h1, h0);

    ReleaseEngine();
    assert!(!IsEngineInitialized());
}

#[test]
fn test_failed_load_returns_sentinel() {
    let _session = session();
    let dir = tempdir().unwrap();
    InitializeEngine();

    assert_eq!(load(&dir.path().join("missing.wav"), LoadParameters::default()), INVALID);
    assert_eq!(unsafe { LoadSound(std::ptr::null(), LoadParameters::default()) }, INVALID);

    ReleaseEngine();
}

#[test]
fn test_unsafe_load_with_explicit_length() {
    let _session = session();
    let dir = tempdir().unwrap();
    let clip = write_wav(dir.path(), "clip.wav", 1);
    InitializeEngine();

    let mut wide = encode_wide(&clip.to_string_lossy());
    let len = (wide.len() - 1) as u32;
    // Trailing garbage past the declared length must be ignored
    wide.pop();
    wide.extend(encode_wide(".bak"));

    let params = LoadParameters::default().looping(true);
    let handle = unsafe { UnsafeLoadSound(wide.as_ptr(), len, &params) };
    assert_eq!(handle, 0);

    assert_eq!(
        unsafe { UnsafeLoadSound(wide.as_ptr(), len, std::ptr::null()) },
        INVALID
    );
    assert_eq!(
        unsafe { UnsafeLoadSound(std::ptr::null(), len, &params) },
        INVALID
    );

    ReleaseEngine();
}

#[test]
fn test_calls_before_init_are_safe() {
    let _session = session();
    InitializeLogger(None, None, Some(capture_error));

    PlaySound(0);
    StopSound(0, true);
    SetSoundVolume(0, 1.0);
    UnloadSound(0);
    assert!(!IsSoundPlaying(0));
    assert!(!IsSoundFinished(0));
    ReleaseEngine();

    let errors = ERRORS.lock().unwrap();
    assert!(errors.iter().any(|e| e.contains("not initialized")));
}

#[test]
fn test_reinitialize_keeps_existing_engine() {
    let _session = session();
    let dir = tempdir().unwrap();
    let clip = write_wav(dir.path(), "clip.wav", 1);
    InitializeLogger(None, None, Some(capture_error));

    InitializeEngine();
    let handle = load(&clip, LoadParameters::default());
    InitializeEngine();

    // Handle from before the second call still works
    PlaySound(handle);
    assert!(IsSoundPlaying(handle));
    assert!(ERRORS
        .lock()
        .unwrap()
        .iter()
        .any(|e| e.contains("reinitialize")));

    ReleaseEngine();
}

#[test]
fn test_out_of_range_handles() {
    let _session = session();
    InitializeEngine();
    PlaySound(9999);
    StopSound(9999, false);
    SetSoundVolume(INVALID, 0.0);
    UnloadSound(INVALID);
    assert!(!IsSoundPlaying(9999));
    assert!(!IsSoundFinished(INVALID));
    ReleaseEngine();
}

#[test]
fn test_engine_is_shared_across_threads() {
    let _session = session();
    let dir = tempdir().unwrap();
    let clip = write_wav(dir.path(), "clip.wav", 5);
    InitializeLogger(None, None, Some(capture_error));

    InitializeEngine();
    let handle = load(&clip, LoadParameters::default());
    assert_eq!(handle, 0);

    let seen = thread::spawn(move || {
        let initialized = IsEngineInitialized();
        InitializeEngine();
        PlaySound(handle);
        (initialized, IsSoundPlaying(handle))
    })
    .join()
    .unwrap();

    assert_eq!(seen, (true, true));
    assert!(IsSoundPlaying(handle));
    assert!(ERRORS
        .lock()
        .unwrap()
        .iter()
        .any(|e| e.contains("reinitialize")));

    // Released from another thread, gone for everyone
    thread::spawn(|| ReleaseEngine()).join().unwrap();
    assert!(!IsEngineInitialized());
}
