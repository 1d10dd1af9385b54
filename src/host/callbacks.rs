//! Host-registered log callbacks
//!
//! Each channel is a C function pointer taking a NUL-terminated UTF-8 message.
//! Registration is per channel and first-wins: once a channel holds a
//! callback, later registrations for it are ignored. A null pointer leaves the
//! channel open for a later registration.

use std::ffi::{c_char, CString};
use std::sync::OnceLock;

use crate::logger::LogSink;

/// `void (*)(const char* message)`
pub type DebugCallback = extern "C" fn(message: *const c_char);

static INFO_CALLBACK: OnceLock<DebugCallback> = OnceLock::new();
static WARN_CALLBACK: OnceLock<DebugCallback> = OnceLock::new();
static ERROR_CALLBACK: OnceLock<DebugCallback> = OnceLock::new();

/// Register any channels that are still empty
pub fn register_callbacks(
    info: Option<DebugCallback>,
    warn: Option<DebugCallback>,
    error: Option<DebugCallback>,
) {
    for (slot, callback) in [
        (&INFO_CALLBACK, info),
        (&WARN_CALLBACK, warn),
        (&ERROR_CALLBACK, error),
    ] {
        if let Some(callback) = callback {
            slot.get_or_init(|| callback);
        }
    }
}

#[cfg(test)]
fn callbacks_registered() -> (bool, bool, bool) {
    (
        INFO_CALLBACK.get().is_some(),
        WARN_CALLBACK.get().is_some(),
        ERROR_CALLBACK.get().is_some(),
    )
}

/// [`LogSink`] that forwards to the registered callbacks
///
/// Looks the callbacks up on every message, so it can be installed before the
/// host registers them. Unregistered channels drop the message.
#[derive(Debug, Default, Clone, Copy)]
pub struct CallbackSink;

impl CallbackSink {
    fn emit(slot: &OnceLock<DebugCallback>, message: &str) {
        if let Some(callback) = slot.get() {
            let message = to_c_message(message);
            callback(message.as_ptr());
        }
    }
}

impl LogSink for CallbackSink {
    fn info(&self, message: &str) {
        Self::emit(&INFO_CALLBACK, message);
    }

    fn warn(&self, message: &str) {
        Self::emit(&WARN_CALLBACK, message);
    }

    fn error(&self, message: &str) {
        Self::emit(&ERROR_CALLBACK, message);
    }
}

/// Interior NULs would truncate the message on the C side, so drop them
fn to_c_message(message: &str) -> CString {
    CString::new(message.replace('\0', "")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;
    use std::sync::Mutex;

    static RECEIVED: Mutex<Vec<String>> = Mutex::new(Vec::new());

    extern "C" fn record(message: *const c_char) {
        let text = unsafe { CStr::from_ptr(message) }
            .to_string_lossy()
            .into_owned();
        RECEIVED.lock().unwrap().push(text);
    }

    extern "C" fn ignored(_message: *const c_char) {}

    #[test]
    fn test_to_c_message_strips_nul() {
        assert_eq!(to_c_message("a\0b").as_bytes(), b"ab");
    }

    #[test]
    fn test_warn_channel_first_registration_wins() {
        // Only this test touches the warn channel
        register_callbacks(None, Some(record), None);
        register_callbacks(None, Some(ignored), None);
        assert!(callbacks_registered().1);

        CallbackSink.warn("from sink");
        assert!(RECEIVED
            .lock()
            .unwrap()
            .iter()
            .any(|m| m == "from sink"));
    }
}
