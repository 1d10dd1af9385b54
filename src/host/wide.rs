//! `wchar_t` path marshalling
//!
//! Managed hosts hand paths over as wide strings: UTF-16 on Windows, UTF-32
//! everywhere else.

use std::path::PathBuf;

#[cfg(windows)]
pub type WideChar = u16;
#[cfg(not(windows))]
pub type WideChar = u32;

/// Decode wide units up to the first NUL (or the end of the slice)
pub fn path_from_wide(units: &[WideChar]) -> PathBuf {
    let len = units.iter().position(|&u| u == 0).unwrap_or(units.len());
    decode(&units[..len])
}

#[cfg(windows)]
fn decode(units: &[WideChar]) -> PathBuf {
    use std::ffi::OsString;
    use std::os::windows::ffi::OsStringExt;
    PathBuf::from(OsString::from_wide(units))
}

#[cfg(not(windows))]
fn decode(units: &[WideChar]) -> PathBuf {
    units
        .iter()
        .map(|&u| char::from_u32(u).unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect::<String>()
        .into()
}

/// Encode a string the way the host would, NUL-terminated
pub fn encode_wide(text: &str) -> Vec<WideChar> {
    #[cfg(windows)]
    let mut units: Vec<WideChar> = text.encode_utf16().collect();
    #[cfg(not(windows))]
    let mut units: Vec<WideChar> = text.chars().map(|c| c as u32).collect();
    units.push(0);
    units
}

/// Read a NUL-terminated wide string
///
/// # Safety
/// `ptr` must be non-null and point to a NUL-terminated sequence of `WideChar`.
pub unsafe fn path_from_wide_ptr(ptr: *const WideChar) -> PathBuf {
    let mut len = 0;
    while *ptr.add(len) != 0 {
        len += 1;
    }
    decode(std::slice::from_raw_parts(ptr, len))
}

/// Read a wide string of known length, stopping early at a NUL
///
/// # Safety
/// `ptr` must be non-null and valid for reads of `len` units.
pub unsafe fn path_from_wide_parts(ptr: *const WideChar, len: usize) -> PathBuf {
    path_from_wide(std::slice::from_raw_parts(ptr, len))
}
