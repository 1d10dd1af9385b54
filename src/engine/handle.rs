//! Sound handles
//!
//! A handle is the position of a slot in the registry. The all-ones value is
//! reserved as the "failed load" sentinel handed back across the C boundary.

use std::fmt;

/// Opaque identifier of a loaded sound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct SoundHandle(u32);

impl SoundHandle {
    /// Returned by a failed load. Never an allocated index.
    pub const INVALID: SoundHandle = SoundHandle(u32::MAX);

    /// Largest slot count the registry will grow to; keeps `INVALID` out of range
    pub const MAX_SLOTS: usize = u32::MAX as usize;

    pub const fn from_raw(raw: u32) -> Self {
        SoundHandle(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn is_invalid(self) -> bool {
        self.0 == u32::MAX
    }

    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for SoundHandle {
    fn from(raw: u32) -> Self {
        SoundHandle(raw)
    }
}

impl From<SoundHandle> for u32 {
    fn from(handle: SoundHandle) -> Self {
        handle.0
    }
}

impl fmt::Display for SoundHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_invalid() {
            write!(f, "#invalid")
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel() {
        assert!(SoundHandle::INVALID.is_invalid());
        assert_eq!(SoundHandle::INVALID.raw(), u32::MAX);
        assert!(!SoundHandle::from_raw(0).is_invalid());
    }

    #[test]
    fn test_display() {
        assert_eq!(SoundHandle::from_raw(7).to_string(), "#7");
        assert_eq!(SoundHandle::INVALID.to_string(), "#invalid");
    }
}
