//! Byte-level helpers shared by the scanner, the key matcher and the value maskers.

pub(crate) mod ascii;
pub(crate) mod escape;
pub(crate) mod utf8;

use std::fmt;

/// A decoding failure at an index relative to the slice being decoded.
///
/// Callers translate it into [`crate::MaskingError::InvalidJson`] once the
/// absolute position of the slice is known.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct DecodeError {
    pub(crate) reason: &'static str,
    pub(crate) index: usize,
}

impl DecodeError {
    pub(crate) const fn new(reason: &'static str, index: usize) -> Self {
        Self { reason, index }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason)
    }
}
