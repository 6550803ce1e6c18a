//! Error types.
//!
//! Two families exist and they never mix:
//!
//! - [`ConfigError`] is raised while building a [`crate::JsonMaskingConfig`],
//!   a [`crate::KeyMaskingConfig`] or a [`crate::JsonMasker`]. Once a masker
//!   exists it cannot fail for configuration reasons.
//! - [`MaskingError`] is raised while masking. `InvalidJson` is the only
//!   error about the document itself; `Io` only appears in streaming mode when
//!   the caller's reader or writer fails.

use std::io;

use thiserror::Error;

/// A failure while masking a document.
#[derive(Debug, Error)]
pub enum MaskingError {
    /// The input is not well-formed JSON where the scanner needed it to be.
    ///
    /// `offset` is the absolute byte offset in the input, counted from the
    /// first byte ever read in streaming mode.
    #[error("invalid JSON input at byte {offset}: {message}")]
    InvalidJson { message: String, offset: u64 },
    /// Reading the source or writing the sink failed.
    #[error("I/O failure while streaming JSON: {0}")]
    Io(#[from] io::Error),
}

impl MaskingError {
    pub(crate) fn invalid_json(message: impl Into<String>, offset: u64) -> Self {
        Self::InvalidJson {
            message: message.into(),
            offset,
        }
    }

    /// Returns `true` for [`MaskingError::InvalidJson`].
    pub fn is_invalid_json(&self) -> bool {
        matches!(self, Self::InvalidJson { .. })
    }

    /// The byte offset of an [`MaskingError::InvalidJson`] failure.
    pub fn offset(&self) -> Option<u64> {
        match self {
            Self::InvalidJson { offset, .. } => Some(*offset),
            Self::Io(_) => None,
        }
    }
}

/// A rejected masking configuration.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no masking targets configured: use mask_keys, mask_json_paths, allow_keys or allow_json_paths")]
    NoTargets,
    #[error("at least one {0} must be provided")]
    EmptyTargetSet(&'static str),
    #[error("target `{0}` is configured more than once")]
    DuplicateTarget(String),
    #[error("cannot {0}: masking and allowing targets without a per-key config are exclusive")]
    ModeConflict(&'static str),
    #[error("invalid JSONPath `{path}`: {reason}")]
    InvalidJsonPath { path: String, reason: &'static str },
    #[error("JSONPaths `{first}` and `{second}` are ambiguous")]
    AmbiguousJsonPaths { first: String, second: String },
    #[error("target `{0}` changes byte length when case folded; use case-sensitive target keys")]
    CaseFoldLengthMismatch(String),
    #[error("conflicting masking options: {0}")]
    ConflictingMaskingOptions(&'static str),
    #[error("mask digit must be between 1 and 9 (0 only with an obfuscation length of 0 or 1), got {0}")]
    InvalidMaskDigit(u8),
    #[error("streaming buffer size must be at least {minimum} bytes, got {requested}")]
    BufferTooSmall { minimum: usize, requested: usize },
    #[error("maximum nesting depth must be greater than zero")]
    ZeroNestingDepth,
    #[error("too many targets for the key matcher")]
    TooManyTargets,
}
