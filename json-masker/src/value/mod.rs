//! The value-masker contract.
//!
//! A [`ValueMasker`] receives a [`ValueMaskerContext`] positioned on exactly
//! one JSON value (quotes included for strings) and decides which bytes to
//! replace. The context hides whether the masker runs over a fully buffered
//! document or a bounded streaming buffer; the value is always completely
//! available when the masker is invoked.
//!
//! Maskers are grouped into typed handles ([`StringMasker`], [`NumberMasker`],
//! [`BooleanMasker`]) so a configuration can only attach a masker to the JSON
//! type it understands. [`AnyMasker`] converts into every typed handle.

mod maskers;
mod text;

use std::{fmt, sync::Arc};

pub use maskers::ValueMaskers;
pub use text::{EmailConfig, FULL_MASK_PLACEHOLDER, KeepConfig, MASK_CHAR, MaskConfig, TextMaskPolicy};

use crate::{error::MaskingError, util};

/// Rewrites a single matched JSON value.
///
/// Implementations must be stateless with respect to individual calls: the
/// same masker is shared by every thread using a [`crate::JsonMasker`].
/// Replacements requested through the context must be ordered by offset and
/// must not overlap.
pub trait ValueMasker: fmt::Debug + Send + Sync {
    fn mask_value(&self, context: &mut ValueMaskerContext<'_>) -> Result<(), MaskingError>;
}

/// Access to the bytes of the value being masked, implemented by both masking
/// states.
pub(crate) trait ValueBuffer {
    /// The raw value bytes, starting at the value's first byte.
    fn value(&self) -> &[u8];

    /// Absolute offset of the value's first byte in the input.
    fn value_offset(&self) -> u64;

    /// Replaces `length` bytes at `offset` (relative to the value start) with
    /// `mask` repeated `repeat` times.
    fn replace_value_range(
        &mut self,
        offset: usize,
        length: usize,
        mask: &[u8],
        repeat: usize,
    ) -> Result<(), MaskingError>;
}

/// The view a [`ValueMasker`] gets on the value it masks.
///
/// Offsets are relative to the first byte of the value. For strings, offset 0
/// is the opening quote.
pub struct ValueMaskerContext<'a> {
    buffer: &'a mut dyn ValueBuffer,
    last_replacement_end: usize,
}

impl<'a> ValueMaskerContext<'a> {
    pub(crate) fn new(buffer: &'a mut dyn ValueBuffer) -> Self {
        Self {
            buffer,
            last_replacement_end: 0,
        }
    }

    /// Length of the raw value in bytes, quotes included.
    pub fn byte_len(&self) -> usize {
        self.buffer.value().len()
    }

    /// The byte at `index`, or `None` past the end of the value.
    pub fn byte_at(&self, index: usize) -> Option<u8> {
        self.buffer.value().get(index).copied()
    }

    /// The raw bytes of the value.
    pub fn as_bytes(&self) -> &[u8] {
        self.buffer.value()
    }

    /// The raw value as text, escapes left untouched.
    pub fn as_str(&self) -> Result<&str, MaskingError> {
        std::str::from_utf8(self.buffer.value()).map_err(|err| {
            self.invalid_json("value is not valid UTF-8", err.valid_up_to())
        })
    }

    /// Returns `true` when the value is a JSON string.
    pub fn is_string(&self) -> bool {
        self.byte_at(0) == Some(b'"')
    }

    /// The decoded text of the value: the unescaped contents for strings, the
    /// raw literal for numbers and booleans.
    pub fn decoded_text(&self) -> Result<String, MaskingError> {
        let raw = self.buffer.value();
        if !self.is_string() || raw.len() < 2 {
            return self.as_str().map(str::to_owned);
        }
        util::escape::decode_json_string(&raw[1..raw.len() - 1])
            .map_err(|err| self.invalid_json(err.reason, err.index + 1))
    }

    /// Number of bytes in `[offset, offset + length)` that do not correspond
    /// to a visible character (UTF-8 continuation bytes and escape sequence
    /// overhead).
    pub fn count_non_visible_bytes(
        &self,
        offset: usize,
        length: usize,
    ) -> Result<usize, MaskingError> {
        let range = self
            .buffer
            .value()
            .get(offset..offset + length)
            .ok_or_else(|| self.invalid_json("range outside of the value", offset))?;
        util::utf8::count_non_visible_bytes(range)
            .map_err(|err| self.invalid_json(err.reason, offset + err.index))
    }

    /// Replaces `length` bytes at `offset` with `mask` repeated `repeat` times.
    ///
    /// Successive calls must move forward through the value.
    pub fn replace_bytes(
        &mut self,
        offset: usize,
        length: usize,
        mask: &[u8],
        repeat: usize,
    ) -> Result<(), MaskingError> {
        let end = offset
            .checked_add(length)
            .filter(|&end| offset >= self.last_replacement_end && end <= self.byte_len());
        let Some(end) = end else {
            return Err(self.invalid_json("replacement outside of the unmasked value range", offset));
        };
        if mask.len().checked_mul(repeat).is_none() {
            return Err(self.invalid_json("replacement is too large", offset));
        }
        self.buffer
            .replace_value_range(offset, length, mask, repeat)?;
        self.last_replacement_end = end;
        Ok(())
    }

    /// Replaces the whole value with `replacement`.
    pub fn replace_value(&mut self, replacement: &[u8]) -> Result<(), MaskingError> {
        let length = self.byte_len();
        self.replace_bytes(0, length, replacement, 1)
    }

    /// Builds an [`MaskingError::InvalidJson`] for a position inside the value.
    pub fn invalid_json(&self, message: impl Into<String>, index: usize) -> MaskingError {
        MaskingError::invalid_json(message, self.buffer.value_offset().saturating_add(index as u64))
    }
}

macro_rules! typed_masker {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $name(Arc<dyn ValueMasker>);

        impl $name {
            /// Wraps a custom masker.
            pub fn new(masker: impl ValueMasker + 'static) -> Self {
                Self(Arc::new(masker))
            }

            pub(crate) fn masker(&self) -> &dyn ValueMasker {
                self.0.as_ref()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Debug::fmt(&self.0, f)
            }
        }
    };
}

typed_masker! {
    /// A masker applicable to values of any JSON type.
    AnyMasker
}

impl ValueMasker for AnyMasker {
    fn mask_value(&self, context: &mut ValueMaskerContext<'_>) -> Result<(), MaskingError> {
        self.0.mask_value(context)
    }
}

typed_masker! {
    /// A masker for JSON strings.
    StringMasker
}

typed_masker! {
    /// A masker for JSON numbers.
    NumberMasker
}

typed_masker! {
    /// A masker for JSON booleans.
    BooleanMasker
}

impl From<AnyMasker> for StringMasker {
    fn from(masker: AnyMasker) -> Self {
        Self(masker.0)
    }
}

impl From<AnyMasker> for NumberMasker {
    fn from(masker: AnyMasker) -> Self {
        Self(masker.0)
    }
}

impl From<AnyMasker> for BooleanMasker {
    fn from(masker: AnyMasker) -> Self {
        Self(masker.0)
    }
}
