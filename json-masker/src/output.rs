//! Lazily masked JSON for log sinks.
//!
//! [`MaskedJson`] pairs a [`JsonMasker`] with a document and masks it only
//! when formatted. Logging must not fail, so a document that cannot be masked
//! renders as [`INVALID_JSON_PLACEHOLDER`] and never as the raw input.

use std::fmt;

use crate::{error::MaskingError, masking::JsonMasker};

/// Rendered in place of a document the masker rejected.
pub const INVALID_JSON_PLACEHOLDER: &str = "[INVALID JSON]";

/// A document masked on display.
#[derive(Clone, Copy)]
pub struct MaskedJson<'a> {
    masker: &'a JsonMasker,
    input: &'a [u8],
}

impl<'a> MaskedJson<'a> {
    pub fn new(masker: &'a JsonMasker, input: &'a [u8]) -> Self {
        Self { masker, input }
    }

    /// Masks the document, surfacing the error the display form hides.
    pub fn try_masked(&self) -> Result<String, MaskingError> {
        let masked = self.masker.mask_bytes(self.input)?;
        String::from_utf8(masked).map_err(|err| {
            let offset = err.utf8_error().valid_up_to() as u64;
            MaskingError::invalid_json("masked output is not valid UTF-8", offset)
        })
    }

    /// The masked document, or the placeholder.
    pub fn masked_or_placeholder(&self) -> String {
        self.try_masked()
            .unwrap_or_else(|_| INVALID_JSON_PLACEHOLDER.to_owned())
    }
}

impl fmt::Display for MaskedJson<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked_or_placeholder())
    }
}

impl fmt::Debug for MaskedJson<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MaskedJson")
            .field(&self.masked_or_placeholder())
            .finish()
    }
}

impl JsonMasker {
    /// Wraps `input` so it is masked when formatted.
    pub fn masked<'a>(&'a self, input: &'a (impl AsRef<[u8]> + ?Sized)) -> MaskedJson<'a> {
        MaskedJson::new(self, input.as_ref())
    }
}
