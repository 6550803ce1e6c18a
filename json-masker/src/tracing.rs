//! Adapters for emitting masked JSON through `tracing`.
//!
//! Masking happens when the subscriber records the field, so events that are
//! filtered out never pay for it.
//!
//! ```
//! use json_masker::{JsonMasker, tracing::TracingMaskedExt};
//!
//! let masker = JsonMasker::for_keys(["password"])?;
//! let body = r#"{"user":"ada","password":"hunter2"}"#;
//! tracing::info!(body = masker.tracing_masked(body), "login request");
//! # Ok::<(), json_masker::ConfigError>(())
//! ```

use tracing::field::{DisplayValue, display};

use crate::{masking::JsonMasker, output::MaskedJson};

/// Marker trait for values whose `tracing` form is always masked.
///
/// Implemented only for the wrappers this crate hands out, never for raw
/// documents.
pub trait TracingMasked {}

impl TracingMasked for MaskedJson<'_> {}

impl<T: TracingMasked + std::fmt::Display> TracingMasked for DisplayValue<T> {}

/// Extension trait for recording documents as masked display fields.
pub trait TracingMaskedExt {
    /// Wraps `input` as a `tracing` display value that masks on record.
    ///
    /// Input the masker rejects is recorded as
    /// [`crate::INVALID_JSON_PLACEHOLDER`].
    fn tracing_masked<'a>(
        &'a self,
        input: &'a (impl AsRef<[u8]> + ?Sized),
    ) -> DisplayValue<MaskedJson<'a>>;
}

impl TracingMaskedExt for JsonMasker {
    fn tracing_masked<'a>(
        &'a self,
        input: &'a (impl AsRef<[u8]> + ?Sized),
    ) -> DisplayValue<MaskedJson<'a>> {
        display(self.masked(input))
    }
}
