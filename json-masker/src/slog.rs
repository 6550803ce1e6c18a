//! Adapters for emitting masked JSON through `slog`.
//!
//! Masked documents are emitted as nested values through `slog`'s serde
//! support, so structured drains receive JSON rather than an escaped string.
//! Logging APIs are infallible from the caller's side: input that cannot be
//! masked is emitted as [`INVALID_JSON_PLACEHOLDER`], never as the original
//! bytes.
//!
//! This module does not configure `slog` or choose what gets masked; that is
//! the [`JsonMasker`]'s configuration.

use serde_json::Value as JsonValue;
use slog::{Key, Record, Result as SlogResult, Serializer, Value as SlogValue};

use crate::{
    masking::JsonMasker,
    output::{INVALID_JSON_PLACEHOLDER, MaskedJson},
};

/// Marker trait for types whose `slog` integration always emits masked
/// output.
///
/// ```compile_fail
/// use json_masker::slog::SlogMasked;
///
/// fn assert_slog_masked<T: SlogMasked>() {}
///
/// assert_slog_masked::<String>();
/// ```
pub trait SlogMasked: SlogValue {}

impl<T: SlogMasked + ?Sized> SlogMasked for &T {}

/// A document masked eagerly and held as JSON, for loggers that need owned
/// values (`o!`).
#[derive(Clone, Debug, PartialEq)]
pub struct SlogMaskedJson {
    value: JsonValue,
}

impl SlogMaskedJson {
    pub fn value(&self) -> &JsonValue {
        &self.value
    }
}

/// The masked text as nested JSON when it parses as one document, as a plain
/// string otherwise (JSON Lines input, for example).
fn to_json(masked: Option<String>) -> JsonValue {
    match masked {
        Some(text) => serde_json::from_str(&text).unwrap_or(JsonValue::String(text)),
        None => JsonValue::String(INVALID_JSON_PLACEHOLDER.to_owned()),
    }
}

fn emit_json(
    json: JsonValue,
    record: &Record<'_>,
    key: Key,
    serializer: &mut dyn Serializer,
) -> SlogResult {
    match json {
        JsonValue::String(text) => serializer.emit_str(key, &text),
        json => SlogValue::serialize(&slog::Serde(json), record, key, serializer),
    }
}

impl SlogValue for SlogMaskedJson {
    fn serialize(
        &self,
        record: &Record<'_>,
        key: Key,
        serializer: &mut dyn Serializer,
    ) -> SlogResult {
        emit_json(self.value.clone(), record, key, serializer)
    }
}

impl SlogMasked for SlogMaskedJson {}

impl SlogValue for MaskedJson<'_> {
    fn serialize(
        &self,
        record: &Record<'_>,
        key: Key,
        serializer: &mut dyn Serializer,
    ) -> SlogResult {
        emit_json(to_json(self.try_masked().ok()), record, key, serializer)
    }
}

impl SlogMasked for MaskedJson<'_> {}

/// Extension trait for ergonomic slog logging of masked documents.
///
/// ```ignore
/// use json_masker::slog::SlogMaskedExt;
///
/// info!(logger, "request"; "body" => masker.slog_masked_json(&body));
/// ```
pub trait SlogMaskedExt {
    /// Masks `input` now and returns a `slog::Value` that serializes as
    /// structured JSON.
    fn slog_masked_json(&self, input: &(impl AsRef<[u8]> + ?Sized)) -> SlogMaskedJson;
}

impl SlogMaskedExt for JsonMasker {
    fn slog_masked_json(&self, input: &(impl AsRef<[u8]> + ?Sized)) -> SlogMaskedJson {
        SlogMaskedJson {
            value: to_json(self.masked(input).try_masked().ok()),
        }
    }
}
