//! Single-pass masking of sensitive values in JSON.
//!
//! The masker works on raw bytes. It never parses the document into a tree:
//! one left-to-right scan finds the values under the configured keys or
//! JSONPaths and rewrites them, copying everything else through untouched
//! (whitespace and escapes included).
//!
//! What this crate does:
//! - targets values by key (case-insensitive by default) or by JSONPath
//! - masks everything except an allow list (ALLOW mode)
//! - masks complete buffers or streams with bounded memory
//! - exposes a [`ValueMasker`] contract for custom masking
//! - provides logging integrations behind feature flags (`tracing`, `slog`)
//!
//! What it does not do:
//! - validate JSON it does not need to look at
//! - reformat, reorder or pretty-print documents
//!
//! ```
//! use json_masker::{JsonMasker, JsonMaskingConfig, KeyMaskingConfig};
//!
//! let config = JsonMaskingConfig::builder()
//!     .mask_keys(["password"])
//!     .mask_json_paths(["$.card.number"])
//!     .default_key_config(KeyMaskingConfig::builder().mask_strings_with("<hidden>").build()?)
//!     .build()?;
//! let masker = JsonMasker::new(config)?;
//!
//! let masked = masker.mask_str(r#"{"password":"hunter2","card":{"number":"4111","type":"visa"}}"#)?;
//! assert_eq!(masked, r#"{"password":"<hidden>","card":{"number":"<hidden>","type":"visa"}}"#);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// <https://doc.rust-lang.org/rustc/lints/listing/allowed-by-default.html>
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    elided_lifetimes_in_paths,
    missing_copy_implementations,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces
)]
// <https://rust-lang.github.io/rust-clippy/stable>
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::dbg_macro,
    clippy::float_cmp_const,
    clippy::get_unwrap,
    clippy::mem_forget,
    clippy::nursery,
    clippy::pedantic,
    clippy::todo,
    clippy::unwrap_used,
    clippy::uninlined_format_args
)]
// Allow some clippy lints
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::doc_markdown,
    clippy::if_not_else,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::use_self,
    clippy::cargo_common_metadata,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::result_large_err,
    clippy::option_if_let_else
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

mod config;
mod error;
mod masking;
pub mod output;
#[cfg(feature = "slog")]
pub mod slog;
#[cfg(feature = "tracing")]
pub mod tracing;
mod util;
mod value;

// Re-exports from config module
pub use config::{
    DEFAULT_BOOLEAN_MASK, DEFAULT_BUFFER_SIZE, DEFAULT_MASK_DIGIT, DEFAULT_MAX_NESTING_DEPTH,
    DEFAULT_NUMBER_MASK, DEFAULT_STRING_MASK, JsonMaskingConfig, JsonMaskingConfigBuilder,
    JsonPath, KeyMaskingConfig, KeyMaskingConfigBuilder, MAX_BUFFER_SIZE, MIN_BUFFER_SIZE,
    TargetKeyMode,
};
#[cfg(feature = "json")]
pub use config::{KeyMaskingSettings, MaskingSettings};
pub use error::{ConfigError, MaskingError};
pub use masking::JsonMasker;
pub use output::{INVALID_JSON_PLACEHOLDER, MaskedJson};
// Re-exports from value module
pub use value::{
    AnyMasker, BooleanMasker, EmailConfig, FULL_MASK_PLACEHOLDER, KeepConfig, MASK_CHAR,
    MaskConfig, NumberMasker, StringMasker, TextMaskPolicy, ValueMasker, ValueMaskerContext,
    ValueMaskers,
};
