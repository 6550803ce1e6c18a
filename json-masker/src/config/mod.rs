//! Masking configuration.
//!
//! - [`JsonMaskingConfig`]: which keys and JSONPaths are targeted, the mode
//!   ([`TargetKeyMode::Mask`] or [`TargetKeyMode::Allow`]), case sensitivity
//!   and the streaming limits.
//! - [`KeyMaskingConfig`]: how the values under one target are masked.
//! - [`JsonPath`]: the supported JSONPath subset.
//!
//! Everything is validated by the builders; a built config is always usable.

mod json_path;
mod key;
mod masking;
#[cfg(feature = "json")]
mod settings;

pub use json_path::JsonPath;
pub use key::{
    DEFAULT_BOOLEAN_MASK, DEFAULT_MASK_DIGIT, DEFAULT_NUMBER_MASK, DEFAULT_STRING_MASK,
    KeyMaskingConfig, KeyMaskingConfigBuilder,
};
pub(crate) use masking::Target;
pub use masking::{
    DEFAULT_BUFFER_SIZE, DEFAULT_MAX_NESTING_DEPTH, JsonMaskingConfig, JsonMaskingConfigBuilder,
    MAX_BUFFER_SIZE, MIN_BUFFER_SIZE, TargetKeyMode,
};
#[cfg(feature = "json")]
pub use settings::{KeyMaskingSettings, MaskingSettings};
