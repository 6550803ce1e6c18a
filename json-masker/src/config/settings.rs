//! Declarative configuration loaded through `serde`.
//!
//! [`MaskingSettings`] mirrors the builder API field by field so a masker can
//! be configured from a JSON (or any serde format) document:
//!
//! ```
//! use json_masker::{JsonMaskingConfig, MaskingSettings};
//!
//! let settings: MaskingSettings = serde_json::from_str(r#"{
//!     "maskKeys": ["password"],
//!     "keyOverrides": { "pin": { "obfuscationLength": 4 } }
//! }"#)?;
//! let config = JsonMaskingConfig::try_from(settings)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;

use super::{JsonMaskingConfig, KeyMaskingConfig};
use crate::error::ConfigError;

/// Serde form of [`JsonMaskingConfig`].
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct MaskingSettings {
    pub mask_keys: Vec<String>,
    pub mask_json_paths: Vec<String>,
    /// Present (even empty) selects ALLOW mode.
    pub allow_keys: Option<Vec<String>>,
    pub allow_json_paths: Option<Vec<String>>,
    pub key_overrides: BTreeMap<String, KeyMaskingSettings>,
    pub json_path_overrides: BTreeMap<String, KeyMaskingSettings>,
    pub case_sensitive_target_keys: bool,
    pub defaults: Option<KeyMaskingSettings>,
    pub streaming_buffer_size: Option<usize>,
    pub max_nesting_depth: Option<usize>,
}

/// Serde form of [`KeyMaskingConfig`].
///
/// At most one option per value type may be set.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct KeyMaskingSettings {
    pub mask_strings_with: Option<String>,
    pub mask_string_characters_with: Option<String>,
    pub mask_numbers_with: Option<String>,
    pub mask_numbers_with_value: Option<i64>,
    pub mask_number_digits_with: Option<u8>,
    pub mask_booleans_with: Option<String>,
    pub mask_booleans_with_value: Option<bool>,
    pub disable_number_masking: bool,
    pub disable_boolean_masking: bool,
    pub disable_object_masking: bool,
    pub disable_array_masking: bool,
    pub obfuscation_length: Option<usize>,
}

fn at_most_one(options: &[bool], conflict: &'static str) -> Result<(), ConfigError> {
    if options.iter().filter(|&&set| set).count() > 1 {
        return Err(ConfigError::ConflictingMaskingOptions(conflict));
    }
    Ok(())
}

impl TryFrom<KeyMaskingSettings> for KeyMaskingConfig {
    type Error = ConfigError;

    fn try_from(settings: KeyMaskingSettings) -> Result<Self, Self::Error> {
        at_most_one(
            &[
                settings.mask_strings_with.is_some(),
                settings.mask_string_characters_with.is_some(),
            ],
            "more than one string masking option",
        )?;
        at_most_one(
            &[
                settings.mask_numbers_with.is_some(),
                settings.mask_numbers_with_value.is_some(),
                settings.mask_number_digits_with.is_some(),
                settings.disable_number_masking,
            ],
            "more than one number masking option",
        )?;
        at_most_one(
            &[
                settings.mask_booleans_with.is_some(),
                settings.mask_booleans_with_value.is_some(),
                settings.disable_boolean_masking,
            ],
            "more than one boolean masking option",
        )?;

        let mut builder = KeyMaskingConfig::builder();
        if let Some(text) = &settings.mask_strings_with {
            builder = builder.mask_strings_with(text);
        }
        if let Some(text) = &settings.mask_string_characters_with {
            builder = builder.mask_string_characters_with(text);
        }
        if let Some(text) = &settings.mask_numbers_with {
            builder = builder.mask_numbers_with(text);
        }
        if let Some(value) = settings.mask_numbers_with_value {
            builder = builder.mask_numbers_with_value(value);
        }
        if let Some(digit) = settings.mask_number_digits_with {
            builder = builder.mask_number_digits_with(digit);
        }
        if let Some(text) = &settings.mask_booleans_with {
            builder = builder.mask_booleans_with(text);
        }
        if let Some(value) = settings.mask_booleans_with_value {
            builder = builder.mask_booleans_with_value(value);
        }
        if settings.disable_number_masking {
            builder = builder.disable_number_masking();
        }
        if settings.disable_boolean_masking {
            builder = builder.disable_boolean_masking();
        }
        if settings.disable_object_masking {
            builder = builder.disable_object_masking();
        }
        if settings.disable_array_masking {
            builder = builder.disable_array_masking();
        }
        if let Some(length) = settings.obfuscation_length {
            builder = builder.obfuscation_length(length);
        }
        builder.build()
    }
}

impl TryFrom<MaskingSettings> for JsonMaskingConfig {
    type Error = ConfigError;

    fn try_from(settings: MaskingSettings) -> Result<Self, Self::Error> {
        let mut builder = JsonMaskingConfig::builder();
        if !settings.mask_keys.is_empty() {
            builder = builder.mask_keys(settings.mask_keys);
        }
        if !settings.mask_json_paths.is_empty() {
            builder = builder.mask_json_paths(settings.mask_json_paths);
        }
        if let Some(keys) = settings.allow_keys {
            builder = builder.allow_keys(keys);
        }
        if let Some(paths) = settings.allow_json_paths {
            builder = builder.allow_json_paths(paths);
        }
        for (key, overrides) in settings.key_overrides {
            builder = builder.mask_key_with(key, overrides.try_into()?);
        }
        for (path, overrides) in settings.json_path_overrides {
            builder = builder.mask_json_path_with(path, overrides.try_into()?);
        }
        if settings.case_sensitive_target_keys {
            builder = builder.case_sensitive_target_keys();
        }
        if let Some(defaults) = settings.defaults {
            builder = builder.default_key_config(defaults.try_into()?);
        }
        if let Some(size) = settings.streaming_buffer_size {
            builder = builder.streaming_buffer_size(size);
        }
        if let Some(depth) = settings.max_nesting_depth {
            builder = builder.max_nesting_depth(depth);
        }
        builder.build()
    }
}
