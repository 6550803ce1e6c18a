//! Per-key masking configuration.

use crate::{
    error::ConfigError,
    value::{BooleanMasker, NumberMasker, StringMasker, ValueMaskers},
};

/// Default replacement for masked strings.
pub const DEFAULT_STRING_MASK: &str = "***";
/// Default replacement for masked numbers (written as a JSON string).
pub const DEFAULT_NUMBER_MASK: &str = "###";
/// Default replacement for masked booleans (written as a JSON string).
pub const DEFAULT_BOOLEAN_MASK: &str = "&&&";
/// Digit used for per-digit number masking when only an obfuscation length is set.
pub const DEFAULT_MASK_DIGIT: u8 = 8;

/// How the values under one key (or JSONPath) are masked.
///
/// Cheap to clone: maskers are shared.
#[derive(Clone, Debug)]
pub struct KeyMaskingConfig {
    string_masker: StringMasker,
    number_masker: Option<NumberMasker>,
    boolean_masker: Option<BooleanMasker>,
    mask_objects: bool,
    mask_arrays: bool,
}

impl Default for KeyMaskingConfig {
    fn default() -> Self {
        Self {
            string_masker: ValueMaskers::with(DEFAULT_STRING_MASK).into(),
            number_masker: Some(ValueMaskers::with(DEFAULT_NUMBER_MASK).into()),
            boolean_masker: Some(ValueMaskers::with(DEFAULT_BOOLEAN_MASK).into()),
            mask_objects: true,
            mask_arrays: true,
        }
    }
}

impl KeyMaskingConfig {
    /// Starts from the defaults: strings become `"***"`, numbers `"###"` and
    /// booleans `"&&&"`, and matched containers are masked as a whole.
    #[must_use]
    pub fn builder() -> KeyMaskingConfigBuilder {
        KeyMaskingConfigBuilder::default()
    }

    pub(crate) fn string_masker(&self) -> &StringMasker {
        &self.string_masker
    }

    /// `None` when number masking is disabled.
    pub(crate) fn number_masker(&self) -> Option<&NumberMasker> {
        self.number_masker.as_ref()
    }

    /// `None` when boolean masking is disabled.
    pub(crate) fn boolean_masker(&self) -> Option<&BooleanMasker> {
        self.boolean_masker.as_ref()
    }

    /// Whether matched numbers are masked.
    pub fn is_number_masking_enabled(&self) -> bool {
        self.number_masker.is_some()
    }

    /// Whether matched booleans are masked.
    pub fn is_boolean_masking_enabled(&self) -> bool {
        self.boolean_masker.is_some()
    }

    /// Whether a matched object masks everything inside it.
    pub fn is_object_masking_enabled(&self) -> bool {
        self.mask_objects
    }

    /// Whether a matched array masks everything inside it.
    pub fn is_array_masking_enabled(&self) -> bool {
        self.mask_arrays
    }
}

#[derive(Clone, Debug, Default)]
enum StringChoice {
    #[default]
    Default,
    EachCharacter(String),
    Masker(StringMasker),
}

#[derive(Clone, Debug, Default)]
enum NumberChoice {
    #[default]
    Default,
    Disabled,
    EachDigit(u8),
    Masker(NumberMasker),
}

#[derive(Clone, Debug, Default)]
enum BooleanChoice {
    #[default]
    Default,
    Disabled,
    Masker(BooleanMasker),
}

/// Builder for [`KeyMaskingConfig`].
///
/// Setting the same value type twice keeps the last setting. Contradictions
/// between settings (such as an obfuscation length next to a static string
/// replacement) are reported by [`KeyMaskingConfigBuilder::build`].
#[derive(Clone, Debug, Default)]
pub struct KeyMaskingConfigBuilder {
    strings: StringChoice,
    numbers: NumberChoice,
    booleans: BooleanChoice,
    disable_objects: bool,
    disable_arrays: bool,
    obfuscation_length: Option<usize>,
}

impl KeyMaskingConfigBuilder {
    /// Replaces strings with the JSON string `"text"`.
    #[must_use]
    pub fn mask_strings_with(mut self, text: &str) -> Self {
        self.strings = StringChoice::Masker(ValueMaskers::with(text).into());
        self
    }

    /// Replaces each visible character of a string with `text`.
    #[must_use]
    pub fn mask_string_characters_with(mut self, text: &str) -> Self {
        self.strings = StringChoice::EachCharacter(text.to_owned());
        self
    }

    /// Masks strings with any [`StringMasker`], see [`crate::ValueMaskers`].
    #[must_use]
    pub fn mask_strings_with_masker(mut self, masker: impl Into<StringMasker>) -> Self {
        self.strings = StringChoice::Masker(masker.into());
        self
    }

    /// Replaces numbers with the JSON string `"text"`.
    #[must_use]
    pub fn mask_numbers_with(mut self, text: &str) -> Self {
        self.numbers = NumberChoice::Masker(ValueMaskers::with(text).into());
        self
    }

    /// Replaces numbers with a fixed JSON number.
    #[must_use]
    pub fn mask_numbers_with_value(mut self, value: i64) -> Self {
        self.numbers = NumberChoice::Masker(value.into());
        self
    }

    /// Replaces every byte of a number with `digit` (1 to 9).
    #[must_use]
    pub fn mask_number_digits_with(mut self, digit: u8) -> Self {
        self.numbers = NumberChoice::EachDigit(digit);
        self
    }

    /// Masks numbers with any [`NumberMasker`].
    #[must_use]
    pub fn mask_numbers_with_masker(mut self, masker: impl Into<NumberMasker>) -> Self {
        self.numbers = NumberChoice::Masker(masker.into());
        self
    }

    /// Leaves numbers untouched.
    #[must_use]
    pub fn disable_number_masking(mut self) -> Self {
        self.numbers = NumberChoice::Disabled;
        self
    }

    /// Replaces booleans with the JSON string `"text"`.
    #[must_use]
    pub fn mask_booleans_with(mut self, text: &str) -> Self {
        self.booleans = BooleanChoice::Masker(ValueMaskers::with(text).into());
        self
    }

    /// Replaces booleans with a fixed JSON boolean.
    #[must_use]
    pub fn mask_booleans_with_value(mut self, value: bool) -> Self {
        self.booleans = BooleanChoice::Masker(value.into());
        self
    }

    /// Masks booleans with any [`BooleanMasker`].
    #[must_use]
    pub fn mask_booleans_with_masker(mut self, masker: impl Into<BooleanMasker>) -> Self {
        self.booleans = BooleanChoice::Masker(masker.into());
        self
    }

    /// Leaves booleans untouched.
    #[must_use]
    pub fn disable_boolean_masking(mut self) -> Self {
        self.booleans = BooleanChoice::Disabled;
        self
    }

    /// A matched object is searched for nested targets instead of being
    /// masked as a whole.
    #[must_use]
    pub fn disable_object_masking(mut self) -> Self {
        self.disable_objects = true;
        self
    }

    /// A matched array is searched for nested targets instead of being masked
    /// as a whole. In ALLOW mode its elements are still masked, since they
    /// have no key that could be allowed.
    #[must_use]
    pub fn disable_array_masking(mut self) -> Self {
        self.disable_arrays = true;
        self
    }

    /// Masks strings and numbers to exactly `length` characters, hiding the
    /// original length. Numbers masked to length 0 become `0`.
    ///
    /// Only compatible with per-character string masking and per-digit number
    /// masking; unset maskers default to `*` and digit `8`.
    #[must_use]
    pub fn obfuscation_length(mut self, length: usize) -> Self {
        self.obfuscation_length = Some(length);
        self
    }

    /// Fails when `obfuscation_length` is combined with a custom string or
    /// number masker, or when a mask digit is out of range.
    pub fn build(self) -> Result<KeyMaskingConfig, ConfigError> {
        let length = self.obfuscation_length;
        let string_masker = match (self.strings, length) {
            (StringChoice::Default, None) => ValueMaskers::with(DEFAULT_STRING_MASK).into(),
            (StringChoice::Default, Some(length)) => {
                ValueMaskers::each_character_with_length("*", length)
            }
            (StringChoice::EachCharacter(text), None) => ValueMaskers::each_character_with(&text),
            (StringChoice::EachCharacter(text), Some(length)) => {
                ValueMaskers::each_character_with_length(&text, length)
            }
            (StringChoice::Masker(masker), None) => masker,
            (StringChoice::Masker(_), Some(_)) => {
                return Err(ConfigError::ConflictingMaskingOptions(
                    "an obfuscation length requires per-character string masking",
                ));
            }
        };
        let number_masker = match (self.numbers, length) {
            (NumberChoice::Disabled, _) => None,
            (NumberChoice::Default, None) => Some(ValueMaskers::with(DEFAULT_NUMBER_MASK).into()),
            (NumberChoice::Default, Some(length)) => Some(ValueMaskers::each_digit_with_length(
                DEFAULT_MASK_DIGIT,
                length,
            )?),
            (NumberChoice::EachDigit(digit), None) => Some(ValueMaskers::each_digit_with(digit)?),
            (NumberChoice::EachDigit(digit), Some(length)) => {
                Some(ValueMaskers::each_digit_with_length(digit, length)?)
            }
            (NumberChoice::Masker(masker), None) => Some(masker),
            (NumberChoice::Masker(_), Some(_)) => {
                return Err(ConfigError::ConflictingMaskingOptions(
                    "an obfuscation length requires per-digit number masking",
                ));
            }
        };
        let boolean_masker = match self.booleans {
            BooleanChoice::Default => Some(ValueMaskers::with(DEFAULT_BOOLEAN_MASK).into()),
            BooleanChoice::Disabled => None,
            BooleanChoice::Masker(masker) => Some(masker),
        };
        Ok(KeyMaskingConfig {
            string_masker,
            number_masker,
            boolean_masker,
            mask_objects: !self.disable_objects,
            mask_arrays: !self.disable_arrays,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::testing::mask_one;

    #[test]
    fn defaults_mask_every_type() {
        let config = KeyMaskingConfig::default();
        assert_eq!(mask_one(config.string_masker().masker(), r#""abc""#).unwrap(), r#""***""#);
        let number = config.number_masker().unwrap();
        assert_eq!(mask_one(number.masker(), "12").unwrap(), r####""###""####);
        let boolean = config.boolean_masker().unwrap();
        assert_eq!(mask_one(boolean.masker(), "true").unwrap(), r#""&&&""#);
        assert!(config.is_object_masking_enabled());
        assert!(config.is_array_masking_enabled());
    }

    #[test]
    fn disabling_types() {
        let config = KeyMaskingConfig::builder()
            .disable_number_masking()
            .disable_boolean_masking()
            .disable_object_masking()
            .disable_array_masking()
            .build()
            .unwrap();
        assert!(!config.is_number_masking_enabled());
        assert!(!config.is_boolean_masking_enabled());
        assert!(!config.is_object_masking_enabled());
        assert!(!config.is_array_masking_enabled());
    }

    #[test]
    fn obfuscation_length_defaults_to_per_unit_maskers() {
        let config = KeyMaskingConfig::builder().obfuscation_length(2).build().unwrap();
        assert_eq!(
            mask_one(config.string_masker().masker(), r#""secret""#).unwrap(),
            r#""**""#
        );
        let number = config.number_masker().unwrap();
        assert_eq!(mask_one(number.masker(), "123456").unwrap(), "88");
    }

    #[test]
    fn obfuscation_length_zero_keeps_numbers_valid() {
        let config = KeyMaskingConfig::builder().obfuscation_length(0).build().unwrap();
        assert_eq!(mask_one(config.string_masker().masker(), r#""x""#).unwrap(), r#""""#);
        let number = config.number_masker().unwrap();
        assert_eq!(mask_one(number.masker(), "-42.0").unwrap(), "0");
    }

    #[test]
    fn obfuscation_length_conflicts_with_static_masks() {
        let err = KeyMaskingConfig::builder()
            .mask_strings_with("[hidden]")
            .obfuscation_length(3)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::ConflictingMaskingOptions(_)));

        let err = KeyMaskingConfig::builder()
            .mask_numbers_with_value(0)
            .obfuscation_length(3)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::ConflictingMaskingOptions(_)));
    }

    #[test]
    fn invalid_digit_is_rejected_at_build() {
        let err = KeyMaskingConfig::builder()
            .mask_number_digits_with(0)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::InvalidMaskDigit(0));
    }

    #[test]
    fn last_setting_wins() {
        let config = KeyMaskingConfig::builder()
            .mask_strings_with("first")
            .mask_string_characters_with("#")
            .build()
            .unwrap();
        assert_eq!(
            mask_one(config.string_masker().masker(), r#""abc""#).unwrap(),
            r####""###""####
        );
    }
}
