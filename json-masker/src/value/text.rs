//! Character-level masking policies for JSON string values.
//!
//! A [`TextMaskPolicy`] works on the decoded text of a string value (escapes
//! resolved), so `"café"` is treated as the four characters `café`. The
//! result is re-encoded as a JSON string. Policies count Unicode scalar
//! values, never bytes.

use std::borrow::Cow;

use super::{StringMasker, ValueMasker, ValueMaskerContext};
use crate::{error::MaskingError, util::escape::encode_json_string};

/// Default character used to mask individual characters.
pub const MASK_CHAR: char = '*';

/// Default placeholder used by [`TextMaskPolicy::Full`].
pub const FULL_MASK_PLACEHOLDER: &str = "***";

fn mask_span(chars: &mut [char], mask_char: char) {
    chars.fill(mask_char);
}

/// Keeps leading and/or trailing characters visible and masks the rest.
///
/// If the visible spans cover the whole value, it is left unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeepConfig {
    visible_prefix: usize,
    visible_suffix: usize,
    mask_char: char,
}

impl KeepConfig {
    #[must_use]
    pub fn first(visible_prefix: usize) -> Self {
        Self::both(visible_prefix, 0)
    }

    #[must_use]
    pub fn last(visible_suffix: usize) -> Self {
        Self::both(0, visible_suffix)
    }

    #[must_use]
    pub fn both(visible_prefix: usize, visible_suffix: usize) -> Self {
        Self {
            visible_prefix,
            visible_suffix,
            mask_char: MASK_CHAR,
        }
    }

    #[must_use]
    pub fn with_mask_char(mut self, mask_char: char) -> Self {
        self.mask_char = mask_char;
        self
    }

    fn apply_to(&self, value: &str) -> String {
        let mut chars: Vec<char> = value.chars().collect();
        let total = chars.len();
        if self.visible_prefix.saturating_add(self.visible_suffix) >= total {
            return value.to_owned();
        }
        mask_span(
            &mut chars[self.visible_prefix..total - self.visible_suffix],
            self.mask_char,
        );
        chars.into_iter().collect()
    }
}

/// Masks leading and/or trailing characters and leaves the rest visible.
///
/// If the masked spans cover the whole value, every character is masked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(clippy::struct_field_names)]
pub struct MaskConfig {
    mask_prefix: usize,
    mask_suffix: usize,
    mask_char: char,
}

impl MaskConfig {
    #[must_use]
    pub fn first(mask_prefix: usize) -> Self {
        Self::both(mask_prefix, 0)
    }

    #[must_use]
    pub fn last(mask_suffix: usize) -> Self {
        Self::both(0, mask_suffix)
    }

    #[must_use]
    pub fn both(mask_prefix: usize, mask_suffix: usize) -> Self {
        Self {
            mask_prefix,
            mask_suffix,
            mask_char: MASK_CHAR,
        }
    }

    #[must_use]
    pub fn with_mask_char(mut self, mask_char: char) -> Self {
        self.mask_char = mask_char;
        self
    }

    fn apply_to(&self, value: &str) -> String {
        let mut chars: Vec<char> = value.chars().collect();
        let total = chars.len();
        if self.mask_prefix.saturating_add(self.mask_suffix) >= total {
            mask_span(&mut chars, self.mask_char);
        } else {
            mask_span(&mut chars[..self.mask_prefix], self.mask_char);
            mask_span(&mut chars[total - self.mask_suffix..], self.mask_char);
        }
        chars.into_iter().collect()
    }
}

/// Masks the local part of an email address and keeps the domain.
///
/// Values without an `@` are masked like [`KeepConfig::first`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmailConfig {
    visible_prefix: usize,
    mask_char: char,
}

impl EmailConfig {
    #[must_use]
    pub fn new(visible_prefix: usize) -> Self {
        Self {
            visible_prefix,
            mask_char: MASK_CHAR,
        }
    }

    #[must_use]
    pub fn with_mask_char(mut self, mask_char: char) -> Self {
        self.mask_char = mask_char;
        self
    }

    fn apply_to(&self, value: &str) -> String {
        let (local, domain) = value
            .find('@')
            .map_or((value, ""), |at| value.split_at(at));
        let keep = KeepConfig::first(self.visible_prefix).with_mask_char(self.mask_char);
        let mut masked = keep.apply_to(local);
        masked.push_str(domain);
        masked
    }
}

/// A masking strategy applied to the decoded text of a JSON string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextMaskPolicy {
    /// Replace the whole text with a placeholder.
    Full { placeholder: Cow<'static, str> },
    Keep(KeepConfig),
    Mask(MaskConfig),
    Email(EmailConfig),
}

impl TextMaskPolicy {
    /// [`TextMaskPolicy::Full`] with [`FULL_MASK_PLACEHOLDER`].
    #[must_use]
    pub fn full() -> Self {
        Self::full_with(FULL_MASK_PLACEHOLDER)
    }

    #[must_use]
    pub fn full_with<P>(placeholder: P) -> Self
    where
        P: Into<Cow<'static, str>>,
    {
        Self::Full {
            placeholder: placeholder.into(),
        }
    }

    #[must_use]
    pub fn keep_first(visible_prefix: usize) -> Self {
        Self::Keep(KeepConfig::first(visible_prefix))
    }

    #[must_use]
    pub fn keep_last(visible_suffix: usize) -> Self {
        Self::Keep(KeepConfig::last(visible_suffix))
    }

    #[must_use]
    pub fn mask_first(mask_prefix: usize) -> Self {
        Self::Mask(MaskConfig::first(mask_prefix))
    }

    #[must_use]
    pub fn mask_last(mask_suffix: usize) -> Self {
        Self::Mask(MaskConfig::last(mask_suffix))
    }

    /// Keeps the first `visible_prefix` characters of the local part.
    ///
    /// ```
    /// use json_masker::TextMaskPolicy;
    ///
    /// let policy = TextMaskPolicy::email_local(2);
    /// assert_eq!(policy.apply_to("alice@example.com"), "al***@example.com");
    /// ```
    #[must_use]
    pub fn email_local(visible_prefix: usize) -> Self {
        Self::Email(EmailConfig::new(visible_prefix))
    }

    /// Overrides the masking character. Has no effect on [`TextMaskPolicy::Full`].
    #[must_use]
    pub fn with_mask_char(self, mask_char: char) -> Self {
        match self {
            Self::Full { .. } => self,
            Self::Keep(config) => Self::Keep(config.with_mask_char(mask_char)),
            Self::Mask(config) => Self::Mask(config.with_mask_char(mask_char)),
            Self::Email(config) => Self::Email(config.with_mask_char(mask_char)),
        }
    }

    #[must_use]
    pub fn apply_to(&self, value: &str) -> String {
        match self {
            Self::Full { placeholder } => placeholder.clone().into_owned(),
            Self::Keep(config) => config.apply_to(value),
            Self::Mask(config) => config.apply_to(value),
            Self::Email(config) => config.apply_to(value),
        }
    }
}

impl Default for TextMaskPolicy {
    fn default() -> Self {
        Self::full()
    }
}

impl ValueMasker for TextMaskPolicy {
    fn mask_value(&self, context: &mut ValueMaskerContext<'_>) -> Result<(), MaskingError> {
        let masked = self.apply_to(&context.decoded_text()?);
        let mut encoded = Vec::with_capacity(masked.len() + 2);
        encode_json_string(&masked, &mut encoded);
        context.replace_value(&encoded)
    }
}

impl From<TextMaskPolicy> for StringMasker {
    fn from(policy: TextMaskPolicy) -> Self {
        Self::new(policy)
    }
}
