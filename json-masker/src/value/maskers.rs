//! The catalog of ready-made value maskers.

use std::fmt;

use super::{
    AnyMasker, BooleanMasker, NumberMasker, StringMasker, TextMaskPolicy, ValueMasker,
    ValueMaskerContext,
};
use crate::{
    error::{ConfigError, MaskingError},
    util::escape::encode_json_string,
};

/// A masker described by a human-readable label.
struct Described<F> {
    description: String,
    mask: F,
}

impl<F> fmt::Debug for Described<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

impl<F> ValueMasker for Described<F>
where
    F: Fn(&mut ValueMaskerContext<'_>) -> Result<(), MaskingError> + Send + Sync,
{
    fn mask_value(&self, context: &mut ValueMaskerContext<'_>) -> Result<(), MaskingError> {
        (self.mask)(context)
    }
}

fn describe<F>(description: impl Into<String>, mask: F) -> Described<F>
where
    F: Fn(&mut ValueMaskerContext<'_>) -> Result<(), MaskingError> + Send + Sync,
{
    Described {
        description: description.into(),
        mask,
    }
}

fn quoted(text: &str) -> Vec<u8> {
    let mut encoded = Vec::with_capacity(text.len() + 2);
    encode_json_string(text, &mut encoded);
    encoded
}

/// `text` escaped for use inside a JSON string, without the quotes.
fn string_fragment(text: &str) -> Vec<u8> {
    let mut encoded = quoted(text);
    encoded.pop();
    encoded.remove(0);
    encoded
}

fn replace_whole(description: String, replacement: Vec<u8>) -> AnyMasker {
    AnyMasker::new(describe(description, move |context| {
        context.replace_value(&replacement)
    }))
}

/// Constructors for the built-in maskers.
///
/// Every masker renders a description through `Debug`, which is what a
/// [`crate::KeyMaskingConfig`] shows when printed.
#[derive(Debug)]
pub enum ValueMaskers {}

impl ValueMaskers {
    /// Replaces the value with the JSON string `"text"`.
    pub fn with(text: &str) -> AnyMasker {
        let replacement = quoted(text);
        replace_whole(String::from_utf8_lossy(&replacement).into_owned(), replacement)
    }

    /// Replaces the value with a JSON number.
    pub fn with_number(value: i64) -> AnyMasker {
        let replacement = value.to_string();
        replace_whole(replacement.clone(), replacement.into_bytes())
    }

    /// Replaces the value with a JSON boolean.
    pub fn with_boolean(value: bool) -> AnyMasker {
        let replacement = value.to_string();
        replace_whole(replacement.clone(), replacement.into_bytes())
    }

    /// Replaces the value with `null`.
    pub fn with_null() -> AnyMasker {
        replace_whole("null (literal)".to_owned(), b"null".to_vec())
    }

    /// Leaves the value untouched.
    pub fn noop() -> AnyMasker {
        AnyMasker::new(describe("<no masking>", |_| Ok(())))
    }

    /// Replaces every visible character of a string with `text`, so the masked
    /// string has as many mask units as the original has characters.
    ///
    /// Escape sequences and multi-byte code points count as one character.
    pub fn each_character_with(text: &str) -> StringMasker {
        let mask = string_fragment(text);
        StringMasker::new(describe(
            format!("every character as {text}"),
            move |context| {
                let body_len = context.byte_len().saturating_sub(2);
                let visible = body_len - context.count_non_visible_bytes(1, body_len)?;
                context.replace_bytes(1, body_len, &mask, visible)
            },
        ))
    }

    /// Replaces the body of a string with `text` repeated exactly `length` times.
    pub fn each_character_with_length(text: &str, length: usize) -> StringMasker {
        let mask = string_fragment(text);
        StringMasker::new(describe(
            format!("{length} characters as {text}"),
            move |context| {
                let body_len = context.byte_len().saturating_sub(2);
                context.replace_bytes(1, body_len, &mask, length)
            },
        ))
    }

    /// Replaces every byte of a number with `digit`, keeping its length.
    ///
    /// `digit` must be between 1 and 9 so the result never has a leading zero.
    pub fn each_digit_with(digit: u8) -> Result<NumberMasker, ConfigError> {
        if !(1..=9).contains(&digit) {
            return Err(ConfigError::InvalidMaskDigit(digit));
        }
        let mask = [b'0' + digit];
        Ok(NumberMasker::new(describe(
            format!("every digit as integer: {digit}"),
            move |context| {
                let length = context.byte_len();
                context.replace_bytes(0, length, &mask, length)
            },
        )))
    }

    /// Replaces a number with exactly `length` copies of `digit`.
    ///
    /// A length of 0 produces the number `0`. `digit` may only be 0 when
    /// `length` is at most 1.
    pub fn each_digit_with_length(digit: u8, length: usize) -> Result<NumberMasker, ConfigError> {
        if digit > 9 || (digit == 0 && length > 1) {
            return Err(ConfigError::InvalidMaskDigit(digit));
        }
        let (mask, repeat) = if length == 0 { (b'0', 1) } else { (b'0' + digit, length) };
        Ok(NumberMasker::new(describe(
            format!("{length} digits as integer: {digit}"),
            move |context| {
                let original = context.byte_len();
                context.replace_bytes(0, original, &[mask], repeat)
            },
        )))
    }

    /// Replaces a number with a JSON string holding `text` once per byte of
    /// the original number.
    pub fn each_digit_as_string(text: &str) -> NumberMasker {
        let unit = string_fragment(text);
        NumberMasker::new(describe(
            format!("every digit as string: {text}"),
            move |context| {
                let original = context.byte_len();
                let mut mask = Vec::with_capacity(unit.len() * original + 2);
                mask.push(b'"');
                for _ in 0..original {
                    mask.extend_from_slice(&unit);
                }
                mask.push(b'"');
                context.replace_value(&mask)
            },
        ))
    }

    /// Masks the middle of an email address with `mask`.
    ///
    /// Keeps `keep_prefix` leading characters and `keep_suffix` trailing
    /// characters. With `keep_domain`, the suffix is counted before the `@`
    /// and the domain stays visible.
    pub fn email(keep_prefix: usize, keep_suffix: usize, keep_domain: bool, mask: &str) -> StringMasker {
        let mask = mask.to_owned();
        StringMasker::new(describe(
            format!("email, keep prefix: {keep_prefix}, keep suffix: {keep_suffix}, keep domain: {keep_domain}"),
            move |context| {
                let text = context.decoded_text()?;
                let chars: Vec<char> = text.chars().collect();
                let suffix_end = if keep_domain {
                    chars.iter().position(|&ch| ch == '@').unwrap_or(chars.len())
                } else {
                    chars.len()
                };
                let suffix_start = suffix_end.saturating_sub(keep_suffix);
                if keep_prefix >= suffix_start {
                    return Ok(());
                }
                let mut masked: String = chars[..keep_prefix].iter().collect();
                masked.push_str(&mask);
                masked.extend(&chars[suffix_start..]);
                context.replace_value(&quoted(&masked))
            },
        ))
    }

    /// Applies a character-level [`TextMaskPolicy`] to string values.
    pub fn text_policy(policy: TextMaskPolicy) -> StringMasker {
        StringMasker::from(policy)
    }

    /// Masks using a function over the decoded value.
    ///
    /// Strings are passed unescaped; numbers and booleans as their literal
    /// text. The result is always written as a JSON string; `None` writes
    /// `null`.
    pub fn with_text_function<F>(function: F) -> AnyMasker
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        AnyMasker::new(describe("with text function", move |context| {
            let decoded = context.decoded_text()?;
            match function(&decoded) {
                Some(masked) => context.replace_value(&quoted(&masked)),
                None => context.replace_value(b"null"),
            }
        }))
    }

    /// Masks using a function over the raw JSON value.
    ///
    /// The function receives the value exactly as it appears in the input
    /// (strings keep their quotes and escapes) and must return valid JSON.
    pub fn with_raw_value_function<F>(function: F) -> AnyMasker
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        AnyMasker::new(describe("with raw value function", move |context| {
            let masked = function(context.as_str()?);
            context.replace_value(masked.as_bytes())
        }))
    }

    /// Wraps `masker` with a custom description.
    pub fn describe<M>(description: impl Into<String>, masker: M) -> AnyMasker
    where
        M: ValueMasker + 'static,
    {
        AnyMasker::new(describe(description, move |context| masker.mask_value(context)))
    }
}

impl From<&str> for StringMasker {
    fn from(text: &str) -> Self {
        ValueMaskers::with(text).into()
    }
}

impl From<bool> for BooleanMasker {
    fn from(value: bool) -> Self {
        ValueMaskers::with_boolean(value).into()
    }
}

impl From<i64> for NumberMasker {
    fn from(value: i64) -> Self {
        ValueMaskers::with_number(value).into()
    }
}
