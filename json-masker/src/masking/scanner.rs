//! The single-pass JSON walk.
//!
//! The scanner never builds a tree. It keeps one [`Frame`] per open object or
//! array, decides for every value whether to skip it, mask it or descend into
//! it, and hands masked primitives to the configured [`ValueMasker`].

use super::{
    key_matcher::{KeyMatcher, Resolution},
    path_tracker::JsonPathTracker,
    state::MaskingState,
};
use crate::{
    config::{KeyMaskingConfig, TargetKeyMode},
    error::MaskingError,
    util::{
        DecodeError,
        ascii::{
            self, BACKSLASH, COLON, COMMA, CURLY_CLOSE, CURLY_OPEN, QUOTE, SQUARE_CLOSE,
            SQUARE_OPEN,
        },
    },
    value::{ValueMasker, ValueMaskerContext},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Container {
    Object,
    Array,
}

impl Container {
    fn name(self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Array => "array",
        }
    }
}

#[derive(Clone, Copy)]
struct Frame<'m> {
    container: Container,
    /// Set when the whole container is masked.
    config: Option<&'m KeyMaskingConfig>,
    has_members: bool,
}

/// What to do with the next value.
#[derive(Clone, Copy)]
enum Action<'m> {
    /// Copy it untouched, containers included.
    Skip,
    /// Walk it, masking primitives with the config if there is one.
    Visit(Option<&'m KeyMaskingConfig>),
}

pub(crate) struct Scanner<'m, 's, S> {
    state: &'s mut S,
    matcher: &'m KeyMatcher,
    tracker: Option<JsonPathTracker<'m>>,
    frames: Vec<Frame<'m>>,
    max_depth: usize,
}

impl<'m, 's, S: MaskingState> Scanner<'m, 's, S> {
    pub(crate) fn new(state: &'s mut S, matcher: &'m KeyMatcher, max_depth: usize) -> Self {
        Self {
            state,
            matcher,
            tracker: JsonPathTracker::new(matcher),
            frames: Vec::new(),
            max_depth,
        }
    }

    /// Masks every top-level value until the input is exhausted.
    pub(crate) fn run(mut self) -> Result<(), MaskingError> {
        loop {
            self.skip_whitespace()?;
            if self.state.peek()?.is_none() {
                return Ok(());
            }
            let path = self.tracker.as_ref().and_then(JsonPathTracker::current);
            let action = match self.matcher.resolve_path(path) {
                Resolution::Allowed => Action::Skip,
                Resolution::Masked { config, .. } => Action::Visit(Some(config)),
                Resolution::Unmatched => Action::Visit(None),
            };
            self.begin_value(action)?;
            while !self.frames.is_empty() {
                self.step()?;
            }
        }
    }

    // ========================================================================
    // Structure
    // ========================================================================

    /// Handles one token inside the innermost open container.
    fn step(&mut self) -> Result<(), MaskingError> {
        self.skip_whitespace()?;
        let top = self.frames.len() - 1;
        let Frame {
            container,
            config,
            has_members,
        } = self.frames[top];
        let mut byte = self.expect_byte(container.name())?;

        let close = match container {
            Container::Object => CURLY_CLOSE,
            Container::Array => SQUARE_CLOSE,
        };
        if byte == close {
            self.state.advance();
            return self.close();
        }
        if has_members {
            if byte != COMMA {
                return Err(self.state.invalid_json(format!(
                    "expected `,` or `{}` in {}, found `{}`",
                    close as char,
                    container.name(),
                    byte.escape_ascii()
                )));
            }
            self.state.advance();
            self.skip_whitespace()?;
            byte = self.expect_byte(container.name())?;
        }
        self.frames[top].has_members = true;

        match container {
            Container::Array => self.begin_value(Action::Visit(config)),
            Container::Object => {
                if byte != QUOTE {
                    return Err(self.state.invalid_json("expected an object key"));
                }
                let action = self.read_key(config)?;
                self.skip_whitespace()?;
                if self.expect_byte("object")? != COLON {
                    return Err(self.state.invalid_json("expected `:` after an object key"));
                }
                self.state.advance();
                self.begin_value(action)
            }
        }
    }

    /// Reads a member key, enters its JSONPath segment and decides what to do
    /// with its value.
    fn read_key(&mut self, parent: Option<&'m KeyMaskingConfig>) -> Result<Action<'m>, MaskingError> {
        self.state.register_token();
        self.skip_string()?;
        let raw = self.state.value();
        let key = &raw[1..raw.len() - 1];
        let key_offset = self.state.value_offset() + 1;
        let invalid_key = move |err: DecodeError| {
            MaskingError::invalid_json(err.reason, key_offset + err.index as u64)
        };

        if let Some(tracker) = self.tracker.as_mut() {
            tracker.push_key_value_segment(key).map_err(invalid_key)?;
        }
        let path = self.tracker.as_ref().and_then(JsonPathTracker::current);
        let resolution = self.matcher.resolve(key, path).map_err(invalid_key)?;
        self.state.clear_token();

        Ok(match resolution {
            Resolution::Allowed => Action::Skip,
            Resolution::Masked { config, specific } => Action::Visit(Some(match parent {
                Some(parent) if !specific => parent,
                _ => config,
            })),
            Resolution::Unmatched => Action::Visit(parent),
        })
    }

    fn begin_value(&mut self, action: Action<'m>) -> Result<(), MaskingError> {
        self.skip_whitespace()?;
        let byte = self.expect_byte("value")?;
        let config = match action {
            Action::Skip => {
                self.skip_value(byte)?;
                return self.value_done();
            }
            Action::Visit(config) => config,
        };
        // In ALLOW mode every value that is not allowed gets masked, so the
        // container switches never drop the config of the members.
        let allow_mode = self.matcher.mode() == TargetKeyMode::Allow;
        match byte {
            CURLY_OPEN => self.open(
                Container::Object,
                config.filter(|config| allow_mode || config.is_object_masking_enabled()),
            ),
            SQUARE_OPEN => self.open(
                Container::Array,
                config.filter(|config| allow_mode || config.is_array_masking_enabled()),
            ),
            _ => {
                match config {
                    Some(config) => self.mask_primitive(byte, config)?,
                    None => self.skip_primitive(byte)?,
                }
                self.value_done()
            }
        }
    }

    fn open(&mut self, container: Container, config: Option<&'m KeyMaskingConfig>) -> Result<(), MaskingError> {
        if self.frames.len() >= self.max_depth {
            return Err(self.state.invalid_json(format!(
                "maximum nesting depth of {} exceeded",
                self.max_depth
            )));
        }
        self.state.advance();
        if container == Container::Array {
            if let Some(tracker) = self.tracker.as_mut() {
                tracker.push_array_segment();
            }
        }
        self.frames.push(Frame {
            container,
            config,
            has_members: false,
        });
        Ok(())
    }

    fn close(&mut self) -> Result<(), MaskingError> {
        if let Some(Frame {
            container: Container::Array,
            ..
        }) = self.frames.pop()
        {
            if let Some(tracker) = self.tracker.as_mut() {
                tracker.backtrack();
            }
        }
        self.value_done()
    }

    /// Leaves the JSONPath segment of an object member once its value is done.
    fn value_done(&mut self) -> Result<(), MaskingError> {
        if let Some(Frame {
            container: Container::Object,
            ..
        }) = self.frames.last()
        {
            if let Some(tracker) = self.tracker.as_mut() {
                tracker.backtrack();
            }
        }
        Ok(())
    }

    // ========================================================================
    // Primitives
    // ========================================================================

    fn mask_primitive(&mut self, byte: u8, config: &'m KeyMaskingConfig) -> Result<(), MaskingError> {
        match byte {
            QUOTE => {
                self.state.register_token();
                self.skip_string()?;
                self.apply(config.string_masker().masker())
            }
            b't' | b'f' => {
                let Some(masker) = config.boolean_masker() else {
                    return self.skip_primitive(byte);
                };
                self.state.register_token();
                let literal: &[u8] = if byte == b't' { b"true" } else { b"false" };
                self.state.advance_by(literal.len());
                self.state.ensure_buffered()?;
                if self.state.value() != literal {
                    let offset = self.state.value_offset();
                    return Err(MaskingError::invalid_json("invalid literal", offset));
                }
                self.apply(masker.masker())
            }
            _ if ascii::is_number_start(byte) => {
                let Some(masker) = config.number_masker() else {
                    return self.skip_primitive(byte);
                };
                self.state.register_token();
                self.skip_number()?;
                self.apply(masker.masker())
            }
            _ => self.skip_primitive(byte),
        }
    }

    /// Runs `masker` over the registered token, which ends at the cursor.
    fn apply(&mut self, masker: &dyn ValueMasker) -> Result<(), MaskingError> {
        let result = masker.mask_value(&mut ValueMaskerContext::new(&mut *self.state));
        self.state.clear_token();
        result
    }

    fn skip_primitive(&mut self, byte: u8) -> Result<(), MaskingError> {
        match byte {
            QUOTE => self.skip_string(),
            b't' | b'n' => {
                self.state.advance_by(4);
                Ok(())
            }
            b'f' => {
                self.state.advance_by(5);
                Ok(())
            }
            _ if ascii::is_number_start(byte) => self.skip_number(),
            _ => Err(self.state.invalid_json(format!(
                "unexpected character `{}`",
                byte.escape_ascii()
            ))),
        }
    }

    /// Skips any value, containers included, without interpreting it.
    fn skip_value(&mut self, byte: u8) -> Result<(), MaskingError> {
        if byte != CURLY_OPEN && byte != SQUARE_OPEN {
            return self.skip_primitive(byte);
        }
        let mut depth = 0_usize;
        loop {
            let byte = self.expect_byte("value")?;
            match byte {
                QUOTE => self.skip_string()?,
                CURLY_OPEN | SQUARE_OPEN => {
                    depth += 1;
                    if self.frames.len() + depth > self.max_depth {
                        return Err(self.state.invalid_json(format!(
                            "maximum nesting depth of {} exceeded",
                            self.max_depth
                        )));
                    }
                    self.state.advance();
                }
                CURLY_CLOSE | SQUARE_CLOSE => {
                    depth -= 1;
                    self.state.advance();
                    if depth == 0 {
                        return Ok(());
                    }
                }
                _ => self.state.advance(),
            }
        }
    }

    /// Moves past a string, the cursor being on its opening quote.
    fn skip_string(&mut self) -> Result<(), MaskingError> {
        self.state.advance();
        loop {
            match self.state.peek()? {
                Some(QUOTE) => {
                    self.state.advance();
                    return Ok(());
                }
                Some(BACKSLASH) => self.skip_escape()?,
                Some(_) => self.state.advance(),
                None => return Err(self.state.invalid_json("unterminated string")),
            }
        }
    }

    /// Moves past one escape sequence, the cursor being on its backslash.
    /// Errors point at the backslash.
    fn skip_escape(&mut self) -> Result<(), MaskingError> {
        let offset = self.state.position();
        self.state.advance();
        match self.state.peek()? {
            Some(b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't') => {
                self.state.advance();
                Ok(())
            }
            Some(b'u') => {
                self.state.advance();
                for _ in 0..4 {
                    match self.state.peek()? {
                        Some(byte) if ascii::is_hex_digit(byte) => self.state.advance(),
                        Some(_) => {
                            return Err(MaskingError::invalid_json("invalid unicode escape", offset));
                        }
                        None => return Err(self.state.invalid_json("unterminated string")),
                    }
                }
                Ok(())
            }
            Some(_) => Err(MaskingError::invalid_json("invalid escape sequence", offset)),
            None => Err(self.state.invalid_json("unterminated string")),
        }
    }

    fn skip_number(&mut self) -> Result<(), MaskingError> {
        self.state.advance();
        while let Some(byte) = self.state.peek()? {
            if !ascii::is_number_part(byte) {
                break;
            }
            self.state.advance();
        }
        Ok(())
    }

    fn skip_whitespace(&mut self) -> Result<(), MaskingError> {
        while let Some(byte) = self.state.peek()? {
            if !ascii::is_whitespace(byte) {
                break;
            }
            self.state.advance();
        }
        Ok(())
    }

    fn expect_byte(&mut self, inside: &str) -> Result<u8, MaskingError> {
        self.state
            .peek()?
            .ok_or_else(|| self.state.invalid_json(format!("unexpected end of input in {inside}")))
    }
}
