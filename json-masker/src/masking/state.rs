//! Cursor over the input shared by the scanner and the value maskers.
//!
//! [`MaskingState`] is the seam between the scanner and the two ways input is
//! held: [`BufferedState`] owns the whole document, while
//! [`super::streaming::StreamingState`] holds a bounded window over a reader.
//! The scanner only moves a cursor forward, registers the start of tokens it
//! may need to mask, and asks for more input when it runs off the end.

use crate::{error::MaskingError, value::ValueBuffer};

pub(crate) trait MaskingState: ValueBuffer {
    /// The bytes currently available.
    fn data(&self) -> &[u8];

    fn cursor(&self) -> usize;

    fn set_cursor(&mut self, cursor: usize);

    /// Makes more input available behind the cursor. Returns `false` once the
    /// input is exhausted. Bytes from the registered token onwards survive.
    fn refill(&mut self) -> Result<bool, MaskingError>;

    /// Marks the cursor as the start of a token that must stay addressable
    /// until [`MaskingState::clear_token`].
    fn register_token(&mut self);

    fn clear_token(&mut self);

    /// Absolute input offset of `index` in [`MaskingState::data`].
    fn absolute_offset(&self, index: usize) -> u64;

    /// The byte under the cursor, or `None` at the end of input.
    ///
    /// The cursor may have been moved past the available bytes by
    /// [`MaskingState::advance_by`]; running out of input in that case is an
    /// error rather than a clean end.
    fn peek(&mut self) -> Result<Option<u8>, MaskingError> {
        loop {
            if let Some(&byte) = self.data().get(self.cursor()) {
                return Ok(Some(byte));
            }
            if !self.refill()? {
                if self.cursor() > self.data().len() {
                    return Err(self.unexpected_end());
                }
                return Ok(None);
            }
        }
    }

    #[inline]
    fn advance(&mut self) {
        self.set_cursor(self.cursor() + 1);
    }

    /// Jumps over `count` bytes without looking at them.
    #[inline]
    fn advance_by(&mut self, count: usize) {
        self.set_cursor(self.cursor() + count);
    }

    /// Makes sure every byte before the cursor is available.
    fn ensure_buffered(&mut self) -> Result<(), MaskingError> {
        while self.cursor() > self.data().len() {
            if !self.refill()? {
                return Err(self.unexpected_end());
            }
        }
        Ok(())
    }

    fn position(&self) -> u64 {
        self.absolute_offset(self.cursor())
    }

    fn invalid_json(&self, message: impl Into<String>) -> MaskingError {
        MaskingError::invalid_json(message, self.position())
    }

    fn unexpected_end(&self) -> MaskingError {
        let end = self.absolute_offset(self.data().len());
        MaskingError::invalid_json("unexpected end of input", end)
    }
}

/// A replacement whose length differs from the bytes it replaces.
#[derive(Debug)]
struct ReplacementOperation {
    start: usize,
    length: usize,
    mask: Vec<u8>,
    repeat: usize,
}

/// The whole document in memory.
///
/// Replacements of the same length are written straight into the buffer.
/// Everything else is recorded and applied by [`BufferedState::finish`] in a
/// single copy.
pub(crate) struct BufferedState {
    buffer: Vec<u8>,
    cursor: usize,
    token_start: Option<usize>,
    replacements: Vec<ReplacementOperation>,
    delta: isize,
}

impl BufferedState {
    pub(crate) fn new(buffer: Vec<u8>) -> Self {
        Self {
            buffer,
            cursor: 0,
            token_start: None,
            replacements: Vec::new(),
            delta: 0,
        }
    }

    /// Applies the recorded replacements and returns the masked document.
    pub(crate) fn finish(self) -> Vec<u8> {
        if self.replacements.is_empty() {
            return self.buffer;
        }
        let capacity = self.buffer.len().saturating_add_signed(self.delta);
        let mut output = Vec::with_capacity(capacity);
        let mut copied = 0;
        for operation in &self.replacements {
            output.extend_from_slice(&self.buffer[copied..operation.start]);
            for _ in 0..operation.repeat {
                output.extend_from_slice(&operation.mask);
            }
            copied = operation.start + operation.length;
        }
        output.extend_from_slice(&self.buffer[copied..]);
        output
    }
}

impl ValueBuffer for BufferedState {
    fn value(&self) -> &[u8] {
        let start = self.token_start.unwrap_or(self.cursor);
        &self.buffer[start..self.cursor]
    }

    fn value_offset(&self) -> u64 {
        self.token_start.unwrap_or(self.cursor) as u64
    }

    fn replace_value_range(
        &mut self,
        offset: usize,
        length: usize,
        mask: &[u8],
        repeat: usize,
    ) -> Result<(), MaskingError> {
        let start = self.token_start.unwrap_or(self.cursor) + offset;
        let replacement_len = mask.len() * repeat;
        if replacement_len == length {
            if !mask.is_empty() {
                for chunk in self.buffer[start..start + length].chunks_exact_mut(mask.len()) {
                    chunk.copy_from_slice(mask);
                }
            }
            return Ok(());
        }
        self.delta += replacement_len as isize - length as isize;
        self.replacements.push(ReplacementOperation {
            start,
            length,
            mask: mask.to_vec(),
            repeat,
        });
        Ok(())
    }
}

impl MaskingState for BufferedState {
    #[inline]
    fn data(&self) -> &[u8] {
        &self.buffer
    }

    #[inline]
    fn cursor(&self) -> usize {
        self.cursor
    }

    #[inline]
    fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor;
    }

    fn refill(&mut self) -> Result<bool, MaskingError> {
        Ok(false)
    }

    fn register_token(&mut self) {
        self.token_start = Some(self.cursor);
    }

    fn clear_token(&mut self) {
        self.token_start = None;
    }

    fn absolute_offset(&self, index: usize) -> u64 {
        index as u64
    }
}
