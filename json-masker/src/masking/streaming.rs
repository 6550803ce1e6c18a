//! Bounded-memory masking state over a reader and a writer.

use std::io::{self, Read, Write};

use super::state::MaskingState;
use crate::{config::MAX_BUFFER_SIZE, error::MaskingError, value::ValueBuffer};

/// A window over the input.
///
/// Bytes before `last_flushed` have been written to the sink (masked where
/// needed). A refill writes everything up to the registered token, or the
/// whole window when no token is open, and reuses the buffer. A token that
/// takes a quarter of the window or more doubles it, up to
/// [`MAX_BUFFER_SIZE`].
pub(crate) struct StreamingState<R, W> {
    reader: R,
    writer: W,
    buffer: Vec<u8>,
    filled: usize,
    cursor: usize,
    token_start: Option<usize>,
    last_flushed: usize,
    /// Absolute offset of `buffer[0]`.
    buffer_offset: u64,
    exhausted: bool,
}

impl<R: Read, W: Write> StreamingState<R, W> {
    pub(crate) fn new(reader: R, writer: W, buffer_size: usize) -> Self {
        Self {
            reader,
            writer,
            buffer: vec![0; buffer_size],
            filled: 0,
            cursor: 0,
            token_start: None,
            last_flushed: 0,
            buffer_offset: 0,
            exhausted: false,
        }
    }

    /// Writes the unflushed tail and flushes the sink.
    pub(crate) fn finish(mut self) -> Result<(), MaskingError> {
        self.flush_until(self.filled)?;
        self.writer.flush()?;
        Ok(())
    }

    fn flush_until(&mut self, end: usize) -> Result<(), MaskingError> {
        if end > self.last_flushed {
            self.writer.write_all(&self.buffer[self.last_flushed..end])?;
            self.last_flushed = end;
        }
        Ok(())
    }

    /// Moves the open token to the front of the buffer, growing it when the
    /// token is large.
    fn shift_token(&mut self, start: usize) -> Result<(), MaskingError> {
        let token_len = self.filled - start;
        let size = self.buffer.len();
        if token_len >= size / 4 && size < MAX_BUFFER_SIZE {
            let grown = (size * 2).min(MAX_BUFFER_SIZE);
            #[cfg(feature = "tracing")]
            ::tracing::debug!(
                from = size,
                to = grown,
                token_len,
                "growing streaming buffer for a large token"
            );
            self.buffer.resize(grown, 0);
        } else if token_len == size {
            return Err(MaskingError::invalid_json(
                format!("single JSON token exceeds the maximum buffer size of {MAX_BUFFER_SIZE} bytes"),
                self.buffer_offset + start as u64,
            ));
        }
        self.buffer.copy_within(start..self.filled, 0);
        self.buffer_offset += start as u64;
        self.cursor -= start;
        self.filled = token_len;
        self.last_flushed = 0;
        self.token_start = Some(0);
        Ok(())
    }

    fn read_more(&mut self) -> Result<bool, MaskingError> {
        loop {
            match self.reader.read(&mut self.buffer[self.filled..]) {
                Ok(0) => {
                    self.exhausted = true;
                    return Ok(false);
                }
                Ok(read) => {
                    self.filled += read;
                    return Ok(true);
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err.into()),
            }
        }
    }
}

impl<R: Read, W: Write> ValueBuffer for StreamingState<R, W> {
    fn value(&self) -> &[u8] {
        let start = self.token_start.unwrap_or(self.cursor);
        &self.buffer[start..self.cursor]
    }

    fn value_offset(&self) -> u64 {
        self.buffer_offset + self.token_start.unwrap_or(self.cursor) as u64
    }

    fn replace_value_range(
        &mut self,
        offset: usize,
        length: usize,
        mask: &[u8],
        repeat: usize,
    ) -> Result<(), MaskingError> {
        let start = self.token_start.unwrap_or(self.cursor) + offset;
        self.flush_until(start)?;
        for _ in 0..repeat {
            self.writer.write_all(mask)?;
        }
        self.last_flushed = start + length;
        Ok(())
    }
}

impl<R: Read, W: Write> MaskingState for StreamingState<R, W> {
    #[inline]
    fn data(&self) -> &[u8] {
        &self.buffer[..self.filled]
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
        if self.exhausted {
            return Ok(false);
        }
        match self.token_start {
            Some(start) => {
                self.flush_until(start)?;
                self.shift_token(start)?;
            }
            None => {
                self.flush_until(self.filled)?;
                self.buffer_offset += self.filled as u64;
                self.cursor -= self.filled;
                self.filled = 0;
                self.last_flushed = 0;
            }
        }
        self.read_more()
    }

    fn register_token(&mut self) {
        self.token_start = Some(self.cursor);
    }

    fn clear_token(&mut self) {
        self.token_start = None;
    }

    fn absolute_offset(&self, index: usize) -> u64 {
        self.buffer_offset + index as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hands out at most `chunk` bytes per read.
    struct Trickle<'a> {
        data: &'a [u8],
        chunk: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let len = self.chunk.min(buf.len()).min(self.data.len());
            buf[..len].copy_from_slice(&self.data[..len]);
            self.data = &self.data[len..];
            Ok(len)
        }
    }

    fn drain<R: Read>(state: &mut StreamingState<R, &mut Vec<u8>>) {
        while state.peek().unwrap().is_some() {
            state.advance();
        }
    }

    #[test]
    fn copies_input_through_small_windows() {
        let mut output = Vec::new();
        let mut state = StreamingState::new(&b"0123456789abcdef"[..], &mut output, 5);
        drain(&mut state);
        assert_eq!(state.position(), 16);
        state.finish().unwrap();
        assert_eq!(output, b"0123456789abcdef");
    }

    #[test]
    fn tokens_survive_refills_and_grow_the_buffer() {
        let input = br#"["abcdefghijkl"]"#;
        let reader = Trickle { data: input, chunk: 3 };
        let mut output = Vec::new();
        let mut state = StreamingState::new(reader, &mut output, 5);
        assert_eq!(state.peek().unwrap(), Some(b'['));
        state.advance();
        state.register_token();
        state.advance();
        while state.peek().unwrap() != Some(b'"') {
            state.advance();
        }
        state.advance();
        assert_eq!(state.value(), br#""abcdefghijkl""#);
        assert_eq!(state.value_offset(), 1);
        assert!(state.buffer.len() >= 14);
        state.replace_value_range(1, 12, b"*", 3).unwrap();
        state.clear_token();
        drain(&mut state);
        state.finish().unwrap();
        assert_eq!(output, br#"["***"]"#);
    }

    #[test]
    fn jumps_across_refills() {
        let reader = Trickle { data: b"[true]", chunk: 2 };
        let mut output = Vec::new();
        let mut state = StreamingState::new(reader, &mut output, 5);
        state.advance();
        state.advance_by(4);
        assert_eq!(state.peek().unwrap(), Some(b']'));
        assert_eq!(state.position(), 5);
        drain(&mut state);
        state.finish().unwrap();
        assert_eq!(output, b"[true]");
    }

    #[test]
    fn read_errors_are_io_errors() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::other("disk on fire"))
            }
        }
        let mut output = Vec::new();
        let mut state = StreamingState::new(Broken, &mut output, 8);
        assert!(matches!(state.peek(), Err(MaskingError::Io(_))));
    }
}
