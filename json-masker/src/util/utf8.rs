//! UTF-8 helpers.

use super::{DecodeError, ascii::BACKSLASH, escape::decode_escape};

/// Number of bytes in the code point introduced by `lead`.
///
/// Continuation bytes report `Some(0)`; bytes that can never appear in UTF-8
/// report `None`.
#[inline]
pub(crate) fn code_point_byte_length(lead: u8) -> Option<usize> {
    match lead {
        0x00..=0x7F => Some(1),
        0x80..=0xBF => Some(0),
        0xC0..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF7 => Some(4),
        _ => None,
    }
}

/// Counts the bytes of a raw JSON string body that do not correspond to a
/// visible character.
///
/// Multi-byte code points contribute their continuation bytes and escape
/// sequences contribute everything but one byte, so
/// `bytes.len() - count_non_visible_bytes(bytes)` is the number of characters
/// a reader sees. An escaped surrogate pair counts as a single character.
pub(crate) fn count_non_visible_bytes(bytes: &[u8]) -> Result<usize, DecodeError> {
    let mut non_visible = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == BACKSLASH {
            let (_, consumed) = decode_escape(bytes, i)?;
            non_visible += consumed - 1;
            i += consumed;
            continue;
        }
        let len = match code_point_byte_length(bytes[i]) {
            Some(0) => return Err(DecodeError::new("unexpected UTF-8 continuation byte", i)),
            Some(len) => len,
            None => return Err(DecodeError::new("invalid UTF-8 byte", i)),
        };
        if i + len > bytes.len() {
            return Err(DecodeError::new("truncated UTF-8 sequence", i));
        }
        non_visible += len - 1;
        i += len;
    }
    Ok(non_visible)
}
