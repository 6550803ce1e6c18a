//! JSON string escape decoding and encoding.

use super::{
    DecodeError,
    ascii::{BACKSLASH, QUOTE, hex_value},
};

const HEX: &[u8; 16] = b"0123456789abcdef";

fn read_hex4(bytes: &[u8], at: usize) -> Result<u16, DecodeError> {
    let digits = bytes
        .get(at..at + 4)
        .ok_or(DecodeError::new("truncated unicode escape", at))?;
    digits.iter().try_fold(0_u16, |acc, &digit| {
        hex_value(digit)
            .map(|value| (acc << 4) | value)
            .ok_or(DecodeError::new("invalid hex digit in unicode escape", at))
    })
}

/// Decodes the escape sequence starting at `bytes[at]` (which must be a
/// backslash), returning the character and the number of bytes consumed.
///
/// `\uXXXX` high surrogates must be immediately followed by an escaped low
/// surrogate; the pair decodes to one supplementary character.
pub(crate) fn decode_escape(bytes: &[u8], at: usize) -> Result<(char, usize), DecodeError> {
    debug_assert_eq!(bytes.get(at), Some(&BACKSLASH));
    let Some(&kind) = bytes.get(at + 1) else {
        return Err(DecodeError::new("truncated escape sequence", at));
    };
    let simple = match kind {
        b'"' => '"',
        b'\\' => '\\',
        b'/' => '/',
        b'b' => '\u{8}',
        b'f' => '\u{c}',
        b'n' => '\n',
        b'r' => '\r',
        b't' => '\t',
        b'u' => return decode_unicode_escape(bytes, at),
        _ => return Err(DecodeError::new("invalid escape sequence", at)),
    };
    Ok((simple, 2))
}

fn decode_unicode_escape(bytes: &[u8], at: usize) -> Result<(char, usize), DecodeError> {
    let unit = read_hex4(bytes, at + 2)?;
    match unit {
        0xD800..=0xDBFF => {
            if bytes.get(at + 6) != Some(&BACKSLASH) || bytes.get(at + 7) != Some(&b'u') {
                return Err(DecodeError::new("unpaired high surrogate", at));
            }
            let low = read_hex4(bytes, at + 8)?;
            if !(0xDC00..=0xDFFF).contains(&low) {
                return Err(DecodeError::new("invalid low surrogate", at + 6));
            }
            let code_point =
                0x10000 + ((u32::from(unit) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
            char::from_u32(code_point)
                .map(|ch| (ch, 12))
                .ok_or(DecodeError::new("invalid surrogate pair", at))
        }
        0xDC00..=0xDFFF => Err(DecodeError::new("unpaired low surrogate", at)),
        _ => char::from_u32(u32::from(unit))
            .map(|ch| (ch, 6))
            .ok_or(DecodeError::new("invalid unicode escape", at)),
    }
}

fn push_raw(out: &mut String, raw: &[u8], offset: usize) -> Result<(), DecodeError> {
    let text = std::str::from_utf8(raw)
        .map_err(|err| DecodeError::new("invalid UTF-8", offset + err.valid_up_to()))?;
    out.push_str(text);
    Ok(())
}

/// Decodes the body of a JSON string (without the surrounding quotes).
pub(crate) fn decode_json_string(body: &[u8]) -> Result<String, DecodeError> {
    let mut out = String::with_capacity(body.len());
    let mut run_start = 0;
    let mut i = 0;
    while i < body.len() {
        if body[i] == BACKSLASH {
            push_raw(&mut out, &body[run_start..i], run_start)?;
            let (ch, consumed) = decode_escape(body, i)?;
            out.push(ch);
            i += consumed;
            run_start = i;
        } else {
            i += 1;
        }
    }
    push_raw(&mut out, &body[run_start..], run_start)?;
    Ok(out)
}

/// Appends `text` to `out` as a quoted JSON string.
pub(crate) fn encode_json_string(text: &str, out: &mut Vec<u8>) {
    out.reserve(text.len() + 2);
    out.push(QUOTE);
    for ch in text.chars() {
        match ch {
            '"' => out.extend_from_slice(br#"\""#),
            '\\' => out.extend_from_slice(br"\\"),
            '\u{8}' => out.extend_from_slice(br"\b"),
            '\u{c}' => out.extend_from_slice(br"\f"),
            '\n' => out.extend_from_slice(br"\n"),
            '\r' => out.extend_from_slice(br"\r"),
            '\t' => out.extend_from_slice(br"\t"),
            control if u32::from(control) < 0x20 => {
                let code = u32::from(control) as usize;
                out.extend_from_slice(br"\u00");
                out.push(HEX[code >> 4]);
                out.push(HEX[code & 0xF]);
            }
            other => {
                let mut buf = [0_u8; 4];
                out.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
    out.push(QUOTE);
}
