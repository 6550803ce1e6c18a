//! Constant byte classification tables used by the scanner hot loop.

const fn table(members: &[u8]) -> [bool; 256] {
    let mut table = [false; 256];
    let mut i = 0;
    while i < members.len() {
        table[members[i] as usize] = true;
        i += 1;
    }
    table
}

static WHITESPACE: [bool; 256] = table(b" \t\r\n");
static NUMBER_START: [bool; 256] = table(b"-0123456789");
static NUMBER_PART: [bool; 256] = table(b"-+.eE0123456789");
static HEX_DIGIT: [bool; 256] = table(b"0123456789abcdefABCDEF");

pub(crate) const QUOTE: u8 = b'"';
pub(crate) const BACKSLASH: u8 = b'\\';
pub(crate) const COLON: u8 = b':';
pub(crate) const COMMA: u8 = b',';
pub(crate) const CURLY_OPEN: u8 = b'{';
pub(crate) const CURLY_CLOSE: u8 = b'}';
pub(crate) const SQUARE_OPEN: u8 = b'[';
pub(crate) const SQUARE_CLOSE: u8 = b']';

#[inline]
pub(crate) fn is_whitespace(byte: u8) -> bool {
    WHITESPACE[byte as usize]
}

#[inline]
pub(crate) fn is_number_start(byte: u8) -> bool {
    NUMBER_START[byte as usize]
}

/// Any byte that may continue a JSON number once it has started.
#[inline]
pub(crate) fn is_number_part(byte: u8) -> bool {
    NUMBER_PART[byte as usize]
}

#[inline]
pub(crate) fn is_hex_digit(byte: u8) -> bool {
    HEX_DIGIT[byte as usize]
}

#[inline]
pub(crate) fn hex_value(byte: u8) -> Option<u16> {
    match byte {
        b'0'..=b'9' => Some(u16::from(byte - b'0')),
        b'a'..=b'f' => Some(u16::from(byte - b'a' + 10)),
        b'A'..=b'F' => Some(u16::from(byte - b'A' + 10)),
        _ => None,
    }
}
