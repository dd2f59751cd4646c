//! Per-participant pseudo-number.
//!
//! The number is a pure function of the participant key and the draw range.
//! A participant "wins" only when it happens to equal the admin's random draw.

use crate::DrawRange;

/// Characters taken from the end of the participant key
pub const KEY_SUFFIX_LEN: usize = 6;

/// Parse the longest base-36 prefix of `text`.
///
/// Leading whitespace and one `+`/`-` sign are accepted, digits are read
/// case-insensitively up to the first character that is not a base-36 digit.
/// Returns `None` when no digit is found or the value overflows.
pub fn parse_base36_prefix(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    let mut value: i64 = 0;
    let mut seen = false;
    for digit in digits.chars().map_while(|c| c.to_digit(36)) {
        value = value.checked_mul(36)?.checked_add(i64::from(digit))?;
        seen = true;
    }

    if !seen {
        return None;
    }
    Some(if negative { -value } else { value })
}

/// Last [`KEY_SUFFIX_LEN`] characters of the key read as base 36, reduced
/// modulo the range width and offset by `min`.
///
/// The remainder keeps the sign of the parsed value, so a suffix starting
/// with `-` yields a number below `min` that can never match a draw.
pub fn pseudo_number(key: &str, range: &DrawRange) -> Option<i64> {
    let skip = key.chars().count().saturating_sub(KEY_SUFFIX_LEN);
    let suffix: String = key.chars().skip(skip).collect();

    let raw = parse_base36_prefix(&suffix)?;
    (raw % range.width()).checked_add(range.min())
}
