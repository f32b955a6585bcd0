//! Line framing and validation
//!
//! A frame is one LF-terminated line of semicolon-separated integers. The
//! logger firmware terminates lines with `\n\r`, so a stray carriage return
//! can show up either at the end of a line or at the start of the next one.

use super::RejectionReason;
use crate::record::{Record, FIELD_DELIMITER, SCHEMA_LEN};

/// Strip one trailing `\n` and then one trailing `\r`
fn strip_terminator(raw: &[u8]) -> &[u8] {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    raw.strip_suffix(b"\r").unwrap_or(raw)
}

/// Split a line on the delimiter, dropping the empty tokens left by
/// consecutive or trailing delimiters
pub fn split_fields(text: &str) -> Vec<&str> {
    text.split(FIELD_DELIMITER).filter(|t| !t.is_empty()).collect()
}

/// Decode one raw wire line into a [`Record`]
///
/// The whole line is rejected if the field count differs from the schema or
/// if any field is not an integer; no partial record is ever produced.
pub fn parse_line(raw: &[u8]) -> Result<Record, RejectionReason> {
    let text = String::from_utf8_lossy(strip_terminator(raw));
    let tokens = split_fields(&text);

    if tokens.len() != SCHEMA_LEN {
        return Err(RejectionReason::WrongFieldCount {
            expected: SCHEMA_LEN,
            actual: tokens.len(),
        });
    }

    let mut values = [0i64; SCHEMA_LEN];
    for (index, (slot, token)) in values.iter_mut().zip(&tokens).enumerate() {
        // Surrounding whitespace covers the carriage return carried over
        // from the previous `\n\r` terminator.
        *slot = token
            .trim()
            .parse::<i64>()
            .map_err(|_| RejectionReason::NonIntegerField {
                index,
                token: (*token).to_string(),
            })?;
    }

    Ok(Record::from_values(values))
}

/// True if the line holds nothing but its terminator and whitespace
pub(crate) fn is_blank(raw: &[u8]) -> bool {
    strip_terminator(raw).iter().all(|b| b.is_ascii_whitespace())
}
