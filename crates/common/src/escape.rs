//! Decimal escape sequences in string literals.
//!
//! A backslash followed by exactly three decimal digits (`\032`, `\092`)
//! denotes the Unicode code point with that decimal value. Decoding happens
//! once, when a literal enters the runtime; materialized strings are never
//! decoded again.

use thiserror::Error;

/// A malformed `\DDD` sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EscapeError {
    /// Backslash with fewer than three characters after it.
    #[error("truncated escape sequence at character {position}")]
    Truncated { position: usize },

    /// Backslash followed by something other than three decimal digits.
    #[error("invalid escape sequence '\\{sequence}' at character {position}")]
    InvalidDigits { position: usize, sequence: String },
}

/// Replace every `\DDD` sequence with the character it denotes.
pub fn decode_escapes(text: &str) -> Result<String, EscapeError> {
    if !text.contains('\\') {
        return Ok(text.to_string());
    }

    let mut decoded = String::with_capacity(text.len());
    let mut chars = text.chars().enumerate();

    while let Some((position, c)) = chars.next() {
        if c != '\\' {
            decoded.push(c);
            continue;
        }

        let sequence: String = chars.by_ref().take(3).map(|(_, c)| c).collect();
        if sequence.chars().count() < 3 {
            return Err(EscapeError::Truncated { position });
        }
        if !sequence.chars().all(|c| c.is_ascii_digit()) {
            return Err(EscapeError::InvalidDigits { position, sequence });
        }

        // Three decimal digits never exceed 999, always a scalar value.
        let code: u32 = sequence
            .parse()
            .map_err(|_| EscapeError::InvalidDigits {
                position,
                sequence: sequence.clone(),
            })?;
        let ch = char::from_u32(code).ok_or(EscapeError::InvalidDigits {
            position,
            sequence: sequence.clone(),
        })?;
        decoded.push(ch);
    }

    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_untouched() {
        assert_eq!(decode_escapes("hello").unwrap(), "hello");
        assert_eq!(decode_escapes("").unwrap(), "");
    }

    #[test]
    fn decodes_space_and_backslash() {
        assert_eq!(decode_escapes("a\\032b").unwrap(), "a b");
        assert_eq!(decode_escapes("\\092").unwrap(), "\\");
        assert_eq!(decode_escapes("x\\010").unwrap(), "x\n");
    }

    #[test]
    fn decodes_nul() {
        assert_eq!(decode_escapes("\\000").unwrap(), "\0");
    }

    #[test]
    fn decodes_once_only() {
        // \092 yields a backslash, which must not start a new sequence.
        assert_eq!(decode_escapes("\\092035").unwrap(), "\\035");
    }

    #[test]
    fn non_ascii_passes_through() {
        assert_eq!(decode_escapes("žluťoučký\\033").unwrap(), "žluťoučký!");
    }

    #[test]
    fn truncated_sequence() {
        assert_eq!(
            decode_escapes("ab\\03"),
            Err(EscapeError::Truncated { position: 2 })
        );
    }

    #[test]
    fn non_digit_sequence() {
        assert_eq!(
            decode_escapes("\\x41"),
            Err(EscapeError::InvalidDigits {
                position: 0,
                sequence: "x41".to_string()
            })
        );
    }
}
