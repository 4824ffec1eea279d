//! Hexadecimal floating-point literals.
//!
//! Floats cross every external boundary in C `%a` notation: READ input,
//! instruction literals and WRITE output. Formatting produces the shortest
//! exact `%a` spelling (`0x1.8p+1`, `0x1p-1`, `0x0p+0`); parsing accepts
//! that and the looser forms other tools emit (optional `0x`, padded
//! fractions, missing exponent, `inf`/`nan`), rounding half-to-even when the
//! literal carries more precision than a double.

const FRACTION_BITS: u32 = 52;
const FRACTION_MASK: u64 = (1 << FRACTION_BITS) - 1;
const EXPONENT_BIAS: i64 = 1023;
const MIN_NORMAL_EXPONENT: i64 = -1022;
const MAX_EXPONENT: i64 = 1023;

/// Hex digits kept exactly while parsing; the rest only feed the sticky bit.
const MAX_SIGNIFICANT_DIGITS: usize = 16;

/// Exponents beyond this saturate; they overflow or underflow either way.
const EXPONENT_CLAMP: i64 = 100_000;

/// Format a double exactly as C's `printf("%a", value)` does.
pub fn format_hex(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    let sign = if value.is_sign_negative() { "-" } else { "" };
    if value.is_infinite() {
        return format!("{sign}inf");
    }

    let bits = value.to_bits();
    let biased = ((bits >> FRACTION_BITS) & 0x7ff) as i64;
    let fraction = bits & FRACTION_MASK;

    let (lead, exponent) = match (biased, fraction) {
        (0, 0) => (0, 0),
        (0, _) => (0, MIN_NORMAL_EXPONENT),
        _ => (1, biased - EXPONENT_BIAS),
    };

    let mut digits = format!("{fraction:013x}");
    while digits.ends_with('0') {
        digits.pop();
    }
    let dot = if digits.is_empty() { "" } else { "." };

    format!("{sign}0x{lead}{dot}{digits}p{exponent:+}")
}

/// Parse a hexadecimal float literal.
///
/// Returns `None` if the text is not a hex float or its magnitude
/// overflows a double.
pub fn parse_hex(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let lower = unsigned.to_ascii_lowercase();
    let magnitude = match lower.as_str() {
        "inf" | "infinity" => f64::INFINITY,
        "nan" => f64::NAN,
        _ => parse_finite(&lower)?,
    };

    Some(if negative { -magnitude } else { magnitude })
}

fn parse_finite(text: &str) -> Option<f64> {
    let body = text.strip_prefix("0x").unwrap_or(text);
    let (digits, exponent) = match body.split_once('p') {
        Some((digits, exponent)) => (digits, parse_exponent(exponent)?),
        None => (body, 0),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }

    // value = mantissa * 2^scale (+ sticky fraction of one unit)
    let mut mantissa: u64 = 0;
    let mut significant = 0usize;
    let mut scale: i64 = 0;
    let mut sticky = false;

    for c in int_part.chars() {
        let digit = u64::from(c.to_digit(16)?);
        if significant < MAX_SIGNIFICANT_DIGITS {
            if mantissa != 0 || digit != 0 {
                mantissa = (mantissa << 4) | digit;
                significant += 1;
            }
        } else {
            scale += 4;
            sticky |= digit != 0;
        }
    }

    for c in frac_part.chars() {
        let digit = u64::from(c.to_digit(16)?);
        if significant < MAX_SIGNIFICANT_DIGITS {
            if mantissa != 0 || digit != 0 {
                mantissa = (mantissa << 4) | digit;
                significant += 1;
            }
            scale -= 4;
        } else {
            sticky |= digit != 0;
        }
    }

    if mantissa == 0 {
        return Some(0.0);
    }

    compose(mantissa, scale.saturating_add(exponent), sticky)
}

fn parse_exponent(text: &str) -> Option<i64> {
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    if digits.is_empty() {
        return None;
    }

    let mut value: i64 = 0;
    for c in digits.chars() {
        let digit = i64::from(c.to_digit(10)?);
        value = (value * 10 + digit).min(EXPONENT_CLAMP);
    }

    Some(if negative { -value } else { value })
}

/// Round `mantissa * 2^scale` to the nearest double.
fn compose(mantissa: u64, scale: i64, sticky: bool) -> Option<f64> {
    let width = 64 - i64::from(mantissa.leading_zeros());
    let top = scale + width - 1;
    if top > MAX_EXPONENT {
        return None;
    }

    let precision = if top >= MIN_NORMAL_EXPONENT {
        53
    } else {
        53 - (MIN_NORMAL_EXPONENT - top)
    };
    let shift = width - precision;
    let kept = if shift <= 0 {
        mantissa << (-shift)
    } else {
        round_shift(mantissa, shift, sticky)
    };

    if top < MIN_NORMAL_EXPONENT {
        // Subnormal: `kept` is already in units of 2^-1074. A carry into
        // bit 52 lands exactly on the smallest normal encoding.
        return Some(f64::from_bits(kept));
    }

    let (kept, top) = if kept == 1 << 53 {
        (kept >> 1, top + 1)
    } else {
        (kept, top)
    };
    if top > MAX_EXPONENT {
        return None;
    }

    let bits = (((top + EXPONENT_BIAS) as u64) << FRACTION_BITS) | (kept & FRACTION_MASK);
    Some(f64::from_bits(bits))
}

/// Drop `shift` low bits, rounding half to even.
fn round_shift(mantissa: u64, shift: i64, sticky: bool) -> u64 {
    if shift > 64 {
        return 0;
    }
    let wide = u128::from(mantissa);
    let kept = wide >> shift;
    let rest = wide & ((1u128 << shift) - 1);
    let half = 1u128 << (shift - 1);
    let round_up = rest > half || (rest == half && (sticky || kept & 1 == 1));
    (kept + u128::from(round_up)) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_matches_printf_a() {
        assert_eq!(format_hex(1.0), "0x1p+0");
        assert_eq!(format_hex(0.5), "0x1p-1");
        assert_eq!(format_hex(3.0), "0x1.8p+1");
        assert_eq!(format_hex(-2.5), "-0x1.4p+1");
        assert_eq!(format_hex(0.1), "0x1.999999999999ap-4");
        assert_eq!(format_hex(0.0), "0x0p+0");
        assert_eq!(format_hex(-0.0), "-0x0p+0");
        assert_eq!(format_hex(f64::MAX), "0x1.fffffffffffffp+1023");
    }

    #[test]
    fn format_subnormal() {
        assert_eq!(format_hex(f64::from_bits(1)), "0x0.0000000000001p-1022");
    }

    #[test]
    fn format_non_finite() {
        assert_eq!(format_hex(f64::INFINITY), "inf");
        assert_eq!(format_hex(f64::NEG_INFINITY), "-inf");
        assert_eq!(format_hex(f64::NAN), "nan");
    }

    #[test]
    fn parse_canonical_forms() {
        assert_eq!(parse_hex("0x1p+0"), Some(1.0));
        assert_eq!(parse_hex("0x1.8p+1"), Some(3.0));
        assert_eq!(parse_hex("-0x1.4p+1"), Some(-2.5));
        assert_eq!(parse_hex("0x1.999999999999ap-4"), Some(0.1));
    }

    #[test]
    fn parse_loose_forms() {
        assert_eq!(parse_hex("0x1.0000000000000p+0"), Some(1.0));
        assert_eq!(parse_hex("  0X1P3 "), Some(8.0));
        assert_eq!(parse_hex("1.8p1"), Some(3.0));
        assert_eq!(parse_hex("0x.8p1"), Some(1.0));
        assert_eq!(parse_hex("0xa"), Some(10.0));
        assert_eq!(parse_hex("+0x1p-1"), Some(0.5));
    }

    #[test]
    fn parse_signed_zero() {
        let z = parse_hex("-0x0p+0").unwrap();
        assert_eq!(z, 0.0);
        assert!(z.is_sign_negative());
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(parse_hex(""), None);
        assert_eq!(parse_hex("0x"), None);
        assert_eq!(parse_hex("0x1p"), None);
        assert_eq!(parse_hex("hello"), None);
        assert_eq!(parse_hex("0x1.2.3"), None);
        assert_eq!(parse_hex("0x1g"), None);
    }

    #[test]
    fn parse_overflow_is_rejected() {
        assert_eq!(parse_hex("0x1p+1024"), None);
        assert_eq!(parse_hex("0x1.fffffffffffffp+1023"), Some(f64::MAX));
    }

    #[test]
    fn parse_rounds_half_to_even() {
        // 1 + 2^-53 is a tie between 1.0 and the next double; even wins.
        assert_eq!(parse_hex("0x1.00000000000008p+0"), Some(1.0));
        // Anything past the tie rounds up.
        assert_eq!(
            parse_hex("0x1.000000000000080001p+0"),
            Some(f64::from_bits(1.0f64.to_bits() + 1))
        );
    }

    #[test]
    fn parse_underflow_to_subnormal_and_zero() {
        assert_eq!(parse_hex("0x1p-1074"), Some(f64::from_bits(1)));
        assert_eq!(parse_hex("0x1p-1076"), Some(0.0));
        assert_eq!(parse_hex("0x1p-100000000"), Some(0.0));
    }

    #[test]
    fn parse_non_finite() {
        assert_eq!(parse_hex("inf"), Some(f64::INFINITY));
        assert_eq!(parse_hex("-Infinity"), Some(f64::NEG_INFINITY));
        assert!(parse_hex("nan").is_some_and(f64::is_nan));
    }
}
