//! Numeric literal validation and conversion.
//!
//! The lexer only checks the shape of a number and keeps its raw text; the
//! builder converts the text into a value while keeping the radix so that
//! `010` can be written back as `010`.

use std::fmt;

use super::errors::ErrorCode;

/// Radix of an integer literal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Radix {
    Octal = 8,
    Decimal = 10,
    Hex = 16,
}

impl Radix {
    pub fn value(self) -> u32 {
        self as u32
    }
}

/// A converted numeric literal
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer { value: i64, radix: Radix },
    Float(f64),
}

impl Number {
    /// Render the number in the radix it was written in
    pub fn to_source(&self) -> String {
        match self {
            Number::Integer { value, radix } => format_integer(*value, *radix),
            Number::Float(value) => format_float(*value),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_source())
    }
}

/// `0%o` for octal, `0x%X` for hex, plain decimal otherwise
pub fn format_integer(value: i64, radix: Radix) -> String {
    let sign = if value < 0 { "-" } else { "" };
    let magnitude = value.unsigned_abs();
    match radix {
        Radix::Decimal => value.to_string(),
        Radix::Octal => format!("{sign}0{magnitude:o}"),
        Radix::Hex => format!("{sign}0x{magnitude:X}"),
    }
}

/// Floats always carry a fraction or an exponent
pub fn format_float(value: f64) -> String {
    format!("{value:?}")
}

/// Check the shape of a scanned number and report which rule it breaks
pub fn validate_number(text: &str) -> Result<(), ErrorCode> {
    let bytes = text.as_bytes();
    if text.starts_with("0x") || text.starts_with("0X") {
        let digits = &text[2..];
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            Ok(())
        } else {
            Err(ErrorCode::E0104)
        }
    } else if bytes.len() > 1 && bytes[0] == b'0' && bytes[1] != b'.' {
        if bytes[1..].iter().all(|b| (b'0'..=b'7').contains(b)) {
            Ok(())
        } else {
            Err(ErrorCode::E0105)
        }
    } else if starts_like_decimal(bytes) {
        if is_decimal_float(bytes) {
            Ok(())
        } else {
            Err(ErrorCode::E0106)
        }
    } else if !bytes.is_empty() && bytes.iter().all(u8::is_ascii_digit) {
        Ok(())
    } else {
        Err(ErrorCode::E0103)
    }
}

/// `\d+[eE.]`
fn starts_like_decimal(bytes: &[u8]) -> bool {
    let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
    digits > 0 && matches!(bytes.get(digits), Some(b'e' | b'E' | b'.'))
}

/// `\d+(\.\d+)?([eE]-?\d+)?`
fn is_decimal_float(bytes: &[u8]) -> bool {
    let mut i = 0;
    let digits = |from: usize| bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count();
    let n = digits(i);
    if n == 0 {
        return false;
    }
    i += n;
    if bytes.get(i) == Some(&b'.') {
        let n = digits(i + 1);
        if n == 0 {
            return false;
        }
        i += 1 + n;
    }
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        i += 1;
        if bytes.get(i) == Some(&b'-') {
            i += 1;
        }
        let n = digits(i);
        if n == 0 {
            return false;
        }
        i += n;
    }
    i == bytes.len()
}

/// Convert validated number text into a value, keeping the radix of integers
pub fn parse_number(text: &str) -> Result<Number, ErrorCode> {
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (-1_i64, rest),
        None => (1_i64, text),
    };
    validate_number(unsigned)?;
    let bytes = unsigned.as_bytes();
    let (digits, radix) = if unsigned.starts_with("0x") || unsigned.starts_with("0X") {
        (&unsigned[2..], Radix::Hex)
    } else if bytes.len() > 1 && bytes[0] == b'0' && bytes[1] != b'.' {
        (&unsigned[1..], Radix::Octal)
    } else if starts_like_decimal(bytes) {
        return unsigned
            .parse::<f64>()
            .map(|v| Number::Float(if sign < 0 { -v } else { v }))
            .map_err(|_| ErrorCode::E0106);
    } else {
        (unsigned, Radix::Decimal)
    };
    i64::from_str_radix(digits, radix.value())
        .map(|value| Number::Integer {
            value: value * sign,
            radix,
        })
        .map_err(|_| ErrorCode::E0103)
}
