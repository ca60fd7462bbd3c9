//! Parsing decimal text in any base from 2 to 36.

use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::Zero;

use crate::decimal::{Decimal, MAX_EXPONENT};
use crate::rounding::RoundingMode;

/// Why a piece of text is not a number.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseDecimalError {
    /// Nothing but whitespace or a sign.
    Empty,
    InvalidDigit { found: char, radix: u32 },
    UnsupportedRadix(u32),
    ExponentOutOfRange,
}

impl fmt::Display for ParseDecimalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseDecimalError::Empty => f.write_str("no digits"),
            ParseDecimalError::InvalidDigit { found, radix } => {
                write!(f, "invalid digit {found:?} for base {radix}")
            }
            ParseDecimalError::UnsupportedRadix(radix) => {
                write!(f, "unsupported base {radix} (expected 2..=36)")
            }
            ParseDecimalError::ExponentOutOfRange => {
                write!(f, "exponent outside ±{MAX_EXPONENT}")
            }
        }
    }
}

impl std::error::Error for ParseDecimalError {}

/// Sign, integer digits, fraction digits and (base 10 only) exponent.
struct Parts<'a> {
    negative: bool,
    whole: &'a str,
    fraction: &'a str,
    exponent: i64,
}

fn split(text: &str, radix: u32) -> Result<Parts<'_>, ParseDecimalError> {
    if !(2..=36).contains(&radix) {
        return Err(ParseDecimalError::UnsupportedRadix(radix));
    }
    let text = text.trim();
    let (negative, body) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let (number, exponent) = match body.find(['e', 'E']) {
        Some(at) if radix == 10 => (&body[..at], parse_exponent(&body[at + 1..])?),
        _ => (body, 0),
    };
    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(ParseDecimalError::Empty);
    }
    if let Some(found) = whole
        .chars()
        .chain(fraction.chars())
        .find(|c| c.to_digit(radix).is_none())
    {
        return Err(ParseDecimalError::InvalidDigit { found, radix });
    }
    Ok(Parts {
        negative,
        whole,
        fraction,
        exponent,
    })
}

fn parse_exponent(text: &str) -> Result<i64, ParseDecimalError> {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    if digits.is_empty() {
        return Err(ParseDecimalError::Empty);
    }
    if let Some(found) = digits.chars().find(|c| !c.is_ascii_digit()) {
        return Err(ParseDecimalError::InvalidDigit { found, radix: 10 });
    }
    let value: i64 = text
        .parse()
        .map_err(|_| ParseDecimalError::ExponentOutOfRange)?;
    if value.abs() > MAX_EXPONENT {
        return Err(ParseDecimalError::ExponentOutOfRange);
    }
    Ok(value)
}

fn digits_to_int(digits: &str, radix: u32) -> BigInt {
    if digits.is_empty() {
        return BigInt::zero();
    }
    BigInt::parse_bytes(digits.as_bytes(), radix).unwrap_or_default()
}

impl Decimal {
    /// Parse base-10 text exactly, accepting `1.5`, `-.25`, `3e-7`.
    pub fn parse(text: &str) -> Result<Self, ParseDecimalError> {
        let parts = split(text, 10)?;
        let canonical = format!(
            "{}{}.{}e{}",
            if parts.negative { "-" } else { "" },
            if parts.whole.is_empty() { "0" } else { parts.whole },
            if parts.fraction.is_empty() { "0" } else { parts.fraction },
            parts.exponent,
        );
        let value = BigDecimal::from_str(&canonical).map_err(|_| ParseDecimalError::Empty)?;
        Decimal::from(value)
            .checked()
            .map_err(|_| ParseDecimalError::ExponentOutOfRange)
    }

    /// Parse text written in `radix` and round it to `precision` significant
    /// digits. Only base 10 accepts an exponent.
    pub fn parse_radix(
        text: &str,
        radix: u32,
        precision: u32,
        mode: RoundingMode,
    ) -> Result<Self, ParseDecimalError> {
        if radix == 10 {
            return Ok(Decimal::parse(text)?.round(precision, mode));
        }
        let parts = split(text, radix)?;
        let mut value = Decimal::from(digits_to_int(parts.whole, radix));
        if !parts.fraction.is_empty() {
            let numerator = Decimal::from(digits_to_int(parts.fraction, radix));
            let places = parts.fraction.len();
            let denominator = Decimal::from(num_traits::pow::pow(BigInt::from(radix), places));
            // Guard digits so the final rounding sees the true value.
            let guarded = precision.saturating_add(4);
            value = numerator
                .checked_div(&denominator, guarded, mode)
                .and_then(|fraction| value.add(&fraction, guarded, mode))
                .map_err(|_| ParseDecimalError::ExponentOutOfRange)?;
        }
        let value = value
            .round(precision, mode)
            .checked()
            .map_err(|_| ParseDecimalError::ExponentOutOfRange)?;
        Ok(if parts.negative { -value } else { value })
    }
}

impl FromStr for Decimal {
    type Err = ParseDecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::parse(s)
    }
}
