//! Text rendering.

use crate::decimal::Decimal;
use std::fmt;

/// Digit budget used by `Display`.
const DISPLAY_MAX_DIGITS: u32 = 40;

impl Decimal {
    /// Render every mantissa digit, in plain notation when that needs at most
    /// `max_digits` digits, in scientific notation (`1.25e-40`) otherwise.
    pub fn to_string_with(&self, max_digits: u32) -> String {
        if self.is_zero() {
            return "0".to_string();
        }
        let digits = self.mantissa().magnitude().to_str_radix(10);
        let count = i64::try_from(digits.len()).unwrap_or(i64::MAX);
        let exponent = self.exponent();
        let budget = i64::from(max_digits.max(1));

        let mut out = String::with_capacity(digits.len() + 8);
        if self.is_negative() {
            out.push('-');
        }

        if exponent >= 0 {
            if count.saturating_add(exponent) <= budget {
                out.push_str(&digits);
                out.extend(std::iter::repeat('0').take(exponent.unsigned_abs() as usize));
                return out;
            }
        } else {
            let whole = count + exponent;
            if whole > 0 {
                if count <= budget {
                    let split = whole.unsigned_abs() as usize;
                    out.push_str(&digits[..split]);
                    out.push('.');
                    out.push_str(&digits[split..]);
                    return out;
                }
            } else if exponent.unsigned_abs() <= budget.unsigned_abs() {
                out.push_str("0.");
                out.extend(std::iter::repeat('0').take(whole.unsigned_abs() as usize));
                out.push_str(&digits);
                return out;
            }
        }

        let scientific = count - 1 + exponent;
        out.push_str(&digits[..1]);
        if digits.len() > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        out.push('e');
        out.push_str(&scientific.to_string());
        out
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with(DISPLAY_MAX_DIGITS))
    }
}
