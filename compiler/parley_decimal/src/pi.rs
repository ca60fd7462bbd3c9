//! The circle constant at any precision.

use crate::decimal::{pow10, Decimal};
use crate::rounding::RoundingMode;
use num_bigint::BigInt;
use num_traits::Zero;

/// Extra digits carried through the series to absorb truncation error.
const GUARD_DIGITS: u64 = 10;

impl Decimal {
    /// π rounded half-even to `precision` significant digits.
    ///
    /// Machin's formula, `π = 16·atan(1/5) − 4·atan(1/239)`, evaluated in
    /// fixed point.
    pub fn pi(precision: u32) -> Decimal {
        let scale = u64::from(precision.max(1)) + GUARD_DIGITS;
        let unity = pow10(scale);
        let pi = (arctan_inverse(5, &unity) * 4u32 - arctan_inverse(239, &unity)) * 4u32;
        let exponent = -i64::try_from(scale).unwrap_or(i64::MAX);
        Decimal::new(pi, exponent).round(precision, RoundingMode::HalfEven)
    }
}

/// `atan(1/x) * unity`, truncated.
fn arctan_inverse(x: u32, unity: &BigInt) -> BigInt {
    let x_squared = BigInt::from(x) * x;
    let mut power = unity / x;
    let mut sum = power.clone();
    let mut divisor = 1u64;
    let mut subtract = true;
    loop {
        power /= &x_squared;
        if power.is_zero() {
            return sum;
        }
        divisor += 2;
        let term = &power / divisor;
        if subtract {
            sum -= term;
        } else {
            sum += term;
        }
        subtract = !subtract;
    }
}
