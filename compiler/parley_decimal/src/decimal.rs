//! The decimal value type.
//!
//! [`Decimal`] wraps a normalized [`BigDecimal`]. Arithmetic always takes a
//! target precision: operands whose magnitudes are far apart never have
//! their digits aligned, so the cost of an operation is bounded by the
//! digits it keeps rather than by the distance between exponents.

use std::cmp::Ordering;
use std::fmt;
use std::ops::Neg;

use bigdecimal::BigDecimal;
use num_bigint::{BigInt, Sign};
use num_traits::{Signed, ToPrimitive, Zero};

use crate::rounding::RoundingMode;

/// Largest power of ten (of the leading digit) a checked result may carry.
pub const MAX_EXPONENT: i64 = 1_000_000;

/// Why an arithmetic operation produced no value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArithmeticError {
    DivisionByZero,
    /// The result's magnitude is outside `10^±MAX_EXPONENT`.
    Overflow,
}

impl fmt::Display for ArithmeticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArithmeticError::DivisionByZero => f.write_str("division by zero"),
            ArithmeticError::Overflow => write!(f, "magnitude beyond 10^{MAX_EXPONENT}"),
        }
    }
}

impl std::error::Error for ArithmeticError {}

/// `10^n` as a big integer.
pub(crate) fn pow10(n: u64) -> BigInt {
    let n = usize::try_from(n).unwrap_or(usize::MAX);
    num_traits::pow::pow(BigInt::from(10u8), n)
}

/// An arbitrary-precision decimal, `mantissa * 10^exponent`.
///
/// Values are kept without trailing zeros in the mantissa.
#[derive(Clone, Debug, Default)]
pub struct Decimal(BigDecimal);

impl Decimal {
    /// `mantissa * 10^exponent`.
    pub fn new(mantissa: BigInt, exponent: i64) -> Self {
        Decimal(BigDecimal::new(mantissa, exponent.saturating_neg()).normalized())
    }

    pub fn zero() -> Self {
        Decimal(BigDecimal::zero())
    }

    #[inline]
    pub fn as_big_decimal(&self) -> &BigDecimal {
        &self.0
    }

    pub fn mantissa(&self) -> BigInt {
        self.0.as_bigint_and_exponent().0
    }

    /// Power of ten of the last mantissa digit.
    pub fn exponent(&self) -> i64 {
        self.0.as_bigint_and_exponent().1.saturating_neg()
    }

    /// Power of ten of the leading digit. Zero reports zero.
    pub fn adjusted_exponent(&self) -> i64 {
        if self.is_zero() {
            return 0;
        }
        let digits = i64::try_from(self.digits()).unwrap_or(i64::MAX);
        self.exponent().saturating_add(digits - 1)
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0.sign() == Sign::Minus
    }

    /// -1, 0 or 1.
    pub fn signum(&self) -> i32 {
        match self.0.sign() {
            Sign::Minus => -1,
            Sign::NoSign => 0,
            Sign::Plus => 1,
        }
    }

    #[must_use]
    pub fn abs(&self) -> Self {
        Decimal(self.0.abs())
    }

    /// Number of significant digits in the mantissa (zero has one).
    pub fn digits(&self) -> u64 {
        self.0.digits()
    }

    /// Round to at most `precision` significant digits.
    ///
    /// A precision of zero is treated as one.
    #[must_use]
    pub fn round(&self, precision: u32, mode: RoundingMode) -> Self {
        let precision = u64::from(precision.max(1));
        let digits = self.digits();
        if digits <= precision {
            return self.clone();
        }
        let dropped = i64::try_from(digits - precision).unwrap_or(i64::MAX);
        let scale = self.0.as_bigint_and_exponent().1;
        Decimal(
            self.0
                .with_scale_round(scale.saturating_sub(dropped), mode.into())
                .normalized(),
        )
    }

    /// The truncated integer value, if it fits in an `i64`.
    pub fn to_i64(&self) -> Option<i64> {
        match self.adjusted_exponent() {
            _ if self.is_zero() => Some(0),
            e if e < 0 => Some(0),
            e if e > 18 => None,
            _ => self
                .0
                .with_scale_round(0, bigdecimal::RoundingMode::Down)
                .to_i64(),
        }
    }

    /// Fail with `Overflow` when the magnitude left the supported range.
    pub fn checked(self) -> Result<Self, ArithmeticError> {
        if !self.is_zero() && self.adjusted_exponent().abs() > MAX_EXPONENT {
            return Err(ArithmeticError::Overflow);
        }
        Ok(self)
    }

    /// Sum rounded to `precision` significant digits.
    pub fn add(
        &self,
        rhs: &Decimal,
        precision: u32,
        mode: RoundingMode,
    ) -> Result<Self, ArithmeticError> {
        if rhs.is_zero() {
            return self.round(precision, mode).checked();
        }
        if self.is_zero() {
            return rhs.round(precision, mode).checked();
        }
        let (big, small) = if self.adjusted_exponent() >= rhs.adjusted_exponent() {
            (self, rhs)
        } else {
            (rhs, self)
        };
        // Digits of `small` below `reach` cannot change the rounded sum; only
        // their sign and being non-zero matter, so a single digit stands in.
        let reach = big
            .exponent()
            .min(big.adjusted_exponent() - i64::from(precision.max(1)) - 1)
            - 2;
        if small.adjusted_exponent() < reach {
            let unit = if small.is_negative() { -1 } else { 1 };
            let sticky = Decimal::new(BigInt::from(unit), reach - 1);
            return Decimal(&big.0 + &sticky.0)
                .normalized()
                .round(precision, mode)
                .checked();
        }
        Decimal(&self.0 + &rhs.0)
            .normalized()
            .round(precision, mode)
            .checked()
    }

    pub fn sub(
        &self,
        rhs: &Decimal,
        precision: u32,
        mode: RoundingMode,
    ) -> Result<Self, ArithmeticError> {
        self.add(&-rhs, precision, mode)
    }

    /// Product rounded to `precision` significant digits.
    pub fn mul(
        &self,
        rhs: &Decimal,
        precision: u32,
        mode: RoundingMode,
    ) -> Result<Self, ArithmeticError> {
        if self.is_zero() || rhs.is_zero() {
            return Ok(Decimal::zero());
        }
        let magnitude = self
            .adjusted_exponent()
            .saturating_add(rhs.adjusted_exponent());
        if magnitude.abs() > MAX_EXPONENT + 1 {
            return Err(ArithmeticError::Overflow);
        }
        Decimal(&self.0 * &rhs.0)
            .normalized()
            .round(precision, mode)
            .checked()
    }

    /// Quotient rounded to `precision` significant digits.
    pub fn checked_div(
        &self,
        rhs: &Decimal,
        precision: u32,
        mode: RoundingMode,
    ) -> Result<Self, ArithmeticError> {
        if rhs.is_zero() {
            return Err(ArithmeticError::DivisionByZero);
        }
        if self.is_zero() {
            return Ok(Decimal::zero());
        }
        let magnitude = self
            .adjusted_exponent()
            .saturating_sub(rhs.adjusted_exponent());
        if magnitude.abs() > MAX_EXPONENT + 1 {
            return Err(ArithmeticError::Overflow);
        }
        let (lhs_mantissa, rhs_mantissa) = (self.mantissa(), rhs.mantissa());
        // Scale the dividend so the integer quotient carries two guard digits.
        let wanted = u64::from(precision.max(1)) + 2 + rhs.digits();
        let shift = wanted.saturating_sub(self.digits());
        let scaled = lhs_mantissa * pow10(shift);
        let mut quotient = &scaled / &rhs_mantissa;
        let remainder = &scaled % &rhs_mantissa;
        let shift = i64::try_from(shift).unwrap_or(i64::MAX);
        let mut exponent = self.exponent() - rhs.exponent() - shift;
        if !remainder.is_zero() {
            // Sticky digit: anything left over must push a tie above half.
            let sticky = if self.is_negative() == rhs.is_negative() {
                1
            } else {
                -1
            };
            quotient = quotient * 10u32 + sticky;
            exponent -= 1;
        }
        Decimal::new(quotient, exponent).round(precision, mode).checked()
    }

    /// Exact truncated remainder; the sign follows the dividend.
    pub fn checked_rem(&self, rhs: &Decimal) -> Result<Self, ArithmeticError> {
        if rhs.is_zero() {
            return Err(ArithmeticError::DivisionByZero);
        }
        if self.abs() < rhs.abs() {
            return Ok(self.clone());
        }
        let (lhs_exponent, rhs_exponent) = (self.exponent(), rhs.exponent());
        let magnitude = self.mantissa().abs();
        let modulus = rhs.mantissa().abs();
        let (rest, exponent) = if lhs_exponent >= rhs_exponent {
            // (m * 10^gap) mod n without materializing 10^gap.
            let gap = BigInt::from(lhs_exponent - rhs_exponent);
            let factor = BigInt::from(10u8).modpow(&gap, &modulus);
            ((magnitude * factor) % &modulus, rhs_exponent)
        } else {
            // |self| >= |rhs| bounds this gap by the dividend's digit count.
            let gap = (rhs_exponent - lhs_exponent).unsigned_abs();
            (magnitude % (modulus * pow10(gap)), lhs_exponent)
        };
        let rest = if self.is_negative() { -rest } else { rest };
        Ok(Decimal::new(rest, exponent))
    }

    fn normalized(&self) -> Self {
        Decimal(self.0.normalized())
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Decimal::new(BigInt::from(value), 0)
    }
}

impl From<BigInt> for Decimal {
    fn from(value: BigInt) -> Self {
        Decimal::new(value, 0)
    }
}

impl From<BigDecimal> for Decimal {
    fn from(value: BigDecimal) -> Self {
        Decimal(value.normalized())
    }
}

impl Ord for Decimal {
    /// Signs first, then leading-digit positions; digits are only compared
    /// when both leading digits sit at the same power of ten.
    fn cmp(&self, other: &Self) -> Ordering {
        let sign = self.signum().cmp(&other.signum());
        if sign != Ordering::Equal || self.is_zero() {
            return sign;
        }
        let magnitude = match self.adjusted_exponent().cmp(&other.adjusted_exponent()) {
            Ordering::Equal => self.0.abs().cmp(&other.0.abs()),
            unequal => unequal,
        };
        if self.is_negative() {
            magnitude.reverse()
        } else {
            magnitude
        }
    }
}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Decimal {}

impl Neg for &Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        Decimal(-&self.0)
    }
}

impl Neg for Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        Decimal(-self.0)
    }
}
