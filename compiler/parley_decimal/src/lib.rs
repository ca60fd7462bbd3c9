//! Parley Decimal - arbitrary-precision decimal numbers.
//!
//! Every number a script sees is a [`Decimal`], a normalized
//! [`bigdecimal::BigDecimal`]. Each arithmetic operation rounds to a
//! requested number of significant digits with a [`RoundingMode`]; results
//! whose magnitude leaves `10^±MAX_EXPONENT` are reported as
//! [`ArithmeticError::Overflow`].
//!
//! On top of `bigdecimal` this crate adds parsing in bases 2 to 36, text
//! rendering that switches to scientific notation past a digit budget, and
//! π at any precision.

mod decimal;
mod format;
mod parse;
mod pi;
mod rounding;

pub use decimal::{ArithmeticError, Decimal, MAX_EXPONENT};
pub use parse::ParseDecimalError;
pub use rounding::{RoundingMode, UnknownRoundingMode};
