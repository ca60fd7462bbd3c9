//! Built-in numeric constants.

use parley_decimal::Decimal;

use crate::object::Obj;
use crate::scalar::{Number, Scalar};
use crate::variable::Computed;

/// Read-only `pi` at the active precision.
///
/// The digits are computed on first read and again whenever the active
/// precision or rounding mode changes.
pub fn pi(name: impl Into<String>) -> Obj {
    Obj::computed_variable(
        name,
        Computed::memoized(|config| {
            let value = Decimal::pi(config.precision);
            Ok(Scalar::Num(Number::new(
                value,
                config.precision,
                config.rounding,
            )))
        }),
    )
}
