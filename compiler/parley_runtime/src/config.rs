//! Runtime configuration.
//!
//! [`Config`] is a small `Copy` value threaded into every operation that
//! formats, parses or indexes. The driver keeps the live settings in a
//! [`SharedConfig`], which scripts can also reach through native variables
//! (`precision`, `strictLists`, `base`).

use std::cell::Cell;
use std::rc::Rc;

use parley_decimal::RoundingMode;
use tracing::level_filters::LevelFilter;

use crate::anomaly::{self, AnomalyResult};
use crate::object::Obj;
use crate::scalar::{Number, Scalar};
use crate::variable::NativeBinding;

pub const MIN_PRECISION: u32 = 1;
pub const MAX_PRECISION: u32 = 10_000;
pub const DEFAULT_PRECISION: u32 = 24;
/// Digits printed before switching to scientific notation.
pub const DEFAULT_MAX_DIGITS: u32 = 30;
pub const MIN_BASE: u32 = 2;
pub const MAX_BASE: u32 = 36;
pub const DEFAULT_BASE: u32 = 10;

/// How much the runtime logs when no `RUST_LOG` is set.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Verbosity {
    Silent,
    #[default]
    Normal,
    Verbose,
    Debug,
}

impl Verbosity {
    pub const fn level_filter(self) -> LevelFilter {
        match self {
            Verbosity::Silent => LevelFilter::OFF,
            Verbosity::Normal => LevelFilter::WARN,
            Verbosity::Verbose => LevelFilter::INFO,
            Verbosity::Debug => LevelFilter::DEBUG,
        }
    }
}

/// Interpreter settings.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Reject out-of-range list indices instead of growing the list.
    pub strict_lists: bool,
    /// Significant digits of new numbers.
    pub precision: u32,
    pub rounding: RoundingMode,
    /// Radix used when reading numbers from text.
    pub base: u32,
    pub max_digits: u32,
    pub verbosity: Verbosity,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            strict_lists: false,
            precision: DEFAULT_PRECISION,
            rounding: RoundingMode::default(),
            base: DEFAULT_BASE,
            max_digits: DEFAULT_MAX_DIGITS,
            verbosity: Verbosity::default(),
        }
    }
}

impl Config {
    /// Defaults with strict list indexing.
    pub fn strict() -> Self {
        Config {
            strict_lists: true,
            ..Config::default()
        }
    }

    /// Validate a precision requested by a script.
    pub fn check_precision(precision: i64) -> AnomalyResult<u32> {
        u32::try_from(precision)
            .ok()
            .filter(|p| (MIN_PRECISION..=MAX_PRECISION).contains(p))
            .ok_or_else(|| anomaly::bad_precision(precision))
    }

    /// Validate a numeric base requested by a script.
    pub fn check_base(base: i64) -> AnomalyResult<u32> {
        u32::try_from(base)
            .ok()
            .filter(|b| (MIN_BASE..=MAX_BASE).contains(b))
            .ok_or_else(|| anomaly::bad_base(base))
    }

    pub fn with_precision(self, precision: i64) -> AnomalyResult<Self> {
        Ok(Config {
            precision: Self::check_precision(precision)?,
            ..self
        })
    }

    pub fn with_base(self, base: i64) -> AnomalyResult<Self> {
        Ok(Config {
            base: Self::check_base(base)?,
            ..self
        })
    }
}

/// The live configuration, shared between the driver and native variables.
#[derive(Clone, Debug, Default)]
pub struct SharedConfig(Rc<Cell<Config>>);

impl SharedConfig {
    pub fn new(config: Config) -> Self {
        SharedConfig(Rc::new(Cell::new(config)))
    }

    #[inline]
    pub fn get(&self) -> Config {
        self.0.get()
    }

    pub fn set(&self, config: Config) {
        self.0.set(config);
    }

    /// Apply a fallible change; nothing changes when it fails.
    pub fn update(
        &self,
        change: impl FnOnce(Config) -> AnomalyResult<Config>,
    ) -> AnomalyResult<()> {
        let updated = change(self.get())?;
        tracing::debug!(?updated, "configuration changed");
        self.set(updated);
        Ok(())
    }

    pub fn set_precision(&self, precision: i64) -> AnomalyResult<()> {
        self.update(|config| config.with_precision(precision))
    }

    pub fn set_base(&self, base: i64) -> AnomalyResult<()> {
        self.update(|config| config.with_base(base))
    }

    pub fn set_strict_lists(&self, strict: bool) {
        let mut config = self.get();
        config.strict_lists = strict;
        self.set(config);
    }

    /// A script variable bound to the active precision.
    pub fn precision_variable(&self, name: impl Into<String>) -> Obj {
        let (read, write) = (self.clone(), self.clone());
        Obj::native_variable(
            name,
            NativeBinding::read_write(
                move |config| {
                    let precision = i64::from(read.get().precision);
                    Ok(Scalar::Num(Number::integer(precision, config)))
                },
                move |value, config| write.set_precision(integer_of(&value, config)?),
            ),
        )
    }

    /// A script variable bound to strict list indexing.
    pub fn strict_lists_variable(&self, name: impl Into<String>) -> Obj {
        let (read, write) = (self.clone(), self.clone());
        Obj::native_variable(
            name,
            NativeBinding::read_write(
                move |_| Ok(Scalar::Bool(read.get().strict_lists)),
                move |value, config| {
                    write.set_strict_lists(value.as_bool(config));
                    Ok(())
                },
            ),
        )
    }

    /// A script variable bound to the numeric base.
    pub fn base_variable(&self, name: impl Into<String>) -> Obj {
        let (read, write) = (self.clone(), self.clone());
        Obj::native_variable(
            name,
            NativeBinding::read_write(
                move |config| {
                    let base = i64::from(read.get().base);
                    Ok(Scalar::Num(Number::integer(base, config)))
                },
                move |value, config| write.set_base(integer_of(&value, config)?),
            ),
        )
    }
}

/// Truncated integer value of a scalar; saturates when out of `i64` range
/// so range checks reject it.
pub(crate) fn integer_of(value: &Scalar, config: &Config) -> AnomalyResult<i64> {
    let number = value.as_number(config)?;
    Ok(number.to_i64().unwrap_or(if number.value().is_negative() {
        i64::MIN
    } else {
        i64::MAX
    }))
}

#[cfg(test)]
mod tests;
