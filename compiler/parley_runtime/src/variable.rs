//! Variables: named scalar values.
//!
//! A variable's value lives in one of three places:
//! - stored in the variable itself;
//! - in host state, reached through a native getter and optional setter
//!   (config fields, list lengths, block flags, object names);
//! - computed on demand by a read-only function, optionally memoized per
//!   active precision and rounding mode (constants such as `pi`).

use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;

use parley_decimal::RoundingMode;
use parley_ir::{BinaryOp, UnaryOp};

use crate::anomaly::{self, AnomalyResult};
use crate::config::{integer_of, Config};
use crate::object::{Body, Obj};
use crate::scalar::{Number, Scalar, ScalarKind};

pub type Getter = Box<dyn Fn(&Config) -> AnomalyResult<Scalar>>;
pub type Setter = Box<dyn Fn(Scalar, &Config) -> AnomalyResult<()>>;

/// Accessors binding a variable to host state.
pub struct NativeBinding {
    get: Getter,
    set: Option<Setter>,
}

impl NativeBinding {
    pub fn read_only<G>(get: G) -> Self
    where
        G: Fn(&Config) -> AnomalyResult<Scalar> + 'static,
    {
        NativeBinding {
            get: Box::new(get),
            set: None,
        }
    }

    pub fn read_write<G, S>(get: G, set: S) -> Self
    where
        G: Fn(&Config) -> AnomalyResult<Scalar> + 'static,
        S: Fn(Scalar, &Config) -> AnomalyResult<()> + 'static,
    {
        NativeBinding {
            get: Box::new(get),
            set: Some(Box::new(set)),
        }
    }

    #[inline]
    pub fn is_read_only(&self) -> bool {
        self.set.is_none()
    }
}

/// A read-only derived value.
pub struct Computed {
    compute: Getter,
    memo: Option<RefCell<Option<(u32, RoundingMode, Scalar)>>>,
}

impl Computed {
    /// Recomputed on every read.
    pub fn new<F>(compute: F) -> Self
    where
        F: Fn(&Config) -> AnomalyResult<Scalar> + 'static,
    {
        Computed {
            compute: Box::new(compute),
            memo: None,
        }
    }

    /// Computed once per active precision and rounding mode.
    pub fn memoized<F>(compute: F) -> Self
    where
        F: Fn(&Config) -> AnomalyResult<Scalar> + 'static,
    {
        Computed {
            compute: Box::new(compute),
            memo: Some(RefCell::new(None)),
        }
    }

    fn get(&self, config: &Config) -> AnomalyResult<Scalar> {
        let Some(memo) = &self.memo else {
            return (self.compute)(config);
        };
        if let Some((precision, rounding, value)) = &*memo.borrow() {
            if *precision == config.precision && *rounding == config.rounding {
                return Ok(value.clone());
            }
        }
        let value = (self.compute)(config)?;
        tracing::trace!(precision = config.precision, "recomputed memoized value");
        *memo.borrow_mut() = Some((config.precision, config.rounding, value.clone()));
        Ok(value)
    }
}

pub(crate) enum VariableData {
    Stored(RefCell<Scalar>),
    Native(NativeBinding),
    Computed(Computed),
}

impl VariableData {
    pub(crate) fn stored(value: Scalar) -> Self {
        VariableData::Stored(RefCell::new(value))
    }

    pub(crate) fn native(binding: NativeBinding) -> Self {
        VariableData::Native(binding)
    }

    pub(crate) fn computed(computed: Computed) -> Self {
        VariableData::Computed(computed)
    }
}

/// A variable view.
#[derive(Clone)]
pub struct Variable(pub(crate) Obj);

impl Variable {
    fn data(&self) -> &VariableData {
        match &self.0.body {
            Body::Variable(data) => data,
            _ => unreachable!("Variable view over a non-variable object"),
        }
    }

    #[inline]
    pub fn object(&self) -> &Obj {
        &self.0
    }

    pub fn into_object(self) -> Obj {
        self.0
    }

    /// The current value in its preferred kind.
    pub fn value(&self, config: &Config) -> AnomalyResult<Scalar> {
        match self.data() {
            VariableData::Stored(value) => Ok(value.borrow().clone()),
            VariableData::Native(binding) => (binding.get)(config),
            VariableData::Computed(computed) => computed.get(config),
        }
    }

    pub fn preferred_kind(&self, config: &Config) -> AnomalyResult<ScalarKind> {
        Ok(self.value(config)?.kind())
    }

    pub fn as_string(&self, config: &Config) -> AnomalyResult<String> {
        Ok(self.value(config)?.as_string(config))
    }

    pub fn as_number(&self, config: &Config) -> AnomalyResult<Number> {
        self.value(config)?.as_number(config)
    }

    pub fn as_bool(&self, config: &Config) -> AnomalyResult<bool> {
        Ok(self.value(config)?.as_bool(config))
    }

    /// Replace the value. Native variables forward to their setter.
    pub fn assign(&self, value: Scalar, config: &Config) -> AnomalyResult<()> {
        self.assert_non_const()?;
        match self.data() {
            VariableData::Stored(stored) => {
                *stored.borrow_mut() = value;
                Ok(())
            }
            VariableData::Native(NativeBinding { set: Some(set), .. }) => set(value, config),
            VariableData::Native(_) | VariableData::Computed(_) => {
                Err(anomaly::const_assign(&self.full_name()))
            }
        }
    }

    /// Assign the scalar view of any object.
    pub fn assign_from(&self, source: &Obj, config: &Config) -> AnomalyResult<()> {
        let value = source.as_variable()?.value(config)?;
        self.assign(value, config)
    }

    /// An anonymous, non-constant stored copy of the current value.
    pub fn duplicate(&self, config: &Config) -> AnomalyResult<Obj> {
        Ok(Obj::variable("", self.value(config)?))
    }

    /// Precision of the current value; the active precision for non-numbers.
    pub fn precision(&self, config: &Config) -> AnomalyResult<u32> {
        Ok(match self.value(config)? {
            Scalar::Num(number) => number.precision(),
            Scalar::Str(_) | Scalar::Bool(_) => config.precision,
        })
    }

    /// Re-round a stored number to `precision` significant digits.
    pub fn set_precision(&self, precision: i64, config: &Config) -> AnomalyResult<()> {
        let precision = Config::check_precision(precision)?;
        self.assert_non_const()?;
        let VariableData::Stored(stored) = self.data() else {
            return Err(anomaly::const_assign(&self.full_name()));
        };
        let mut value = stored.borrow_mut();
        let rounded = match &*value {
            Scalar::Num(number) => number.with_precision(precision, config.rounding),
            Scalar::Str(_) | Scalar::Bool(_) => {
                return Err(anomaly::no_conversion(
                    &self.full_name(),
                    ScalarKind::Number.name(),
                ));
            }
        };
        *value = Scalar::Num(rounded);
        Ok(())
    }

    /// A native variable reading and writing this variable's precision.
    pub fn precision_field(&self) -> Obj {
        let (read, write) = (self.downgrade(), self.downgrade());
        let name = self.full_name();
        let write_name = name.clone();
        Obj::native_variable(
            "precision",
            NativeBinding::read_write(
                move |config| {
                    let var = read.upgrade_or(&name)?.as_variable()?;
                    let precision = i64::from(var.precision(config)?);
                    Ok(Scalar::Num(Number::integer(precision, config)))
                },
                move |value, config| {
                    let var = write.upgrade_or(&write_name)?.as_variable()?;
                    var.set_precision(integer_of(&value, config)?, config)
                },
            ),
        )
    }

    /// `self op rhs` as a new anonymous variable.
    pub fn binary(&self, op: BinaryOp, rhs: &Obj, config: &Config) -> AnomalyResult<Obj> {
        let rhs = rhs.as_variable()?.value(config)?;
        let result = self.value(config)?.binary(op, &rhs, config)?;
        Ok(Obj::variable("", result))
    }

    pub fn unary(&self, op: UnaryOp, config: &Config) -> AnomalyResult<Obj> {
        let result = self.value(config)?.unary(op, config)?;
        Ok(Obj::variable("", result))
    }
}

impl Deref for Variable {
    type Target = Obj;

    #[inline]
    fn deref(&self) -> &Obj {
        &self.0
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let storage = match self.data() {
            VariableData::Stored(value) => format!("{:?}", value.borrow()),
            VariableData::Native(binding) if binding.is_read_only() => "<native, read-only>".into(),
            VariableData::Native(_) => "<native>".into(),
            VariableData::Computed(_) => "<computed>".into(),
        };
        f.debug_struct("Variable")
            .field("name", &self.full_name())
            .field("value", &storage)
            .finish()
    }
}
