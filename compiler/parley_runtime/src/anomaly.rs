//! Anomalies: the runtime's structured failures.
//!
//! Every fallible operation in the core returns [`AnomalyResult`]. The core
//! never recovers locally; an anomaly travels up to the driver, which decides
//! whether to report and continue (soft anomalies) or abort (panic-class).
//!
//! # Structured Kinds
//!
//! [`AnomalyKind`] carries the data of each failure so callers can match on
//! it. Factory functions (e.g. [`id_not_found`]) are the constructors used by
//! the core; they fill in both `kind` and the rendered `message`, and record
//! the Rust source location that raised the anomaly.

use parley_ir::SourcePos;
use std::fmt;
use std::panic::Location;

/// Result of a fallible runtime operation.
pub type AnomalyResult<T> = Result<T, Anomaly>;

/// What went wrong.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnomalyKind {
    // Naming
    AlreadyExists {
        name: String,
        scope: String,
    },
    IdNotFound {
        id: String,
    },
    NotImported {
        name: String,
    },
    OwnershipCycle {
        name: String,
    },

    // Mutation
    ConstAssign {
        name: String,
    },

    // Casting
    NoConversion {
        name: String,
        target: &'static str,
    },

    // Lists
    ListTooBig {
        requested: i64,
        max: usize,
    },
    NoListElement {
        index: i64,
        len: usize,
    },

    // Numbers
    BadPrecision {
        precision: i64,
    },
    BadBase {
        base: i64,
    },
    DivisionByZero,
    /// A result's magnitude left the range numbers may carry.
    NumberOutOfRange {
        op: &'static str,
    },
    InvalidOperation {
        op: &'static str,
        kind: &'static str,
    },

    /// An invariant of the core itself was violated. Never a script mistake.
    Internal {
        message: String,
    },
}

impl fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyExists { name, scope } => {
                if scope.is_empty() {
                    write!(f, "'{name}' already exists")
                } else {
                    write!(f, "'{name}' already exists in '{scope}'")
                }
            }
            Self::IdNotFound { id } => write!(f, "identifier not found: {id}"),
            Self::NotImported { name } => write!(f, "'{name}' was never imported"),
            Self::OwnershipCycle { name } => {
                write!(f, "'{name}' cannot be registered inside itself")
            }
            Self::ConstAssign { name } => write!(f, "cannot modify constant '{name}'"),
            Self::NoConversion { name, target } => {
                write!(f, "'{name}' cannot be converted to {target}")
            }
            Self::ListTooBig { requested, max } => {
                write!(f, "list size {requested} outside 0..={max}")
            }
            Self::NoListElement { index, len } => {
                write!(f, "no element at index {index} (length {len})")
            }
            Self::BadPrecision { precision } => write!(f, "invalid precision: {precision}"),
            Self::BadBase { base } => write!(f, "invalid numeric base: {base}"),
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::NumberOutOfRange { op } => write!(f, "result of `{op}` is out of range"),
            Self::InvalidOperation { op, kind } => {
                write!(f, "operator `{op}` cannot be applied to {kind}")
            }
            Self::Internal { message } => write!(f, "internal error: {message}"),
        }
    }
}

/// A structured runtime failure.
#[derive(Clone, Debug)]
pub struct Anomaly {
    pub kind: AnomalyKind,
    /// Rendered message; equals `kind.to_string()`.
    pub message: String,
    /// Where in the runtime the anomaly was raised.
    pub raised_at: &'static Location<'static>,
    /// Script position, attached by the driver when it knows one.
    pub pos: Option<SourcePos>,
}

impl Anomaly {
    #[track_caller]
    fn from_kind(kind: AnomalyKind) -> Self {
        let message = kind.to_string();
        Anomaly {
            kind,
            message,
            raised_at: Location::caller(),
            pos: None,
        }
    }

    /// Attach the script position the driver was executing.
    #[must_use]
    pub fn with_pos(mut self, pos: SourcePos) -> Self {
        self.pos = Some(pos);
        self
    }

    /// Panic-class anomalies indicate a bug in the runtime, not in the script.
    #[inline]
    pub fn is_panic(&self) -> bool {
        matches!(self.kind, AnomalyKind::Internal { .. })
    }
}

impl PartialEq for Anomaly {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.pos == other.pos
    }
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if let Some(pos) = self.pos {
            write!(f, " at {pos}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Anomaly {}

// Naming Anomalies

/// A name is already taken in a scope, or a scope is imported twice.
#[cold]
#[track_caller]
pub fn already_exists(name: &str, scope: &str) -> Anomaly {
    Anomaly::from_kind(AnomalyKind::AlreadyExists {
        name: name.to_string(),
        scope: scope.to_string(),
    })
}

/// Resolution found nothing.
#[cold]
#[track_caller]
pub fn id_not_found(id: &str) -> Anomaly {
    Anomaly::from_kind(AnomalyKind::IdNotFound { id: id.to_string() })
}

/// Unimport of a scope that was never imported.
#[cold]
#[track_caller]
pub fn not_imported(name: &str) -> Anomaly {
    Anomaly::from_kind(AnomalyKind::NotImported {
        name: name.to_string(),
    })
}

/// Registering a scope inside itself or one of its descendants.
#[cold]
#[track_caller]
pub fn ownership_cycle(name: &str) -> Anomaly {
    Anomaly::from_kind(AnomalyKind::OwnershipCycle {
        name: name.to_string(),
    })
}

// Mutation Anomalies

/// Mutation of a constant object.
#[cold]
#[track_caller]
pub fn const_assign(name: &str) -> Anomaly {
    Anomaly::from_kind(AnomalyKind::ConstAssign {
        name: name.to_string(),
    })
}

// Casting Anomalies

/// An object cannot be viewed as `target`.
#[cold]
#[track_caller]
pub fn no_conversion(name: &str, target: &'static str) -> Anomaly {
    Anomaly::from_kind(AnomalyKind::NoConversion {
        name: name.to_string(),
        target,
    })
}

// List Anomalies

#[cold]
#[track_caller]
pub fn list_too_big(requested: i64, max: usize) -> Anomaly {
    Anomaly::from_kind(AnomalyKind::ListTooBig { requested, max })
}

#[cold]
#[track_caller]
pub fn no_list_element(index: i64, len: usize) -> Anomaly {
    Anomaly::from_kind(AnomalyKind::NoListElement { index, len })
}

// Numeric Anomalies

#[cold]
#[track_caller]
pub fn bad_precision(precision: i64) -> Anomaly {
    Anomaly::from_kind(AnomalyKind::BadPrecision { precision })
}

#[cold]
#[track_caller]
pub fn bad_base(base: i64) -> Anomaly {
    Anomaly::from_kind(AnomalyKind::BadBase { base })
}

#[cold]
#[track_caller]
pub fn division_by_zero() -> Anomaly {
    Anomaly::from_kind(AnomalyKind::DivisionByZero)
}

#[cold]
#[track_caller]
pub fn number_out_of_range(op: &'static str) -> Anomaly {
    Anomaly::from_kind(AnomalyKind::NumberOutOfRange { op })
}

#[cold]
#[track_caller]
pub fn invalid_operation(op: &'static str, kind: &'static str) -> Anomaly {
    Anomaly::from_kind(AnomalyKind::InvalidOperation { op, kind })
}

// Internal Anomalies

/// Invariant violation inside the runtime.
#[cold]
#[track_caller]
pub fn internal(message: impl Into<String>) -> Anomaly {
    Anomaly::from_kind(AnomalyKind::Internal {
        message: message.into(),
    })
}
