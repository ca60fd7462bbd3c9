//! Parley Runtime - the object, scope and value model of the Parley
//! dialogue interpreter.
//!
//! Parley scripts are made of named blocks of dialogue that reference each
//! other. This crate holds everything those names resolve to at run time;
//! tokenizing, parsing and statement execution live with the driver, which
//! talks to the runtime through [`Executor`].
//!
//! # Architecture
//!
//! - [`Obj`]: shared handle to any runtime object; casts to typed views
//! - [`Scope`]: owned members, ordered imports, identifier resolution
//! - [`Variable`]: stored, native or computed scalar values
//! - [`List`]: resizable sequences with lenient or strict indexing
//! - [`Operator`] / [`Block`]: invocable scopes
//! - [`Anomaly`]: structured failures, propagated with `?`
//! - [`Config`] / [`SharedConfig`]: precision, base, rounding, list mode
//!
//! Registered objects are owned only by their scope's member map; every
//! other reference (parents, imports, aliases, bookmarks) is weak.

pub mod anomaly;
mod block;
pub mod builtins;
mod config;
pub mod constants;
mod list;
mod logging;
mod object;
mod operator;
mod scalar;
mod scope;
mod variable;
pub mod visitor;

pub use anomaly::{Anomaly, AnomalyKind, AnomalyResult};
pub use block::{Block, Bookmark};
pub use config::{
    Config, SharedConfig, Verbosity, DEFAULT_BASE, DEFAULT_MAX_DIGITS, DEFAULT_PRECISION,
    MAX_BASE, MAX_PRECISION, MIN_BASE, MIN_PRECISION,
};
pub use list::{List, MAX_LIST_LEN};
pub use logging::init_tracing;
pub use object::{Kind, Obj, Object, WeakObj};
pub use operator::{Executor, NativeFn, Operator};
pub use scalar::{Number, Scalar, ScalarKind};
pub use scope::Scope;
pub use variable::{Computed, Getter, NativeBinding, Setter, Variable};
pub use visitor::{walk_scope, ObjectVisitor};

pub use parley_decimal::{Decimal, RoundingMode};
pub use parley_ir::{BinaryOp, FileId, Identifier, SourcePos, UnaryOp};
