//! Parley IR - identifiers, operators and source positions.
//!
//! The runtime never reads script text itself, but it has to agree with the
//! parser on a few things:
//! - how a qualified name like `A:B:C` splits into segments ([`Identifier`])
//! - how a position in a script file is recorded ([`FileId`], [`SourcePos`])
//! - which operators an expression can apply ([`BinaryOp`], [`UnaryOp`])
//!
//! They live here so the parser and the runtime depend on one small crate
//! instead of on each other.

mod identifier;
mod operators;
mod source;

pub use identifier::{Identifier, SCOPE_SEPARATOR};
pub use operators::{BinaryOp, UnaryOp};
pub use source::{FileId, SourcePos};
