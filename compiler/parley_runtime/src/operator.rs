//! Operators: scopes that can be invoked with one argument.
//!
//! Invoking an operator binds the argument into its `in` list and runs the
//! operator's body. Native operators run a host function; blocks ask the
//! [`Executor`] to run script statements (see [`crate::block`]).

use std::fmt;
use std::ops::Deref;

use crate::anomaly::{self, AnomalyResult};
use crate::block::Block;
use crate::builtins::INPUT;
use crate::config::Config;
use crate::list::List;
use crate::object::{Body, Obj};
use crate::scope::{Scope, ScopeData};

/// The evaluator's side of [`Operator::operate`].
///
/// The runtime core never parses or executes statements itself; whoever
/// drives it implements this trait.
pub trait Executor {
    /// Settings for the operation about to run.
    fn config(&self) -> Config;

    /// Run the body of `block`, starting at its bookmark.
    ///
    /// Text the body says goes through [`Block::say`].
    fn execute_block(&mut self, block: &Block) -> AnomalyResult<()>;
}

/// Body of a native operator.
pub type NativeFn = Box<dyn Fn(&mut dyn Executor, &Operator) -> AnomalyResult<Obj>>;

pub(crate) struct OperatorData {
    pub(crate) scope: ScopeData,
    native: NativeFn,
}

impl OperatorData {
    pub(crate) fn new(native: NativeFn) -> Self {
        OperatorData {
            scope: ScopeData::new(),
            native,
        }
    }
}

/// An operator view over an operator or block.
#[derive(Clone)]
pub struct Operator(pub(crate) Obj);

impl Operator {
    #[inline]
    pub fn object(&self) -> &Obj {
        &self.0
    }

    pub fn into_object(self) -> Obj {
        self.0
    }

    pub fn to_scope(&self) -> Scope {
        Scope(self.0.clone())
    }

    /// The `in` list holding the bound argument.
    pub fn input(&self) -> AnomalyResult<List> {
        self.to_scope()
            .member(INPUT)
            .ok_or_else(|| anomaly::id_not_found(&format!("{}:{INPUT}", self.full_name())))?
            .as_list()
    }

    /// Bind `argument` into `in`: a list argument is list-assigned, any
    /// other object becomes the single element.
    pub(crate) fn bind(&self, argument: &Obj, config: &Config) -> AnomalyResult<()> {
        let input = self.input()?;
        if let Ok(list) = argument.as_list() {
            return input.assign(&list, config);
        }
        input.resize(0, config)?;
        input.push(argument, config)?;
        Ok(())
    }

    /// Invoke the operator with one argument.
    #[tracing::instrument(level = "debug", skip_all, fields(operator = %self.full_name()))]
    pub fn operate(&self, argument: &Obj, executor: &mut dyn Executor) -> AnomalyResult<Obj> {
        match &self.0.body {
            Body::Operator(data) => {
                self.bind(argument, &executor.config())?;
                (data.native)(executor, self)
            }
            Body::Block(_) => Block(self.0.clone()).operate(argument, executor),
            _ => unreachable!("Operator view over a non-operator object"),
        }
    }
}

impl Deref for Operator {
    type Target = Obj;

    #[inline]
    fn deref(&self) -> &Obj {
        &self.0
    }
}

impl fmt::Debug for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Operator").field(&self.full_name()).finish()
    }
}
