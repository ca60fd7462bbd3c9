//! Runtime objects.
//!
//! Every nameable runtime entity (scope, variable, list, operator, block) is
//! an [`Object`]: a shared header (name, constness, back reference to the
//! owning scope) plus a kind-specific [`Body`]. Objects are handed around as
//! [`Obj`], a reference-counted handle.
//!
//! # Ownership
//!
//! The member map of the owning scope holds the only strong reference to a
//! registered object. The back reference to the parent is weak, so is every
//! import, list alias and bookmark context. Each object keeps a weak handle
//! to itself, bound at allocation, so code holding `&Object` can recover an
//! [`Obj`].
//!
//! # Casting
//!
//! The object model is closed. [`Object::kind`] gives the tag, the `as_*`
//! casts return typed views ([`Scope`], [`Variable`], [`List`], [`Operator`],
//! [`Block`]) or a `NoConversion` anomaly, and [`Obj::accept`] dispatches to
//! an [`ObjectVisitor`].

use std::cell::{Cell, RefCell};
use std::fmt;
use std::ops::Deref;
use std::rc::{Rc, Weak};

use parley_ir::SCOPE_SEPARATOR;

use crate::anomaly::{self, AnomalyResult};
use crate::block::{Block, BlockData, Bookmark};
use crate::config::Config;
use crate::list::{List, ListData};
use crate::operator::{Executor, Operator, OperatorData};
use crate::scalar::{Number, Scalar};
use crate::scope::{Scope, ScopeData};
use crate::variable::{Computed, NativeBinding, Variable, VariableData};
use crate::visitor::ObjectVisitor;

/// The closed set of object kinds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    /// A bare object with only a header.
    Plain,
    Scope,
    Variable,
    List,
    Operator,
    Block,
}

impl Kind {
    /// Name used in diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            Kind::Plain => "ScopeObject",
            Kind::Scope => "Scope",
            Kind::Variable => "Variable",
            Kind::List => "List",
            Kind::Operator => "Operator",
            Kind::Block => "Block",
        }
    }

    /// Scopes, operators and blocks all own members.
    #[inline]
    pub const fn is_scope(self) -> bool {
        matches!(self, Kind::Scope | Kind::Operator | Kind::Block)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Kind-specific storage.
pub(crate) enum Body {
    Plain,
    Scope(ScopeData),
    Variable(VariableData),
    List(ListData),
    Operator(OperatorData),
    Block(BlockData),
}

/// Header shared by every runtime object.
pub struct Object {
    this: Weak<Object>,
    name: RefCell<String>,
    constant: Cell<bool>,
    parent: RefCell<Weak<Object>>,
    pub(crate) body: Body,
}

impl Object {
    /// The object's own name. Empty for anonymous objects.
    pub fn name(&self) -> String {
        self.name.borrow().clone()
    }

    pub fn kind(&self) -> Kind {
        match &self.body {
            Body::Plain => Kind::Plain,
            Body::Scope(_) => Kind::Scope,
            Body::Variable(_) => Kind::Variable,
            Body::List(_) => Kind::List,
            Body::Operator(_) => Kind::Operator,
            Body::Block(_) => Kind::Block,
        }
    }

    #[inline]
    pub fn is_const(&self) -> bool {
        self.constant.get()
    }

    #[inline]
    pub fn set_const(&self, constant: bool) {
        self.constant.set(constant);
    }

    /// Fails with `ConstAssign` when the object is constant.
    pub fn assert_non_const(&self) -> AnomalyResult<()> {
        if self.is_const() {
            return Err(anomaly::const_assign(&self.full_name()));
        }
        Ok(())
    }

    /// The owning scope, if the object is registered.
    pub fn parent(&self) -> Option<Obj> {
        self.parent.borrow().upgrade().map(Obj)
    }

    #[inline]
    pub fn is_registered(&self) -> bool {
        self.parent().is_some()
    }

    /// Names from the root down to this object, joined with `:`.
    ///
    /// The global scope has an empty name, so the full name of anything
    /// registered under it starts with the separator and is itself an
    /// absolute identifier.
    pub fn full_name(&self) -> String {
        let mut names = vec![self.name()];
        let mut current = self.parent();
        while let Some(scope) = current {
            names.push(scope.name());
            current = scope.parent();
        }
        names.reverse();
        names.join(&SCOPE_SEPARATOR.to_string())
    }

    /// A strong handle to this object.
    ///
    /// `None` only while the object is being dropped.
    pub fn handle(&self) -> Option<Obj> {
        self.this.upgrade().map(Obj)
    }

    /// The root of the ownership tree this object belongs to.
    pub fn global_scope(&self) -> Option<Obj> {
        let mut current = self.handle()?;
        while let Some(parent) = current.parent() {
            current = parent;
        }
        Some(current)
    }

    pub(crate) fn set_parent(&self, parent: &Obj) {
        *self.parent.borrow_mut() = Rc::downgrade(&parent.0);
    }

    pub(crate) fn clear_parent(&self) {
        *self.parent.borrow_mut() = Weak::new();
    }

    pub(crate) fn rename_in_place(&self, name: &str) {
        *self.name.borrow_mut() = name.to_string();
    }

    #[inline]
    pub(crate) fn as_ptr(&self) -> *const Object {
        self
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("name", &*self.name.borrow())
            .field("kind", &self.kind())
            .field("const", &self.constant.get())
            .field("registered", &self.is_registered())
            .finish()
    }
}

/// A shared handle to a runtime object.
#[derive(Clone)]
pub struct Obj(Rc<Object>);

impl Obj {
    fn new(name: impl Into<String>, body: Body) -> Obj {
        Obj(Rc::new_cyclic(|this| Object {
            this: this.clone(),
            name: RefCell::new(name.into()),
            constant: Cell::new(false),
            parent: RefCell::new(Weak::new()),
            body,
        }))
    }

    // Factories

    /// A bare object with only a header.
    pub fn plain(name: impl Into<String>) -> Obj {
        Obj::new(name, Body::Plain)
    }

    pub fn scope(name: impl Into<String>) -> Obj {
        Obj::new(name, Body::Scope(ScopeData::new()))
    }

    /// A stored variable holding `value`.
    pub fn variable(name: impl Into<String>, value: Scalar) -> Obj {
        Obj::new(name, Body::Variable(VariableData::stored(value)))
    }

    pub fn number(name: impl Into<String>, value: Number) -> Obj {
        Obj::variable(name, Scalar::Num(value))
    }

    /// An integer at the active precision.
    pub fn integer(name: impl Into<String>, value: i64, config: &Config) -> Obj {
        Obj::number(name, Number::integer(value, config))
    }

    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Obj {
        Obj::variable(name, Scalar::Str(value.into()))
    }

    pub fn boolean(name: impl Into<String>, value: bool) -> Obj {
        Obj::variable(name, Scalar::Bool(value))
    }

    /// A variable bound to host state. Read-only bindings are constant.
    pub fn native_variable(name: impl Into<String>, binding: NativeBinding) -> Obj {
        let read_only = binding.is_read_only();
        let obj = Obj::new(name, Body::Variable(VariableData::native(binding)));
        obj.set_const(read_only);
        obj
    }

    /// A read-only derived variable.
    pub fn computed_variable(name: impl Into<String>, computed: Computed) -> Obj {
        let obj = Obj::new(name, Body::Variable(VariableData::computed(computed)));
        obj.set_const(true);
        obj
    }

    pub fn list(name: impl Into<String>) -> Obj {
        Obj::new(name, Body::List(ListData::new()))
    }

    /// An operator whose body is a native function.
    pub fn operator<F>(name: impl Into<String>, native: F) -> Obj
    where
        F: Fn(&mut dyn Executor, &Operator) -> AnomalyResult<Obj> + 'static,
    {
        Obj::new(name, Body::Operator(OperatorData::new(Box::new(native))))
    }

    /// A block whose body starts at `bookmark`.
    pub fn block(name: impl Into<String>, bookmark: Bookmark) -> Obj {
        Obj::new(name, Body::Block(BlockData::new(bookmark)))
    }

    // Identity

    #[inline]
    pub fn ptr_eq(&self, other: &Obj) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn downgrade(&self) -> WeakObj {
        WeakObj(Rc::downgrade(&self.0))
    }

    /// Rename the object.
    ///
    /// A constant object cannot be renamed. A registered object is re-keyed
    /// in its owning scope; the owning scope's own constness does not matter.
    /// The collision check happens before anything changes, so a failed
    /// rename leaves the object registered under its old name.
    pub fn set_name(&self, new_name: &str) -> AnomalyResult<()> {
        self.assert_non_const()?;
        let old_name = self.name();
        if old_name == new_name {
            return Ok(());
        }
        let Some(parent) = self.parent() else {
            self.rename_in_place(new_name);
            return Ok(());
        };
        let scope = parent.as_scope()?;
        if scope.contains(new_name) {
            return Err(anomaly::already_exists(new_name, &parent.full_name()));
        }
        let obj = scope.unregister(&old_name)?;
        obj.rename_in_place(new_name);
        scope.adopt(obj)?;
        Ok(())
    }

    // Casts

    pub fn as_scope(&self) -> AnomalyResult<Scope> {
        if self.kind().is_scope() {
            Ok(Scope(self.clone()))
        } else {
            Err(self.no_conversion(Kind::Scope))
        }
    }

    pub fn as_operator(&self) -> AnomalyResult<Operator> {
        match self.kind() {
            Kind::Operator | Kind::Block => Ok(Operator(self.clone())),
            _ => Err(self.no_conversion(Kind::Operator)),
        }
    }

    pub fn as_block(&self) -> AnomalyResult<Block> {
        match self.kind() {
            Kind::Block => Ok(Block(self.clone())),
            _ => Err(self.no_conversion(Kind::Block)),
        }
    }

    pub fn as_list(&self) -> AnomalyResult<List> {
        match self.kind() {
            Kind::List => Ok(List(self.clone())),
            _ => Err(self.no_conversion(Kind::List)),
        }
    }

    /// The object's scalar view.
    ///
    /// A variable is its own view. A list is viewed as the concatenation of
    /// its elements. Every other kind is viewed as a read-only string holding
    /// its full name.
    pub fn as_variable(&self) -> AnomalyResult<Variable> {
        let view = match self.kind() {
            Kind::Variable => return Ok(Variable(self.clone())),
            Kind::List => {
                let list = List(self.clone());
                Obj::computed_variable(
                    self.name(),
                    Computed::new(move |config| list.flatten(config).map(Scalar::Str)),
                )
            }
            _ => {
                let obj = Obj::string(self.name(), self.full_name());
                obj.set_const(true);
                obj
            }
        };
        Ok(Variable(view))
    }

    pub fn as_string(&self, config: &Config) -> AnomalyResult<String> {
        self.as_variable()?.as_string(config)
    }

    pub fn as_number(&self, config: &Config) -> AnomalyResult<Number> {
        self.as_variable()?.as_number(config)
    }

    pub fn as_bool(&self, config: &Config) -> AnomalyResult<bool> {
        self.as_variable()?.as_bool(config)
    }

    #[cold]
    #[track_caller]
    fn no_conversion(&self, target: Kind) -> anomaly::Anomaly {
        anomaly::no_conversion(&self.full_name(), target.name())
    }

    /// Dispatch to the visitor method for this object's kind.
    pub fn accept<V: ObjectVisitor + ?Sized>(&self, visitor: &mut V) {
        match &self.body {
            Body::Plain => visitor.visit_object(self),
            Body::Scope(_) => visitor.visit_scope(&Scope(self.clone())),
            Body::Variable(_) => visitor.visit_variable(&Variable(self.clone())),
            Body::List(_) => visitor.visit_list(&List(self.clone())),
            Body::Operator(_) => visitor.visit_operator(&Operator(self.clone())),
            Body::Block(_) => visitor.visit_block(&Block(self.clone())),
        }
    }
}

impl Deref for Obj {
    type Target = Object;

    #[inline]
    fn deref(&self) -> &Object {
        &self.0
    }
}

impl fmt::Debug for Obj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

/// A non-owning handle to a runtime object.
#[derive(Clone, Default)]
pub struct WeakObj(Weak<Object>);

impl WeakObj {
    /// A handle that never upgrades.
    pub fn new() -> Self {
        WeakObj(Weak::new())
    }

    pub fn upgrade(&self) -> Option<Obj> {
        self.0.upgrade().map(Obj)
    }

    /// Upgrade, or fail with `IdNotFound` naming what the handle pointed at.
    #[track_caller]
    pub fn upgrade_or(&self, name: &str) -> AnomalyResult<Obj> {
        self.upgrade().ok_or_else(|| anomaly::id_not_found(name))
    }

    #[inline]
    pub fn points_to(&self, obj: &Obj) -> bool {
        std::ptr::eq(self.0.as_ptr(), Rc::as_ptr(&obj.0))
    }

    #[inline]
    pub(crate) fn as_ptr(&self) -> *const Object {
        self.0.as_ptr()
    }
}

impl fmt::Debug for WeakObj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(obj) => write!(f, "WeakObj({})", obj.full_name()),
            None => f.write_str("WeakObj(<dropped>)"),
        }
    }
}
