//! Lists: ordered, resizable sequences of objects.
//!
//! # Slots
//!
//! A slot either holds a handle (the list owns or co-owns the element) or a
//! non-owning alias to an object registered elsewhere. Reading an alias
//! whose target has been dropped fails with `IdNotFound`.
//!
//! # Copy Rules
//!
//! `push`, `append`, `assign` and element replacement copy by value:
//! - variables copy their current value;
//! - lists are deep-copied;
//! - scopes, operators, blocks and plain objects are stored by reference,
//!   as an alias when registered and as a shared handle otherwise.
//!
//! The `_without_copy` variants store the given handle itself.
//!
//! # Indexing
//!
//! Negative indices count from the end. An index past the end fails in
//! strict mode; otherwise the list grows with zeros until it is valid.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::ops::Deref;

use parley_stack::ensure_sufficient_stack;

use crate::anomaly::{self, AnomalyResult};
use crate::config::{integer_of, Config};
use crate::object::{Body, Kind, Obj, WeakObj};
use crate::scalar::{Number, Scalar};
use crate::variable::NativeBinding;

/// Largest number of elements a list may hold.
pub const MAX_LIST_LEN: usize = 1 << 24;

#[derive(Clone)]
pub(crate) enum Slot {
    Held(Obj),
    Alias { target: WeakObj, name: String },
}

impl Slot {
    fn alias(obj: &Obj) -> Slot {
        Slot::Alias {
            target: obj.downgrade(),
            name: obj.full_name(),
        }
    }

    /// Store `obj` itself: aliased when registered, held otherwise.
    fn reference(obj: &Obj) -> Slot {
        if obj.is_registered() {
            Slot::alias(obj)
        } else {
            Slot::Held(obj.clone())
        }
    }

    fn get(&self) -> AnomalyResult<Obj> {
        match self {
            Slot::Held(obj) => Ok(obj.clone()),
            Slot::Alias { target, name } => target.upgrade_or(name),
        }
    }
}

pub(crate) struct ListData {
    slots: RefCell<Vec<Slot>>,
    /// Set while the list is being flattened or copied.
    busy: Cell<bool>,
}

impl ListData {
    pub(crate) fn new() -> Self {
        ListData {
            slots: RefCell::new(Vec::new()),
            busy: Cell::new(false),
        }
    }
}

/// Marks a list busy for the lifetime of the guard.
struct Busy<'a>(&'a Cell<bool>);

impl<'a> Busy<'a> {
    fn enter(flag: &'a Cell<bool>) -> Option<Self> {
        if flag.replace(true) {
            None
        } else {
            Some(Busy(flag))
        }
    }
}

impl Drop for Busy<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// A list view.
#[derive(Clone)]
pub struct List(pub(crate) Obj);

impl List {
    fn data(&self) -> &ListData {
        match &self.0.body {
            Body::List(data) => data,
            _ => unreachable!("List view over a non-list object"),
        }
    }

    #[inline]
    pub fn object(&self) -> &Obj {
        &self.0
    }

    pub fn into_object(self) -> Obj {
        self.0
    }

    pub fn len(&self) -> usize {
        self.data().slots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn snapshot(&self) -> Vec<Slot> {
        self.data().slots.borrow().clone()
    }

    /// Every element, in order.
    pub fn elements(&self) -> AnomalyResult<Vec<Obj>> {
        self.snapshot().iter().map(Slot::get).collect()
    }

    fn zero(config: &Config) -> Obj {
        Obj::number("", Number::zero(config.precision))
    }

    fn check_room(&self, extra: usize) -> AnomalyResult<()> {
        let wanted = self.len().saturating_add(extra);
        if wanted > MAX_LIST_LEN {
            return Err(anomaly::list_too_big(
                i64::try_from(wanted).unwrap_or(i64::MAX),
                MAX_LIST_LEN,
            ));
        }
        Ok(())
    }

    /// Grow with zeros or truncate to `size` elements.
    pub fn resize(&self, size: i64, config: &Config) -> AnomalyResult<()> {
        let len = usize::try_from(size)
            .ok()
            .filter(|len| *len <= MAX_LIST_LEN)
            .ok_or_else(|| anomaly::list_too_big(size, MAX_LIST_LEN))?;
        self.assert_non_const()?;
        let removed: Vec<Slot> = {
            let mut slots = self.data().slots.borrow_mut();
            if len >= slots.len() {
                slots.resize_with(len, || Slot::Held(Self::zero(config)));
                Vec::new()
            } else {
                slots.drain(len..).collect()
            }
        };
        drop(removed);
        Ok(())
    }

    /// Append a copy of `value`; returns the stored element.
    pub fn push(&self, value: &Obj, config: &Config) -> AnomalyResult<Obj> {
        self.assert_non_const()?;
        self.check_room(1)?;
        let slot = copy_of(value, config)?;
        let element = slot.get()?;
        self.data().slots.borrow_mut().push(slot);
        Ok(element)
    }

    /// Append `value` itself rather than a copy.
    ///
    /// A list pushed into itself is stored as an alias.
    pub fn push_without_copy(&self, value: &Obj) -> AnomalyResult<()> {
        self.assert_non_const()?;
        self.check_room(1)?;
        let slot = if value.ptr_eq(&self.0) {
            Slot::alias(value)
        } else {
            Slot::Held(value.clone())
        };
        self.data().slots.borrow_mut().push(slot);
        Ok(())
    }

    /// Append a non-owning reference to `value`, whether or not it is
    /// registered.
    pub(crate) fn push_reference(&self, value: &Obj) -> AnomalyResult<()> {
        self.assert_non_const()?;
        self.check_room(1)?;
        self.data().slots.borrow_mut().push(Slot::alias(value));
        Ok(())
    }

    /// Remove and return the last element.
    pub fn pop(&self) -> AnomalyResult<Obj> {
        self.assert_non_const()?;
        let slot = self.data().slots.borrow_mut().pop();
        slot.ok_or_else(|| anomaly::no_list_element(-1, 0))?.get()
    }

    /// Append copies of every element of `other`.
    pub fn append(&self, other: &List, config: &Config) -> AnomalyResult<()> {
        self.assert_non_const()?;
        let copies = other.copy_slots(config)?;
        self.check_room(copies.len())?;
        self.data().slots.borrow_mut().extend(copies);
        Ok(())
    }

    /// Append the elements of `other` themselves.
    pub fn append_without_copy(&self, other: &List) -> AnomalyResult<()> {
        self.assert_non_const()?;
        let slots = other.snapshot();
        self.check_room(slots.len())?;
        self.data().slots.borrow_mut().extend(slots);
        Ok(())
    }

    /// Translate a script index into a position, growing the list in
    /// lenient mode.
    pub fn real_index(&self, index: i64, config: &Config) -> AnomalyResult<usize> {
        let len = self.len();
        let signed_len = i64::try_from(len).unwrap_or(i64::MAX);
        if index < 0 {
            return usize::try_from(signed_len + index)
                .map_err(|_| anomaly::no_list_element(index, len));
        }
        if index < signed_len {
            return usize::try_from(index).map_err(|_| anomaly::no_list_element(index, len));
        }
        if config.strict_lists {
            return Err(anomaly::no_list_element(index, len));
        }
        let grown = index.saturating_add(1);
        tracing::debug!(list = %self.full_name(), from = len, to = grown, "lenient index grows list");
        self.resize(grown, config)?;
        usize::try_from(index).map_err(|_| anomaly::no_list_element(index, len))
    }

    /// Element at a script index.
    pub fn get(&self, index: i64, config: &Config) -> AnomalyResult<Obj> {
        let position = self.real_index(index, config)?;
        self.get_raw(position)
    }

    /// Element at a position, without translation or growth.
    pub fn get_raw(&self, position: usize) -> AnomalyResult<Obj> {
        let slot = self.data().slots.borrow().get(position).cloned();
        match slot {
            Some(slot) => slot.get(),
            None => Err(anomaly::no_list_element(
                i64::try_from(position).unwrap_or(i64::MAX),
                self.len(),
            )),
        }
    }

    /// Store a copy of `value` at a script index; returns the stored element.
    pub fn replace(&self, index: i64, value: &Obj, config: &Config) -> AnomalyResult<Obj> {
        self.assert_non_const()?;
        let position = self.real_index(index, config)?;
        let slot = copy_of(value, config)?;
        let element = slot.get()?;
        let previous = std::mem::replace(&mut self.data().slots.borrow_mut()[position], slot);
        drop(previous);
        Ok(element)
    }

    /// Erase the element at a script index and return it.
    pub fn remove(&self, index: i64, config: &Config) -> AnomalyResult<Obj> {
        self.assert_non_const()?;
        let position = self.real_index(index, config)?;
        let slot = self.data().slots.borrow_mut().remove(position);
        slot.get()
    }

    /// Insert a fresh zero before a script index and return it.
    ///
    /// Inserting at the length appends exactly one element.
    pub fn insert(&self, index: i64, config: &Config) -> AnomalyResult<Obj> {
        self.assert_non_const()?;
        self.check_room(1)?;
        let zero = Self::zero(config);
        if usize::try_from(index).is_ok_and(|i| i == self.len()) {
            self.data().slots.borrow_mut().push(Slot::Held(zero.clone()));
            return Ok(zero);
        }
        let position = self.real_index(index, config)?;
        self.data()
            .slots
            .borrow_mut()
            .insert(position, Slot::Held(zero.clone()));
        Ok(zero)
    }

    /// A native variable reading the length; writing it resizes.
    pub fn length(&self) -> Obj {
        let (read, write) = (self.downgrade(), self.downgrade());
        let name = self.full_name();
        let write_name = name.clone();
        Obj::native_variable(
            "length",
            NativeBinding::read_write(
                move |config| {
                    let list = read.upgrade_or(&name)?.as_list()?;
                    let len = i64::try_from(list.len()).unwrap_or(i64::MAX);
                    Ok(Scalar::Num(Number::integer(len, config)))
                },
                move |value, config| {
                    let list = write.upgrade_or(&write_name)?.as_list()?;
                    list.resize(integer_of(&value, config)?, config)
                },
            ),
        )
    }

    /// Copy the elements of `source` into this list.
    ///
    /// Positions both lists share are assigned in place: a variable element
    /// takes the source value and a list element is list-assigned, so every
    /// alias of the element sees the change. Other elements are replaced by
    /// copies. A constant list keeps its length and only overwrites the
    /// overlap; any other list then grows or shrinks to the length of
    /// `source`.
    pub fn assign(&self, source: &List, config: &Config) -> AnomalyResult<()> {
        if self.ptr_eq(source) {
            return Ok(());
        }
        let Some(_busy) = Busy::enter(&self.data().busy) else {
            return Ok(());
        };
        let sources = source.snapshot();
        let overlap = self.len().min(sources.len());
        for (position, slot) in sources.iter().enumerate().take(overlap) {
            match slot.get() {
                Ok(element) => self.assign_element(position, &element, config)?,
                Err(_) => self.replace_slot(position, slot.clone()),
            }
        }
        if self.is_const() {
            return Ok(());
        }
        if sources.len() > overlap {
            let tail = sources[overlap..]
                .iter()
                .map(|slot| copy_slot(slot, config))
                .collect::<AnomalyResult<Vec<_>>>()?;
            self.check_room(tail.len())?;
            self.data().slots.borrow_mut().extend(tail);
        } else {
            let removed: Vec<Slot> = self.data().slots.borrow_mut().drain(overlap..).collect();
            drop(removed);
        }
        Ok(())
    }

    fn assign_element(&self, position: usize, source: &Obj, config: &Config) -> AnomalyResult<()> {
        let current = self.data().slots.borrow()[position].get();
        if let Ok(target) = current {
            match (target.kind(), source.kind()) {
                (Kind::Variable, Kind::Variable) if !target.is_const() => {
                    return target.as_variable()?.assign_from(source, config);
                }
                (Kind::List, Kind::List) => {
                    let target = List(target);
                    if !target.data().busy.get() && !target.ptr_eq(source) {
                        let source = List(source.clone());
                        return ensure_sufficient_stack(|| target.assign(&source, config));
                    }
                }
                _ => {}
            }
        }
        let copy = copy_of(source, config)?;
        self.replace_slot(position, copy);
        Ok(())
    }

    fn replace_slot(&self, position: usize, slot: Slot) {
        let previous = std::mem::replace(&mut self.data().slots.borrow_mut()[position], slot);
        drop(previous);
    }

    /// A deep copy: an anonymous, non-constant list of copied elements.
    pub fn duplicate(&self, config: &Config) -> AnomalyResult<Obj> {
        let copies = self.copy_slots(config)?;
        let copy = List(Obj::list(""));
        *copy.data().slots.borrow_mut() = copies;
        Ok(copy.into_object())
    }

    fn copy_slots(&self, config: &Config) -> AnomalyResult<Vec<Slot>> {
        let Some(_busy) = Busy::enter(&self.data().busy) else {
            return Ok(self.snapshot());
        };
        ensure_sufficient_stack(|| {
            self.snapshot()
                .iter()
                .map(|slot| copy_slot(slot, config))
                .collect()
        })
    }

    /// Concatenated string forms of every element.
    ///
    /// A list reached again while it is being flattened contributes nothing.
    pub fn flatten(&self, config: &Config) -> AnomalyResult<String> {
        let Some(_busy) = Busy::enter(&self.data().busy) else {
            return Ok(String::new());
        };
        ensure_sufficient_stack(|| {
            let mut out = String::new();
            for slot in self.snapshot() {
                out.push_str(&slot.get()?.as_string(config)?);
            }
            Ok(out)
        })
    }
}

/// A value copy of whatever `slot` refers to. Dangling aliases stay as they
/// are.
fn copy_slot(slot: &Slot, config: &Config) -> AnomalyResult<Slot> {
    match slot {
        Slot::Held(obj) => copy_of(obj, config),
        Slot::Alias { target, .. } => match target.upgrade() {
            Some(obj) => copy_of(&obj, config),
            None => Ok(slot.clone()),
        },
    }
}

/// The slot a value copy of `value` occupies.
fn copy_of(value: &Obj, config: &Config) -> AnomalyResult<Slot> {
    match value.kind() {
        Kind::Variable => Ok(Slot::Held(value.as_variable()?.duplicate(config)?)),
        Kind::List => {
            let list = value.as_list()?;
            if list.data().busy.get() {
                return Ok(Slot::alias(value));
            }
            Ok(Slot::Held(list.duplicate(config)?))
        }
        Kind::Plain | Kind::Scope | Kind::Operator | Kind::Block => Ok(Slot::reference(value)),
    }
}

impl Deref for List {
    type Target = Obj;

    #[inline]
    fn deref(&self) -> &Obj {
        &self.0
    }
}

impl fmt::Debug for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("List")
            .field("name", &self.full_name())
            .field("len", &self.len())
            .finish()
    }
}
