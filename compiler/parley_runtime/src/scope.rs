//! Scopes and identifier resolution.
//!
//! A scope owns its members by name and keeps an ordered list of imported
//! scopes. Resolution walks a compound identifier one segment at a time:
//! a member found locally is descended into, a miss falls back to the
//! imports in the order they were added.

use std::cell::{Cell, RefCell};
use std::ops::Deref;

use parley_ir::Identifier;
use parley_stack::ensure_sufficient_stack;
use rustc_hash::FxHashMap;

use crate::anomaly::{self, AnomalyResult};
use crate::builtins::{self, Builtins};
use crate::object::{Body, Obj, Object, WeakObj};

/// Member storage of a scope, operator or block.
pub(crate) struct ScopeData {
    members: RefCell<FxHashMap<String, Obj>>,
    imports: RefCell<Vec<WeakObj>>,
    /// Built-ins already materialized (or claimed by a registration).
    pub(crate) hooks: Cell<Builtins>,
}

impl ScopeData {
    pub(crate) fn new() -> Self {
        ScopeData {
            members: RefCell::new(FxHashMap::default()),
            imports: RefCell::new(Vec::new()),
            hooks: Cell::new(Builtins::empty()),
        }
    }
}

impl Drop for ScopeData {
    fn drop(&mut self) {
        for member in self.members.get_mut().values() {
            member.clear_parent();
        }
    }
}

/// A scope view over a scope, operator or block.
#[derive(Clone, Debug)]
pub struct Scope(pub(crate) Obj);

/// Key of an import search already under way: the scope searched and how
/// many segments were left. Identifiers are only ever shortened from the
/// front, so the count pins down the exact suffix.
type Visit = (*const Object, usize);

impl Scope {
    pub(crate) fn data(&self) -> &ScopeData {
        match &self.0.body {
            Body::Scope(data) => data,
            Body::Operator(operator) => &operator.scope,
            Body::Block(block) => &block.scope,
            _ => unreachable!("Scope view over a non-scope object"),
        }
    }

    #[inline]
    pub fn object(&self) -> &Obj {
        &self.0
    }

    pub fn into_object(self) -> Obj {
        self.0
    }

    /// Number of members currently registered.
    pub fn len(&self) -> usize {
        self.data().members.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every member, sorted by name.
    pub fn members(&self) -> Vec<Obj> {
        let mut members: Vec<(String, Obj)> = self
            .data()
            .members
            .borrow()
            .iter()
            .map(|(name, obj)| (name.clone(), obj.clone()))
            .collect();
        members.sort_by(|a, b| a.0.cmp(&b.0));
        members.into_iter().map(|(_, obj)| obj).collect()
    }

    /// Live imported scopes, in import order.
    pub fn imports(&self) -> Vec<Obj> {
        self.data()
            .imports
            .borrow()
            .iter()
            .filter_map(WeakObj::upgrade)
            .collect()
    }

    /// Local member lookup, materializing a built-in on first use.
    pub fn member(&self, name: &str) -> Option<Obj> {
        builtins::materialize(self, name);
        self.data().members.borrow().get(name).cloned()
    }

    /// True when `name` is a local member (built-ins included).
    pub fn contains(&self, name: &str) -> bool {
        builtins::materialize(self, name);
        self.data().members.borrow().contains_key(name)
    }

    /// Register `object` under its own name.
    ///
    /// The object is detached from any scope that owned it before. Returns
    /// the registered handle.
    pub fn register(&self, object: Obj) -> AnomalyResult<Obj> {
        self.assert_non_const()?;
        self.adopt(object)
    }

    /// [`Scope::register`] without the constness check. Used for re-keying
    /// on rename.
    pub(crate) fn adopt(&self, object: Obj) -> AnomalyResult<Obj> {
        let name = object.name();
        if self.contains(&name) {
            return Err(anomaly::already_exists(&name, &self.full_name()));
        }
        let mut ancestor = Some(self.0.clone());
        while let Some(scope) = ancestor {
            if scope.ptr_eq(&object) {
                return Err(anomaly::ownership_cycle(&object.full_name()));
            }
            ancestor = scope.parent();
        }
        if let Some(previous) = object.parent() {
            Scope(previous).detach(&object);
        }
        tracing::debug!(scope = %self.full_name(), name = %name, kind = %object.kind(), "register");
        self.insert(object.clone());
        Ok(object)
    }

    /// Insert without any checks. The caller guarantees the name is free.
    pub(crate) fn insert(&self, object: Obj) {
        object.set_parent(&self.0);
        let name = object.name();
        self.data().members.borrow_mut().insert(name, object);
    }

    /// Remove `object` if it is the member registered under its name.
    fn detach(&self, object: &Obj) {
        let name = object.name();
        let removed = {
            let mut members = self.data().members.borrow_mut();
            match members.get(&name) {
                Some(member) if member.ptr_eq(object) => members.remove(&name),
                _ => None,
            }
        };
        if let Some(removed) = removed {
            removed.clear_parent();
        }
    }

    /// Remove the member called `name` and hand it back.
    ///
    /// Asking for a name that is not a member is a runtime bug, reported as a
    /// panic-class anomaly.
    pub fn unregister(&self, name: &str) -> AnomalyResult<Obj> {
        let removed = self.data().members.borrow_mut().remove(name);
        let Some(removed) = removed else {
            return Err(anomaly::internal(format!(
                "'{name}' is not a member of '{}'",
                self.full_name()
            )));
        };
        removed.clear_parent();
        tracing::debug!(scope = %self.full_name(), name, "unregister");
        Ok(removed)
    }

    /// Remove every member. Built-ins are materialized again on next use.
    pub fn clear(&self) {
        let removed: Vec<Obj> = self
            .data()
            .members
            .borrow_mut()
            .drain()
            .map(|(_, obj)| obj)
            .collect();
        for obj in &removed {
            obj.clear_parent();
        }
        self.data().hooks.set(Builtins::empty());
        tracing::debug!(scope = %self.full_name(), removed = removed.len(), "clear");
    }

    /// True when `id` is non-empty and resolves from this scope.
    pub fn exists(&self, id: &str) -> bool {
        !id.is_empty() && self.try_resolve(&Identifier::parse(id)).is_some()
    }

    /// Make the members of `scope` visible from this scope.
    pub fn import(&self, scope: &Obj) -> AnomalyResult<()> {
        scope.as_scope()?;
        let already = scope.ptr_eq(&self.0)
            || self
                .data()
                .imports
                .borrow()
                .iter()
                .any(|import| import.points_to(scope));
        if already {
            return Err(anomaly::already_exists(
                &scope.full_name(),
                &self.full_name(),
            ));
        }
        tracing::debug!(scope = %self.full_name(), import = %scope.full_name(), "import");
        self.data().imports.borrow_mut().push(scope.downgrade());
        Ok(())
    }

    pub fn unimport(&self, scope: &Obj) -> AnomalyResult<()> {
        let mut imports = self.data().imports.borrow_mut();
        let Some(index) = imports.iter().position(|import| import.points_to(scope)) else {
            return Err(anomaly::not_imported(&scope.full_name()));
        };
        imports.remove(index);
        Ok(())
    }

    /// Resolve a compound identifier.
    ///
    /// A leading empty segment restarts resolution at the global scope. The
    /// anomaly names the identifier as written.
    #[tracing::instrument(level = "trace", skip(self), fields(scope = %self.full_name()))]
    pub fn resolve(&self, id: &Identifier) -> AnomalyResult<Obj> {
        self.try_resolve(id)
            .ok_or_else(|| anomaly::id_not_found(&id.to_string()))
    }

    /// [`Scope::resolve`] from script text.
    pub fn resolve_str(&self, text: &str) -> AnomalyResult<Obj> {
        self.resolve(&Identifier::parse(text))
    }

    /// [`Scope::resolve`] that reports a miss as `None`.
    pub fn try_resolve(&self, id: &Identifier) -> Option<Obj> {
        if id.is_empty() {
            return None;
        }
        let mut visited = Vec::new();
        if id.is_absolute() {
            let root = self.global_scope()?.as_scope().ok()?;
            return root.lookup(id.relative_segments(), &mut visited);
        }
        self.lookup(id.segments(), &mut visited)
    }

    fn lookup(&self, segments: &[String], visited: &mut Vec<Visit>) -> Option<Obj> {
        ensure_sufficient_stack(|| {
            let (head, rest) = segments.split_first()?;
            if head.is_empty() {
                return None;
            }
            if let Some(member) = self.member(head) {
                if rest.is_empty() {
                    return Some(member);
                }
                return member.as_scope().ok()?.lookup(rest, visited);
            }
            visited.push((self.as_ptr(), segments.len()));
            let imports = self.data().imports.borrow().clone();
            for import in imports {
                if visited.contains(&(import.as_ptr(), segments.len())) {
                    continue;
                }
                let Some(scope) = import.upgrade() else {
                    continue;
                };
                if let Some(found) = Scope(scope).lookup(segments, visited) {
                    return Some(found);
                }
            }
            None
        })
    }
}

impl Deref for Scope {
    type Target = Obj;

    #[inline]
    fn deref(&self) -> &Obj {
        &self.0
    }
}

#[cfg(test)]
mod tests;
