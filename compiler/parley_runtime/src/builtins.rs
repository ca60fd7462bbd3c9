//! Lazily materialized built-in members.
//!
//! Every scope answers to `name`, `fullname` and `doc`; operators and blocks
//! also carry `in`, and blocks carry `next` and `beenSaid`. None of these
//! exist until something looks them up: the first lookup of a built-in name
//! builds the member and registers it. A one-shot flag per built-in is set
//! before the member is built, so building it never re-enters the hook.

use bitflags::bitflags;

use crate::object::{Kind, Obj, WeakObj};
use crate::scalar::Scalar;
use crate::scope::Scope;
use crate::variable::{Computed, NativeBinding};

pub const NAME: &str = "name";
pub const FULLNAME: &str = "fullname";
pub const DOC: &str = "doc";
pub const INPUT: &str = "in";
pub const NEXT: &str = "next";
pub const BEEN_SAID: &str = "beenSaid";

bitflags! {
    /// Built-ins a scope has already materialized.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub(crate) struct Builtins: u8 {
        const NAME = 1 << 0;
        const FULLNAME = 1 << 1;
        const DOC = 1 << 2;
        /// Operators and blocks only.
        const INPUT = 1 << 3;
        /// Blocks only.
        const NEXT = 1 << 4;
        /// Blocks only.
        const BEEN_SAID = 1 << 5;
    }
}

impl Builtins {
    /// The built-in a member called `name` would be, for a scope of `kind`.
    fn for_member(name: &str, kind: Kind) -> Option<Builtins> {
        match name {
            NAME => Some(Builtins::NAME),
            FULLNAME => Some(Builtins::FULLNAME),
            DOC => Some(Builtins::DOC),
            INPUT if matches!(kind, Kind::Operator | Kind::Block) => Some(Builtins::INPUT),
            NEXT if kind == Kind::Block => Some(Builtins::NEXT),
            BEEN_SAID if kind == Kind::Block => Some(Builtins::BEEN_SAID),
            _ => None,
        }
    }
}

/// Build and register the built-in called `name`, once per scope.
pub(crate) fn materialize(scope: &Scope, name: &str) {
    let Some(flag) = Builtins::for_member(name, scope.kind()) else {
        return;
    };
    let data = scope.data();
    let done = data.hooks.get();
    if done.contains(flag) {
        return;
    }
    data.hooks.set(done | flag);

    let owner = scope.downgrade();
    let member = if flag == Builtins::NAME {
        name_variable(owner)
    } else if flag == Builtins::FULLNAME {
        fullname_variable(owner)
    } else if flag == Builtins::DOC {
        Obj::string(DOC, "")
    } else if flag == Builtins::INPUT {
        Obj::list(INPUT)
    } else if flag == Builtins::NEXT {
        Obj::list(NEXT)
    } else {
        been_said_variable(owner)
    };
    tracing::trace!(scope = %scope.full_name(), member = name, "materialize built-in");
    scope.insert(member);
}

/// Reads the owner's name; writing renames the owner.
fn name_variable(owner: WeakObj) -> Obj {
    let setter_owner = owner.clone();
    Obj::native_variable(
        NAME,
        NativeBinding::read_write(
            move |_| Ok(Scalar::Str(owner.upgrade_or(NAME)?.name())),
            move |value, config| {
                let owner = setter_owner.upgrade_or(NAME)?;
                owner.set_name(&value.as_string(config))
            },
        ),
    )
}

fn fullname_variable(owner: WeakObj) -> Obj {
    Obj::computed_variable(
        FULLNAME,
        Computed::new(move |_| Ok(Scalar::Str(owner.upgrade_or(FULLNAME)?.full_name()))),
    )
}

fn been_said_variable(owner: WeakObj) -> Obj {
    let setter_owner = owner.clone();
    Obj::native_variable(
        BEEN_SAID,
        NativeBinding::read_write(
            move |_| {
                let block = owner.upgrade_or(BEEN_SAID)?.as_block()?;
                Ok(Scalar::Bool(block.been_said()))
            },
            move |value, config| {
                let block = setter_owner.upgrade_or(BEEN_SAID)?.as_block()?;
                block.set_been_said(value.as_bool(config));
                Ok(())
            },
        ),
    )
}

#[cfg(test)]
mod tests;
