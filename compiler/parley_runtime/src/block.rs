//! Blocks: named units of dialogue.
//!
//! A block is an operator whose body is script text. It remembers where that
//! text starts ([`Bookmark`]), collects what the body says into `out`, and
//! records whether it has ever been said. Its `next` list holds the blocks
//! the script may continue with; these are non-owning references.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::ops::Deref;

use parley_ir::SourcePos;

use crate::anomaly::{self, AnomalyResult};
use crate::builtins::NEXT;
use crate::list::List;
use crate::object::{Body, Obj, WeakObj};
use crate::operator::{Executor, Operator};
use crate::scope::{Scope, ScopeData};

/// Where a block body starts, and the scope it was defined in.
#[derive(Clone, Debug)]
pub struct Bookmark {
    pos: SourcePos,
    context: WeakObj,
}

impl Bookmark {
    pub fn new(pos: SourcePos, context: &Obj) -> Self {
        Bookmark {
            pos,
            context: context.downgrade(),
        }
    }

    /// A bookmark without a captured scope, for host-created blocks.
    pub fn detached(pos: SourcePos) -> Self {
        Bookmark {
            pos,
            context: WeakObj::new(),
        }
    }

    #[inline]
    pub fn pos(&self) -> SourcePos {
        self.pos
    }

    /// The scope the block was defined in, if it is still alive.
    pub fn context(&self) -> Option<Obj> {
        self.context.upgrade()
    }
}

pub(crate) struct BlockData {
    pub(crate) scope: ScopeData,
    bookmark: Bookmark,
    been_said: Cell<bool>,
    out: RefCell<String>,
}

impl BlockData {
    pub(crate) fn new(bookmark: Bookmark) -> Self {
        BlockData {
            scope: ScopeData::new(),
            bookmark,
            been_said: Cell::new(false),
            out: RefCell::new(String::new()),
        }
    }
}

/// A block view.
#[derive(Clone)]
pub struct Block(pub(crate) Obj);

impl Block {
    fn data(&self) -> &BlockData {
        match &self.0.body {
            Body::Block(data) => data,
            _ => unreachable!("Block view over a non-block object"),
        }
    }

    #[inline]
    pub fn object(&self) -> &Obj {
        &self.0
    }

    pub fn into_object(self) -> Obj {
        self.0
    }

    pub fn to_operator(&self) -> Operator {
        Operator(self.0.clone())
    }

    pub fn to_scope(&self) -> Scope {
        Scope(self.0.clone())
    }

    pub fn bookmark(&self) -> &Bookmark {
        &self.data().bookmark
    }

    /// True once the block has been operated successfully.
    #[inline]
    pub fn been_said(&self) -> bool {
        self.data().been_said.get()
    }

    pub fn set_been_said(&self, said: bool) {
        self.data().been_said.set(said);
    }

    /// Text said during the current or last run.
    pub fn out(&self) -> String {
        self.data().out.borrow().clone()
    }

    /// Append text on behalf of the executing body.
    pub fn say(&self, text: &str) {
        self.data().out.borrow_mut().push_str(text);
    }

    /// The list of successor references.
    pub fn next(&self) -> AnomalyResult<List> {
        self.to_scope()
            .member(NEXT)
            .ok_or_else(|| anomaly::id_not_found(&format!("{}:{NEXT}", self.full_name())))?
            .as_list()
    }

    /// Record `successor` as a block the script may continue with.
    pub fn add_next(&self, successor: &Obj) -> AnomalyResult<()> {
        successor.as_block()?;
        self.next()?.push_reference(successor)
    }

    /// The live successors, in the order they were added.
    pub fn successors(&self) -> AnomalyResult<Vec<Block>> {
        self.next()?
            .elements()?
            .iter()
            .map(Obj::as_block)
            .collect()
    }

    /// Run the block with one argument.
    ///
    /// Binds the argument into `in`, clears `out`, has the executor run the
    /// body and marks the block said. Returns a new string variable holding
    /// a copy of what the body said; later runs do not change it.
    #[tracing::instrument(level = "debug", skip_all, fields(block = %self.full_name()))]
    pub fn operate(&self, argument: &Obj, executor: &mut dyn Executor) -> AnomalyResult<Obj> {
        let config = executor.config();
        self.to_operator().bind(argument, &config)?;
        self.data().out.borrow_mut().clear();
        executor.execute_block(self)?;
        self.set_been_said(true);
        let said = self.out();
        tracing::debug!(len = said.len(), "block said");
        Ok(Obj::string("", said))
    }
}

impl Deref for Block {
    type Target = Obj;

    #[inline]
    fn deref(&self) -> &Obj {
        &self.0
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("name", &self.full_name())
            .field("pos", &self.bookmark().pos())
            .field("been_said", &self.been_said())
            .finish()
    }
}

#[cfg(test)]
mod tests;
