//! Object visitor.
//!
//! Double dispatch over the closed set of object kinds. Override `visit_*`
//! for the kinds of interest; the defaults fall back along the kind
//! hierarchy (block to operator to scope to object) and `walk_scope`
//! continues into a scope's members.
//!
//! ```text
//! struct CountBlocks(usize);
//!
//! impl ObjectVisitor for CountBlocks {
//!     fn visit_block(&mut self, block: &Block) {
//!         self.0 += 1;
//!         walk_scope(self, &block.to_scope());
//!     }
//! }
//! ```

use crate::block::Block;
use crate::list::List;
use crate::object::Obj;
use crate::operator::Operator;
use crate::scope::Scope;
use crate::variable::Variable;

/// Object visitor trait.
///
/// The visitor can mutate its own state; the objects it is shown are shared
/// handles and can be mutated through their own operations.
pub trait ObjectVisitor {
    /// Any object. Plain objects land here directly.
    fn visit_object(&mut self, object: &Obj) {
        let _ = object;
    }

    /// A scope. The default walks its members.
    fn visit_scope(&mut self, scope: &Scope) {
        walk_scope(self, scope);
    }

    fn visit_variable(&mut self, variable: &Variable) {
        self.visit_object(variable);
    }

    fn visit_list(&mut self, list: &List) {
        self.visit_object(list);
    }

    fn visit_operator(&mut self, operator: &Operator) {
        self.visit_scope(&operator.to_scope());
    }

    fn visit_block(&mut self, block: &Block) {
        self.visit_operator(&block.to_operator());
    }
}

/// Visit every member of `scope`, in name order.
pub fn walk_scope<V: ObjectVisitor + ?Sized>(visitor: &mut V, scope: &Scope) {
    for member in scope.members() {
        member.accept(visitor);
    }
}
