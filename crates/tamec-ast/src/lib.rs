//! Abstract syntax tree for the tame JavaScript dialect.
//!
//! The parser hands this crate a fully constructed tree rooted at
//! [`Program`], with accurate source line numbers. Three operations run
//! over it, in order:
//!
//! 1. **Condense** (`Node::condense`) - merges adjacent raw-text leaves
//!    into maximal atoms while preserving source line accounting. The
//!    only pass that mutates the tree.
//! 2. **Suspension analysis** (`Node::has_suspension_point`) - pure
//!    predicate reporting whether a subtree transitively contains a
//!    `twait` suspension point. Recomputed on demand, never cached.
//! 3. **Code generation** (the `tamec-emitter` crate) - walks the tree
//!    read-only, consulting the suspension analysis to decide between
//!    pass-through emission and a continuation-passing rewrite.
//!
//! Every node exclusively owns its children: the structure is a tree,
//! not a graph, with no sharing and no cycles.

mod condense;
mod dump;
mod node;

pub use node::{
    Atom, Block, Expr, ForIterClassic, ForStatement, FunctionDeclaration, IfElseStatement, Label,
    Node, Program, ReturnStatement, Str, TwaitStatement, WhileStatement,
};
