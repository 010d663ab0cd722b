//! Continuation-passing-style code generator for the tamec compiler.
//!
//! # Architecture
//!
//! Generation is a single synchronous, deterministic pass over a
//! condensed AST. Every statement node has two emission paths:
//!
//! - **pass-through**: structurally equivalent plain JavaScript, used
//!   whenever the node's own subtree contains no suspension point;
//! - **CPS unit**: a named fragment `var f = function (k) { ... };`
//!   whose final action invokes its continuation `k`, used whenever the
//!   subtree does suspend.
//!
//! The choice is made locally at every compound node from
//! `has_suspension_point()`, so only the minimal enclosing subtrees that
//! actually reach a suspension point pay the rewrite cost.
//!
//! The [`EmitContext`] is the single capability boundary the generator
//! needs: fresh globally-unique identifier allocation plus emit options.
//! Generated text accumulates in [`Output`] buffers, which are append
//! only: once a line or a spliced fragment is in, it is never inspected
//! or reordered.

mod codegen;
mod context;
mod error;
mod output;

pub use codegen::compile_program;
pub use context::{EmitContext, EmitOptions};
pub use error::EmitError;
pub use output::Output;
