//! tamec: the AST and CPS code-generation core of the tame compiler.
//!
//! tame is a JavaScript dialect with a blocking-looking asynchronous
//! construct, `twait`, marking a suspension point. This crate takes the
//! parsed program tree and decides, subtree by subtree, whether a
//! construct must be rewritten into explicit continuation-passing form;
//! if so it is emitted as a chain of functions each accepting a trailing
//! continuation parameter, invoked once the subtree's effect completes.
//! Synchronous subtrees pass through structurally unchanged.
//!
//! The pipeline is: parser (external) → [`Program`] tree → condense
//! (merge adjacent text leaves in place) → code generation (read-only).
//! [`compile`] runs the whole pipeline on a tree and renders the result.
//!
//! ```
//! use tamec::ast::{Expr, Node, Program};
//!
//! let mut program = Program::new(vec![Node::Expr(Expr::from_text(1, "x = 1;"))]);
//! let js = tamec::compile(&mut program).unwrap();
//! assert_eq!(js, "x = 1;\n");
//! ```

pub use tamec_ast as ast;
pub use tamec_common as common;
pub use tamec_emitter as emitter;

pub use tamec_ast::{Node, Program};
pub use tamec_emitter::{EmitContext, EmitError, EmitOptions, Output, compile_program};

/// Condense, generate, and render a whole program with default options.
#[tracing::instrument(level = "debug", skip_all)]
pub fn compile(program: &mut Program) -> Result<String, EmitError> {
    let mut ctx = EmitContext::new();
    compile_with_context(program, &mut ctx)
}

/// Same as [`compile`], but with a caller-configured context (reserved
/// identifiers, emit options).
pub fn compile_with_context(
    program: &mut Program,
    ctx: &mut EmitContext,
) -> Result<String, EmitError> {
    program.condense();
    let output = compile_program(program, ctx)?;
    Ok(output.render(&ctx.options))
}
