//! Recursive CPS code generation.
//!
//! Each statement compiles through one of two strategies, chosen locally
//! from its own `has_suspension_point()`:
//!
//! - `emit_statement` - pass-through: structurally equivalent plain
//!   JavaScript, no continuation threading;
//! - `compile_unit` - a named CPS unit `var f = function (k) { ... };`
//!   whose final action invokes `k`.
//!
//! A non-suspending statement that sits inside a suspending sequence is
//! wrapped in a generic unit (its pass-through emission followed by
//! `k ();`), so the inner code keeps its original shape.

use tamec_ast::{
    Block, Expr, ForStatement, FunctionDeclaration, IfElseStatement, Node, Program,
    ReturnStatement, TwaitStatement, WhileStatement,
};

use crate::context::EmitContext;
use crate::error::EmitError;
use crate::output::Output;

/// Compile a whole program.
///
/// Top-level statements are generated in sequence without continuation
/// threading between them (top level has no enclosing continuation): a
/// suspending statement's unit is declared and immediately invoked with
/// an empty continuation.
#[tracing::instrument(level = "trace", skip_all, fields(statements = program.statements.len()))]
pub fn compile_program(program: &Program, ctx: &mut EmitContext) -> Result<Output, EmitError> {
    let mut out = Output::new();
    for statement in &program.statements {
        // A declaration stays a declaration even when its body suspends;
        // the body transform happens inside the declaration emission.
        let needs_cps =
            statement.has_suspension_point() && !matches!(statement, Node::Function(_));
        if needs_cps {
            tracing::trace!(
                kind = statement.kind_name(),
                line = statement.start_line(),
                "top-level statement suspends, compiling as CPS unit"
            );
            let unit = compile_unit(statement, ctx)?;
            let name = unit_name(&unit, statement.start_line())?;
            out.splice(unit);
            out.add_line(format!("{name} (function () {{}});"));
        } else {
            emit_statement(statement, ctx, &mut out)?;
        }
    }
    Ok(out)
}

// =========================================================================
// Pass-through emission
// =========================================================================

fn emit_statement(node: &Node, ctx: &mut EmitContext, out: &mut Output) -> Result<(), EmitError> {
    match node {
        Node::Atom(a) => out.add_line(&a.text),
        Node::Str(s) => out.add_line(&s.text),
        Node::Label(l) => out.add_line(&l.text),
        Node::Expr(e) => {
            for element in &e.elements {
                emit_statement(element, ctx, out)?;
            }
        }
        Node::Block(b) => {
            for statement in &b.statements {
                emit_statement(statement, ctx, out)?;
            }
        }
        Node::IfElse(s) => emit_if_else(s, ctx, out)?,
        Node::While(w) => emit_while(w, ctx, out)?,
        Node::For(f) => emit_for(f, ctx, out)?,
        Node::Function(f) => emit_function_declaration(f, ctx, out)?,
        Node::Return(r) => emit_return(r, ctx, out)?,
        Node::Twait(t) => {
            return Err(EmitError::MisplacedTwait {
                line: t.start_line,
            });
        }
        Node::Program(_) => {
            return Err(EmitError::UnsupportedConstruct {
                line: node.start_line(),
                kind: node.kind_name(),
            });
        }
    }
    Ok(())
}

fn emit_if_else(
    stmt: &IfElseStatement,
    ctx: &mut EmitContext,
    out: &mut Output,
) -> Result<(), EmitError> {
    let cond = inline_expr(&stmt.cond_expr)?;
    out.add_line(format!("if ({cond}) {{"));
    out.indent();
    emit_statement(&stmt.if_statement, ctx, out)?;
    out.unindent();
    if is_empty_block(&stmt.else_statement) {
        out.add_line("}");
    } else {
        out.add_line("} else {");
        out.indent();
        emit_statement(&stmt.else_statement, ctx, out)?;
        out.unindent();
        out.add_line("}");
    }
    Ok(())
}

fn emit_while(
    stmt: &WhileStatement,
    ctx: &mut EmitContext,
    out: &mut Output,
) -> Result<(), EmitError> {
    let cond = inline_expr(&stmt.cond_expr)?;
    match &stmt.label {
        Some(label) => out.add_line(format!("{label}: while ({cond}) {{")),
        None => out.add_line(format!("while ({cond}) {{")),
    }
    out.indent();
    emit_statement(&stmt.body, ctx, out)?;
    out.unindent();
    out.add_line("}");
    Ok(())
}

fn emit_for(stmt: &ForStatement, ctx: &mut EmitContext, out: &mut Output) -> Result<(), EmitError> {
    let init = inline_expr(&stmt.iter.init_expr)?;
    let cond = inline_expr(&stmt.iter.cond_expr)?;
    let inc = inline_expr(&stmt.iter.inc_expr)?;
    match &stmt.label {
        Some(label) => out.add_line(format!("{label}: for ({init}; {cond}; {inc}) {{")),
        None => out.add_line(format!("for ({init}; {cond}; {inc}) {{")),
    }
    out.indent();
    emit_statement(&stmt.body, ctx, out)?;
    out.unindent();
    out.add_line("}");
    Ok(())
}

/// Emit a function declaration on either path.
///
/// With no suspension point in the body the declaration is emitted
/// unchanged. Otherwise one trailing continuation parameter is appended
/// to the declared list and the body becomes a continuation chain whose
/// final action invokes that parameter; nested returns invoke it with
/// the return value instead of a native `return`.
fn emit_function_declaration(
    func: &FunctionDeclaration,
    ctx: &mut EmitContext,
    out: &mut Output,
) -> Result<(), EmitError> {
    let body = expect_block(&func.body)?;
    if !func.body.has_suspension_point() {
        out.add_line(format!(
            "function {} ({}) {{",
            func.name,
            func.params.join(", ")
        ));
        out.indent();
        ctx.enter_function(None);
        let mut result = Ok(());
        for statement in &body.statements {
            result = emit_statement(statement, ctx, out);
            if result.is_err() {
                break;
            }
        }
        ctx.exit_function();
        result?;
        out.unindent();
        out.add_line("}");
    } else {
        let cont = ctx.fresh_name();
        let mut params = func.params.clone();
        params.push(cont.clone());
        out.add_line(format!("function {} ({}) {{", func.name, params.join(", ")));
        out.indent();
        ctx.enter_function(Some(cont.clone()));
        let result = emit_chain(&body.statements, ctx, out, &cont);
        ctx.exit_function();
        result?;
        out.unindent();
        out.add_line("}");
    }
    Ok(())
}

fn emit_return(
    ret: &ReturnStatement,
    ctx: &mut EmitContext,
    out: &mut Output,
) -> Result<(), EmitError> {
    let value = return_value(ret)?;
    // Inside a transformed function a return is an unconditional
    // invocation of the appended continuation parameter.
    match (ctx.return_continuation(), value) {
        (Some(cont), Some(value)) => out.add_line(format!("{cont} ({value});")),
        (Some(cont), None) => out.add_line(format!("{cont} ();")),
        (None, Some(value)) => out.add_line(format!("return {value};")),
        (None, None) => out.add_line("return;"),
    }
    Ok(())
}

// =========================================================================
// CPS units
// =========================================================================

/// Compile one statement into a named CPS unit.
#[tracing::instrument(
    level = "trace",
    skip_all,
    fields(kind = node.kind_name(), line = node.start_line())
)]
fn compile_unit(node: &Node, ctx: &mut EmitContext) -> Result<Output, EmitError> {
    match node {
        Node::Twait(t) => twait_unit(t, ctx),
        Node::Return(r) => return_unit(r, ctx),
        Node::Expr(e) => expr_unit(e, ctx),
        node if !node.has_suspension_point() => generic_unit(node, ctx),
        Node::Block(b) => block_unit(b, ctx),
        Node::IfElse(s) => if_else_unit(s, ctx),
        Node::While(w) => while_unit(w, ctx),
        Node::For(f) => for_unit(f, ctx),
        // A declaration is synchronous even when its body suspends.
        Node::Function(_) => generic_unit(node, ctx),
        node => Err(EmitError::UnsupportedConstruct {
            line: node.start_line(),
            kind: node.kind_name(),
        }),
    }
}

/// Wrap a non-suspending statement: pass-through emission bracketed by
/// the unit header and the continuation invocation.
fn generic_unit(node: &Node, ctx: &mut EmitContext) -> Result<Output, EmitError> {
    let name = ctx.fresh_name();
    let mut out = Output::with_name(&name);
    out.add_line(format!("var {name} = function (k) {{"));
    out.indent();
    emit_statement(node, ctx, &mut out)?;
    out.add_line("k ();");
    out.unindent();
    out.add_line("};");
    Ok(out)
}

/// The leaf CPS unit: a one-shot computation bracketed by entry and
/// continuation invocation. Literal elements become verbatim lines;
/// nested constructs are compiled as their own fragments and spliced in.
fn expr_unit(expr: &Expr, ctx: &mut EmitContext) -> Result<Output, EmitError> {
    let name = ctx.fresh_name();
    let mut out = Output::with_name(&name);
    out.add_line(format!("var {name} = function (k) {{"));
    out.indent();
    for element in &expr.elements {
        match element {
            Node::Atom(a) => out.add_line(&a.text),
            Node::Str(s) => out.add_line(&s.text),
            Node::Label(l) => out.add_line(&l.text),
            nested => {
                let fragment = compile_unit(nested, ctx)?;
                out.splice(fragment);
            }
        }
    }
    out.add_line("k ();");
    out.unindent();
    out.add_line("};");
    Ok(out)
}

fn block_unit(block: &Block, ctx: &mut EmitContext) -> Result<Output, EmitError> {
    let name = ctx.fresh_name();
    let mut out = Output::with_name(&name);
    out.add_line(format!("var {name} = function (k) {{"));
    out.indent();
    emit_chain(&block.statements, ctx, &mut out, "k")?;
    out.unindent();
    out.add_line("};");
    Ok(out)
}

/// Compile a statement sequence as a continuation chain into `out`.
///
/// Each statement becomes an independent unit; statement *i*'s
/// continuation is a closure invoking statement *i+1*'s unit, and the
/// last unit receives `cont` (an identifier naming the sequence's own
/// incoming continuation). Statements after an unconditional return are
/// dead code and are not generated.
fn emit_chain(
    statements: &[Node],
    ctx: &mut EmitContext,
    out: &mut Output,
    cont: &str,
) -> Result<(), EmitError> {
    let live = truncate_after_return(statements);
    if live.len() < statements.len() {
        tracing::debug!(
            suppressed = statements.len() - live.len(),
            line = statements[live.len()].start_line(),
            "dropping unreachable statements after return"
        );
    }
    if live.is_empty() {
        out.add_line(format!("{cont} ();"));
        return Ok(());
    }

    let mut names = Vec::with_capacity(live.len());
    for statement in live {
        let unit = compile_unit(statement, ctx)?;
        names.push(unit_name(&unit, statement.start_line())?);
        out.splice(unit);
    }

    // s1 (function () { s2 (function () { s3 (k); }); });
    let mut call = format!("{} ({});", names[names.len() - 1], cont);
    for name in names[..names.len() - 1].iter().rev() {
        call = format!("{name} (function () {{ {call} }});");
    }
    out.add_line(call);
    Ok(())
}

fn truncate_after_return(statements: &[Node]) -> &[Node] {
    match statements.iter().position(|s| matches!(s, Node::Return(_))) {
        Some(i) => &statements[..=i],
        None => statements,
    }
}

/// Both branches compile to units that receive the *same* continuation:
/// whichever branch runs, control joins back at the statement(s) after
/// the if/else.
fn if_else_unit(stmt: &IfElseStatement, ctx: &mut EmitContext) -> Result<Output, EmitError> {
    let name = ctx.fresh_name();
    let cond = inline_expr(&stmt.cond_expr)?;
    let mut out = Output::with_name(&name);
    out.add_line(format!("var {name} = function (k) {{"));
    out.indent();
    let then_unit = compile_unit(&stmt.if_statement, ctx)?;
    let then_name = unit_name(&then_unit, stmt.start_line)?;
    out.splice(then_unit);
    let else_unit = compile_unit(&stmt.else_statement, ctx)?;
    let else_name = unit_name(&else_unit, stmt.start_line)?;
    out.splice(else_unit);
    out.add_line(format!("if ({cond}) {{"));
    out.indent();
    out.add_line(format!("{then_name} (k);"));
    out.unindent();
    out.add_line("} else {");
    out.indent();
    out.add_line(format!("{else_name} (k);"));
    out.unindent();
    out.add_line("}");
    out.unindent();
    out.add_line("};");
    Ok(out)
}

/// Reify iteration as a named step function: a suspension point in the
/// body means execution may yield between iterations, so the generated
/// code cannot rely on the native loop construct to resume. The step
/// evaluates the condition; on true it runs the body unit, whose
/// continuation re-invokes the step; on false it invokes the loop's own
/// continuation, exactly once. A loop label names the step function so
/// labeled jumps can target it.
fn while_unit(stmt: &WhileStatement, ctx: &mut EmitContext) -> Result<Output, EmitError> {
    let name = ctx.fresh_name();
    let step = match &stmt.label {
        Some(label) => label.clone(),
        None => ctx.fresh_name(),
    };
    let cond = inline_expr(&stmt.cond_expr)?;
    let mut out = Output::with_name(&name);
    out.add_line(format!("var {name} = function (k) {{"));
    out.indent();
    out.add_line(format!("var {step} = function () {{"));
    out.indent();
    out.add_line(format!("if ({cond}) {{"));
    out.indent();
    let body_unit = compile_unit(&stmt.body, ctx)?;
    let body_name = unit_name(&body_unit, stmt.start_line)?;
    out.splice(body_unit);
    out.add_line(format!("{body_name} (function () {{ {step} (); }});"));
    out.unindent();
    out.add_line("} else {");
    out.indent();
    out.add_line("k ();");
    out.unindent();
    out.add_line("}");
    out.unindent();
    out.add_line("};");
    out.add_line(format!("{step} ();"));
    out.unindent();
    out.add_line("};");
    Ok(out)
}

/// Same reconstruction as [`while_unit`], with the init clause run once
/// on entry and the increment clause run in the body's continuation
/// before the step re-invocation.
fn for_unit(stmt: &ForStatement, ctx: &mut EmitContext) -> Result<Output, EmitError> {
    let name = ctx.fresh_name();
    let step = match &stmt.label {
        Some(label) => label.clone(),
        None => ctx.fresh_name(),
    };
    let init = inline_expr(&stmt.iter.init_expr)?;
    let cond = inline_expr(&stmt.iter.cond_expr)?;
    let inc = inline_expr(&stmt.iter.inc_expr)?;
    let mut out = Output::with_name(&name);
    out.add_line(format!("var {name} = function (k) {{"));
    out.indent();
    out.add_line(format!("{init};"));
    out.add_line(format!("var {step} = function () {{"));
    out.indent();
    out.add_line(format!("if ({cond}) {{"));
    out.indent();
    let body_unit = compile_unit(&stmt.body, ctx)?;
    let body_name = unit_name(&body_unit, stmt.start_line)?;
    out.splice(body_unit);
    out.add_line(format!("{body_name} (function () {{ {inc}; {step} (); }});"));
    out.unindent();
    out.add_line("} else {");
    out.indent();
    out.add_line("k ();");
    out.unindent();
    out.add_line("}");
    out.unindent();
    out.add_line("};");
    out.add_line(format!("{step} ();"));
    out.unindent();
    out.add_line("};");
    Ok(out)
}

/// The suspension point: the wrapped expression is emitted as a call
/// whose final argument is the unit's continuation. Whatever the call
/// does asynchronously decides when that continuation fires; this layer
/// does not validate the waited-upon operation's contract.
fn twait_unit(stmt: &TwaitStatement, ctx: &mut EmitContext) -> Result<Output, EmitError> {
    let name = ctx.fresh_name();
    let call = inline_expr(&stmt.body)?;
    let mut out = Output::with_name(&name);
    out.add_line(format!("var {name} = function (k) {{"));
    out.indent();
    out.add_line(append_continuation(&call, "k"));
    out.unindent();
    out.add_line("};");
    Ok(out)
}

/// A return inside a continuation chain invokes the enclosing
/// transformed function's continuation parameter, ignoring its own `k`:
/// nothing after an unconditional return may run.
fn return_unit(ret: &ReturnStatement, ctx: &mut EmitContext) -> Result<Output, EmitError> {
    let cont = ctx
        .return_continuation()
        .ok_or(EmitError::ReturnOutsideFunction {
            line: ret.start_line,
        })?
        .to_string();
    let value = return_value(ret)?;
    let name = ctx.fresh_name();
    let mut out = Output::with_name(&name);
    out.add_line(format!("var {name} = function (k) {{"));
    out.indent();
    match value {
        Some(value) => out.add_line(format!("{cont} ({value});")),
        None => out.add_line(format!("{cont} ();")),
    }
    out.unindent();
    out.add_line("};");
    Ok(out)
}

// =========================================================================
// Helpers
// =========================================================================

fn unit_name(unit: &Output, line: u32) -> Result<String, EmitError> {
    match unit.name() {
        Some(name) => Ok(name.to_string()),
        None => Err(EmitError::Internal {
            line,
            message: "CPS unit fragment has no name",
        }),
    }
}

fn expect_block<'a>(node: &'a Node) -> Result<&'a Block, EmitError> {
    match node {
        Node::Block(b) => Ok(b),
        other => Err(EmitError::UnsupportedConstruct {
            line: other.start_line(),
            kind: other.kind_name(),
        }),
    }
}

fn is_empty_block(node: &Node) -> bool {
    matches!(node, Node::Block(b) if b.statements.is_empty())
}

fn return_value(ret: &ReturnStatement) -> Result<Option<String>, EmitError> {
    match &*ret.expr {
        Node::Expr(e) if e.is_empty() => Ok(None),
        node => inline_expr(node).map(Some),
    }
}

/// Render an expression on a single line, for conditions, for-clauses,
/// return values, and twait bodies. Element texts are joined with single
/// spaces and internal newline padding is flattened; a trailing
/// statement semicolon is dropped. An expression with zero elements
/// cannot provide the required text and fails fast.
fn inline_expr(node: &Node) -> Result<String, EmitError> {
    match node {
        Node::Expr(e) => {
            if e.elements.is_empty() {
                return Err(EmitError::EmptyExpression {
                    line: e.span.start,
                });
            }
            let mut parts = Vec::with_capacity(e.elements.len());
            for element in &e.elements {
                parts.push(inline_leaf(element)?);
            }
            Ok(strip_trailing_semicolon(&parts.join(" ")))
        }
        node => inline_leaf(node).map(|text| strip_trailing_semicolon(&text)),
    }
}

fn inline_leaf(node: &Node) -> Result<String, EmitError> {
    match node {
        Node::Atom(a) => Ok(flatten(&a.text)),
        Node::Str(s) => Ok(flatten(&s.text)),
        Node::Label(l) => Ok(l.text.clone()),
        other => Err(EmitError::UnsupportedConstruct {
            line: other.start_line(),
            kind: other.kind_name(),
        }),
    }
}

fn flatten(text: &str) -> String {
    text.split('\n')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_trailing_semicolon(text: &str) -> String {
    text.trim_end()
        .trim_end_matches(';')
        .trim_end()
        .to_string()
}

/// Rewrite a call so that `cont` is its final argument: `foo (a)`
/// becomes `foo (a, cont);`, `go ()` becomes `go (cont);`. Text that is
/// not syntactically a call is treated as a function value and invoked
/// with the continuation.
fn append_continuation(call: &str, cont: &str) -> String {
    let text = call.trim_end();
    if text.ends_with(')') {
        if let Some(open) = matching_open_paren(text) {
            let inner = &text[open + 1..text.len() - 1];
            if inner.trim().is_empty() {
                let callee = text[..open].trim_end();
                return format!("{callee} ({cont});");
            }
            let head = text[..text.len() - 1].trim_end();
            return format!("{head}, {cont});");
        }
    }
    format!("{text} ({cont});")
}

/// Index of the `(` matching the final `)` of `text`, tracking string
/// quoting so parentheses inside literals do not confuse the pairing.
fn matching_open_paren(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut stack: Vec<usize> = Vec::new();
    let mut quote: Option<u8> = None;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == b'\\' {
                    i += 1;
                } else if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'\'' | b'"' => quote = Some(b),
                b'(' => stack.push(i),
                b')' => {
                    let open = stack.pop()?;
                    if i == bytes.len() - 1 {
                        return Some(open);
                    }
                }
                _ => {}
            },
        }
        i += 1;
    }
    None
}
