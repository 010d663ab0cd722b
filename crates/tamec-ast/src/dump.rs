//! Structural dump.
//!
//! Every node produces a plain nested-record representation (type tag,
//! line span where applicable, dumped children) suitable for snapshot
//! testing and debugging.

use serde_json::{Value, json};

use crate::node::{ForIterClassic, Node, Program};

impl Node {
    pub fn dump(&self) -> Value {
        match self {
            Node::Atom(a) => json!({
                "type": "Atom",
                "lines": [a.span.start, a.span.end],
                "value": a.text,
            }),
            Node::Label(l) => json!({
                "type": "Label",
                "value": l.text,
            }),
            Node::Str(s) => json!({
                "type": "String",
                "lines": [s.span.start, s.span.end],
                "value": s.text,
            }),
            Node::Expr(e) => json!({
                "type": "Expr",
                "atoms": e.elements.iter().map(Node::dump).collect::<Vec<_>>(),
            }),
            Node::Block(b) => json!({
                "type": "Block",
                "body": b.statements.iter().map(Node::dump).collect::<Vec<_>>(),
            }),
            Node::IfElse(s) => json!({
                "type": "IfElseStatement",
                "condExpr": s.cond_expr.dump(),
                "ifStatement": s.if_statement.dump(),
                "elseStatement": s.else_statement.dump(),
            }),
            Node::While(w) => json!({
                "type": "WhileStatement",
                "condExpr": w.cond_expr.dump(),
                "body": w.body.dump(),
            }),
            Node::For(f) => json!({
                "type": "ForStatement",
                "iter": f.iter.dump(),
                "body": f.body.dump(),
            }),
            Node::Function(f) => json!({
                "type": "FunctionDeclaration",
                "name": f.name,
                "params": f.params,
                "body": f.body.dump(),
            }),
            Node::Twait(t) => json!({
                "type": "TwaitStatement",
                "body": t.body.dump(),
            }),
            Node::Return(r) => json!({
                "type": "ReturnStatement",
                "expr": r.expr.dump(),
            }),
            Node::Program(p) => p.dump(),
        }
    }
}

impl ForIterClassic {
    pub fn dump(&self) -> Value {
        json!({
            "type": "ForIterClassic",
            "initExpr": self.init_expr.dump(),
            "condExpr": self.cond_expr.dump(),
            "incExpr": self.inc_expr.dump(),
        })
    }
}

impl Program {
    pub fn dump(&self) -> Value {
        json!({
            "statements": self.statements.iter().map(Node::dump).collect::<Vec<_>>(),
        })
    }
}
