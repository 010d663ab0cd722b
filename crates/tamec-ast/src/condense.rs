//! The condense pass.
//!
//! Collapses many small lexical fragments (identifiers, operators,
//! punctuation) into as few text runs as possible, so that downstream
//! generation emits as few output lines as possible while keeping exact
//! source-line correspondence for line mapping.

use tamec_common::LineSpan;

use crate::node::{Expr, Node};

impl Node {
    /// Recursively condense this node and its children in place.
    ///
    /// The default behavior recurses into the children; an expression
    /// runs the atom-merge scan over its element list instead. Condense
    /// is idempotent: a second pass finds no adjacent convertible pairs
    /// left to merge.
    pub fn condense(&mut self) {
        match self {
            Node::Expr(expr) => expr.condense(),
            Node::Program(program) => program.condense(),
            _ => {
                for child in self.children_mut() {
                    child.condense();
                }
            }
        }
    }
}

impl Expr {
    /// Merge every maximal run of atom-convertible elements into one
    /// atom; non-convertible elements are hard boundaries that are never
    /// merged across (they are condensed recursively instead).
    ///
    /// Afterwards the expression's span is set from the first and last
    /// output elements. An empty element list is a no-op leaving the
    /// spans unchanged.
    pub fn condense(&mut self) {
        if self.elements.is_empty() {
            return;
        }

        let mut condensed: Vec<Node> = Vec::with_capacity(self.elements.len());
        // Whether the last pushed element is an open merge target.
        let mut merging = false;

        for mut element in self.elements.drain(..) {
            match element.to_atom() {
                None => {
                    element.condense();
                    condensed.push(element);
                    merging = false;
                }
                Some(atom) => {
                    if merging {
                        if let Some(Node::Atom(target)) = condensed.last_mut() {
                            target.merge(&atom);
                        }
                    } else {
                        condensed.push(Node::Atom(atom));
                        merging = true;
                    }
                }
            }
        }

        // Non-empty input guarantees non-empty output.
        if let (Some(first), Some(last)) = (condensed.first(), condensed.last()) {
            self.span = LineSpan::new(first.start_line(), last.end_line());
        }
        self.elements = condensed;
    }
}

#[cfg(test)]
mod tests {
    use tamec_common::LineSpan;

    use crate::node::{Atom, Block, Expr, Label, Node, Str, TwaitStatement};

    fn atom(line: u32, text: &str) -> Node {
        Node::Atom(Atom::new(line, text))
    }

    #[test]
    fn consecutive_lines_merge_with_newline() {
        // Atoms on consecutive source lines 3 and 4 collapse into a
        // single atom spanning [3, 4].
        let mut expr = Expr::new(vec![atom(3, "var x = 1;"), atom(4, "var y = 2;")]);
        expr.condense();
        assert_eq!(expr.elements.len(), 1);
        let Node::Atom(merged) = &expr.elements[0] else {
            panic!("expected a single merged atom");
        };
        assert_eq!(merged.text, "var x = 1;\nvar y = 2;");
        assert_eq!(merged.span, LineSpan::new(3, 4));
        assert_eq!(expr.span, LineSpan::new(3, 4));
    }

    #[test]
    fn non_convertible_elements_are_hard_boundaries() {
        let mut expr = Expr::new(vec![
            atom(1, "log ("),
            Node::Str(Str::new(LineSpan::line(1), "\"a(b\"")),
            atom(1, ")"),
            atom(1, ";"),
        ]);
        expr.condense();
        assert_eq!(expr.elements.len(), 3);
        assert!(matches!(expr.elements[0], Node::Atom(_)));
        assert!(matches!(expr.elements[1], Node::Str(_)));
        let Node::Atom(tail) = &expr.elements[2] else {
            panic!("expected trailing atoms to merge");
        };
        assert_eq!(tail.text, ") ;");
    }

    #[test]
    fn labels_convert_and_merge() {
        let mut expr = Expr::new(vec![
            Node::Label(Label::new(2, "retry")),
            atom(2, ":"),
            atom(2, "go ();"),
        ]);
        expr.condense();
        assert_eq!(expr.elements.len(), 1);
        let Node::Atom(merged) = &expr.elements[0] else {
            panic!("expected one atom");
        };
        assert_eq!(merged.text, "retry : go ();");
    }

    #[test]
    fn empty_expr_is_a_no_op() {
        let mut expr = Expr::new(vec![]);
        let span_before = expr.span;
        expr.condense();
        assert!(expr.elements.is_empty());
        assert_eq!(expr.span, span_before);
    }

    #[test]
    fn condense_recurses_into_nested_constructs() {
        let nested = Node::Block(Block::new(
            2,
            vec![Node::Expr(Expr::new(vec![atom(2, "a"), atom(3, "b")]))],
        ));
        let mut root = Node::Block(Block::new(1, vec![nested]));
        root.condense();

        let Node::Block(outer) = &root else {
            unreachable!()
        };
        let Node::Block(inner) = &outer.statements[0] else {
            unreachable!()
        };
        let Node::Expr(expr) = &inner.statements[0] else {
            unreachable!()
        };
        assert_eq!(expr.elements.len(), 1);
    }

    #[test]
    fn condense_is_idempotent() {
        let build = || {
            Node::Block(Block::new(
                1,
                vec![
                    Node::Expr(Expr::new(vec![
                        atom(1, "x"),
                        atom(1, "="),
                        atom(2, "y;"),
                        Node::Twait(TwaitStatement::new(
                            3,
                            Node::Expr(Expr::new(vec![atom(3, "go"), atom(3, "()")])),
                        )),
                        atom(4, "z ();"),
                    ])),
                ],
            ))
        };

        let mut once = build();
        once.condense();
        let mut twice = build();
        twice.condense();
        twice.condense();
        assert_eq!(once, twice);
    }
}
