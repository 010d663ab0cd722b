//! Node variants for the tame AST.
//!
//! [`Node`] is a closed tagged union: generic tree operations (children,
//! suspension analysis, atom conversion) are match dispatches over the
//! tag, and the code generator rejects anything outside the enumerated
//! set rather than guessing.

use tamec_common::LineSpan;

/// A node in the tame AST.
///
/// Children are owned exclusively (`Box<Node>` / `Vec<Node>`); no node is
/// ever aliased from two parents.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Atom(Atom),
    Label(Label),
    Str(Str),
    Expr(Expr),
    Block(Block),
    IfElse(IfElseStatement),
    While(WhileStatement),
    For(ForStatement),
    Function(FunctionDeclaration),
    Twait(TwaitStatement),
    Return(ReturnStatement),
    Program(Program),
}

/// A literal run of source text spanning `[start, end]` lines.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub span: LineSpan,
    pub text: String,
}

/// A named reference (e.g. a loop label). Converts to an [`Atom`] lazily,
/// using its own identifier text as the atom's content.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub line: u32,
    pub text: String,
}

/// A string literal. Carries its span like an atom but never participates
/// in atom merging: synthesizing newline padding inside a string literal
/// would change its value.
#[derive(Debug, Clone, PartialEq)]
pub struct Str {
    pub span: LineSpan,
    pub text: String,
}

/// An ordered sequence of juxtaposed fragments making up an
/// expression-level statement (e.g. `a.b(c)` assembled from several
/// lexical pieces). Elements are either atom-convertible leaves or nested
/// constructs, which act as hard boundaries during condensing.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub span: LineSpan,
    pub elements: Vec<Node>,
}

/// An ordered sequence of statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub start_line: u32,
    pub statements: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfElseStatement {
    pub start_line: u32,
    pub cond_expr: Box<Node>,
    pub if_statement: Box<Node>,
    pub else_statement: Box<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStatement {
    pub start_line: u32,
    pub label: Option<String>,
    pub cond_expr: Box<Node>,
    pub body: Box<Node>,
}

/// Classic three-clause iteration descriptor: `for (init; cond; inc)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ForIterClassic {
    pub init_expr: Box<Node>,
    pub cond_expr: Box<Node>,
    pub inc_expr: Box<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStatement {
    pub start_line: u32,
    pub label: Option<String>,
    pub iter: ForIterClassic,
    pub body: Box<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclaration {
    pub start_line: u32,
    pub name: String,
    pub params: Vec<String>,
    pub body: Box<Node>,
}

/// The suspension point: wraps the expression for the asynchronous
/// operation to invoke. Always reports `has_suspension_point() == true`.
#[derive(Debug, Clone, PartialEq)]
pub struct TwaitStatement {
    pub start_line: u32,
    pub body: Box<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement {
    pub start_line: u32,
    pub expr: Box<Node>,
}

/// The root node output by the parser.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Node>,
}

// =========================================================================
// Constructors
// =========================================================================

impl Atom {
    /// Single-line atom.
    pub fn new(line: u32, text: impl Into<String>) -> Self {
        Self {
            span: LineSpan::line(line),
            text: text.into(),
        }
    }

    pub fn with_span(span: LineSpan, text: impl Into<String>) -> Self {
        Self {
            span,
            text: text.into(),
        }
    }

    /// Merge `other` into `self`.
    ///
    /// Pads `self.text` with one newline per line between `self.span.end`
    /// and `other.span.start`, or a single space when the two are already
    /// line-adjacent, then appends `other.text`. Afterwards the span
    /// covers the union of both inputs' original positions; only
    /// whitespace layout is synthesized.
    pub fn merge(&mut self, other: &Atom) {
        let mut spc = String::new();
        while self.span.end < other.span.start {
            spc.push('\n');
            self.span.end += 1;
        }
        if spc.is_empty() {
            spc.push(' ');
        }
        self.text.push_str(&spc);
        self.text.push_str(&other.text);
        self.span.end = self.span.end.max(other.span.end);
    }
}

impl Label {
    pub fn new(line: u32, text: impl Into<String>) -> Self {
        Self {
            line,
            text: text.into(),
        }
    }

    pub fn to_atom(&self) -> Atom {
        Atom::new(self.line, self.text.clone())
    }
}

impl Str {
    pub fn new(span: LineSpan, text: impl Into<String>) -> Self {
        Self {
            span,
            text: text.into(),
        }
    }
}

impl Expr {
    pub fn new(elements: Vec<Node>) -> Self {
        let span = match (elements.first(), elements.last()) {
            (Some(first), Some(last)) => LineSpan::new(first.start_line(), last.end_line()),
            _ => LineSpan::EMPTY,
        };
        Self { span, elements }
    }

    /// Single-atom expression; the common case for an already-lexed
    /// statement fragment.
    pub fn from_text(line: u32, text: impl Into<String>) -> Self {
        Self::new(vec![Node::Atom(Atom::new(line, text))])
    }

    /// Parser hook: append one more element.
    pub fn push(&mut self, element: Node) {
        self.elements.push(element);
    }

    /// Flatten this expression's elements into `out`, consuming self.
    /// Used when splicing expression fragments into a surrounding list.
    pub fn push_elements_into(self, out: &mut Vec<Node>) {
        out.extend(self.elements);
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl Block {
    pub fn new(start_line: u32, statements: Vec<Node>) -> Self {
        Self {
            start_line,
            statements,
        }
    }

    /// Synthesized empty block (implicit else branch).
    pub fn empty() -> Self {
        Self {
            start_line: 0,
            statements: Vec::new(),
        }
    }
}

impl IfElseStatement {
    /// A missing else branch defaults to an empty block so that both
    /// branches always exist structurally.
    pub fn new(
        start_line: u32,
        cond_expr: Node,
        if_statement: Node,
        else_statement: Option<Node>,
    ) -> Self {
        Self {
            start_line,
            cond_expr: Box::new(cond_expr),
            if_statement: Box::new(if_statement),
            else_statement: Box::new(
                else_statement.unwrap_or_else(|| Node::Block(Block::empty())),
            ),
        }
    }
}

impl WhileStatement {
    pub fn new(start_line: u32, cond_expr: Node, body: Node) -> Self {
        Self {
            start_line,
            label: None,
            cond_expr: Box::new(cond_expr),
            body: Box::new(body),
        }
    }
}

impl ForIterClassic {
    pub fn new(init_expr: Node, cond_expr: Node, inc_expr: Node) -> Self {
        Self {
            init_expr: Box::new(init_expr),
            cond_expr: Box::new(cond_expr),
            inc_expr: Box::new(inc_expr),
        }
    }
}

impl ForStatement {
    pub fn new(start_line: u32, iter: ForIterClassic, body: Node) -> Self {
        Self {
            start_line,
            label: None,
            iter,
            body: Box::new(body),
        }
    }
}

impl FunctionDeclaration {
    pub fn new(start_line: u32, name: impl Into<String>, params: Vec<String>, body: Node) -> Self {
        Self {
            start_line,
            name: name.into(),
            params,
            body: Box::new(body),
        }
    }
}

impl TwaitStatement {
    pub fn new(start_line: u32, body: Node) -> Self {
        Self {
            start_line,
            body: Box::new(body),
        }
    }
}

impl ReturnStatement {
    pub fn new(start_line: u32, expr: Node) -> Self {
        Self {
            start_line,
            expr: Box::new(expr),
        }
    }
}

impl Program {
    pub fn new(statements: Vec<Node>) -> Self {
        Self { statements }
    }

    /// Whether any top-level statement transitively contains a suspension
    /// point.
    pub fn has_suspension_point(&self) -> bool {
        self.statements.iter().any(Node::has_suspension_point)
    }

    /// Condense every top-level statement in place.
    pub fn condense(&mut self) {
        for statement in &mut self.statements {
            statement.condense();
        }
    }
}

macro_rules! impl_from_variant {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(impl From<$ty> for Node {
            fn from(value: $ty) -> Node {
                Node::$variant(value)
            }
        })*
    };
}

impl_from_variant! {
    Atom => Atom,
    Label => Label,
    Str => Str,
    Expr => Expr,
    Block => Block,
    IfElse => IfElseStatement,
    While => WhileStatement,
    For => ForStatement,
    Function => FunctionDeclaration,
    Twait => TwaitStatement,
    Return => ReturnStatement,
    Program => Program,
}

// =========================================================================
// Node capability set
// =========================================================================

impl Node {
    /// Human-readable variant tag, used in diagnostics and dumps.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Atom(_) => "Atom",
            Node::Label(_) => "Label",
            Node::Str(_) => "String",
            Node::Expr(_) => "Expr",
            Node::Block(_) => "Block",
            Node::IfElse(_) => "IfElseStatement",
            Node::While(_) => "WhileStatement",
            Node::For(_) => "ForStatement",
            Node::Function(_) => "FunctionDeclaration",
            Node::Twait(_) => "TwaitStatement",
            Node::Return(_) => "ReturnStatement",
            Node::Program(_) => "Program",
        }
    }

    /// 1-based source line where this node starts; 0 for synthesized
    /// nodes with no position.
    pub fn start_line(&self) -> u32 {
        match self {
            Node::Atom(a) => a.span.start,
            Node::Label(l) => l.line,
            Node::Str(s) => s.span.start,
            Node::Expr(e) => e.span.start,
            Node::Block(b) => b.start_line,
            Node::IfElse(s) => s.start_line,
            Node::While(w) => w.start_line,
            Node::For(f) => f.start_line,
            Node::Function(f) => f.start_line,
            Node::Twait(t) => t.start_line,
            Node::Return(r) => r.start_line,
            Node::Program(_) => 1,
        }
    }

    /// Last source line this node is known to cover. Only the text leaves
    /// track an end line; compound statements report their start line.
    pub fn end_line(&self) -> u32 {
        match self {
            Node::Atom(a) => a.span.end,
            Node::Str(s) => s.span.end,
            Node::Expr(e) => e.span.end,
            _ => self.start_line(),
        }
    }

    /// Attach a label to this node. Loop statements store it (it names
    /// the generated loop-step function); an expression absorbs it as a
    /// leading atom; every other variant ignores labels.
    pub fn set_label(&mut self, label: Label) {
        match self {
            Node::While(w) => w.label = Some(label.text),
            Node::For(f) => f.label = Some(label.text),
            Node::Expr(e) => e.elements.insert(0, Node::Atom(label.to_atom())),
            _ => {}
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            Node::While(w) => w.label.as_deref(),
            Node::For(f) => f.label.as_deref(),
            _ => None,
        }
    }

    /// Whether this subtree transitively contains a suspension point.
    ///
    /// Pure and recomputed on demand: the result is queried before
    /// condensing and is unaffected by it, and the decision it drives
    /// (pass-through vs continuation rewrite) is taken locally at every
    /// compound node. Suspension propagates monotonically upward through
    /// the containment relation, so independent local decisions compose.
    pub fn has_suspension_point(&self) -> bool {
        match self {
            Node::Twait(_) => true,
            Node::Block(b) => b.statements.iter().any(Node::has_suspension_point),
            Node::IfElse(s) => {
                s.if_statement.has_suspension_point() || s.else_statement.has_suspension_point()
            }
            Node::While(w) => w.body.has_suspension_point(),
            Node::For(f) => f.body.has_suspension_point(),
            Node::Function(f) => f.body.has_suspension_point(),
            Node::Program(p) => p.has_suspension_point(),
            _ => false,
        }
    }

    /// Convert this node to an atom for merging, if it is a text leaf.
    /// `None` is the hard-boundary signal during condensing, not an
    /// error.
    pub fn to_atom(&self) -> Option<Atom> {
        match self {
            Node::Atom(a) => Some(a.clone()),
            Node::Label(l) => Some(l.to_atom()),
            _ => None,
        }
    }

    /// Direct children in evaluation order.
    pub fn children(&self) -> Vec<&Node> {
        match self {
            Node::Atom(_) | Node::Label(_) | Node::Str(_) => Vec::new(),
            Node::Expr(e) => e.elements.iter().collect(),
            Node::Block(b) => b.statements.iter().collect(),
            Node::IfElse(s) => vec![&s.cond_expr, &s.if_statement, &s.else_statement],
            Node::While(w) => vec![&w.cond_expr, &w.body],
            Node::For(f) => vec![
                &f.iter.init_expr,
                &f.iter.cond_expr,
                &f.iter.inc_expr,
                &f.body,
            ],
            Node::Function(f) => vec![&f.body],
            Node::Twait(t) => vec![&t.body],
            Node::Return(r) => vec![&r.expr],
            Node::Program(p) => p.statements.iter().collect(),
        }
    }

    pub(crate) fn children_mut(&mut self) -> Vec<&mut Node> {
        match self {
            Node::Atom(_) | Node::Label(_) | Node::Str(_) => Vec::new(),
            Node::Expr(e) => e.elements.iter_mut().collect(),
            Node::Block(b) => b.statements.iter_mut().collect(),
            Node::IfElse(s) => vec![
                &mut s.cond_expr,
                &mut s.if_statement,
                &mut s.else_statement,
            ],
            Node::While(w) => vec![&mut w.cond_expr, &mut w.body],
            Node::For(f) => vec![
                &mut f.iter.init_expr,
                &mut f.iter.cond_expr,
                &mut f.iter.inc_expr,
                &mut f.body,
            ],
            Node::Function(f) => vec![&mut f.body],
            Node::Twait(t) => vec![&mut t.body],
            Node::Return(r) => vec![&mut r.expr],
            Node::Program(p) => p.statements.iter_mut().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_pads_with_newlines() {
        let mut a = Atom::new(3, "first");
        let b = Atom::new(5, "second");
        a.merge(&b);
        assert_eq!(a.text, "first\n\nsecond");
        assert_eq!(a.span, LineSpan::new(3, 5));
    }

    #[test]
    fn merge_line_adjacent_uses_single_space() {
        let mut a = Atom::new(3, "x");
        let b = Atom::new(3, "= 1;");
        a.merge(&b);
        assert_eq!(a.text, "x = 1;");
        assert_eq!(a.span, LineSpan::line(3));
    }

    #[test]
    fn merge_extends_over_multiline_input() {
        let mut a = Atom::new(1, "a");
        let b = Atom::with_span(LineSpan::new(2, 4), "b\nc\nd");
        a.merge(&b);
        assert_eq!(a.text, "a\nb\nc\nd");
        assert_eq!(a.span, LineSpan::new(1, 4));
    }

    #[test]
    fn label_converts_to_atom() {
        let label = Label::new(9, "outer");
        let atom = label.to_atom();
        assert_eq!(atom.text, "outer");
        assert_eq!(atom.span, LineSpan::line(9));
    }

    #[test]
    fn suspension_defaults_to_false_for_leaves() {
        assert!(!Node::Atom(Atom::new(1, "x")).has_suspension_point());
        assert!(!Node::Label(Label::new(1, "l")).has_suspension_point());
        assert!(!Node::Expr(Expr::from_text(1, "x = 1;")).has_suspension_point());
    }

    #[test]
    fn suspension_propagates_through_compounds() {
        let twait = Node::Twait(TwaitStatement::new(
            2,
            Node::Expr(Expr::from_text(2, "fetch ()")),
        ));
        assert!(twait.has_suspension_point());

        let block = Node::Block(Block::new(1, vec![twait]));
        assert!(block.has_suspension_point());

        let while_stmt = Node::While(WhileStatement::new(
            1,
            Node::Expr(Expr::from_text(1, "more ()")),
            block,
        ));
        assert!(while_stmt.has_suspension_point());

        let func = Node::Function(FunctionDeclaration::new(
            1,
            "f",
            vec![],
            Node::Block(Block::new(
                1,
                vec![Node::Expr(Expr::from_text(2, "x = 1;"))],
            )),
        ));
        assert!(!func.has_suspension_point());
    }

    #[test]
    fn if_else_checks_both_branches() {
        let twait = Node::Twait(TwaitStatement::new(
            3,
            Node::Expr(Expr::from_text(3, "go ()")),
        ));
        let stmt = IfElseStatement::new(
            1,
            Node::Expr(Expr::from_text(1, "cond")),
            Node::Block(Block::new(1, vec![])),
            Some(Node::Block(Block::new(2, vec![twait]))),
        );
        assert!(Node::IfElse(stmt).has_suspension_point());
    }

    #[test]
    fn missing_else_defaults_to_empty_block() {
        let stmt = IfElseStatement::new(
            1,
            Node::Expr(Expr::from_text(1, "cond")),
            Node::Block(Block::new(1, vec![])),
            None,
        );
        assert_eq!(*stmt.else_statement, Node::Block(Block::empty()));
    }

    #[test]
    fn set_label_on_loop_and_expr() {
        let mut loop_node = Node::While(WhileStatement::new(
            1,
            Node::Expr(Expr::from_text(1, "cond")),
            Node::Block(Block::new(1, vec![])),
        ));
        loop_node.set_label(Label::new(1, "outer"));
        assert_eq!(loop_node.label(), Some("outer"));

        let mut expr = Node::Expr(Expr::from_text(2, "x"));
        expr.set_label(Label::new(2, "lbl"));
        let Node::Expr(e) = &expr else { unreachable!() };
        assert_eq!(e.elements.len(), 2);
        assert_eq!(e.elements[0].to_atom().map(|a| a.text), Some("lbl".into()));
    }

    #[test]
    fn children_in_evaluation_order() {
        let for_stmt = Node::For(ForStatement::new(
            1,
            ForIterClassic::new(
                Node::Expr(Expr::from_text(1, "i = 0")),
                Node::Expr(Expr::from_text(1, "i < n")),
                Node::Expr(Expr::from_text(1, "i++")),
            ),
            Node::Block(Block::new(1, vec![])),
        ));
        let kinds: Vec<&str> = for_stmt.children().iter().map(|c| c.kind_name()).collect();
        assert_eq!(kinds, ["Expr", "Expr", "Expr", "Block"]);
    }
}
