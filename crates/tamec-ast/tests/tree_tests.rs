//! Tree-wide behavior: condense and suspension analysis over a program
//! that mixes all the statement variants.

use tamec_ast::{
    Atom, Block, Expr, ForIterClassic, ForStatement, FunctionDeclaration, IfElseStatement, Node,
    Program, ReturnStatement, Str, TwaitStatement, WhileStatement,
};
use tamec_common::LineSpan;

fn expr(line: u32, text: &str) -> Node {
    Node::Expr(Expr::from_text(line, text))
}

fn sample_program() -> Program {
    Program::new(vec![
        Node::Expr(Expr::new(vec![
            Node::Atom(Atom::new(1, "var total")),
            Node::Atom(Atom::new(1, "= 0;")),
        ])),
        Node::Function(FunctionDeclaration::new(
            2,
            "poll",
            vec!["source".to_string()],
            Node::Block(Block::new(
                2,
                vec![
                    Node::While(WhileStatement::new(
                        3,
                        expr(3, "source.alive ()"),
                        Node::Block(Block::new(
                            3,
                            vec![Node::Twait(TwaitStatement::new(
                                4,
                                expr(4, "source.next ()"),
                            ))],
                        )),
                    )),
                    Node::Return(ReturnStatement::new(6, expr(6, "total"))),
                ],
            )),
        )),
        Node::For(ForStatement::new(
            8,
            ForIterClassic::new(expr(8, "i = 0"), expr(8, "i < 3"), expr(8, "i++")),
            Node::Block(Block::new(8, vec![expr(9, "log (i);")])),
        )),
    ])
}

#[test]
fn program_level_condense_reaches_every_expression() {
    let mut program = sample_program();
    program.condense();
    let Node::Expr(first) = &program.statements[0] else {
        panic!("expected leading expression statement");
    };
    assert_eq!(first.elements.len(), 1);
    let Node::Atom(atom) = &first.elements[0] else {
        panic!("expected merged atom");
    };
    assert_eq!(atom.text, "var total = 0;");
    assert_eq!(atom.span, LineSpan::line(1));
}

#[test]
fn suspension_is_reported_only_where_a_twait_lives() {
    let program = sample_program();
    assert!(program.has_suspension_point());
    // The function containing the twait loop suspends...
    assert!(program.statements[1].has_suspension_point());
    // ...the synchronous statements around it do not.
    assert!(!program.statements[0].has_suspension_point());
    assert!(!program.statements[2].has_suspension_point());
}

#[test]
fn condense_does_not_change_suspension_analysis() {
    let mut program = sample_program();
    let before: Vec<bool> = program
        .statements
        .iter()
        .map(Node::has_suspension_point)
        .collect();
    program.condense();
    let after: Vec<bool> = program
        .statements
        .iter()
        .map(Node::has_suspension_point)
        .collect();
    assert_eq!(before, after);
}

#[test]
fn string_literals_survive_condense_unmerged() {
    let mut node = Node::Expr(Expr::new(vec![
        Node::Atom(Atom::new(1, "greet (")),
        Node::Str(Str::new(LineSpan::line(1), "\"hi there\"")),
        Node::Atom(Atom::new(1, ");")),
    ]));
    node.condense();
    let Node::Expr(e) = &node else { unreachable!() };
    assert_eq!(e.elements.len(), 3);
    let Node::Str(s) = &e.elements[1] else {
        panic!("string literal must stay a hard boundary");
    };
    assert_eq!(s.text, "\"hi there\"");
}

#[test]
fn dump_round_trips_the_whole_structure() {
    let program = sample_program();
    let dump = program.dump();
    assert_eq!(dump["statements"][1]["type"], "FunctionDeclaration");
    assert_eq!(dump["statements"][1]["name"], "poll");
    assert_eq!(
        dump["statements"][1]["body"]["body"][0]["type"],
        "WhileStatement"
    );
    assert_eq!(
        dump["statements"][1]["body"]["body"][0]["body"]["body"][0]["type"],
        "TwaitStatement"
    );
    assert_eq!(dump["statements"][2]["iter"]["type"], "ForIterClassic");
}
