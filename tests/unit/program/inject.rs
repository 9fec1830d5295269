use super::*;
use crate::expression::ast::{BinaryOp, Expr};
use crate::foundation::core::{Direction, SweepRange};
use crate::program::model::{
    Block, BlockKind, Circle, Clear, Definition, Dot, Line, MathFunction, Position, Program,
    RegularFunction, Text, Transform,
};
use kurbo::Point;

fn define_dot(name: &str) -> StatementKind {
    StatementKind::Definition(Definition {
        name: Ident::new(name),
        value: Value::Entity(Entity::Dot(Dot {
            id: Ident::new(name),
            position: Position::Absolute(Point::ZERO),
        })),
    })
}

fn define_regular(name: &str) -> StatementKind {
    StatementKind::Definition(Definition {
        name: Ident::new(name),
        value: Value::Function(MathFunction::Regular(RegularFunction {
            id: Ident::new(name),
            variables: vec![Ident::new("x")],
            expression: Expr::binary(BinaryOp::Pow, Expr::var("x"), Expr::num(2.0)),
            domain: None,
            range: None,
        })),
    })
}

fn show_line_between(from: &str, to: &str) -> StatementKind {
    StatementKind::Animation(Animation {
        instance: Animatable::Entity(Entity::Line(Line {
            id: Ident::synthetic("line-1"),
            extent: Extent::Between {
                from: Ident::new(from),
                to: Ident::new(to),
            },
        })),
        transforms: Vec::new(),
    })
}

fn show_ref_swept(name: &str) -> StatementKind {
    StatementKind::Animation(Animation {
        instance: Animatable::Ref(Ident::new(name)),
        transforms: vec![Transform::Sweep(SweepRange { from: 0.0, to: 1.0 })],
    })
}

fn assert_contiguous(program: &Program) {
    for (i, statement) in program.statements.iter().enumerate() {
        assert_eq!(statement.index.0 as usize, i);
    }
}

#[test]
fn undefined_reference_fails_naming_the_identifier() {
    let program = Program::new(vec![show_line_between("pointA", "pointB")]);
    let err = resolve_dependencies(program).unwrap_err();
    assert!(matches!(err, ScriptError::Reference(_)));
    assert!(err.to_string().contains("`pointA`"));
}

#[test]
fn used_but_never_shown_names_get_one_implicit_show_each() {
    let program = Program::new(vec![
        define_dot("p"),
        define_dot("q"),
        show_line_between("p", "q"),
    ]);
    let program = resolve_dependencies(program).unwrap();

    assert_eq!(program.statements.len(), 5);
    assert_contiguous(&program);

    // The implicit shows sit immediately before the first use.
    for (slot, name) in [(2usize, "p"), (3usize, "q")] {
        let StatementKind::Animation(anim) = &program.statements[slot].kind else {
            panic!("expected an implicit show at slot {slot}");
        };
        assert!(matches!(&anim.instance, Animatable::Ref(n) if n == &Ident::new(name)));
        assert!(anim.transforms.is_empty());
    }
    assert!(matches!(
        &program.statements[4].kind,
        StatementKind::Animation(_)
    ));
}

#[test]
fn already_shown_names_are_not_reinjected() {
    let program = Program::new(vec![
        define_dot("p"),
        define_dot("q"),
        show_ref_swept("p"),
        show_ref_swept("q"),
        show_line_between("p", "q"),
    ]);
    let program = resolve_dependencies(program).unwrap();
    assert_eq!(program.statements.len(), 5);
    assert_contiguous(&program);
}

#[test]
fn the_pass_is_idempotent() {
    let program = Program::new(vec![
        define_dot("p"),
        define_dot("q"),
        show_line_between("p", "q"),
    ]);
    let once = resolve_dependencies(program).unwrap();
    let count = once.statements.len();
    let indices: Vec<u32> = once.statements.iter().map(|s| s.index.0).collect();

    let twice = resolve_dependencies(once).unwrap();
    assert_eq!(twice.statements.len(), count);
    let again: Vec<u32> = twice.statements.iter().map(|s| s.index.0).collect();
    assert_eq!(again, indices);
}

#[test]
fn free_symbols_inside_expressions_are_not_references() {
    // `x` is the function's sweep variable, not a program variable.
    let program = Program::new(vec![define_regular("f"), show_ref_swept("f")]);
    assert!(resolve_dependencies(program).is_ok());
}

#[test]
fn block_member_indices_are_remapped_after_insertions() {
    let program = Program::new(vec![
        define_dot("anchor"),
        define_regular("f"),
        // Uses `anchor` without showing it: one show gets injected here.
        StatementKind::Animation(Animation {
            instance: Animatable::Entity(Entity::Text(Text {
                id: Ident::synthetic("text-1"),
                content: "hi".to_string(),
                position: Some(Position::Relative {
                    anchor: Ident::new("anchor"),
                    placement: Direction::Above,
                }),
                options: serde_json::Value::Null,
                latex: false,
            })),
            transforms: Vec::new(),
        }),
        StatementKind::Block(Block {
            id: Ident::new("a"),
            kind: BlockKind::Axis,
            members: vec![StatementIndex(4)],
        }),
        show_ref_swept("f"),
    ]);
    let program = resolve_dependencies(program).unwrap();

    assert_eq!(program.statements.len(), 6);
    assert_contiguous(&program);
    let StatementKind::Block(block) = &program.statements[4].kind else {
        panic!("expected the block at slot 4");
    };
    assert_eq!(block.members, vec![StatementIndex(5)]);
}

#[test]
fn clear_targets_are_materialized_too() {
    let program = Program::new(vec![
        StatementKind::Definition(Definition {
            name: Ident::new("c"),
            value: Value::Entity(Entity::Circle(Circle {
                id: Ident::new("c"),
                position: Position::Absolute(Point::ZERO),
                radius: 1.0,
            })),
        }),
        StatementKind::Clear(Clear {
            target: Ident::new("c"),
        }),
    ]);
    let program = resolve_dependencies(program).unwrap();
    assert_eq!(program.statements.len(), 3);
    assert!(matches!(
        &program.statements[1].kind,
        StatementKind::Animation(_)
    ));
}
