use super::*;
use crate::expression::ast::BinaryOp;
use crate::foundation::core::{StatementIndex, SweepRange};
use crate::program::model::{Charge, Clear, Definition, Dot, Position, Text};
use kurbo::Point;

fn define_function(name: &str, expression: Expr) -> StatementKind {
    StatementKind::Definition(Definition {
        name: Ident::new(name),
        value: Value::Function(MathFunction::Regular(RegularFunction {
            id: Ident::new(name),
            variables: vec![Ident::new("x")],
            expression,
            domain: None,
            range: None,
        })),
    })
}

fn define_number(name: &str, value: f64) -> StatementKind {
    StatementKind::Definition(Definition {
        name: Ident::new(name),
        value: Value::Number(value),
    })
}

fn show(name: &str, transforms: Vec<Transform>) -> StatementKind {
    StatementKind::Animation(Animation {
        instance: Animatable::Ref(Ident::new(name)),
        transforms,
    })
}

fn sweep(from: f64, to: f64) -> Transform {
    Transform::Sweep(SweepRange { from, to })
}

fn x_squared() -> Expr {
    Expr::binary(BinaryOp::Pow, Expr::var("x"), Expr::num(2.0))
}

fn run(kinds: Vec<StatementKind>) -> ScriptResult<Vec<EvaluatedEntity>> {
    Evaluator::new(Program::new(kinds)).run()
}

fn single_plot(entities: &[EvaluatedEntity]) -> &Plot {
    assert_eq!(entities.len(), 1);
    let Evaluated::Plot(plot) = &entities[0].value else {
        panic!("expected a plot");
    };
    plot
}

#[test]
fn regular_function_gets_domain_and_sampled_range() {
    let entities = run(vec![
        define_function("f", x_squared()),
        show("f", vec![sweep(-2.0, 2.0)]),
    ])
    .unwrap();

    let plot = single_plot(&entities);
    assert_eq!(plot.function.id(), &Ident::new("f"));
    assert_eq!(entities[0].index, StatementIndex(1));

    let MathFunction::Regular(f) = &plot.function else {
        panic!("expected a regular function");
    };
    let domain = f.domain.unwrap();
    assert_eq!((domain.from, domain.to), (-2.0, 2.0));
    let range = f.range.unwrap();
    assert_eq!(range.from, 0.0);
    assert!((range.to - 4.0).abs() < 1e-9);
}

#[test]
fn range_sampling_is_deterministic() {
    let program = vec![
        define_function("f", x_squared()),
        show("f", vec![sweep(-2.0, 2.0)]),
    ];
    let a = run(program.clone()).unwrap();
    let b = run(program).unwrap();

    let (MathFunction::Regular(fa), MathFunction::Regular(fb)) =
        (&single_plot(&a).function, &single_plot(&b).function)
    else {
        panic!("expected regular functions");
    };
    assert_eq!(fa.range, fb.range);
}

#[test]
fn zero_sweep_endpoints_are_nudged() {
    let entities = run(vec![
        define_function("f", x_squared()),
        show("f", vec![sweep(0.0, 2.0)]),
    ])
    .unwrap();
    let domain = single_plot(&entities).function.domain().unwrap();
    assert_eq!(domain.from, 0.001);
    assert_eq!(domain.to, 2.0);
}

#[test]
fn function_show_requires_a_sweep() {
    let err = run(vec![define_function("f", x_squared()), show("f", vec![])]).unwrap_err();
    assert!(matches!(err, ScriptError::Structure(_)));
}

#[test]
fn numeric_bindings_substitute_into_expressions() {
    let entities = run(vec![
        define_number("a", 2.0),
        define_function(
            "f",
            Expr::binary(BinaryOp::Mul, Expr::var("a"), Expr::var("x")),
        ),
        show("f", vec![sweep(0.0, 1.0)]),
    ])
    .unwrap();

    let MathFunction::Regular(f) = &single_plot(&entities).function else {
        panic!("expected a regular function");
    };
    assert_eq!(
        f.expression,
        Expr::binary(BinaryOp::Mul, Expr::num(2.0), Expr::var("x"))
    );
    let range = f.range.unwrap();
    assert_eq!(range.from, 0.002);
    assert_eq!(range.to, 2.0);
}

#[test]
fn non_numeric_bindings_stay_symbolic_and_fail_sampling() {
    let err = run(vec![
        define_function("g", Expr::var("x")),
        define_function(
            "f",
            Expr::binary(BinaryOp::Mul, Expr::var("g"), Expr::var("x")),
        ),
        show("f", vec![sweep(1.0, 2.0)]),
    ])
    .unwrap_err();
    assert!(matches!(err, ScriptError::Type(_)));
    assert!(err.to_string().contains("`g`"));
}

#[test]
fn parametric_components_sample_independently() {
    let entities = run(vec![
        StatementKind::Definition(Definition {
            name: Ident::new("p"),
            value: Value::Function(MathFunction::Parametric(ParametricFunction {
                id: Ident::new("p"),
                variables: vec![Ident::new("t")],
                expressions: vec![
                    Expr::var("t"),
                    Expr::binary(BinaryOp::Mul, Expr::num(2.0), Expr::var("t")),
                ],
                domain: None,
                x_range: None,
                y_range: None,
            })),
        }),
        show("p", vec![sweep(0.0, 1.0)]),
    ])
    .unwrap();

    let MathFunction::Parametric(p) = &single_plot(&entities).function else {
        panic!("expected a parametric function");
    };
    let x_range = p.x_range.unwrap();
    let y_range = p.y_range.unwrap();
    assert_eq!((x_range.from, x_range.to), (0.001, 1.0));
    assert_eq!((y_range.from, y_range.to), (0.002, 2.0));
}

#[test]
fn a_sweep_dot_transform_marks_the_plot() {
    let entities = run(vec![
        define_function("f", x_squared()),
        show("f", vec![sweep(1.0, 2.0), Transform::SweepDot]),
    ])
    .unwrap();
    assert!(single_plot(&entities).tracked_dot);
}

#[test]
fn numbers_are_not_animatable() {
    let err = run(vec![define_number("n", 3.0), show("n", vec![])]).unwrap_err();
    assert!(matches!(err, ScriptError::Structure(_)));
}

#[test]
fn showing_an_unknown_name_is_a_reference_error() {
    let err = run(vec![show("ghost", vec![])]).unwrap_err();
    assert!(matches!(err, ScriptError::Reference(_)));
    assert!(err.to_string().contains("`ghost`"));
}

#[test]
fn morph_rebinds_the_source_and_emits_a_transform_entity() {
    let entities = run(vec![
        define_function("f", x_squared()),
        define_function("g", Expr::var("x")),
        show("f", vec![sweep(1.0, 2.0)]),
        StatementKind::Animation(Animation {
            instance: Animatable::Morph(MorphExpr {
                from: Expr::var("f"),
                to: vec![Expr::binary(BinaryOp::Add, Expr::var("f"), Expr::var("g"))],
            }),
            transforms: Vec::new(),
        }),
    ])
    .unwrap();

    assert_eq!(entities.len(), 2);
    let Evaluated::Entity(Entity::Morph(morph)) = &entities[1].value else {
        panic!("expected a morph entity");
    };
    assert_eq!(morph.from, Ident::new("f"));
    let MathFunction::Regular(to) = &morph.to else {
        panic!("expected a regular target");
    };
    assert_eq!(
        to.expression,
        Expr::binary(BinaryOp::Add, x_squared(), Expr::var("x"))
    );
}

#[test]
fn morph_between_function_kinds_is_a_type_error() {
    let err = run(vec![
        define_function("f", x_squared()),
        StatementKind::Definition(Definition {
            name: Ident::new("g"),
            value: Value::Function(MathFunction::Parametric(ParametricFunction {
                id: Ident::new("g"),
                variables: vec![Ident::new("t")],
                expressions: vec![Expr::var("t"), Expr::var("t")],
                domain: None,
                x_range: None,
                y_range: None,
            })),
        }),
        StatementKind::Animation(Animation {
            instance: Animatable::Morph(MorphExpr {
                from: Expr::var("f"),
                to: vec![Expr::var("g")],
            }),
            transforms: Vec::new(),
        }),
    ])
    .unwrap_err();
    assert!(matches!(err, ScriptError::Type(_)));
}

#[test]
fn polar_content_in_an_axis_block_is_a_type_error() {
    let err = run(vec![
        StatementKind::Definition(Definition {
            name: Ident::new("g"),
            value: Value::Function(MathFunction::Polar(PolarFunction {
                id: Ident::new("g"),
                variables: vec![Ident::new("theta")],
                expression: Expr::var("theta"),
                domain: None,
                range: None,
            })),
        }),
        StatementKind::Block(Block {
            id: Ident::new("a"),
            kind: BlockKind::Axis,
            members: vec![StatementIndex(2)],
        }),
        show("g", vec![sweep(0.0, 1.0)]),
    ])
    .unwrap_err();
    assert!(matches!(err, ScriptError::Type(_)));
    assert!(err.to_string().contains("polar"));
}

#[test]
fn block_members_must_be_show_statements() {
    let err = run(vec![
        StatementKind::Block(Block {
            id: Ident::new("a"),
            kind: BlockKind::Axis,
            members: vec![StatementIndex(1)],
        }),
        define_number("n", 1.0),
    ])
    .unwrap_err();
    assert!(matches!(err, ScriptError::Structure(_)));
}

#[test]
fn field_blocks_accept_only_charges() {
    let charge = |name: &str, magnitude: f64| {
        StatementKind::Definition(Definition {
            name: Ident::new(name),
            value: Value::Entity(Entity::Charge(Charge {
                id: Ident::new(name),
                position: Position::Absolute(Point::ZERO),
                magnitude,
            })),
        })
    };

    let entities = run(vec![
        charge("plus", 1.0),
        charge("minus", -1.0),
        StatementKind::Block(Block {
            id: Ident::new("field"),
            kind: BlockKind::Field,
            members: vec![StatementIndex(3), StatementIndex(4)],
        }),
        show("plus", vec![]),
        show("minus", vec![]),
    ])
    .unwrap();
    let Evaluated::Group(group) = &entities[0].value else {
        panic!("expected a group");
    };
    assert_eq!(group.members.len(), 2);

    let err = run(vec![
        StatementKind::Definition(Definition {
            name: Ident::new("d"),
            value: Value::Entity(Entity::Dot(Dot {
                id: Ident::new("d"),
                position: Position::Absolute(Point::ZERO),
            })),
        }),
        StatementKind::Block(Block {
            id: Ident::new("field"),
            kind: BlockKind::Field,
            members: vec![StatementIndex(2)],
        }),
        show("d", vec![]),
    ])
    .unwrap_err();
    assert!(matches!(err, ScriptError::Type(_)));
}

#[test]
fn clearing_something_never_shown_fails() {
    let err = run(vec![
        StatementKind::Definition(Definition {
            name: Ident::new("t"),
            value: Value::Entity(Entity::Text(Text {
                id: Ident::new("t"),
                content: "hi".to_string(),
                position: None,
                options: serde_json::Value::Null,
                latex: false,
            })),
        }),
        StatementKind::Clear(Clear {
            target: Ident::new("t"),
        }),
    ])
    .unwrap_err();
    assert!(matches!(err, ScriptError::Reference(_)));
    assert!(err.to_string().contains("never shown"));
}

#[test]
fn clearing_a_shown_entity_emits_a_clear() {
    let entities = run(vec![
        StatementKind::Definition(Definition {
            name: Ident::new("t"),
            value: Value::Entity(Entity::Text(Text {
                id: Ident::new("t"),
                content: "hi".to_string(),
                position: None,
                options: serde_json::Value::Null,
                latex: false,
            })),
        }),
        show("t", vec![]),
        StatementKind::Clear(Clear {
            target: Ident::new("t"),
        }),
    ])
    .unwrap();
    assert_eq!(entities.len(), 2);
    assert!(matches!(
        &entities[1].value,
        Evaluated::Clear(target) if target == &Ident::new("t")
    ));
}

#[test]
fn repeated_references_converge_on_one_id() {
    let entities = run(vec![
        define_function("f", x_squared()),
        show("f", vec![sweep(1.0, 2.0)]),
        show("f", vec![sweep(2.0, 3.0)]),
    ])
    .unwrap();
    assert_eq!(entities.len(), 2);
    assert_eq!(entities[0].id(), entities[1].id());
}
