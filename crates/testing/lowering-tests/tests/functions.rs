//! Function bodies, lambdas and jump targets

use expect_test::expect;
use lowering_tests::Fixture;
use tl_ast::AstError;
use tl_lower::LowerError;
use tl_semantic::{ResolvedCall, ResolvedValueArgument};
use tl_syntax::NodeKind;

#[test]
fn test_expression_body_returns_to_function() {
    let mut fixture = Fixture::new();
    let int = fixture.builtins().int_type;
    let answer = fixture.function("answer", None, int, &[]);
    let value = fixture.int(42);
    let node = fixture.function_node(answer, Vec::new(), Some(value));
    fixture.add_declaration(node);

    let fragment = fixture.lower().unwrap();
    expect![[r#"
        fun answer(): Int {
            return@answer 42
        }
    "#]]
    .assert_eq(&fixture.render_decl(&fragment, fragment.files[0].declarations[0]));
}

#[test]
fn test_lambda_is_labeled_by_callee_and_return_skips_it() {
    let mut fixture = Fixture::new();
    let builtins = fixture.builtins();
    let run = fixture.function("run", None, builtins.unit_type, &[("block", builtins.any_type)]);
    let outer = fixture.function("outer", None, builtins.unit_type, &[]);
    let lambda_desc = fixture.lambda_descriptor(outer, builtins.unit_type, &[]);

    let ret = fixture.typed(
        NodeKind::Return {
            label: None,
            value: None,
        },
        builtins.nothing_type,
    );
    let lambda_body = fixture.block(vec![ret]);
    let lambda = fixture.typed(
        NodeKind::Lambda {
            parameters: Vec::new(),
            body: lambda_body,
        },
        builtins.any_type,
    );
    fixture.binding.record_declaration(lambda, lambda_desc);
    let call = fixture.call(
        ResolvedCall::new(run, builtins.unit_type)
            .with_argument(ResolvedValueArgument::Expression(lambda)),
        vec![lambda],
    );
    let body = fixture.block(vec![call]);
    let node = fixture.function_node(outer, Vec::new(), Some(body));
    fixture.add_declaration(node);

    let fragment = fixture.lower().unwrap();
    expect![[r#"
        fun outer(): Unit {
            run(run@{ {
                return@outer Unit
            } })
        }
    "#]]
    .assert_eq(&fixture.render_decl(&fragment, fragment.files[0].declarations[0]));
}

#[test]
fn test_unknown_return_label_is_fatal() {
    let mut fixture = Fixture::new();
    let builtins = fixture.builtins();
    let function = fixture.function("f", None, builtins.unit_type, &[]);
    let missing = fixture.name("missing");
    let ret = fixture.typed(
        NodeKind::Return {
            label: Some(missing),
            value: None,
        },
        builtins.nothing_type,
    );
    let body = fixture.block(vec![ret]);
    let node = fixture.function_node(function, Vec::new(), Some(body));
    fixture.add_declaration(node);

    let error = fixture.lower().unwrap_err();
    assert!(
        matches!(&error, LowerError::UnresolvedLabel { label, .. } if label == "missing"),
        "unexpected error: {error}"
    );
}

#[test]
fn test_break_outside_loop_is_fatal() {
    let mut fixture = Fixture::new();
    let builtins = fixture.builtins();
    let function = fixture.function("f", None, builtins.unit_type, &[]);
    let jump = fixture.node(NodeKind::Break { label: None });
    let body = fixture.block(vec![jump]);
    let node = fixture.function_node(function, Vec::new(), Some(body));
    fixture.add_declaration(node);

    let error = fixture.lower().unwrap_err();
    assert!(
        matches!(
            error,
            LowerError::MissingTarget {
                keyword: "break",
                expected: "loop",
                ..
            }
        ),
        "unexpected error: {error}"
    );
}

#[test]
fn test_labeled_break_leaves_outer_loop() {
    let mut fixture = Fixture::new();
    let builtins = fixture.builtins();
    let function = fixture.function("spin", None, builtins.unit_type, &[]);
    let label = fixture.name("outer");

    let jump = fixture.node(NodeKind::Break { label: Some(label) });
    let inner_body = fixture.block(vec![jump]);
    let inner_condition = fixture.boolean(true);
    let inner = fixture.node(NodeKind::While {
        condition: Some(inner_condition),
        body: Some(inner_body),
    });
    let outer_body = fixture.block(vec![inner]);
    let outer_condition = fixture.boolean(true);
    let outer = fixture.node(NodeKind::While {
        condition: Some(outer_condition),
        body: Some(outer_body),
    });
    let labeled = fixture.node(NodeKind::Labeled { label, body: outer });
    let body = fixture.block(vec![labeled]);
    let node = fixture.function_node(function, Vec::new(), Some(body));
    fixture.add_declaration(node);

    let fragment = fixture.lower().unwrap();
    expect![[r#"
        fun spin(): Unit {
            outer@ while (true) {
                while (true) {
                    break@outer
                }
            }
        }
    "#]]
    .assert_eq(&fixture.render_decl(&fragment, fragment.files[0].declarations[0]));
}

#[test]
fn test_declaring_a_descriptor_twice_is_fatal() {
    let mut fixture = Fixture::new();
    let builtins = fixture.builtins();
    let function = fixture.function("twice", None, builtins.unit_type, &[]);
    let first = fixture.function_node(function, Vec::new(), None);
    let second = fixture.function_node(function, Vec::new(), None);
    fixture.add_declaration(first);
    fixture.add_declaration(second);

    let error = fixture.lower().unwrap_err();
    assert!(
        matches!(
            error,
            LowerError::SymbolAlreadyBound(AstError::SymbolAlreadyBound { .. })
        ),
        "unexpected error: {error}"
    );
}

#[test]
fn test_parameters_share_symbols_with_references() {
    let mut fixture = Fixture::new();
    let int = fixture.builtins().int_type;
    let identity = fixture.function("identity", None, int, &[("value", int)]);
    let parameters = fixture.parameter_nodes(identity);
    let value = fixture.parameter_of(identity, 0).unwrap();
    let read = fixture.reference(value, int);
    let node = fixture.function_node(identity, parameters, Some(read));
    fixture.add_declaration(node);

    let fragment = fixture.lower().unwrap();
    assert_eq!(fragment.unbound_symbols().count(), 0);
    expect![[r#"
        fun identity(value: Int): Int {
            return@identity value
        }
    "#]]
    .assert_eq(&fixture.render_decl(&fragment, fragment.files[0].declarations[0]));
}
