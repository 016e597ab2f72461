//! Stub generation and session configuration

use expect_test::expect;
use lowering_tests::Fixture;
use std::io::Write;
use tl_semantic::{ResolvedCall, ResolvedValueArgument};
use tl_syntax::ClassKind;

#[test]
fn test_supertype_chain_is_stubbed_to_fixed_point() {
    let mut fixture = Fixture::new();
    let c = fixture.class("C", ClassKind::Class);
    let c_ty = fixture.class_type(c);
    let b = fixture.class("B", ClassKind::Class);
    let b_ty = fixture.class_type(b);
    let a = fixture.class("A", ClassKind::Class);
    let a_ty = fixture.class_type(a);
    for (class, supertype) in [(b, c_ty), (a, b_ty)] {
        if let Some(class) = fixture.class_descriptor_mut(class) {
            class.supertypes.push(supertype);
        }
    }
    let make = fixture.function("make", None, a_ty, &[]);
    let node = fixture.function_node(make, Vec::new(), None);
    fixture.add_declaration(node);

    let mut session = fixture.session();
    session.lower_files().unwrap();
    session.generate_stubs().unwrap();
    // A, then B from A's supertypes, then C from B's
    assert_eq!(session.stats().fixed_point_passes, 3);
    assert_eq!(session.stats().stubs, 3);

    let first = session.declaration_for(c).unwrap();
    let second = session.declaration_for(c).unwrap();
    assert_eq!(first, second);
    assert_eq!(session.stats().stubs, 3);

    let fragment = session.finish().unwrap();
    assert_eq!(fragment.unbound_symbols().count(), 0);
    expect![[r#"
        // file main.kt
        package demo
        fun make(): A
        // external
        /* stub */ class A : B
        /* stub */ class B : C
        /* stub */ class C
    "#]]
    .assert_eq(&fixture.render(&fragment));
}

#[test]
fn test_local_declarations_are_never_stubbed() {
    let mut fixture = Fixture::new();
    let widget = fixture.class("Widget", ClassKind::Class);
    let widget_ty = fixture.class_type(widget);
    let build = fixture.function("build", None, widget_ty, &[]);
    let build_node = fixture.function_node(build, Vec::new(), None);
    // the class is declared after the function that mentions it
    let name = fixture.name("Widget");
    let widget_node = fixture.node(tl_syntax::NodeKind::Class {
        name: Some(name),
        type_parameters: Vec::new(),
        primary_constructor: None,
        super_call: None,
        declarations: Vec::new(),
        annotations: Vec::new(),
    });
    fixture.binding.record_declaration(widget_node, widget);
    fixture.add_declaration(build_node);
    fixture.add_declaration(widget_node);

    let fragment = fixture.lower().unwrap();
    assert!(fragment.external_declarations.is_empty());
    expect![[r#"
        // file main.kt
        package demo
        fun build(): Widget
        class Widget
    "#]]
    .assert_eq(&fixture.render(&fragment));
}

/// `f(b = side(), a = 1)` against `fun f(a: Int, b: Int)`
fn named_arguments_out_of_order(fixture: &mut Fixture) {
    let builtins = fixture.builtins();
    let int = builtins.int_type;
    let unit = builtins.unit_type;
    let f = fixture.function("f", None, unit, &[("a", int), ("b", int)]);
    let side = fixture.function("side", None, int, &[]);
    let caller = fixture.function("caller", None, unit, &[]);

    let side_call = fixture.call(ResolvedCall::new(side, int), Vec::new());
    let one = fixture.int(1);
    let call = fixture.call(
        ResolvedCall::new(f, unit)
            .with_argument(ResolvedValueArgument::Expression(one))
            .with_argument(ResolvedValueArgument::Expression(side_call))
            .with_evaluation_order(vec![1, 0]),
        vec![side_call, one],
    );
    let body = fixture.block(vec![call]);
    let node = fixture.function_node(caller, Vec::new(), Some(body));
    fixture.add_declaration(node);
}

#[test]
fn test_out_of_order_arguments_are_materialized() {
    let mut fixture = Fixture::new();
    named_arguments_out_of_order(&mut fixture);

    let fragment = fixture.lower().unwrap();
    expect![[r#"
        fun caller(): Unit {
            val <tmp>: Int = side()
            f(1, <tmp>)
        }
    "#]]
    .assert_eq(&fixture.render_decl(&fragment, fragment.files[0].declarations[0]));
}

#[test]
fn test_config_file_disables_reordering() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "module_name = \"app\"\n\n[calls]\nreorder_arguments = false").unwrap();

    let mut fixture = Fixture::new();
    named_arguments_out_of_order(&mut fixture);
    let fragment = fixture.lower_with_config_file(file.path()).unwrap();

    assert_eq!(fragment.name, "app");
    expect![[r#"
        fun caller(): Unit {
            f(1, side())
        }
    "#]]
    .assert_eq(&fixture.render_decl(&fragment, fragment.files[0].declarations[0]));
}
