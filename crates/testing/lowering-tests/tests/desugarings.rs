//! Constructs that expand into temporaries and canonical calls

use expect_test::expect;
use lowering_tests::Fixture;
use tl_semantic::{
    DescId, DescriptorKind, IndexedCalls, LoopCalls, PropertyDescriptor, ReceiverValue,
    ResolvedCall, ResolvedValueArgument, SemTypeId,
};
use tl_syntax::{
    BinaryOp, ClassKind, NodeId, NodeKind, TemplateEntry, UnaryOp, WhenCondition, WhenEntry,
    WhenSubject,
};

/// Lowers `function` with a block body and renders it
fn body_of(fixture: &mut Fixture, function: DescId, statements: Vec<NodeId>) -> String {
    let parameters = fixture.parameter_nodes(function);
    let body = fixture.block(statements);
    let node = fixture.function_node(function, parameters, Some(body));
    fixture.add_declaration(node);
    let fragment = fixture.lower().unwrap();
    fixture.render_decl(&fragment, fragment.files[0].declarations[0])
}

#[test]
fn test_postfix_and_prefix_increment() {
    let mut fixture = Fixture::new();
    let builtins = fixture.builtins();
    let int = builtins.int_type;
    let count = fixture.function("count", None, builtins.unit_type, &[]);
    let inc = fixture.operator(int, "inc", int, &[]);
    let x = fixture.local("x", count, int, true);

    let zero = fixture.int(0);
    let declaration = fixture.variable(x, Some(zero));

    let mut increments = Vec::new();
    for prefix in [false, true] {
        let operand = fixture.reference(x, int);
        let node = fixture.typed(
            NodeKind::Unary {
                op: UnaryOp::Increment,
                operand,
                prefix,
            },
            int,
        );
        fixture.binding.record_resolved_call(
            node,
            ResolvedCall::new(inc, int).with_dispatch_receiver(ReceiverValue::Expression(operand)),
        );
        increments.push(node);
    }

    let mut statements = vec![declaration];
    statements.extend(increments);
    expect![[r#"
        fun count(): Unit {
            var x: Int = 0
            val <unary>: Int = x
            x = <unary>.inc()
            <unary>
            val <unary>: Int = x
            x = <unary>.inc()
            x
        }
    "#]]
    .assert_eq(&body_of(&mut fixture, count, statements));
}

#[test]
fn test_destructuring_skips_underscore_entries() {
    let mut fixture = Fixture::new();
    let builtins = fixture.builtins();
    let int = builtins.int_type;
    let triple_class = fixture.class("Triple", ClassKind::Class);
    let triple = fixture.class_type(triple_class);
    let components: Vec<DescId> = (1..=3)
        .map(|index| fixture.operator(triple, &format!("component{index}"), int, &[]))
        .collect();
    let split = fixture.function("split", None, builtins.unit_type, &[("t", triple)]);
    let t = fixture.parameter_of(split, 0).unwrap();

    let mut entries = Vec::new();
    for (name, component) in [("a", Some(components[0])), ("_", None), ("c", Some(components[2]))] {
        let Some(component) = component else {
            entries.push(fixture.node(NodeKind::DestructuringEntry { name: None }));
            continue;
        };
        let local = fixture.local(name, split, int, false);
        let name = fixture.name(name);
        let entry = fixture.node(NodeKind::DestructuringEntry { name: Some(name) });
        fixture.binding.record_declaration(entry, local);
        fixture
            .binding
            .record_component_call(entry, ResolvedCall::new(component, int));
        entries.push(entry);
    }
    let initializer = fixture.reference(t, triple);
    let destructuring = fixture.node(NodeKind::Destructuring {
        entries,
        initializer: Some(initializer),
    });

    let parameters = fixture.parameter_nodes(split);
    let body = fixture.block(vec![destructuring]);
    let node = fixture.function_node(split, parameters, Some(body));
    fixture.add_declaration(node);
    let fragment = fixture.lower().unwrap();

    expect![[r#"
        fun split(t: Triple): Unit {
            val <destruct>: Triple = t
            val a: Int = <destruct>.component1()
            val c: Int = <destruct>.component3()
        }
    "#]]
    .assert_eq(&fixture.render_decl(&fragment, fragment.files[0].declarations[0]));
    let rendered = fixture.render(&fragment);
    assert!(rendered.contains("fun component3(): Int"));
    assert!(!rendered.contains("component2"));
}

#[test]
fn test_for_loop_uses_iterator_protocol() {
    let mut fixture = Fixture::new();
    let builtins = fixture.builtins();
    let int = builtins.int_type;
    let unit = builtins.unit_type;
    let items_class = fixture.class("Items", ClassKind::Class);
    let items_ty = fixture.class_type(items_class);
    let cursor_class = fixture.class("Cursor", ClassKind::Class);
    let cursor_ty = fixture.class_type(cursor_class);
    let iterator = fixture.operator(items_ty, "iterator", cursor_ty, &[]);
    let has_next = fixture.operator(cursor_ty, "hasNext", builtins.boolean_type, &[]);
    let next = fixture.operator(cursor_ty, "next", int, &[]);
    let print = fixture.function("print", None, unit, &[("value", int)]);
    let consume = fixture.function("consume", None, unit, &[("items", items_ty)]);
    let items = fixture.parameter_of(consume, 0).unwrap();

    let item = fixture.local("item", consume, int, false);
    let parameter = fixture.parameter(item);
    let item_read = fixture.reference(item, int);
    let print_call = fixture.call(
        ResolvedCall::new(print, unit).with_argument(ResolvedValueArgument::Expression(item_read)),
        vec![item_read],
    );
    let loop_body = fixture.block(vec![print_call]);
    let range = fixture.reference(items, items_ty);
    let for_loop = fixture.node(NodeKind::For {
        parameter,
        range,
        body: Some(loop_body),
    });
    fixture.binding.record_loop_calls(
        for_loop,
        LoopCalls {
            iterator: ResolvedCall::new(iterator, cursor_ty),
            has_next: ResolvedCall::new(has_next, builtins.boolean_type),
            next: ResolvedCall::new(next, int),
        },
    );

    expect![[r#"
        fun consume(items: Items): Unit {
            val <iterator>: Cursor = items.iterator()
            while (<iterator>.hasNext()) {
                val item: Int = <iterator>.next()
                print(item)
            }
        }
    "#]]
    .assert_eq(&body_of(&mut fixture, consume, vec![for_loop]));
}

#[test]
fn test_string_template_concatenates_with_to_string() {
    let mut fixture = Fixture::new();
    let builtins = fixture.builtins();
    let describe = fixture.function(
        "describe",
        None,
        builtins.string_type,
        &[("n", builtins.int_type)],
    );
    let n = fixture.parameter_of(describe, 0).unwrap();
    let n_read = fixture.reference(n, builtins.int_type);
    let template = fixture.typed(
        NodeKind::StringTemplate {
            entries: vec![
                TemplateEntry::Literal("n = ".to_owned()),
                TemplateEntry::Expression(n_read),
                TemplateEntry::Literal("!".to_owned()),
            ],
        },
        builtins.string_type,
    );
    let parameters = fixture.parameter_nodes(describe);
    let node = fixture.function_node(describe, parameters, Some(template));
    fixture.add_declaration(node);

    let fragment = fixture.lower().unwrap();
    expect![[r#"
        fun describe(n: Int): String {
            return@describe strcat("n = ", n.toString(), "!")
        }
    "#]]
    .assert_eq(&fixture.render_decl(&fragment, fragment.files[0].declarations[0]));
}

#[test]
fn test_template_of_single_string_is_that_string() {
    let mut fixture = Fixture::new();
    let string = fixture.builtins().string_type;
    let echo = fixture.function("echo", None, string, &[("s", string)]);
    let s = fixture.parameter_of(echo, 0).unwrap();
    let s_read = fixture.reference(s, string);
    let template = fixture.typed(
        NodeKind::StringTemplate {
            entries: vec![TemplateEntry::Expression(s_read)],
        },
        string,
    );
    let parameters = fixture.parameter_nodes(echo);
    let node = fixture.function_node(echo, parameters, Some(template));
    fixture.add_declaration(node);

    let fragment = fixture.lower().unwrap();
    expect![[r#"
        fun echo(s: String): String {
            return@echo s
        }
    "#]]
    .assert_eq(&fixture.render_decl(&fragment, fragment.files[0].declarations[0]));
}

#[test]
fn test_when_with_subject_compares_against_subject() {
    let mut fixture = Fixture::new();
    let builtins = fixture.builtins();
    let int = builtins.int_type;
    let span_class = fixture.class("Span", ClassKind::Class);
    let span = fixture.class_type(span_class);
    let contains = fixture.operator(span, "contains", builtins.boolean_type, &[("value", int)]);
    let classify = fixture.function(
        "classify",
        None,
        builtins.string_type,
        &[("x", int), ("r", span)],
    );
    let x = fixture.parameter_of(classify, 0).unwrap();
    let r = fixture.parameter_of(classify, 1).unwrap();

    let subject = fixture.reference(x, int);
    let one = fixture.int(1);
    let two = fixture.int(2);
    let low = fixture.string("low");
    let range = fixture.reference(r, span);
    fixture.binding.record_condition_call(
        range,
        ResolvedCall::new(contains, builtins.boolean_type)
            .with_dispatch_receiver(ReceiverValue::Expression(range)),
    );
    let outside = fixture.string("outside");
    let other = fixture.string("other");
    let when = fixture.typed(
        NodeKind::When {
            subject: Some(WhenSubject::Expression(subject)),
            entries: vec![
                WhenEntry {
                    conditions: vec![
                        WhenCondition::Expression(Some(one)),
                        WhenCondition::Expression(Some(two)),
                    ],
                    body: Some(low),
                    is_else: false,
                },
                WhenEntry {
                    conditions: vec![WhenCondition::InRange {
                        range,
                        negated: true,
                    }],
                    body: Some(outside),
                    is_else: false,
                },
                WhenEntry {
                    conditions: Vec::new(),
                    body: Some(other),
                    is_else: true,
                },
            ],
        },
        builtins.string_type,
    );
    let parameters = fixture.parameter_nodes(classify);
    let node = fixture.function_node(classify, parameters, Some(when));
    fixture.add_declaration(node);

    let fragment = fixture.lower().unwrap();
    expect![[r#"
        fun classify(x: Int, r: Span): String {
            return@classify when (x) {
                (($subject == 1) || ($subject == 2)) -> "low"
                !r.contains($subject) -> "outside"
                else -> "other"
            }
        }
    "#]]
    .assert_eq(&fixture.render_decl(&fragment, fragment.files[0].declarations[0]));
}

#[test]
fn test_safe_call_reads_through_checked_subject() {
    let mut fixture = Fixture::new();
    let builtins = fixture.builtins();
    let int = builtins.int_type;
    let int_class = fixture.classifier(int).unwrap();
    let nullable_string = fixture.nullable_type(builtins.string);
    let nullable_int = fixture.nullable_type(int_class);
    let mut length = PropertyDescriptor::new(int, false);
    length.dispatch_receiver = Some(builtins.string_type);
    let length = fixture.descriptor(
        "length",
        Some(builtins.string),
        DescriptorKind::Property(length),
    );
    let size = fixture.function("size", None, nullable_int, &[("a", nullable_string)]);
    let a = fixture.parameter_of(size, 0).unwrap();

    let receiver = fixture.reference(a, nullable_string);
    let name = fixture.name("length");
    let selector = fixture.typed(NodeKind::NameReference { name }, int);
    fixture.binding.record_resolved_call(
        selector,
        ResolvedCall::new(length, int).with_dispatch_receiver(ReceiverValue::Expression(receiver)),
    );
    let safe_call = fixture.typed(
        NodeKind::Qualified {
            receiver,
            selector,
            safe: true,
        },
        nullable_int,
    );
    let parameters = fixture.parameter_nodes(size);
    let node = fixture.function_node(size, parameters, Some(safe_call));
    fixture.add_declaration(node);

    let fragment = fixture.lower().unwrap();
    expect![[r#"
        fun size(a: String?): Int? {
            return@size a?.{ $safe.length }
        }
    "#]]
    .assert_eq(&fixture.render_decl(&fragment, fragment.files[0].declarations[0]));
}

/// `a[f()]` inside `fun bump(a: Buffer)`, with `Buffer.get` and `Buffer.set` resolved
fn element_of_buffer(fixture: &mut Fixture) -> (DescId, NodeId) {
    let builtins = fixture.builtins();
    let int = builtins.int_type;
    let unit = builtins.unit_type;
    let buffer_class = fixture.class("Buffer", ClassKind::Class);
    let buffer = fixture.class_type(buffer_class);
    let get = fixture.operator(buffer, "get", int, &[("index", int)]);
    let set = fixture.operator(buffer, "set", unit, &[("index", int), ("value", int)]);
    let f = fixture.function("f", None, int, &[]);
    let bump = fixture.function("bump", None, unit, &[("a", buffer)]);
    let a = fixture.parameter_of(bump, 0).unwrap();

    let array = fixture.reference(a, buffer);
    let index = fixture.call(ResolvedCall::new(f, int), Vec::new());
    let access = fixture.typed(
        NodeKind::ArrayAccess {
            array,
            indices: vec![index],
        },
        int,
    );
    let receiver = ReceiverValue::Expression(array);
    fixture.binding.record_indexed_calls(
        access,
        IndexedCalls {
            get: Some(
                ResolvedCall::new(get, int)
                    .with_dispatch_receiver(receiver)
                    .with_argument(ResolvedValueArgument::Expression(index)),
            ),
            set: Some(
                ResolvedCall::new(set, unit)
                    .with_dispatch_receiver(receiver)
                    .with_argument(ResolvedValueArgument::Expression(index)),
            ),
        },
    );
    (bump, access)
}

#[test]
fn test_augmented_indexed_assignment_evaluates_index_once() {
    let mut fixture = Fixture::new();
    let int = fixture.builtins().int_type;
    let plus = fixture.operator(int, "plus", int, &[("other", int)]);
    let (bump, access) = element_of_buffer(&mut fixture);

    let one = fixture.int(1);
    let assignment = fixture.node(NodeKind::Binary {
        op: BinaryOp::PlusAssign,
        left: access,
        right: Some(one),
    });
    fixture.binding.record_resolved_call(
        assignment,
        ResolvedCall::new(plus, int)
            .with_dispatch_receiver(ReceiverValue::Expression(access))
            .with_argument(ResolvedValueArgument::Expression(one)),
    );

    let rendered = body_of(&mut fixture, bump, vec![assignment]);
    expect![[r#"
        fun bump(a: Buffer): Unit {
            val <array>: Buffer = a
            val <index_0>: Int = f()
            <array>.set(<index_0>, <array>.get(<index_0>).plus(1))
        }
    "#]]
    .assert_eq(&rendered);
    assert_eq!(rendered.matches("f()").count(), 1);
}

#[test]
fn test_prefix_increment_of_element_yields_updated_value() {
    let mut fixture = Fixture::new();
    let int = fixture.builtins().int_type;
    let inc = fixture.operator(int, "inc", int, &[]);
    let (bump, access) = element_of_buffer(&mut fixture);

    let increment = fixture.typed(
        NodeKind::Unary {
            op: UnaryOp::Increment,
            operand: access,
            prefix: true,
        },
        int,
    );
    fixture.binding.record_resolved_call(
        increment,
        ResolvedCall::new(inc, int).with_dispatch_receiver(ReceiverValue::Expression(access)),
    );

    let rendered = body_of(&mut fixture, bump, vec![increment]);
    expect![[r#"
        fun bump(a: Buffer): Unit {
            val <array>: Buffer = a
            val <index_0>: Int = f()
            val <unary>: Int = <array>.get(<index_0>)
            val <unary-result>: Int = <unary>.inc()
            <array>.set(<index_0>, <unary-result>)
            <unary-result>
        }
    "#]]
    .assert_eq(&rendered);
    assert_eq!(rendered.matches("f()").count(), 1);
}

/// `class Holder` with a member `var count: Int`
fn holder_with_count(fixture: &mut Fixture) -> (DescId, SemTypeId) {
    let int = fixture.builtins().int_type;
    let holder_class = fixture.class("Holder", ClassKind::Class);
    let holder = fixture.class_type(holder_class);
    let mut count = PropertyDescriptor::new(int, true);
    count.dispatch_receiver = Some(holder);
    let count = fixture.descriptor("count", Some(holder_class), DescriptorKind::Property(count));
    (count, holder)
}

/// `receiver.count` resolved against the receiver expression
fn count_of(fixture: &mut Fixture, count: DescId, receiver: NodeId, safe: bool) -> NodeId {
    let int = fixture.builtins().int_type;
    let name = fixture.name("count");
    let selector = fixture.typed(NodeKind::NameReference { name }, int);
    fixture.binding.record_resolved_call(
        selector,
        ResolvedCall::new(count, int).with_dispatch_receiver(ReceiverValue::Expression(receiver)),
    );
    fixture.node(NodeKind::Qualified {
        receiver,
        selector,
        safe,
    })
}

#[test]
fn test_postfix_increment_of_member_captures_receiver() {
    let mut fixture = Fixture::new();
    let builtins = fixture.builtins();
    let int = builtins.int_type;
    let inc = fixture.operator(int, "inc", int, &[]);
    let (count, holder) = holder_with_count(&mut fixture);
    let g = fixture.function("g", None, holder, &[]);
    let touch = fixture.function("touch", None, builtins.unit_type, &[]);

    let receiver = fixture.call(ResolvedCall::new(g, holder), Vec::new());
    let member = count_of(&mut fixture, count, receiver, false);
    let increment = fixture.typed(
        NodeKind::Unary {
            op: UnaryOp::Increment,
            operand: member,
            prefix: false,
        },
        int,
    );
    fixture.binding.record_resolved_call(
        increment,
        ResolvedCall::new(inc, int).with_dispatch_receiver(ReceiverValue::Expression(member)),
    );

    let rendered = body_of(&mut fixture, touch, vec![increment]);
    expect![[r#"
        fun touch(): Unit {
            val <receiver>: Holder = g()
            val <unary>: Int = <receiver>.count
            <receiver>.count = <unary>.inc()
            <unary>
        }
    "#]]
    .assert_eq(&rendered);
    assert_eq!(rendered.matches("g()").count(), 1);
}

#[test]
fn test_assignment_through_safe_call_stays_inside_the_check() {
    let mut fixture = Fixture::new();
    let builtins = fixture.builtins();
    let (count, _) = holder_with_count(&mut fixture);
    let holder_class = fixture.binding.descriptor(count).container.unwrap();
    let nullable_holder = fixture.nullable_type(holder_class);
    let reset = fixture.function("reset", None, builtins.unit_type, &[("h", nullable_holder)]);
    let h = fixture.parameter_of(reset, 0).unwrap();

    let receiver = fixture.reference(h, nullable_holder);
    let member = count_of(&mut fixture, count, receiver, true);
    let zero = fixture.int(0);
    let assignment = fixture.node(NodeKind::Binary {
        op: BinaryOp::Assign,
        left: member,
        right: Some(zero),
    });

    expect![[r#"
        fun reset(h: Holder?): Unit {
            h?.{ $safe.count = 0 }
        }
    "#]]
    .assert_eq(&body_of(&mut fixture, reset, vec![assignment]));
}
