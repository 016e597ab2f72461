//! Classes, constructors and delegated properties

use expect_test::expect;
use lowering_tests::Fixture;
use tl_ast::DeclKind;
use tl_semantic::{
    ConstructorDescriptor, DelegateCalls, DescId, DescriptorKind, PropertyDescriptor,
    ResolvedCall, SemTypeId, ValueParameterDescriptor,
};
use tl_syntax::{ClassKind, NodeId, NodeKind};

fn constructor(fixture: &mut Fixture, class: DescId, ty: SemTypeId) -> DescId {
    let constructor = fixture.descriptor(
        "<init>",
        Some(class),
        DescriptorKind::Constructor(ConstructorDescriptor {
            is_primary: true,
            value_parameters: Vec::new(),
            return_type: ty,
        }),
    );
    if let Some(class) = fixture.class_descriptor_mut(class) {
        class.primary_constructor = Some(constructor);
        class.constructors.push(constructor);
    }
    constructor
}

fn class_node(fixture: &mut Fixture, class: DescId, primary_constructor: Option<NodeId>) -> NodeId {
    let name = fixture.binding.descriptor(class).name;
    let node = fixture.node(NodeKind::Class {
        name: Some(name),
        type_parameters: Vec::new(),
        primary_constructor,
        super_call: None,
        declarations: Vec::new(),
        annotations: Vec::new(),
    });
    fixture.binding.record_declaration(node, class);
    node
}

#[test]
fn test_constructor_val_parameter_declares_property() {
    let mut fixture = Fixture::new();
    let int = fixture.builtins().int_type;
    let point = fixture.class("Point", ClassKind::Class);
    let point_ty = fixture.class_type(point);
    let init = constructor(&mut fixture, point, point_ty);
    let x_parameter = fixture.descriptor(
        "x",
        Some(init),
        DescriptorKind::ValueParameter(ValueParameterDescriptor::new(0, int)),
    );
    if let DescriptorKind::Constructor(constructor) = &mut fixture.binding.descriptor_mut(init).kind {
        constructor.value_parameters.push(x_parameter);
    }
    let mut x_property = PropertyDescriptor::new(int, false);
    x_property.dispatch_receiver = Some(point_ty);
    let x_property = fixture.descriptor("x", Some(point), DescriptorKind::Property(x_property));

    let parameter = fixture.parameter(x_parameter);
    fixture.binding.record_constructor_property(parameter, x_property);
    let primary = fixture.node(NodeKind::PrimaryConstructor {
        parameters: vec![parameter],
        annotations: Vec::new(),
    });
    fixture.binding.record_declaration(primary, init);
    let node = class_node(&mut fixture, point, Some(primary));
    fixture.add_declaration(node);

    let fragment = fixture.lower().unwrap();
    let class_decl = fragment.files[0].declarations[0];
    expect![[r#"
        class Point {
            constructor(x: Int)
            val x: Int = x
        }
    "#]]
    .assert_eq(&fixture.render_decl(&fragment, class_decl));

    let DeclKind::Class(class) = &fragment.store[class_decl].kind else {
        panic!("expected a class");
    };
    let [constructor_decl, property_decl] = class.declarations[..] else {
        panic!("expected a constructor and a property");
    };
    let DeclKind::Constructor(constructor) = &fragment.store[constructor_decl].kind else {
        panic!("expected a constructor");
    };
    let DeclKind::ValueParameter(parameter) = &fragment.store[constructor.value_parameters[0]].kind
    else {
        panic!("expected a value parameter");
    };
    assert_eq!(
        parameter.corresponding_property,
        Some(fragment.store[property_decl].symbol)
    );
}

#[test]
fn test_missing_primary_constructor_is_synthesized_except_for_objects() {
    let mut fixture = Fixture::new();
    let empty = fixture.class("Empty", ClassKind::Class);
    let empty_ty = fixture.class_type(empty);
    constructor(&mut fixture, empty, empty_ty);
    let single = fixture.class("Single", ClassKind::Object);
    let single_ty = fixture.class_type(single);
    constructor(&mut fixture, single, single_ty);

    let empty_node = class_node(&mut fixture, empty, None);
    let single_node = class_node(&mut fixture, single, None);
    fixture.add_declaration(empty_node);
    fixture.add_declaration(single_node);

    let fragment = fixture.lower().unwrap();
    let declarations = &fragment.files[0].declarations;
    expect![[r#"
        class Empty {
            constructor()
        }
    "#]]
    .assert_eq(&fixture.render_decl(&fragment, declarations[0]));
    expect![[r#"
        object Single
    "#]]
    .assert_eq(&fixture.render_decl(&fragment, declarations[1]));
}

#[test]
fn test_delegated_properties_get_synthetic_accessors() {
    let mut fixture = Fixture::new();
    let builtins = fixture.builtins();
    let int = builtins.int_type;
    let holder_class = fixture.class("Holder", ClassKind::Class);
    let holder_ty = fixture.class_type(holder_class);
    let get_value = fixture.operator(
        holder_ty,
        "getValue",
        int,
        &[("thisRef", builtins.nullable_any_type), ("property", builtins.any_type)],
    );
    let set_value = fixture.operator(
        holder_ty,
        "setValue",
        builtins.unit_type,
        &[
            ("thisRef", builtins.nullable_any_type),
            ("property", builtins.any_type),
            ("value", int),
        ],
    );
    let holder = fixture.descriptor(
        "holder",
        None,
        DescriptorKind::Property(PropertyDescriptor::new(holder_ty, false)),
    );

    for (name, is_var) in [("lazyValue", false), ("counter", true)] {
        let property = fixture.descriptor(
            name,
            None,
            DescriptorKind::Property(PropertyDescriptor::new(int, is_var)),
        );
        let delegate = fixture.reference(holder, holder_ty);
        let node = fixture.property_node(property, None, Some(delegate));
        fixture.binding.record_delegate_calls(
            node,
            DelegateCalls {
                get_value: ResolvedCall::new(get_value, int),
                set_value: Some(ResolvedCall::new(set_value, builtins.unit_type)),
                provide_delegate: None,
            },
        );
        fixture.add_declaration(node);
    }

    let fragment = fixture.lower().unwrap();
    let declarations = &fragment.files[0].declarations;
    expect![[r#"
        val lazyValue: Int by holder
            get() {
                return lazyValue$delegate.getValue(null, ::lazyValue)
            }
    "#]]
    .assert_eq(&fixture.render_decl(&fragment, declarations[0]));
    expect![[r#"
        var counter: Int by holder
            get() {
                return counter$delegate.getValue(null, ::counter)
            }
            set(<set-?>: Int) {
                counter$delegate.setValue(null, ::counter, <set-?>)
            }
    "#]]
    .assert_eq(&fixture.render_decl(&fragment, declarations[1]));
}
