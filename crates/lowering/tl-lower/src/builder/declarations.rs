//! Classes, callables, properties and their parameters

use super::calls::{build_call, lower_delegation_call, CallOverrides};
use super::{annotation_calls, block, desugar, lower_block, lower_expr, push_flattened, Temporary};
use crate::context::GeneratorContext;
use crate::error::{LowerError, LowerResult};
use crate::scope::{Frame, Scope};
use crate::stub::{convert_all, convert_optional, function_flags};
use log::{debug, trace};
use tl_ast::{
    Access, AccessorDecl, AstType, ClassDecl, ConstKind, ConstValue, ConstructorDecl, DeclId,
    DeclKind, DeclOrigin, ExprId, ExprKind, FunctionDecl, FunctionTarget, FunctionTargetId,
    InitializerDecl, PropertyDecl, Statement, SymbolId, SymbolKind, TypeAliasDecl,
    TypeParameterDecl, ValueParameterDecl,
};
use tl_intern::Name;
use tl_semantic::{ClassDescriptor, DescId, Descriptor, DescriptorKind, ResolvedCall, SemTypeId};
use tl_syntax::{ClassKind, Modality, NodeId, NodeKind, Visibility};

/// Translate a declaration node and bind its symbol
pub(super) fn lower_declaration(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    node: NodeId,
) -> LowerResult<DeclId> {
    let tree = ctx.tree;
    match tree.kind(node) {
        NodeKind::Class { .. } => lower_class(ctx, node),
        NodeKind::EnumEntry {
            declarations,
            annotations,
            ..
        } => lower_enum_entry(ctx, node, declarations, annotations),
        NodeKind::Function { .. } => lower_function(ctx, scope, node, None),
        NodeKind::Property { .. } => lower_property(ctx, scope, node),
        NodeKind::TypeAlias {
            type_parameters,
            annotations,
            ..
        } => lower_type_alias(ctx, node, type_parameters, annotations),
        NodeKind::SecondaryConstructor { .. } => lower_constructor(ctx, scope, node, None),
        NodeKind::AnonymousInitializer { body, annotations } => {
            lower_initializer(ctx, scope, *body, annotations)
        }
        _ => Err(ctx.unexpected(node, "declaration")),
    }
}

fn unexpected_declaration(
    ctx: &GeneratorContext<'_>,
    desc: DescId,
    expected: &'static str,
) -> LowerError {
    let descriptor = ctx.binding.descriptor(desc);
    LowerError::UnexpectedDeclaration {
        name: ctx.name(descriptor.name).to_string(),
        found: descriptor.kind.describe(),
        expected,
    }
}

fn class_decl(
    ctx: &mut GeneratorContext<'_>,
    descriptor: &Descriptor,
    class: &ClassDescriptor,
    type_parameters: Vec<DeclId>,
    declarations: Vec<DeclId>,
) -> LowerResult<ClassDecl> {
    Ok(ClassDecl {
        class_kind: class.class_kind,
        visibility: descriptor.visibility,
        modality: class.modality,
        is_data: class.is_data,
        is_inner: class.is_inner,
        is_companion: class.is_companion,
        type_parameters,
        supertypes: convert_all(ctx, &class.supertypes)?,
        declarations,
    })
}

/// Class, interface or object with its constructors and members
///
/// Members see no enclosing jump targets. A class without a written primary
/// constructor gets one from its descriptor, except for objects. Primary
/// constructor parameters declared `val`/`var` add a property initialized
/// from the parameter.
fn lower_class(ctx: &mut GeneratorContext<'_>, node: NodeId) -> LowerResult<DeclId> {
    let tree = ctx.tree;
    let binding = ctx.binding;
    let NodeKind::Class {
        type_parameters,
        primary_constructor,
        super_call,
        declarations,
        annotations,
        ..
    } = tree.kind(node)
    else {
        return Err(ctx.unexpected(node, "class"));
    };
    let desc = ctx.declared(node)?;
    let descriptor = binding.descriptor(desc);
    let Some(class) = descriptor.as_class() else {
        return Err(unexpected_declaration(ctx, desc, "class"));
    };
    debug!("lowering class `{}`", ctx.name(descriptor.name));

    let symbol = ctx.symbols.get_or_create_class_symbol(desc);
    let annotations = annotation_calls(ctx, annotations)?;
    let type_parameters = lower_type_parameters(ctx, type_parameters)?;

    let members_scope = Scope::root();
    let mut members = Vec::with_capacity(declarations.len() + 1);
    match primary_constructor {
        Some(constructor) => {
            members.push(lower_constructor(ctx, &members_scope, *constructor, *super_call)?);
            if let NodeKind::PrimaryConstructor { parameters, .. } = tree.kind(*constructor) {
                for &parameter in parameters {
                    if let Some(property) = binding.constructor_property(parameter) {
                        members.push(constructor_property(ctx, property, parameter)?);
                    }
                }
            }
        }
        None => {
            if let Some(constructor) = class.primary_constructor {
                if class.class_kind != ClassKind::Object {
                    members.push(synthesized_constructor(
                        ctx,
                        &members_scope,
                        constructor,
                        *super_call,
                    )?);
                }
            }
        }
    }
    for &member in declarations {
        members.push(lower_declaration(ctx, &members_scope, member)?);
    }

    let class = class_decl(ctx, descriptor, class, type_parameters, members)?;
    ctx.declare(symbol, DeclOrigin::Source, annotations, DeclKind::Class(class))
}

/// `object : T { .. }` in expression position
pub(super) fn lower_object_literal(
    ctx: &mut GeneratorContext<'_>,
    node: NodeId,
    declaration: NodeId,
) -> LowerResult<ExprId> {
    let class = lower_class(ctx, declaration)?;
    let ty = ctx.expression_type(node)?;
    Ok(ctx.alloc_expr(ty, ExprKind::AnonymousObject { class }))
}

fn lower_enum_entry(
    ctx: &mut GeneratorContext<'_>,
    node: NodeId,
    declarations: &[NodeId],
    annotations: &[NodeId],
) -> LowerResult<DeclId> {
    let binding = ctx.binding;
    let desc = ctx.declared(node)?;
    let descriptor = binding.descriptor(desc);
    let Some(class) = descriptor.as_class() else {
        return Err(unexpected_declaration(ctx, desc, "enum entry"));
    };
    let symbol = ctx.symbols.get_or_create_class_symbol(desc);
    let annotations = annotation_calls(ctx, annotations)?;

    let scope = Scope::root();
    let mut members = Vec::with_capacity(declarations.len());
    for &member in declarations {
        members.push(lower_declaration(ctx, &scope, member)?);
    }

    let class = class_decl(ctx, descriptor, class, Vec::new(), members)?;
    ctx.declare(symbol, DeclOrigin::Source, annotations, DeclKind::Class(class))
}

/// Member property declared by a `val`/`var` primary constructor parameter
fn constructor_property(
    ctx: &mut GeneratorContext<'_>,
    property_desc: DescId,
    parameter: NodeId,
) -> LowerResult<DeclId> {
    let binding = ctx.binding;
    let descriptor = binding.descriptor(property_desc);
    let Some(property) = descriptor.as_property() else {
        return Err(unexpected_declaration(ctx, property_desc, "property"));
    };
    let symbol = ctx.symbols.get_or_create_property_symbol(property_desc);
    let parameter_desc = ctx.declared(parameter)?;
    let parameter_symbol = ctx.symbols.get_or_create_value_parameter_symbol(parameter_desc);

    let return_type = ctx.convert(property.ty)?;
    let initializer = ctx.alloc_expr(
        return_type.clone(),
        ExprKind::QualifiedAccess(Access::plain(parameter_symbol)),
    );
    let property = PropertyDecl {
        visibility: descriptor.visibility,
        modality: property.modality,
        is_var: property.is_var,
        is_local: false,
        is_const: property.is_const,
        is_lateinit: property.is_lateinit,
        return_type,
        dispatch_receiver_type: convert_optional(ctx, property.dispatch_receiver)?,
        extension_receiver_type: None,
        type_parameters: Vec::new(),
        initializer: Some(initializer),
        delegate: None,
        getter: None,
        setter: None,
    };
    ctx.declare(symbol, DeclOrigin::Source, Vec::new(), DeclKind::Property(property))
}

/// Primary or secondary constructor node
///
/// `super_call` is the superclass call from the class header, used for a
/// primary constructor; secondary constructors carry their own delegation.
fn lower_constructor(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    node: NodeId,
    super_call: Option<NodeId>,
) -> LowerResult<DeclId> {
    let tree = ctx.tree;
    let binding = ctx.binding;
    let (parameters, delegation, body, annotations, is_primary) = match tree.kind(node) {
        NodeKind::PrimaryConstructor {
            parameters,
            annotations,
        } => (parameters, super_call, None, annotations, true),
        NodeKind::SecondaryConstructor {
            parameters,
            delegation_call,
            body,
            annotations,
        } => (parameters, *delegation_call, *body, annotations, false),
        _ => return Err(ctx.unexpected(node, "constructor")),
    };
    let desc = ctx.declared(node)?;
    let descriptor = binding.descriptor(desc);
    let Some(constructor) = descriptor.as_constructor() else {
        return Err(unexpected_declaration(ctx, desc, "constructor"));
    };
    let symbol = ctx.symbols.get_or_create_constructor_symbol(desc);
    let annotations = annotation_calls(ctx, annotations)?;

    let target = ctx.store.new_function_target(FunctionTarget::new(None, false));
    let inner = scope.push(Frame::Function(target));
    let value_parameters = lower_value_parameters(ctx, &inner, parameters)?;
    let delegated_call = match delegation {
        Some(delegation) => Some(lower_delegation_call(ctx, &inner, delegation)?),
        None => None,
    };
    let body = match body {
        Some(body) => Some(lower_function_body(ctx, &inner, body, target)?),
        None => None,
    };

    let constructor = ConstructorDecl {
        is_primary,
        visibility: descriptor.visibility,
        value_parameters,
        return_type: ctx.convert(constructor.return_type)?,
        delegated_call,
        body,
    };
    let decl = ctx.declare(
        symbol,
        DeclOrigin::Source,
        annotations,
        DeclKind::Constructor(constructor),
    )?;
    ctx.store.bind_function_target(target, decl)?;
    Ok(decl)
}

/// Primary constructor of a class that does not write one out
fn synthesized_constructor(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    desc: DescId,
    super_call: Option<NodeId>,
) -> LowerResult<DeclId> {
    let binding = ctx.binding;
    let descriptor = binding.descriptor(desc);
    let Some(constructor) = descriptor.as_constructor() else {
        return Err(unexpected_declaration(ctx, desc, "constructor"));
    };
    let symbol = ctx.symbols.get_or_create_constructor_symbol(desc);

    let target = ctx.store.new_function_target(FunctionTarget::new(None, false));
    let inner = scope.push(Frame::Function(target));
    let value_parameters = constructor
        .value_parameters
        .iter()
        .map(|&parameter| synthetic_value_parameter(ctx, parameter))
        .collect::<LowerResult<Vec<_>>>()?;
    let delegated_call = match super_call {
        Some(call) => Some(lower_delegation_call(ctx, &inner, call)?),
        None => None,
    };

    let constructor = ConstructorDecl {
        is_primary: true,
        visibility: descriptor.visibility,
        value_parameters,
        return_type: ctx.convert(constructor.return_type)?,
        delegated_call,
        body: None,
    };
    let decl = ctx.declare(
        symbol,
        DeclOrigin::Synthetic,
        Vec::new(),
        DeclKind::Constructor(constructor),
    )?;
    ctx.store.bind_function_target(target, decl)?;
    Ok(decl)
}

/// Named function, or the declaration behind an anonymous function
///
/// The function target is labeled with the explicit label if there is one
/// and with the function name otherwise.
fn lower_function(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    node: NodeId,
    label: Option<Name>,
) -> LowerResult<DeclId> {
    let tree = ctx.tree;
    let binding = ctx.binding;
    let NodeKind::Function {
        name,
        type_parameters,
        parameters,
        body,
        annotations,
    } = tree.kind(node)
    else {
        return Err(ctx.unexpected(node, "function"));
    };
    let desc = ctx.declared(node)?;
    let descriptor = binding.descriptor(desc);
    let Some(function) = descriptor.as_function() else {
        return Err(unexpected_declaration(ctx, desc, "function"));
    };
    trace!("lowering function `{}`", ctx.name(descriptor.name));

    let symbol = ctx.symbols.symbol_for(desc);
    let annotations = annotation_calls(ctx, annotations)?;
    let type_parameters = lower_type_parameters(ctx, type_parameters)?;

    let target = ctx
        .store
        .new_function_target(FunctionTarget::new(label.or(*name), false));
    let inner = scope.push(Frame::Function(target));
    let value_parameters = lower_value_parameters(ctx, &inner, parameters)?;
    let body = match body {
        Some(body) => Some(lower_function_body(ctx, &inner, *body, target)?),
        None => None,
    };

    let function = FunctionDecl {
        visibility: descriptor.visibility,
        modality: function.modality,
        flags: function_flags(function),
        type_parameters,
        dispatch_receiver_type: convert_optional(ctx, function.dispatch_receiver)?,
        extension_receiver_type: convert_optional(ctx, function.extension_receiver)?,
        value_parameters,
        return_type: ctx.convert(function.return_type)?,
        body,
        overridden: function
            .overridden
            .iter()
            .map(|&overridden| ctx.symbols.get_or_create_function_symbol(overridden))
            .collect(),
        label: if name.is_none() { label } else { None },
    };
    let decl = ctx.declare(symbol, DeclOrigin::Source, annotations, DeclKind::Function(function))?;
    ctx.store.bind_function_target(target, decl)?;
    Ok(decl)
}

/// `fun(..) { .. }` in expression position
pub(super) fn lower_anonymous_function(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    node: NodeId,
    label: Option<Name>,
) -> LowerResult<ExprId> {
    let label = label.or_else(|| scope.implicit_lambda_label());
    let function = lower_function(ctx, scope, node, label)?;
    let ty = ctx.expression_type(node)?;
    Ok(ctx.alloc_expr(ty, ExprKind::Lambda { function }))
}

/// Block body, or an expression body wrapped as `{ return expr }`
fn lower_function_body(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    body: NodeId,
    target: FunctionTargetId,
) -> LowerResult<ExprId> {
    let tree = ctx.tree;
    if let NodeKind::Block { statements } = tree.kind(body) {
        return lower_block(ctx, scope, body, statements);
    }
    let value = lower_expr(ctx, scope, body)?;
    let nothing = ctx.nothing_type()?;
    let ret = ctx.alloc_expr(nothing, ExprKind::Return { target, value });
    block(ctx, vec![Statement::Expression(ret)])
}

/// Lambda literal
///
/// A lambda without a label takes the name of the call it is passed to.
/// Destructured parameters unpack at the start of the body, and a lambda
/// written without parameters declares the implicit `it` of its signature.
/// The body has no implicit return of its last expression.
pub(super) fn lower_lambda(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    node: NodeId,
    label: Option<Name>,
) -> LowerResult<ExprId> {
    let tree = ctx.tree;
    let binding = ctx.binding;
    let NodeKind::Lambda { parameters, body } = tree.kind(node) else {
        return Err(ctx.unexpected(node, "lambda"));
    };
    let desc = ctx.declared(node)?;
    let Some(function) = binding.descriptor(desc).as_function() else {
        return Err(unexpected_declaration(ctx, desc, "lambda"));
    };
    let symbol = ctx.symbols.get_or_create_anonymous_function_symbol(desc);
    let label = label.or_else(|| scope.implicit_lambda_label());

    let target = ctx.store.new_function_target(FunctionTarget::new(label, true));
    let inner = scope.push(Frame::Function(target));

    let mut statements = Vec::new();
    let mut value_parameters = Vec::with_capacity(parameters.len().max(1));
    if parameters.is_empty() {
        for &parameter in &function.value_parameters {
            value_parameters.push(synthetic_value_parameter(ctx, parameter)?);
        }
    }
    for &parameter in parameters {
        let decl = lower_value_parameter(ctx, &inner, parameter)?;
        value_parameters.push(decl);

        let NodeKind::Parameter {
            destructuring: Some(destructuring),
            ..
        } = tree.kind(parameter)
        else {
            continue;
        };
        let NodeKind::Destructuring { entries, .. } = tree.kind(*destructuring) else {
            return Err(ctx.unexpected(*destructuring, "destructuring declaration"));
        };
        let container = Temporary {
            decl,
            symbol: ctx.store[decl].symbol,
            ty: ctx
                .declared_type(decl)
                .ok_or_else(|| ctx.unexpected(parameter, "value parameter"))?,
        };
        desugar::destructure_into(ctx, &inner, entries, &container, &mut statements)?;
    }

    match tree.kind(*body) {
        NodeKind::Block { statements: body } => {
            for &statement in body {
                let expr = lower_expr(ctx, &inner, statement)?;
                push_flattened(ctx, &mut statements, expr);
            }
        }
        _ => {
            let expr = lower_expr(ctx, &inner, *body)?;
            push_flattened(ctx, &mut statements, expr);
        }
    }
    if statements.is_empty() {
        let unit = ctx.unit()?;
        statements.push(Statement::Expression(unit));
    }
    let body = block(ctx, statements)?;

    let lambda = FunctionDecl {
        visibility: Visibility::Local,
        modality: Modality::Final,
        flags: function_flags(function),
        type_parameters: Vec::new(),
        dispatch_receiver_type: None,
        extension_receiver_type: convert_optional(ctx, function.extension_receiver)?,
        value_parameters,
        return_type: ctx.convert(function.return_type)?,
        body: Some(body),
        overridden: Vec::new(),
        label,
    };
    let decl = ctx.declare(symbol, DeclOrigin::Source, Vec::new(), DeclKind::Function(lambda))?;
    ctx.store.bind_function_target(target, decl)?;

    let ty = ctx.expression_type(node)?;
    Ok(ctx.alloc_expr(ty, ExprKind::Lambda { function: decl }))
}

/// Property or local variable with its accessors
fn lower_property(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    node: NodeId,
) -> LowerResult<DeclId> {
    let tree = ctx.tree;
    let binding = ctx.binding;
    let NodeKind::Property {
        type_parameters,
        initializer,
        delegate,
        getter,
        setter,
        annotations,
        ..
    } = tree.kind(node)
    else {
        return Err(ctx.unexpected(node, "property"));
    };
    let desc = ctx.declared(node)?;
    let descriptor = binding.descriptor(desc);
    let Some(property) = descriptor.as_property() else {
        return Err(unexpected_declaration(ctx, desc, "property"));
    };

    let symbol = ctx.symbols.get_or_create_property_symbol(desc);
    let annotations = annotation_calls(ctx, annotations)?;
    let type_parameters = lower_type_parameters(ctx, type_parameters)?;
    let return_type = ctx.convert(property.ty)?;
    let initializer = match initializer {
        Some(initializer) => Some(lower_expr(ctx, scope, *initializer)?),
        None => None,
    };

    let (delegate, getter, setter) = match delegate {
        Some(delegate) => {
            let delegated = lower_delegate(ctx, scope, node, desc, symbol, *delegate)?;
            (Some(delegated.field), Some(delegated.getter), delegated.setter)
        }
        None => {
            let getter = match getter {
                Some(getter) => Some(lower_accessor(ctx, scope, *getter, symbol)?),
                None => None,
            };
            let setter = match setter {
                Some(setter) => Some(lower_accessor(ctx, scope, *setter, symbol)?),
                None => None,
            };
            (None, getter, setter)
        }
    };

    let property = PropertyDecl {
        visibility: descriptor.visibility,
        modality: property.modality,
        is_var: property.is_var,
        is_local: property.is_local,
        is_const: property.is_const,
        is_lateinit: property.is_lateinit,
        return_type,
        dispatch_receiver_type: convert_optional(ctx, property.dispatch_receiver)?,
        extension_receiver_type: convert_optional(ctx, property.extension_receiver)?,
        type_parameters,
        initializer,
        delegate,
        getter,
        setter,
    };
    ctx.declare(symbol, DeclOrigin::Source, annotations, DeclKind::Property(property))
}

/// Custom getter or setter written in source
fn lower_accessor(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    node: NodeId,
    property: SymbolId,
) -> LowerResult<DeclId> {
    let tree = ctx.tree;
    let binding = ctx.binding;
    let NodeKind::PropertyAccessor {
        is_setter,
        parameters,
        body,
        annotations,
    } = tree.kind(node)
    else {
        return Err(ctx.unexpected(node, "property accessor"));
    };
    let desc = ctx.declared(node)?;
    let descriptor = binding.descriptor(desc);
    let DescriptorKind::PropertyAccessor(accessor) = &descriptor.kind else {
        return Err(unexpected_declaration(ctx, desc, "property accessor"));
    };
    let symbol = ctx.symbols.get_or_create_property_accessor_symbol(desc);
    let annotations = annotation_calls(ctx, annotations)?;

    let target = ctx.store.new_function_target(FunctionTarget::new(None, false));
    let inner = scope.push(Frame::Function(target));
    let value_parameters = lower_value_parameters(ctx, &inner, parameters)?;
    let body = match body {
        Some(body) => Some(lower_function_body(ctx, &inner, *body, target)?),
        None => None,
    };

    let accessor = AccessorDecl {
        property,
        is_setter: *is_setter,
        visibility: descriptor.visibility,
        return_type: ctx.convert(accessor.return_type)?,
        value_parameters,
        body,
    };
    let decl = ctx.declare(
        symbol,
        DeclOrigin::Source,
        annotations,
        DeclKind::PropertyAccessor(accessor),
    )?;
    ctx.store.bind_function_target(target, decl)?;
    Ok(decl)
}

/// Delegate field initializer and the accessors that forward to it
struct Delegated {
    field: ExprId,
    getter: DeclId,
    setter: Option<DeclId>,
}

/// `val x by d`
///
/// The delegate field holds `d`, or `d.provideDelegate(thisRef, ::x)` when
/// that operator resolved. The getter returns `getValue(thisRef, ::x)` on
/// the field and a `var` also gets a setter calling `setValue`.
fn lower_delegate(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    node: NodeId,
    desc: DescId,
    property_symbol: SymbolId,
    delegate: NodeId,
) -> LowerResult<Delegated> {
    let binding = ctx.binding;
    let descriptor = binding.descriptor(desc);
    let Some(property) = descriptor.as_property() else {
        return Err(unexpected_declaration(ctx, desc, "property"));
    };
    let calls = binding
        .delegate_calls(node)
        .ok_or_else(|| ctx.missing("delegate operator calls", node))?;
    let name = ctx.name(descriptor.name);

    let value = lower_expr(ctx, scope, delegate)?;
    let field = match &calls.provide_delegate {
        Some(provide) => {
            let this_ref = this_ref(ctx, property.dispatch_receiver)?;
            let reference = property_reference(ctx, provide, property_symbol)?;
            let ty = ctx.convert(provide.result_type)?;
            build_call(
                ctx,
                scope,
                provide,
                ty,
                CallOverrides::with_arguments(Some(value), vec![Some(this_ref), Some(reference)]),
            )?
        }
        None => value,
    };
    let field_ty = ctx.expr_type(field);

    let getter_symbol = match property.getter {
        Some(getter) => ctx.symbols.get_or_create_property_accessor_symbol(getter),
        None => {
            let name = ctx.intern(&format!("<get-{name}>"));
            ctx.symbols.fresh_local(SymbolKind::PropertyAccessor, name)
        }
    };
    let return_type = ctx.convert(property.ty)?;
    let target = ctx.store.new_function_target(FunctionTarget::new(None, false));
    let receiver = delegate_field(ctx, property_symbol, property.dispatch_receiver, &field_ty)?;
    let this = this_ref(ctx, property.dispatch_receiver)?;
    let reference = property_reference(ctx, &calls.get_value, property_symbol)?;
    let value = build_call(
        ctx,
        scope,
        &calls.get_value,
        return_type.clone(),
        CallOverrides::with_arguments(Some(receiver), vec![Some(this), Some(reference)]),
    )?;
    let nothing = ctx.nothing_type()?;
    let ret = ctx.alloc_expr(nothing, ExprKind::Return { target, value });
    let body = block(ctx, vec![Statement::Expression(ret)])?;
    let getter = ctx.declare(
        getter_symbol,
        DeclOrigin::Synthetic,
        Vec::new(),
        DeclKind::PropertyAccessor(AccessorDecl {
            property: property_symbol,
            is_setter: false,
            visibility: descriptor.visibility,
            return_type: return_type.clone(),
            value_parameters: Vec::new(),
            body: Some(body),
        }),
    )?;
    ctx.store.bind_function_target(target, getter)?;

    let setter = match (&calls.set_value, property.is_var) {
        (Some(set_value), true) => {
            let setter_symbol = match property.setter {
                Some(setter) => ctx.symbols.get_or_create_property_accessor_symbol(setter),
                None => {
                    let name = ctx.intern(&format!("<set-{name}>"));
                    ctx.symbols.fresh_local(SymbolKind::PropertyAccessor, name)
                }
            };
            let value_name = ctx.intern("<set-?>");
            let value_symbol = ctx.symbols.fresh_local(SymbolKind::ValueParameter, value_name);
            let parameter = ctx.declare(
                value_symbol,
                DeclOrigin::Synthetic,
                Vec::new(),
                DeclKind::ValueParameter(ValueParameterDecl::new(return_type.clone())),
            )?;

            let target = ctx.store.new_function_target(FunctionTarget::new(None, false));
            let receiver =
                delegate_field(ctx, property_symbol, property.dispatch_receiver, &field_ty)?;
            let this = this_ref(ctx, property.dispatch_receiver)?;
            let reference = property_reference(ctx, set_value, property_symbol)?;
            let new_value = ctx.alloc_expr(
                return_type,
                ExprKind::QualifiedAccess(Access::plain(value_symbol)),
            );
            let unit = ctx.unit_type()?;
            let call = build_call(
                ctx,
                scope,
                set_value,
                unit.clone(),
                CallOverrides::with_arguments(
                    Some(receiver),
                    vec![Some(this), Some(reference), Some(new_value)],
                ),
            )?;
            let body = block(ctx, vec![Statement::Expression(call)])?;
            let setter = ctx.declare(
                setter_symbol,
                DeclOrigin::Synthetic,
                Vec::new(),
                DeclKind::PropertyAccessor(AccessorDecl {
                    property: property_symbol,
                    is_setter: true,
                    visibility: descriptor.visibility,
                    return_type: unit,
                    value_parameters: vec![parameter],
                    body: Some(body),
                }),
            )?;
            ctx.store.bind_function_target(target, setter)?;
            Some(setter)
        }
        _ => None,
    };

    Ok(Delegated {
        field,
        getter,
        setter,
    })
}

/// `this` for a member property, `null` otherwise
fn this_ref(
    ctx: &mut GeneratorContext<'_>,
    dispatch_receiver: Option<SemTypeId>,
) -> LowerResult<ExprId> {
    match dispatch_receiver {
        Some(receiver) => {
            let ty = ctx.convert(receiver)?;
            Ok(ctx.alloc_expr(ty, ExprKind::This { label: None }))
        }
        None => {
            let null = ctx.builtins().nullable_nothing_type;
            let ty = ctx.convert(null)?;
            Ok(ctx.alloc_expr(
                ty,
                ExprKind::Const {
                    kind: ConstKind::Null,
                    value: ConstValue::Null,
                },
            ))
        }
    }
}

fn delegate_field(
    ctx: &mut GeneratorContext<'_>,
    property: SymbolId,
    dispatch_receiver: Option<SemTypeId>,
    ty: &AstType,
) -> LowerResult<ExprId> {
    let receiver = match dispatch_receiver {
        Some(receiver) => {
            let receiver_ty = ctx.convert(receiver)?;
            Some(ctx.alloc_expr(receiver_ty, ExprKind::This { label: None }))
        }
        None => None,
    };
    Ok(ctx.alloc_expr(
        ty.clone(),
        ExprKind::DelegateFieldAccess { property, receiver },
    ))
}

/// `::x` typed as the property parameter of the delegate operator
fn property_reference(
    ctx: &mut GeneratorContext<'_>,
    operator: &ResolvedCall,
    property: SymbolId,
) -> LowerResult<ExprId> {
    let binding = ctx.binding;
    let ty = binding
        .descriptor(operator.candidate)
        .value_parameters()
        .get(1)
        .and_then(|&parameter| binding.descriptor(parameter).as_value_parameter())
        .map_or(binding.builtins().nullable_any_type, |parameter| parameter.ty);
    let ty = ctx.convert(ty)?;
    Ok(ctx.alloc_expr(ty, ExprKind::CallableReference(Access::plain(property))))
}

/// `init { .. }`; a missing body becomes an empty block
fn lower_initializer(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    body: Option<NodeId>,
    annotations: &[NodeId],
) -> LowerResult<DeclId> {
    let name = ctx.intern("<init>");
    let symbol = ctx.symbols.fresh_local(SymbolKind::AnonymousInitializer, name);
    let annotations = annotation_calls(ctx, annotations)?;
    let body = super::lower_body_block(ctx, scope, body)?;
    ctx.declare(
        symbol,
        DeclOrigin::Source,
        annotations,
        DeclKind::AnonymousInitializer(InitializerDecl { body }),
    )
}

fn lower_type_alias(
    ctx: &mut GeneratorContext<'_>,
    node: NodeId,
    type_parameters: &[NodeId],
    annotations: &[NodeId],
) -> LowerResult<DeclId> {
    let binding = ctx.binding;
    let desc = ctx.declared(node)?;
    let descriptor = binding.descriptor(desc);
    let DescriptorKind::TypeAlias(alias) = &descriptor.kind else {
        return Err(unexpected_declaration(ctx, desc, "type alias"));
    };
    let symbol = ctx.symbols.get_or_create_type_alias_symbol(desc);
    let annotations = annotation_calls(ctx, annotations)?;
    let type_parameters = lower_type_parameters(ctx, type_parameters)?;
    let alias = TypeAliasDecl {
        visibility: descriptor.visibility,
        type_parameters,
        expanded: ctx.convert(alias.expanded)?,
    };
    ctx.declare(symbol, DeclOrigin::Source, annotations, DeclKind::TypeAlias(alias))
}

fn lower_type_parameters(
    ctx: &mut GeneratorContext<'_>,
    nodes: &[NodeId],
) -> LowerResult<Vec<DeclId>> {
    let tree = ctx.tree;
    let binding = ctx.binding;
    let mut parameters = Vec::with_capacity(nodes.len());
    for &node in nodes {
        let NodeKind::TypeParameter { annotations, .. } = tree.kind(node) else {
            return Err(ctx.unexpected(node, "type parameter"));
        };
        let desc = ctx.declared(node)?;
        let DescriptorKind::TypeParameter(parameter) = &binding.descriptor(desc).kind else {
            return Err(unexpected_declaration(ctx, desc, "type parameter"));
        };
        let symbol = ctx.symbols.get_or_create_type_parameter_symbol(desc);
        let annotations = annotation_calls(ctx, annotations)?;
        let parameter = TypeParameterDecl {
            index: parameter.index,
            variance: parameter.variance,
            is_reified: parameter.is_reified,
            bounds: convert_all(ctx, &parameter.upper_bounds)?,
        };
        parameters.push(ctx.declare(
            symbol,
            DeclOrigin::Source,
            annotations,
            DeclKind::TypeParameter(parameter),
        )?);
    }
    Ok(parameters)
}

fn lower_value_parameters(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    nodes: &[NodeId],
) -> LowerResult<Vec<DeclId>> {
    nodes
        .iter()
        .map(|&node| lower_value_parameter(ctx, scope, node))
        .collect()
}

/// Value parameter of a callable or catch clause
pub(super) fn lower_value_parameter(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    node: NodeId,
) -> LowerResult<DeclId> {
    let tree = ctx.tree;
    let binding = ctx.binding;
    let NodeKind::Parameter {
        default_value,
        annotations,
        ..
    } = tree.kind(node)
    else {
        return Err(ctx.unexpected(node, "parameter"));
    };
    let desc = ctx.declared(node)?;
    let Some(parameter) = binding.descriptor(desc).as_value_parameter() else {
        return Err(unexpected_declaration(ctx, desc, "value parameter"));
    };
    let symbol = ctx.symbols.get_or_create_value_parameter_symbol(desc);
    let annotations = annotation_calls(ctx, annotations)?;
    let default_value = match default_value {
        Some(value) => Some(lower_expr(ctx, scope, *value)?),
        None => None,
    };
    let corresponding_property = binding
        .constructor_property(node)
        .map(|property| ctx.symbols.get_or_create_property_symbol(property));

    let parameter = ValueParameterDecl {
        ty: ctx.convert(parameter.ty)?,
        default_value,
        is_vararg: parameter.is_vararg,
        is_crossinline: parameter.is_crossinline,
        is_noinline: parameter.is_noinline,
        corresponding_property,
    };
    ctx.declare(
        symbol,
        DeclOrigin::Source,
        annotations,
        DeclKind::ValueParameter(parameter),
    )
}

/// Parameter that exists only in a signature, like the implicit `it`
fn synthetic_value_parameter(ctx: &mut GeneratorContext<'_>, desc: DescId) -> LowerResult<DeclId> {
    let binding = ctx.binding;
    let Some(parameter) = binding.descriptor(desc).as_value_parameter() else {
        return Err(unexpected_declaration(ctx, desc, "value parameter"));
    };
    let symbol = ctx.symbols.get_or_create_value_parameter_symbol(desc);
    let mut decl = ValueParameterDecl::new(ctx.convert(parameter.ty)?);
    decl.is_vararg = parameter.is_vararg;
    ctx.declare(
        symbol,
        DeclOrigin::Synthetic,
        Vec::new(),
        DeclKind::ValueParameter(decl),
    )
}
