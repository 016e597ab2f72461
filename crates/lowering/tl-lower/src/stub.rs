//! Signature-only declarations for symbols defined outside the unit

use crate::constant::generate_annotation_call;
use crate::context::GeneratorContext;
use crate::error::{LowerError, LowerResult};
use crate::type_converter::convert_type;
use log::{debug, trace};
use rustc_hash::FxHashSet;
use tl_ast::{
    AccessorDecl, AstType, ClassDecl, ConstructorDecl, DeclId, DeclKind, DeclOrigin, ExprId, ExprKind,
    FunctionDecl, FunctionFlags, PropertyDecl, SymbolId, TypeAliasDecl, TypeParameterDecl,
    ValueParameterDecl,
};
use tl_semantic::{DescId, Descriptor, DescriptorKind, FunctionDescriptor, SemTypeId};
use tl_syntax::Visibility;

/// The declaration owning `symbol`, building a stub for `desc` if there is none yet
///
/// # Errors
///
/// Propagates type conversion and annotation failures.
pub fn get_declaration(
    ctx: &mut GeneratorContext<'_>,
    symbol: SymbolId,
    desc: DescId,
) -> LowerResult<DeclId> {
    if let Some(owner) = ctx.symbols.get(symbol).owner() {
        return Ok(owner);
    }

    let binding = ctx.binding;
    let descriptor = binding.descriptor(desc);
    trace!(
        "stubbing {} `{}`",
        descriptor.kind.describe(),
        ctx.name(descriptor.name)
    );

    let kind = match &descriptor.kind {
        DescriptorKind::Class(class) => DeclKind::Class(ClassDecl {
            class_kind: class.class_kind,
            visibility: descriptor.visibility,
            modality: class.modality,
            is_data: class.is_data,
            is_inner: class.is_inner,
            is_companion: class.is_companion,
            type_parameters: type_parameters(ctx, &class.type_parameters)?,
            supertypes: convert_all(ctx, &class.supertypes)?,
            declarations: Vec::new(),
        }),
        DescriptorKind::Function(function) => DeclKind::Function(FunctionDecl {
            visibility: descriptor.visibility,
            modality: function.modality,
            flags: function_flags(function),
            type_parameters: type_parameters(ctx, &function.type_parameters)?,
            dispatch_receiver_type: convert_optional(ctx, function.dispatch_receiver)?,
            extension_receiver_type: convert_optional(ctx, function.extension_receiver)?,
            value_parameters: value_parameters(ctx, &function.value_parameters)?,
            return_type: convert_type(ctx, function.return_type)?,
            body: None,
            overridden: function
                .overridden
                .iter()
                .map(|&overridden| ctx.symbols.get_or_create_function_symbol(overridden))
                .collect(),
            label: None,
        }),
        DescriptorKind::Constructor(constructor) => DeclKind::Constructor(ConstructorDecl {
            is_primary: constructor.is_primary,
            visibility: descriptor.visibility,
            value_parameters: value_parameters(ctx, &constructor.value_parameters)?,
            return_type: convert_type(ctx, constructor.return_type)?,
            delegated_call: None,
            body: None,
        }),
        DescriptorKind::Property(property) => DeclKind::Property(PropertyDecl {
            visibility: descriptor.visibility,
            modality: property.modality,
            is_var: property.is_var,
            is_local: property.is_local,
            is_const: property.is_const,
            is_lateinit: property.is_lateinit,
            return_type: convert_type(ctx, property.ty)?,
            dispatch_receiver_type: convert_optional(ctx, property.dispatch_receiver)?,
            extension_receiver_type: convert_optional(ctx, property.extension_receiver)?,
            type_parameters: type_parameters(ctx, &property.type_parameters)?,
            initializer: None,
            delegate: None,
            getter: None,
            setter: None,
        }),
        DescriptorKind::PropertyAccessor(accessor) => {
            let property = ctx.symbols.get_or_create_property_symbol(accessor.property);
            DeclKind::PropertyAccessor(AccessorDecl {
                property,
                is_setter: accessor.is_setter,
                visibility: descriptor.visibility,
                return_type: convert_type(ctx, accessor.return_type)?,
                value_parameters: value_parameters(ctx, &accessor.value_parameters)?,
                body: None,
            })
        }
        DescriptorKind::TypeParameter(parameter) => DeclKind::TypeParameter(TypeParameterDecl {
            index: parameter.index,
            variance: parameter.variance,
            is_reified: parameter.is_reified,
            bounds: convert_all(ctx, &parameter.upper_bounds)?,
        }),
        DescriptorKind::ValueParameter(parameter) => {
            let default_value = if parameter.declares_default {
                let ty = convert_type(ctx, parameter.ty)?;
                Some(ctx.alloc_expr(
                    ty,
                    ExprKind::Block {
                        statements: Vec::new(),
                    },
                ))
            } else {
                None
            };
            DeclKind::ValueParameter(ValueParameterDecl {
                ty: convert_type(ctx, parameter.ty)?,
                default_value,
                is_vararg: parameter.is_vararg,
                is_crossinline: parameter.is_crossinline,
                is_noinline: parameter.is_noinline,
                corresponding_property: None,
            })
        }
        DescriptorKind::TypeAlias(alias) => DeclKind::TypeAlias(TypeAliasDecl {
            visibility: descriptor.visibility,
            type_parameters: type_parameters(ctx, &alias.type_parameters)?,
            expanded: convert_type(ctx, alias.expanded)?,
        }),
    };

    let annotations = annotations(ctx, descriptor)?;

    // Converting the signature may have reached this symbol again
    if let Some(owner) = ctx.symbols.get(symbol).owner() {
        return Ok(owner);
    }
    ctx.declare(symbol, DeclOrigin::Stub, annotations, kind)
}

pub(crate) fn function_flags(function: &FunctionDescriptor) -> FunctionFlags {
    FunctionFlags {
        is_operator: function.is_operator,
        is_infix: function.is_infix,
        is_inline: function.is_inline,
        is_suspend: function.is_suspend,
        is_tailrec: function.is_tailrec,
    }
}

fn annotations(ctx: &mut GeneratorContext<'_>, descriptor: &Descriptor) -> LowerResult<Vec<ExprId>> {
    let mut calls = Vec::new();
    for annotation in &descriptor.annotations {
        if let Some(call) = generate_annotation_call(ctx, annotation)? {
            calls.push(call);
        }
    }
    Ok(calls)
}

fn type_parameters(ctx: &mut GeneratorContext<'_>, parameters: &[DescId]) -> LowerResult<Vec<DeclId>> {
    parameters
        .iter()
        .map(|&parameter| {
            let symbol = ctx.symbols.get_or_create_type_parameter_symbol(parameter);
            get_declaration(ctx, symbol, parameter)
        })
        .collect()
}

fn value_parameters(
    ctx: &mut GeneratorContext<'_>,
    parameters: &[DescId],
) -> LowerResult<Vec<DeclId>> {
    parameters
        .iter()
        .map(|&parameter| {
            let symbol = ctx.symbols.get_or_create_value_parameter_symbol(parameter);
            get_declaration(ctx, symbol, parameter)
        })
        .collect()
}

pub(crate) fn convert_all(ctx: &mut GeneratorContext<'_>, types: &[SemTypeId]) -> LowerResult<Vec<AstType>> {
    types.iter().map(|&ty| convert_type(ctx, ty)).collect()
}

pub(crate) fn convert_optional(
    ctx: &mut GeneratorContext<'_>,
    ty: Option<SemTypeId>,
) -> LowerResult<Option<AstType>> {
    ty.map(|ty| convert_type(ctx, ty)).transpose()
}

/// Stub every unbound symbol until no new ones appear
///
/// Each pass snapshots the unbound symbols and stubs the ones not seen
/// before. A symbol is marked visited whether or not stubbing it succeeded,
/// so the visited set grows on every productive pass and the loop ends.
/// Returns the root stubs: stubs for symbols that were unbound when a pass
/// started, in the order they were generated.
///
/// # Errors
///
/// [`LowerError::UnboundSymbols`] if descriptor-less symbols remain unbound
/// at the fixed point, or any error from building a stub.
pub fn generate_unbound_stubs(ctx: &mut GeneratorContext<'_>) -> LowerResult<Vec<DeclId>> {
    let mut visited: FxHashSet<SymbolId> = FxHashSet::default();
    let mut roots = Vec::new();

    loop {
        let pending: Vec<_> = ctx
            .symbols
            .unbound_symbols()
            .into_iter()
            .filter(|(_, symbol)| !visited.contains(symbol))
            .collect();
        if pending.is_empty() {
            break;
        }

        ctx.stats.fixed_point_passes += 1;
        debug!(
            "stub pass {}: {} unbound symbols",
            ctx.stats.fixed_point_passes,
            pending.len()
        );

        for (desc, symbol) in pending {
            visited.insert(symbol);
            if ctx.symbols.get(symbol).is_bound() {
                continue;
            }
            let decl = get_declaration(ctx, symbol, desc)?;
            if is_root(ctx, desc) {
                roots.push(decl);
            }
        }
    }

    let unbound: Vec<String> = ctx
        .symbols
        .all_unbound()
        .map(|symbol| ctx.name(ctx.symbols.get(symbol).name()).to_string())
        .collect();
    if !unbound.is_empty() {
        return Err(LowerError::UnboundSymbols { names: unbound });
    }

    Ok(roots)
}

/// Parameters hang off their callable; every other non-local stub is listed as a root
fn is_root(ctx: &GeneratorContext<'_>, desc: DescId) -> bool {
    let descriptor = ctx.binding.descriptor(desc);
    match descriptor.kind {
        DescriptorKind::TypeParameter(_) | DescriptorKind::ValueParameter(_) => false,
        _ => descriptor.visibility != Visibility::Local,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LowerConfig;
    use tl_intern::Interner;
    use tl_semantic::{BindingContext, ClassDescriptor, SemType, SimpleType, ValueParameterDescriptor};
    use tl_syntax::{ClassKind, SyntaxTree};

    #[test]
    fn test_get_declaration_is_idempotent() {
        let interner = Interner::new();
        let mut binding = BindingContext::new(&interner);
        let unit = binding.builtins().unit_type;
        let function = binding.alloc_descriptor(tl_semantic::Descriptor::new(
            interner.intern("log"),
            Vec::new(),
            None,
            DescriptorKind::Function(FunctionDescriptor::new(unit)),
        ));

        let tree = SyntaxTree::new();
        let config = LowerConfig::default();
        let mut ctx = GeneratorContext::new(&tree, &binding, &interner, &config);
        let symbol = ctx.symbols.get_or_create_function_symbol(function);
        let first = get_declaration(&mut ctx, symbol, function).unwrap();
        let second = get_declaration(&mut ctx, symbol, function).unwrap();
        assert_eq!(first, second);
        assert_eq!(ctx.stats.stubs, 1);
        assert_eq!(ctx.store[first].origin, DeclOrigin::Stub);
    }

    #[test]
    fn test_default_value_gets_placeholder() {
        let interner = Interner::new();
        let mut binding = BindingContext::new(&interner);
        let builtins = binding.builtins().clone();
        let mut parameter = ValueParameterDescriptor::new(0, builtins.int_type);
        parameter.declares_default = true;
        let parameter = binding.alloc_descriptor(tl_semantic::Descriptor::new(
            interner.intern("count"),
            Vec::new(),
            None,
            DescriptorKind::ValueParameter(parameter),
        ));
        let mut function = FunctionDescriptor::new(builtins.unit_type);
        function.value_parameters.push(parameter);
        let function = binding.alloc_descriptor(tl_semantic::Descriptor::new(
            interner.intern("repeat"),
            Vec::new(),
            None,
            DescriptorKind::Function(function),
        ));

        let tree = SyntaxTree::new();
        let config = LowerConfig::default();
        let mut ctx = GeneratorContext::new(&tree, &binding, &interner, &config);
        let symbol = ctx.symbols.get_or_create_function_symbol(function);
        let decl = get_declaration(&mut ctx, symbol, function).unwrap();

        let DeclKind::Function(function) = &ctx.store[decl].kind else {
            panic!("expected function");
        };
        let DeclKind::ValueParameter(parameter) = &ctx.store[function.value_parameters[0]].kind
        else {
            panic!("expected value parameter");
        };
        let default = parameter.default_value.unwrap();
        assert_eq!(
            ctx.store[default].kind,
            ExprKind::Block {
                statements: Vec::new()
            }
        );
    }

    #[test]
    fn test_driver_stubs_supertypes_transitively() {
        let interner = Interner::new();
        let mut binding = BindingContext::new(&interner);
        let base = binding.alloc_descriptor(tl_semantic::Descriptor::new(
            interner.intern("Base"),
            Vec::new(),
            None,
            DescriptorKind::Class(ClassDescriptor::new(ClassKind::Interface)),
        ));
        let base_type = binding.alloc_type(SemType::Simple(SimpleType::plain(base)));
        let mut derived = ClassDescriptor::new(ClassKind::Class);
        derived.supertypes.push(base_type);
        let derived = binding.alloc_descriptor(tl_semantic::Descriptor::new(
            interner.intern("Derived"),
            Vec::new(),
            None,
            DescriptorKind::Class(derived),
        ));

        let tree = SyntaxTree::new();
        let config = LowerConfig::default();
        let mut ctx = GeneratorContext::new(&tree, &binding, &interner, &config);
        let symbol = ctx.symbols.get_or_create_class_symbol(derived);
        let roots = generate_unbound_stubs(&mut ctx).unwrap();

        let base_symbol = ctx.symbols.get_or_create_class_symbol(base);
        assert!(ctx.symbols.get(symbol).is_bound());
        assert!(ctx.symbols.get(base_symbol).is_bound());
        assert!(ctx.symbols.all_unbound().next().is_none());
        assert_eq!(roots.len(), 2);
        assert!(ctx.stats.fixed_point_passes >= 1);
    }
}
