//! Constant values and annotation instances as AST expressions

use crate::config::LiteralPolicy;
use crate::context::GeneratorContext;
use crate::error::{LowerError, LowerResult};
use crate::type_converter::convert_type;
use log::warn;
use tl_ast::{Access, ConstKind, ConstValue, ExprId, ExprKind};
use tl_semantic::{AnnotationDescriptor, ConstantValue, SemType, SemTypeId};

/// Generate the expression for a constant value
///
/// Returns `Ok(None)` for values that have no expression form: error
/// sentinels, unresolvable class literals, and enum or class literals when
/// they are configured as unsupported.
///
/// # Errors
///
/// Propagates type conversion failures and [`LowerError::NoAnnotationConstructor`]
/// from nested annotations.
pub fn generate_constant(
    ctx: &mut GeneratorContext<'_>,
    value: &ConstantValue,
    ty: Option<SemTypeId>,
) -> LowerResult<Option<ExprId>> {
    let builtins = ctx.builtins();
    let (kind, raw, default_ty) = match value {
        ConstantValue::String(text) => (
            ConstKind::String,
            ConstValue::Str(text.clone()),
            builtins.string_type,
        ),
        ConstantValue::Int(value) => (
            ConstKind::Int,
            ConstValue::Integer(i64::from(*value)),
            builtins.int_type,
        ),
        ConstantValue::UInt(value) => (
            ConstKind::Int,
            ConstValue::Integer(i64::from(*value as i32)),
            builtins.int_type,
        ),
        ConstantValue::Long(value) => (
            ConstKind::Long,
            ConstValue::Integer(*value),
            builtins.long_type,
        ),
        ConstantValue::ULong(value) => (
            ConstKind::Long,
            ConstValue::Integer(*value as i64),
            builtins.long_type,
        ),
        ConstantValue::Short(value) => (
            ConstKind::Short,
            ConstValue::Integer(i64::from(*value)),
            builtins.short_type,
        ),
        ConstantValue::UShort(value) => (
            ConstKind::Short,
            ConstValue::Integer(i64::from(*value as i16)),
            builtins.short_type,
        ),
        ConstantValue::Byte(value) => (
            ConstKind::Byte,
            ConstValue::Integer(i64::from(*value)),
            builtins.byte_type,
        ),
        ConstantValue::UByte(value) => (
            ConstKind::Byte,
            ConstValue::Integer(i64::from(*value as i8)),
            builtins.byte_type,
        ),
        ConstantValue::Boolean(value) => (
            ConstKind::Boolean,
            ConstValue::Bool(*value),
            builtins.boolean_type,
        ),
        ConstantValue::Float(value) => (
            ConstKind::Float,
            ConstValue::Float(f64::from(*value)),
            builtins.float_type,
        ),
        ConstantValue::Double(value) => (
            ConstKind::Double,
            ConstValue::Float(*value),
            builtins.double_type,
        ),
        ConstantValue::Char(value) => (
            ConstKind::Char,
            ConstValue::Char(*value),
            builtins.char_type,
        ),
        ConstantValue::Null => (
            ConstKind::Null,
            ConstValue::Null,
            builtins.nullable_nothing_type,
        ),
        ConstantValue::Array { elements, ty } => {
            return generate_array(ctx, elements, *ty).map(Some);
        }
        ConstantValue::Annotation(annotation) => {
            return generate_annotation_call(ctx, annotation);
        }
        ConstantValue::Enum { entry, ty } => {
            if !literals_supported(ctx, "enum entry") {
                return Ok(None);
            }
            let ty = convert_type(ctx, *ty)?;
            let callee = ctx.symbols.get_or_create_class_symbol(*entry);
            return Ok(Some(
                ctx.alloc_expr(ty, ExprKind::QualifiedAccess(Access::plain(callee))),
            ));
        }
        ConstantValue::Class { referenced, ty } => {
            if !literals_supported(ctx, "class literal") {
                return Ok(None);
            }
            let binding = ctx.binding;
            let classifier = match binding.ty(*referenced) {
                SemType::Error { .. } => return Ok(None),
                SemType::Simple(_) | SemType::Flexible { .. } => {
                    convert_type(ctx, *referenced)?.classifier
                }
            };
            let ty = convert_type(ctx, *ty)?;
            return Ok(Some(
                ctx.alloc_expr(ty, ExprKind::ClassReference { classifier }),
            ));
        }
        ConstantValue::Error { .. } => return Ok(None),
    };

    let ty = convert_type(ctx, ty.unwrap_or(default_ty))?;
    Ok(Some(ctx.alloc_expr(ty, ExprKind::Const { kind, value: raw })))
}

fn literals_supported(ctx: &GeneratorContext<'_>, what: &str) -> bool {
    match ctx.config.constants.enum_and_class_literals {
        LiteralPolicy::Complete => true,
        LiteralPolicy::Unsupported => {
            warn!("{what} constants are not supported by this configuration, omitting value");
            false
        }
    }
}

fn generate_array(
    ctx: &mut GeneratorContext<'_>,
    elements: &[ConstantValue],
    ty: SemTypeId,
) -> LowerResult<ExprId> {
    let mut generated = Vec::with_capacity(elements.len());
    for element in elements {
        if let Some(element) = generate_constant(ctx, element, None)? {
            generated.push(element);
        }
    }
    let ty = convert_type(ctx, ty)?;
    Ok(ctx.alloc_expr(
        ty,
        ExprKind::Vararg {
            elements: generated,
        },
    ))
}

/// Generate a call to the annotation class constructor
///
/// One argument slot per constructor parameter: the generated named
/// argument, or `None` when it was not given and the default applies.
///
/// # Errors
///
/// [`LowerError::NoAnnotationConstructor`] when the annotation class has no
/// primary or sole constructor.
pub fn generate_annotation_call(
    ctx: &mut GeneratorContext<'_>,
    annotation: &AnnotationDescriptor,
) -> LowerResult<Option<ExprId>> {
    let binding = ctx.binding;
    let SemType::Simple(simple) = binding.ty(annotation.ty) else {
        return Ok(None);
    };
    let class_descriptor = binding.descriptor(simple.classifier);
    let Some(class) = class_descriptor.as_class() else {
        return Ok(None);
    };
    let constructor =
        class
            .primary_or_sole_constructor()
            .ok_or_else(|| LowerError::NoAnnotationConstructor {
                name: ctx.name(class_descriptor.name).to_string(),
            })?;

    let ty = convert_type(ctx, annotation.ty)?;
    let callee = ctx.symbols.get_or_create_constructor_symbol(constructor);

    let parameters = binding.descriptor(constructor).value_parameters();
    let mut arguments = Vec::with_capacity(parameters.len());
    for &parameter in parameters {
        let name = binding.descriptor(parameter).name;
        let argument = match annotation.arguments.get(&name) {
            Some(value) => {
                let parameter_ty = binding
                    .descriptor(parameter)
                    .as_value_parameter()
                    .map(|parameter| parameter.ty);
                generate_constant(ctx, value, parameter_ty)?
            }
            None => None,
        };
        arguments.push(argument);
    }

    Ok(Some(ctx.alloc_expr(
        ty,
        ExprKind::Call {
            access: Access::plain(callee),
            arguments,
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LowerConfig;
    use tl_intern::Interner;
    use tl_semantic::{
        BindingContext, ClassDescriptor, ConstructorDescriptor, Descriptor, DescriptorKind,
        SimpleType, ValueParameterDescriptor,
    };
    use tl_syntax::{ClassKind, SyntaxTree};

    fn with_context<R>(
        binding: &BindingContext,
        interner: &Interner,
        config: &LowerConfig,
        run: impl FnOnce(&mut GeneratorContext<'_>) -> R,
    ) -> R {
        let tree = SyntaxTree::new();
        let mut ctx = GeneratorContext::new(&tree, binding, interner, config);
        run(&mut ctx)
    }

    #[test]
    fn test_unsigned_folds_to_signed_bits() {
        let interner = Interner::new();
        let binding = BindingContext::new(&interner);
        let config = LowerConfig::default();
        with_context(&binding, &interner, &config, |ctx| {
            let expr = generate_constant(ctx, &ConstantValue::UInt(u32::MAX), None)
                .unwrap()
                .unwrap();
            assert_eq!(
                ctx.store[expr].kind,
                ExprKind::Const {
                    kind: ConstKind::Int,
                    value: ConstValue::Integer(-1),
                }
            );
        });
    }

    #[test]
    fn test_array_skips_error_elements() {
        let interner = Interner::new();
        let binding = BindingContext::new(&interner);
        let config = LowerConfig::default();
        let array_ty = binding.builtins().any_type;
        with_context(&binding, &interner, &config, |ctx| {
            let value = ConstantValue::Array {
                elements: vec![
                    ConstantValue::Int(1),
                    ConstantValue::Error {
                        message: "bad".to_string(),
                    },
                    ConstantValue::Int(3),
                ],
                ty: array_ty,
            };
            let expr = generate_constant(ctx, &value, None).unwrap().unwrap();
            match &ctx.store[expr].kind {
                ExprKind::Vararg { elements } => assert_eq!(elements.len(), 2),
                other => panic!("expected vararg, got {other:?}"),
            }
            assert!(
                generate_constant(
                    ctx,
                    &ConstantValue::Error {
                        message: "bad".to_string()
                    },
                    None
                )
                .unwrap()
                .is_none()
            );
        });
    }

    #[test]
    fn test_annotation_call_fills_missing_arguments_with_none() {
        let interner = Interner::new();
        let mut binding = BindingContext::new(&interner);
        let int_type = binding.builtins().int_type;

        let annotation_class = binding.alloc_descriptor(Descriptor::new(
            interner.intern("Retry"),
            Vec::new(),
            None,
            DescriptorKind::Class(ClassDescriptor::new(ClassKind::Annotation)),
        ));
        let class_type = binding.alloc_type(SemType::Simple(SimpleType::plain(annotation_class)));
        let times = binding.alloc_descriptor(Descriptor::new(
            interner.intern("times"),
            Vec::new(),
            None,
            DescriptorKind::ValueParameter(ValueParameterDescriptor::new(0, int_type)),
        ));
        let delay = binding.alloc_descriptor(Descriptor::new(
            interner.intern("delay"),
            Vec::new(),
            None,
            DescriptorKind::ValueParameter(ValueParameterDescriptor::new(1, int_type)),
        ));
        let constructor = binding.alloc_descriptor(Descriptor::new(
            interner.intern("<init>"),
            Vec::new(),
            Some(annotation_class),
            DescriptorKind::Constructor(ConstructorDescriptor {
                is_primary: true,
                value_parameters: vec![times, delay],
                return_type: class_type,
            }),
        ));
        if let DescriptorKind::Class(class) = &mut binding.descriptor_mut(annotation_class).kind {
            class.constructors.push(constructor);
            class.primary_constructor = Some(constructor);
        }

        let annotation = AnnotationDescriptor::new(class_type)
            .with_argument(interner.intern("delay"), ConstantValue::Int(10));
        let config = LowerConfig::default();
        with_context(&binding, &interner, &config, |ctx| {
            let call = generate_annotation_call(ctx, &annotation).unwrap().unwrap();
            match &ctx.store[call].kind {
                ExprKind::Call { access, arguments } => {
                    assert_eq!(
                        access.callee,
                        ctx.symbols.get_or_create_constructor_symbol(constructor)
                    );
                    assert_eq!(arguments.len(), 2);
                    assert!(arguments[0].is_none());
                    assert!(arguments[1].is_some());
                }
                other => panic!("expected call, got {other:?}"),
            }
        });
    }

    #[test]
    fn test_annotation_without_constructor_is_fatal() {
        let interner = Interner::new();
        let mut binding = BindingContext::new(&interner);
        let annotation_class = binding.alloc_descriptor(Descriptor::new(
            interner.intern("Marker"),
            Vec::new(),
            None,
            DescriptorKind::Class(ClassDescriptor::new(ClassKind::Annotation)),
        ));
        let class_type = binding.alloc_type(SemType::Simple(SimpleType::plain(annotation_class)));
        let config = LowerConfig::default();
        with_context(&binding, &interner, &config, |ctx| {
            let result = generate_annotation_call(ctx, &AnnotationDescriptor::new(class_type));
            assert!(matches!(
                result,
                Err(LowerError::NoAnnotationConstructor { .. })
            ));
        });
    }

    #[test]
    fn test_unsupported_literals_are_omitted() {
        let interner = Interner::new();
        let binding = BindingContext::new(&interner);
        let builtins = binding.builtins().clone();
        let mut config = LowerConfig::default();
        config.constants.enum_and_class_literals = LiteralPolicy::Unsupported;
        with_context(&binding, &interner, &config, |ctx| {
            let value = ConstantValue::Class {
                referenced: builtins.string_type,
                ty: builtins.any_type,
            };
            assert!(generate_constant(ctx, &value, None).unwrap().is_none());
        });
    }
}
