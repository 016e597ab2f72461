//! Conversion from semantic types to structural AST types

use crate::constant::generate_annotation_call;
use crate::context::GeneratorContext;
use crate::error::{LowerError, LowerResult};
use log::trace;
use tl_ast::{AstType, TypeProjection};
use tl_semantic::{DescriptorKind, SemType, SemTypeArgument, SemTypeId};

/// Convert a semantic type, reusing earlier conversions of the same type
///
/// Flexible types collapse to their upper bound. The classifier must be a
/// class or a type parameter; error types are fatal.
///
/// # Errors
///
/// [`LowerError::ErrorType`] for error types, [`LowerError::UnexpectedClassifier`]
/// for any other classifier kind.
pub fn convert_type(ctx: &mut GeneratorContext<'_>, ty: SemTypeId) -> LowerResult<AstType> {
    if let Some(cached) = ctx.type_cache.get(&ty) {
        return Ok(cached.clone());
    }

    let binding = ctx.binding;
    let simple = match binding.ty(ty) {
        SemType::Simple(simple) => simple,
        SemType::Flexible { upper, .. } => {
            let converted = convert_type(ctx, *upper)?;
            ctx.type_cache.insert(ty, converted.clone());
            return Ok(converted);
        }
        SemType::Error { message } => {
            return Err(LowerError::ErrorType {
                message: message.clone(),
            });
        }
    };

    let descriptor = binding.descriptor(simple.classifier);
    let classifier = match &descriptor.kind {
        DescriptorKind::Class(_) => ctx.symbols.get_or_create_class_symbol(simple.classifier),
        DescriptorKind::TypeParameter(_) => {
            ctx.symbols.get_or_create_type_parameter_symbol(simple.classifier)
        }
        other => {
            return Err(LowerError::UnexpectedClassifier {
                name: ctx.name(descriptor.name).to_string(),
                kind: other.describe(),
            });
        }
    };

    let mut arguments = Vec::with_capacity(simple.arguments.len());
    for argument in &simple.arguments {
        arguments.push(match *argument {
            SemTypeArgument::Star => TypeProjection::Star,
            SemTypeArgument::Projection { variance, ty } => TypeProjection::Projection {
                variance,
                ty: convert_type(ctx, ty)?,
            },
        });
    }

    let mut annotations = Vec::new();
    for annotation in &simple.annotations {
        if let Some(call) = generate_annotation_call(ctx, annotation)? {
            annotations.push(call);
        }
    }

    let converted = AstType {
        classifier,
        nullable: simple.nullable,
        arguments,
        annotations,
    };
    trace!("converted type {ty:?} to classifier {classifier:?}");
    ctx.type_cache.insert(ty, converted.clone());
    Ok(converted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LowerConfig;
    use tl_intern::Interner;
    use tl_semantic::{
        BindingContext, ClassDescriptor, Descriptor, SimpleType, TypeParameterDescriptor,
    };
    use tl_syntax::{ClassKind, SyntaxTree, Variance};

    #[test]
    fn test_conversion_is_referentially_stable() {
        let interner = Interner::new();
        let mut binding = BindingContext::new(&interner);
        let list = binding.alloc_descriptor(Descriptor::new(
            interner.intern("List"),
            vec![interner.intern("kotlin"), interner.intern("collections")],
            None,
            DescriptorKind::Class(ClassDescriptor::new(ClassKind::Interface)),
        ));
        let string = binding.builtins().string_type;
        let mut simple = SimpleType::plain(list);
        simple.arguments.push(SemTypeArgument::Projection {
            variance: Variance::Out,
            ty: string,
        });
        simple.nullable = true;
        let first = binding.alloc_type(SemType::Simple(simple.clone()));
        let second = binding.alloc_type(SemType::Simple(simple));

        let tree = SyntaxTree::new();
        let config = LowerConfig::default();
        let mut ctx = GeneratorContext::new(&tree, &binding, &interner, &config);
        let a = convert_type(&mut ctx, first).unwrap();
        let b = convert_type(&mut ctx, second).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.classifier, ctx.symbols.get_or_create_class_symbol(list));
        assert!(a.nullable);
        match &a.arguments[..] {
            [TypeProjection::Projection { variance, ty }] => {
                assert_eq!(*variance, Variance::Out);
                assert!(!ty.nullable);
            }
            other => panic!("unexpected arguments {other:?}"),
        }
    }

    #[test]
    fn test_flexible_uses_upper_bound() {
        let interner = Interner::new();
        let mut binding = BindingContext::new(&interner);
        let builtins = binding.builtins().clone();
        let flexible = binding.alloc_type(SemType::Flexible {
            lower: builtins.string_type,
            upper: builtins.nullable_any_type,
        });

        let tree = SyntaxTree::new();
        let config = LowerConfig::default();
        let mut ctx = GeneratorContext::new(&tree, &binding, &interner, &config);
        let converted = convert_type(&mut ctx, flexible).unwrap();
        assert_eq!(converted.classifier, ctx.symbols.get_or_create_class_symbol(builtins.any));
        assert!(converted.nullable);
    }

    #[test]
    fn test_type_parameter_classifier() {
        let interner = Interner::new();
        let mut binding = BindingContext::new(&interner);
        let any = binding.builtins().nullable_any_type;
        let parameter = binding.alloc_descriptor(Descriptor::new(
            interner.intern("T"),
            Vec::new(),
            None,
            DescriptorKind::TypeParameter(TypeParameterDescriptor {
                index: 0,
                variance: Variance::Invariant,
                is_reified: false,
                upper_bounds: vec![any],
            }),
        ));
        let ty = binding.alloc_type(SemType::Simple(SimpleType::plain(parameter)));

        let tree = SyntaxTree::new();
        let config = LowerConfig::default();
        let mut ctx = GeneratorContext::new(&tree, &binding, &interner, &config);
        let converted = convert_type(&mut ctx, ty).unwrap();
        assert_eq!(
            converted.classifier,
            ctx.symbols.get_or_create_type_parameter_symbol(parameter)
        );
    }

    #[test]
    fn test_error_type_is_fatal() {
        let interner = Interner::new();
        let mut binding = BindingContext::new(&interner);
        let error = binding.alloc_type(SemType::Error {
            message: "unresolved".to_string(),
        });

        let tree = SyntaxTree::new();
        let config = LowerConfig::default();
        let mut ctx = GeneratorContext::new(&tree, &binding, &interner, &config);
        assert!(matches!(
            convert_type(&mut ctx, error),
            Err(LowerError::ErrorType { .. })
        ));
    }
}
