//! Literals, operators and the smaller expression forms

use super::calls::{build_access, build_call, CallOverrides};
use super::{annotation_calls, desugar, lower_expr, lower_optional};
use crate::constant::generate_constant;
use crate::context::GeneratorContext;
use crate::error::LowerResult;
use crate::scope::Scope;
use tl_ast::{
    Access, AstType, ConstKind, ConstValue, DiagnosticKind, ExprId, ExprKind, IntrinsicOp,
    TypeOperator,
};
use tl_intern::Name;
use tl_syntax::{BinaryOp, NodeId, NodeKind, TemplateEntry, UnaryOp};

pub(super) fn lower_constant(ctx: &mut GeneratorContext<'_>, node: NodeId) -> LowerResult<ExprId> {
    let binding = ctx.binding;
    let value = binding
        .constant(node)
        .ok_or_else(|| ctx.missing("constant value", node))?;
    match generate_constant(ctx, value, binding.expression_type(node))? {
        Some(expr) => Ok(expr),
        None => ctx.error_expr(DiagnosticKind::Syntax, "constant has no value"),
    }
}

fn string_const(ctx: &mut GeneratorContext<'_>, ty: &AstType, text: String) -> ExprId {
    ctx.alloc_expr(
        ty.clone(),
        ExprKind::Const {
            kind: ConstKind::String,
            value: ConstValue::Str(text),
        },
    )
}

fn as_string_const<'ctx>(ctx: &'ctx GeneratorContext<'_>, expr: ExprId) -> Option<&'ctx str> {
    match &ctx.store[expr].kind {
        ExprKind::Const {
            kind: ConstKind::String,
            value: ConstValue::Str(text),
        } => Some(text),
        _ => None,
    }
}

/// String template
///
/// Adjacent constant pieces fold into one literal. A template made of a
/// single `String` expression is that expression; anything else is a
/// concatenation of literals and `toString()` calls.
pub(super) fn lower_string_template(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    entries: &[TemplateEntry],
) -> LowerResult<ExprId> {
    let string = ctx.string_type()?;
    let mut parts = Vec::new();
    let mut pending = String::new();

    for entry in entries {
        match entry {
            TemplateEntry::Literal(text) | TemplateEntry::Escape(text) => pending.push_str(text),
            TemplateEntry::Expression(node) => {
                let expr = lower_expr(ctx, scope, *node)?;
                if let Some(text) = as_string_const(ctx, expr) {
                    pending.push_str(text);
                    continue;
                }
                if !pending.is_empty() {
                    let text = std::mem::take(&mut pending);
                    parts.push(string_const(ctx, &string, text));
                }
                parts.push(expr);
            }
        }
    }

    if parts.is_empty() {
        return Ok(string_const(ctx, &string, pending));
    }
    if !pending.is_empty() {
        parts.push(string_const(ctx, &string, pending));
    }
    if let [single] = parts[..] {
        if ctx.store[single].ty == string {
            return Ok(single);
        }
    }

    let any_to_string = ctx.builtins().any_to_string;
    let to_string = ctx.symbols.get_or_create_function_symbol(any_to_string);
    let mut concatenated = Vec::with_capacity(parts.len());
    for part in parts {
        if as_string_const(ctx, part).is_some() {
            concatenated.push(part);
            continue;
        }
        let access = Access::plain(to_string).with_dispatch_receiver(part);
        concatenated.push(ctx.alloc_expr(
            string.clone(),
            ExprKind::Call {
                access,
                arguments: Vec::new(),
            },
        ));
    }
    Ok(ctx.alloc_expr(
        string,
        ExprKind::StringConcat {
            parts: concatenated,
        },
    ))
}

pub(super) fn lower_unary(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    node: NodeId,
    op: UnaryOp,
    operand: NodeId,
    prefix: bool,
) -> LowerResult<ExprId> {
    let binding = ctx.binding;
    match op {
        UnaryOp::Increment | UnaryOp::Decrement => {
            desugar::lower_increment(ctx, scope, node, operand, prefix)
        }
        UnaryOp::NotNull => {
            let argument = lower_expr(ctx, scope, operand)?;
            let ty = ctx.expression_type(node)?;
            Ok(ctx.alloc_expr(
                ty,
                ExprKind::Intrinsic {
                    op: IntrinsicOp::CheckNotNull,
                    arguments: vec![argument],
                },
            ))
        }
        UnaryOp::Minus | UnaryOp::Plus | UnaryOp::Not => {
            let ty = ctx.expression_type(node)?;
            match binding.resolved_call(node) {
                Some(call) => build_call(ctx, scope, call, ty, CallOverrides::default()),
                None if op == UnaryOp::Not => {
                    let argument = lower_expr(ctx, scope, operand)?;
                    Ok(ctx.alloc_expr(
                        ty,
                        ExprKind::Intrinsic {
                            op: IntrinsicOp::Not,
                            arguments: vec![argument],
                        },
                    ))
                }
                None => Err(ctx.missing("resolved operator call", node)),
            }
        }
    }
}

fn intrinsic_for(op: BinaryOp) -> Option<IntrinsicOp> {
    Some(match op {
        BinaryOp::Equals => IntrinsicOp::Equals,
        BinaryOp::NotEquals => IntrinsicOp::NotEquals,
        BinaryOp::IdentityEquals => IntrinsicOp::IdentityEquals,
        BinaryOp::IdentityNotEquals => IntrinsicOp::IdentityNotEquals,
        BinaryOp::Less => IntrinsicOp::Less,
        BinaryOp::LessOrEqual => IntrinsicOp::LessOrEqual,
        BinaryOp::Greater => IntrinsicOp::Greater,
        BinaryOp::GreaterOrEqual => IntrinsicOp::GreaterOrEqual,
        BinaryOp::And => IntrinsicOp::LazyAnd,
        BinaryOp::Or => IntrinsicOp::LazyOr,
        _ => return None,
    })
}

pub(super) fn lower_binary(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    node: NodeId,
    op: BinaryOp,
    left: NodeId,
    right: Option<NodeId>,
) -> LowerResult<ExprId> {
    if op.is_assignment() {
        return desugar::lower_assignment(ctx, scope, node, op, left, right);
    }

    let binding = ctx.binding;
    if let Some(intrinsic) = intrinsic_for(op) {
        let left = lower_expr(ctx, scope, left)?;
        let right = lower_optional(ctx, scope, right, "right operand")?;
        let ty = ctx.boolean_type()?;
        return Ok(ctx.alloc_expr(
            ty,
            ExprKind::Intrinsic {
                op: intrinsic,
                arguments: vec![left, right],
            },
        ));
    }

    match op {
        BinaryOp::Elvis => {
            let left = lower_expr(ctx, scope, left)?;
            let right = lower_optional(ctx, scope, right, "right operand")?;
            let ty = ctx.expression_type(node)?;
            Ok(ctx.alloc_expr(ty, ExprKind::Elvis { left, right }))
        }
        BinaryOp::In | BinaryOp::NotIn => {
            let contains = binding
                .resolved_call(node)
                .ok_or_else(|| ctx.missing("resolved `contains` call", node))?;
            let boolean = ctx.boolean_type()?;
            let call = build_call(ctx, scope, contains, boolean.clone(), CallOverrides::default())?;
            if op == BinaryOp::In {
                return Ok(call);
            }
            Ok(ctx.alloc_expr(
                boolean,
                ExprKind::Intrinsic {
                    op: IntrinsicOp::Not,
                    arguments: vec![call],
                },
            ))
        }
        _ => {
            let call = binding
                .resolved_call(node)
                .ok_or_else(|| ctx.missing("resolved operator call", node))?;
            let ty = ctx.expression_type(node)?;
            build_call(ctx, scope, call, ty, CallOverrides::default())
        }
    }
}

/// Type written at a type reference node
pub(super) fn written_type(ctx: &mut GeneratorContext<'_>, type_ref: NodeId) -> LowerResult<AstType> {
    let ty = ctx
        .binding
        .type_reference(type_ref)
        .ok_or_else(|| ctx.missing("resolved type", type_ref))?;
    ctx.convert(ty)
}

pub(super) fn lower_type_check(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    expression: NodeId,
    type_ref: NodeId,
    negated: bool,
) -> LowerResult<ExprId> {
    let argument = lower_expr(ctx, scope, expression)?;
    let operand = written_type(ctx, type_ref)?;
    let op = if negated {
        TypeOperator::NotIs
    } else {
        TypeOperator::Is
    };
    let ty = ctx.boolean_type()?;
    Ok(ctx.alloc_expr(
        ty,
        ExprKind::TypeOperation {
            op,
            argument,
            operand,
        },
    ))
}

pub(super) fn lower_cast(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    node: NodeId,
    expression: NodeId,
    type_ref: NodeId,
    safe: bool,
) -> LowerResult<ExprId> {
    let argument = lower_expr(ctx, scope, expression)?;
    let operand = written_type(ctx, type_ref)?;
    let op = if safe {
        TypeOperator::SafeAs
    } else {
        TypeOperator::As
    };
    let ty = ctx.expression_type(node)?;
    Ok(ctx.alloc_expr(
        ty,
        ExprKind::TypeOperation {
            op,
            argument,
            operand,
        },
    ))
}

pub(super) fn lower_this(
    ctx: &mut GeneratorContext<'_>,
    node: NodeId,
    label: Option<Name>,
) -> LowerResult<ExprId> {
    let ty = ctx.expression_type(node)?;
    Ok(ctx.alloc_expr(ty, ExprKind::This { label }))
}

/// `T::class` references the class named on the left, or the static type of the left expression
pub(super) fn lower_class_literal(
    ctx: &mut GeneratorContext<'_>,
    node: NodeId,
    receiver: NodeId,
) -> LowerResult<ExprId> {
    let binding = ctx.binding;
    let classifier = if let Some(target) = binding.reference_target(receiver) {
        ctx.symbols.symbol_for(target)
    } else if let Some(ty) = binding.type_reference(receiver) {
        ctx.convert(ty)?.classifier
    } else {
        ctx.expression_type(receiver)?.classifier
    };
    let ty = ctx.expression_type(node)?;
    Ok(ctx.alloc_expr(ty, ExprKind::ClassReference { classifier }))
}

pub(super) fn lower_callable_reference(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    node: NodeId,
) -> LowerResult<ExprId> {
    let tree = ctx.tree;
    let binding = ctx.binding;
    let NodeKind::CallableReference { callee, .. } = tree.kind(node) else {
        return Err(ctx.unexpected(node, "callable reference"));
    };
    let call = binding
        .resolved_call(node)
        .or_else(|| binding.resolved_call(*callee))
        .ok_or_else(|| ctx.missing("resolved callable reference", node))?;
    let access = build_access(ctx, scope, call, None)?;
    let ty = ctx.expression_type(node)?;
    Ok(ctx.alloc_expr(ty, ExprKind::CallableReference(access)))
}

pub(super) fn lower_annotated(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    annotations: &[NodeId],
    base: NodeId,
) -> LowerResult<ExprId> {
    let expr = lower_expr(ctx, scope, base)?;
    let calls = annotation_calls(ctx, annotations)?;
    ctx.store.expr_mut(expr).annotations.extend(calls);
    Ok(expr)
}
