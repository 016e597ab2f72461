//! Conditionals, loops and jumps

use super::calls::{build_call, CallOverrides};
use super::expressions::written_type;
use super::{declarations, desugar, lower_body_block, lower_expr, lower_optional};
use crate::context::GeneratorContext;
use crate::error::LowerResult;
use crate::scope::{Frame, Scope};
use tl_ast::{
    AstType, Catch, DiagnosticKind, ExprId, ExprKind, IntrinsicOp, LoopTarget, TypeOperator,
    WhenBranch, WhenRefId,
};
use tl_intern::Name;
use tl_syntax::{CatchClause, NodeId, NodeKind, WhenCondition, WhenEntry, WhenSubject};

/// `if`/`else if`/`else` as one subject-less `when`
pub(super) fn lower_if(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    node: NodeId,
) -> LowerResult<ExprId> {
    let tree = ctx.tree;
    let mut branches = Vec::new();
    let mut current = node;

    loop {
        let NodeKind::If {
            condition,
            then_branch,
            else_branch,
        } = tree.kind(current)
        else {
            return Err(ctx.unexpected(current, "if"));
        };
        let condition = lower_optional(ctx, scope, *condition, "condition")?;
        let result = lower_body_block(ctx, scope, *then_branch)?;
        branches.push(WhenBranch {
            condition: Some(condition),
            result,
        });

        let Some(otherwise) = else_branch else {
            break;
        };
        let otherwise = tree.deparenthesize(*otherwise);
        if let NodeKind::If { .. } = tree.kind(otherwise) {
            current = otherwise;
            continue;
        }
        let result = lower_body_block(ctx, scope, Some(otherwise))?;
        branches.push(WhenBranch {
            condition: None,
            result,
        });
        break;
    }

    let ty = ctx.expression_type(node)?;
    Ok(ctx.alloc_expr(
        ty,
        ExprKind::When {
            when_ref: None,
            subject: None,
            subject_variable: None,
            branches,
        },
    ))
}

pub(super) fn lower_when(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    node: NodeId,
    subject: Option<WhenSubject>,
    entries: &[WhenEntry],
) -> LowerResult<ExprId> {
    let (subject, subject_variable, subject_ty) = match subject {
        None => (None, None, None),
        Some(WhenSubject::Expression(expression)) => {
            let subject = lower_expr(ctx, scope, expression)?;
            let ty = ctx.expr_type(subject);
            (Some(subject), None, Some(ty))
        }
        Some(WhenSubject::Variable(property)) => {
            let variable = declarations::lower_declaration(ctx, scope, property)?;
            let ty = ctx.declared_type(variable);
            (None, Some(variable), ty)
        }
    };
    // the reference exists before the branches that point at it
    let when_ref = match subject_ty {
        Some(_) => Some(ctx.store.new_when_ref()),
        None => None,
    };

    let mut branches = Vec::with_capacity(entries.len());
    for entry in entries {
        let result = lower_optional(ctx, scope, entry.body, "branch result")?;
        if entry.is_else {
            branches.push(WhenBranch {
                condition: None,
                result,
            });
            continue;
        }

        let mut joined: Option<ExprId> = None;
        for condition in &entry.conditions {
            let lowered = match (when_ref, &subject_ty) {
                (Some(when_ref), Some(subject_ty)) => {
                    subject_condition(ctx, scope, when_ref, subject_ty, *condition)?
                }
                _ => plain_condition(ctx, scope, *condition)?,
            };
            joined = Some(match joined {
                None => lowered,
                Some(previous) => {
                    let boolean = ctx.boolean_type()?;
                    ctx.alloc_expr(
                        boolean,
                        ExprKind::Intrinsic {
                            op: IntrinsicOp::LazyOr,
                            arguments: vec![previous, lowered],
                        },
                    )
                }
            });
        }
        let condition = match joined {
            Some(condition) => condition,
            None => ctx.error_expr(DiagnosticKind::ExpressionRequired, "expected condition")?,
        };
        branches.push(WhenBranch {
            condition: Some(condition),
            result,
        });
    }

    let ty = ctx.expression_type(node)?;
    let expr = ctx.alloc_expr(
        ty,
        ExprKind::When {
            when_ref,
            subject,
            subject_variable,
            branches,
        },
    );
    if let Some(when_ref) = when_ref {
        ctx.store.bind_when_ref(when_ref, expr)?;
    }
    Ok(expr)
}

fn plain_condition(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    condition: WhenCondition,
) -> LowerResult<ExprId> {
    match condition {
        WhenCondition::Expression(expression) => {
            lower_optional(ctx, scope, expression, "condition")
        }
        WhenCondition::InRange { .. } | WhenCondition::IsPattern { .. } => ctx.error_expr(
            DiagnosticKind::Syntax,
            "`in` and `is` conditions need a `when` subject",
        ),
    }
}

fn subject_condition(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    when_ref: WhenRefId,
    subject_ty: &AstType,
    condition: WhenCondition,
) -> LowerResult<ExprId> {
    let binding = ctx.binding;
    let subject = ctx.alloc_expr(subject_ty.clone(), ExprKind::WhenSubject { when_ref });
    let boolean = ctx.boolean_type()?;

    match condition {
        WhenCondition::Expression(expression) => {
            let value = lower_optional(ctx, scope, expression, "condition")?;
            Ok(ctx.alloc_expr(
                boolean,
                ExprKind::Intrinsic {
                    op: IntrinsicOp::Equals,
                    arguments: vec![subject, value],
                },
            ))
        }
        WhenCondition::InRange { range, negated } => {
            let contains = binding
                .condition_call(range)
                .ok_or_else(|| ctx.missing("`contains` call", range))?;
            let call = build_call(
                ctx,
                scope,
                contains,
                boolean.clone(),
                CallOverrides::with_arguments(None, vec![Some(subject)]),
            )?;
            if !negated {
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
        WhenCondition::IsPattern { type_ref, negated } => {
            let operand = written_type(ctx, type_ref)?;
            let op = if negated {
                TypeOperator::NotIs
            } else {
                TypeOperator::Is
            };
            Ok(ctx.alloc_expr(
                boolean,
                ExprKind::TypeOperation {
                    op,
                    argument: subject,
                    operand,
                },
            ))
        }
    }
}

pub(super) fn lower_while(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    condition: Option<NodeId>,
    body: Option<NodeId>,
    label: Option<Name>,
) -> LowerResult<ExprId> {
    let condition = lower_optional(ctx, scope, condition, "loop condition")?;
    let target = ctx.store.new_loop_target(LoopTarget::new(label));
    let loop_scope = scope.push(Frame::Loop(target));
    let body = lower_body_block(ctx, &loop_scope, body)?;

    let unit = ctx.unit_type()?;
    let expr = ctx.alloc_expr(
        unit,
        ExprKind::While {
            target,
            condition,
            body,
        },
    );
    ctx.store.bind_loop_target(target, expr)?;
    Ok(expr)
}

pub(super) fn lower_do_while(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    body: Option<NodeId>,
    condition: Option<NodeId>,
    label: Option<Name>,
) -> LowerResult<ExprId> {
    let target = ctx.store.new_loop_target(LoopTarget::new(label));
    let loop_scope = scope.push(Frame::Loop(target));
    let body = lower_body_block(ctx, &loop_scope, body)?;
    let condition = lower_optional(ctx, &loop_scope, condition, "loop condition")?;

    let unit = ctx.unit_type()?;
    let expr = ctx.alloc_expr(
        unit,
        ExprKind::DoWhile {
            target,
            condition,
            body,
        },
    );
    ctx.store.bind_loop_target(target, expr)?;
    Ok(expr)
}

/// `break` or `continue`
pub(super) fn lower_break(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    node: NodeId,
    label: Option<Name>,
    is_continue: bool,
) -> LowerResult<ExprId> {
    let keyword = if is_continue { "continue" } else { "break" };
    let span = ctx.tree.span(node);
    let target = scope.loop_target(keyword, label, &ctx.store, ctx.interner, span)?;
    let kind = if is_continue {
        ExprKind::Continue { target }
    } else {
        ExprKind::Break { target }
    };
    let nothing = ctx.nothing_type()?;
    Ok(ctx.alloc_expr(nothing, kind))
}

pub(super) fn lower_return(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    node: NodeId,
    label: Option<Name>,
    value: Option<NodeId>,
) -> LowerResult<ExprId> {
    let span = ctx.tree.span(node);
    let target = scope.return_target(label, &ctx.store, ctx.interner, span)?;
    let value = match value {
        Some(value) => lower_expr(ctx, scope, value)?,
        None => ctx.unit()?,
    };
    let nothing = ctx.nothing_type()?;
    Ok(ctx.alloc_expr(nothing, ExprKind::Return { target, value }))
}

/// A label is consumed by the lambda or loop it names
pub(super) fn lower_labeled(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    label: Name,
    body: NodeId,
) -> LowerResult<ExprId> {
    let tree = ctx.tree;
    let inner = tree.deparenthesize(body);
    match tree.kind(inner) {
        NodeKind::Lambda { .. } => declarations::lower_lambda(ctx, scope, inner, Some(label)),
        NodeKind::Function { name: None, .. } => {
            declarations::lower_anonymous_function(ctx, scope, inner, Some(label))
        }
        NodeKind::While { condition, body } => {
            lower_while(ctx, scope, *condition, *body, Some(label))
        }
        NodeKind::DoWhile { body, condition } => {
            lower_do_while(ctx, scope, *body, *condition, Some(label))
        }
        NodeKind::For { .. } => desugar::lower_for(ctx, scope, inner, Some(label)),
        _ => lower_expr(ctx, scope, body),
    }
}

pub(super) fn lower_throw(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    exception: Option<NodeId>,
) -> LowerResult<ExprId> {
    let exception = lower_optional(ctx, scope, exception, "thrown exception")?;
    let nothing = ctx.nothing_type()?;
    Ok(ctx.alloc_expr(nothing, ExprKind::Throw { exception }))
}

pub(super) fn lower_try(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    node: NodeId,
    body: NodeId,
    catches: &[CatchClause],
    finally: Option<NodeId>,
) -> LowerResult<ExprId> {
    let body = lower_body_block(ctx, scope, Some(body))?;

    let mut lowered = Vec::with_capacity(catches.len());
    for clause in catches {
        let parameter = declarations::lower_value_parameter(ctx, scope, clause.parameter)?;
        let body = lower_body_block(ctx, scope, Some(clause.body))?;
        lowered.push(Catch { parameter, body });
    }

    let finally = match finally {
        Some(finally) => Some(lower_body_block(ctx, scope, Some(finally))?),
        None => None,
    };

    let ty = ctx.expression_type(node)?;
    Ok(ctx.alloc_expr(
        ty,
        ExprKind::Try {
            body,
            catches: lowered,
            finally,
        },
    ))
}
