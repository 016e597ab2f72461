//! Resolved calls, receivers and argument lists

use super::{block, lower_expr, Temporary};
use crate::context::GeneratorContext;
use crate::error::LowerResult;
use crate::scope::{Frame, Scope};
use tl_ast::{Access, AstType, DelegatedCallKind, ExprId, ExprKind, Statement};
use tl_semantic::{
    DescId, DescriptorKind, ReceiverValue, ResolvedCall, ResolvedValueArgument, VarargElement,
};
use tl_syntax::{DelegationKind, NodeId, NodeKind};

/// Parts of a call its caller has already built
#[derive(Debug, Default)]
pub(crate) struct CallOverrides {
    /// Takes the place of the receiver written in source
    pub explicit_receiver: Option<ExprId>,
    /// Replaces the value arguments, one slot per parameter
    pub arguments: Option<Vec<Option<ExprId>>>,
}

impl CallOverrides {
    /// Override only the receiver
    pub fn receiver(receiver: ExprId) -> Self {
        Self {
            explicit_receiver: Some(receiver),
            arguments: None,
        }
    }

    /// Override receiver and arguments
    pub fn with_arguments(receiver: Option<ExprId>, arguments: Vec<Option<ExprId>>) -> Self {
        Self {
            explicit_receiver: receiver,
            arguments: Some(arguments),
        }
    }
}

/// Callee reference with both receivers and the inferred type arguments
///
/// The explicit receiver replaces the receiver written in source. When the
/// call has none, it becomes the extension receiver if the callee has one
/// and the dispatch receiver otherwise.
pub(crate) fn build_access(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    call: &ResolvedCall,
    explicit: Option<ExprId>,
) -> LowerResult<Access> {
    let mut explicit = explicit;
    let callee = ctx.symbols.symbol_for(call.candidate);

    let mut extension_receiver = match call.extension_receiver {
        Some(receiver) => Some(receiver_expr(ctx, scope, receiver, &mut explicit)?),
        None => None,
    };
    let mut dispatch_receiver = match call.dispatch_receiver {
        Some(receiver) => Some(receiver_expr(ctx, scope, receiver, &mut explicit)?),
        None => None,
    };
    if let Some(explicit) = explicit {
        if call.extension_receiver.is_some() {
            extension_receiver = Some(explicit);
        } else {
            dispatch_receiver = Some(explicit);
        }
    }

    let mut type_arguments = Vec::with_capacity(call.type_arguments.len());
    for &ty in &call.type_arguments {
        type_arguments.push(ctx.convert(ty)?);
    }

    Ok(Access {
        callee,
        dispatch_receiver,
        extension_receiver,
        type_arguments,
    })
}

fn receiver_expr(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    receiver: ReceiverValue,
    explicit: &mut Option<ExprId>,
) -> LowerResult<ExprId> {
    let binding = ctx.binding;
    match receiver {
        ReceiverValue::Expression(node) => match explicit.take() {
            Some(expr) => Ok(expr),
            None => lower_expr(ctx, scope, node),
        },
        ReceiverValue::ImplicitThis { class, ty } => {
            let name = binding.descriptor(class).name;
            // anonymous classes have special names and cannot be labeled
            let label = (!ctx.name(name).starts_with('<')).then_some(name);
            let ty = ctx.convert(ty)?;
            Ok(ctx.alloc_expr(ty, ExprKind::This { label }))
        }
        ReceiverValue::ExtensionThis { callable, ty } => {
            let label = Some(binding.descriptor(callable).name);
            let ty = ctx.convert(ty)?;
            Ok(ctx.alloc_expr(ty, ExprKind::This { label }))
        }
        ReceiverValue::Super { ty } => {
            let ty = ctx.convert(ty)?;
            Ok(ctx.alloc_expr(
                ty.clone(),
                ExprKind::Super {
                    super_type: Some(ty),
                },
            ))
        }
        ReceiverValue::ClassValue { class, ty } => {
            let symbol = ctx.symbols.get_or_create_class_symbol(class);
            let ty = ctx.convert(ty)?;
            Ok(ctx.alloc_expr(ty, ExprKind::QualifiedAccess(Access::plain(symbol))))
        }
    }
}

/// Build the expression for a resolved call typed `ty`
///
/// Variables, parameters and objects become reads; everything else a call.
pub(crate) fn build_call(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    call: &ResolvedCall,
    ty: AstType,
    overrides: CallOverrides,
) -> LowerResult<ExprId> {
    let binding = ctx.binding;
    let access = build_access(ctx, scope, call, overrides.explicit_receiver)?;

    if matches!(
        binding.descriptor(call.candidate).kind,
        DescriptorKind::Property(_) | DescriptorKind::ValueParameter(_) | DescriptorKind::Class(_)
    ) {
        return Ok(ctx.alloc_expr(ty, ExprKind::QualifiedAccess(access)));
    }

    let (mut prelude, arguments) = match overrides.arguments {
        Some(arguments) => (Vec::new(), arguments),
        None => lower_arguments(ctx, scope, call)?,
    };
    let expr = ctx.alloc_expr(ty, ExprKind::Call { access, arguments });
    if prelude.is_empty() {
        return Ok(expr);
    }
    prelude.push(Statement::Expression(expr));
    block(ctx, prelude)
}

/// Value arguments by parameter slot, with the temporaries that must run first
///
/// Arguments are lowered in evaluation order. When named arguments were
/// written out of parameter order, every argument that may have side effects
/// is stored in a temporary so the call can take them in parameter order.
pub(crate) fn lower_arguments(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    call: &ResolvedCall,
) -> LowerResult<(Vec<Statement>, Vec<Option<ExprId>>)> {
    let binding = ctx.binding;
    let parameters = binding.descriptor(call.candidate).value_parameters();
    let reorder = ctx.config.calls.reorder_arguments && call.is_reordering_required();

    let mut prelude = Vec::new();
    let mut slots = vec![None; call.value_arguments.len()];
    for index in call.arguments_in_evaluation_order() {
        let Some(argument) = call.value_arguments.get(index) else {
            continue;
        };
        let lowered = match argument {
            ResolvedValueArgument::Default => None,
            ResolvedValueArgument::Expression(node) => Some(lower_expr(ctx, scope, *node)?),
            ResolvedValueArgument::Vararg(elements) => {
                lower_vararg(ctx, scope, elements, parameters.get(index).copied())?
            }
        };
        slots[index] = match lowered {
            Some(expr) if reorder && !has_no_side_effects(ctx, expr) => {
                let temporary = Temporary::new(ctx, "<tmp>", expr)?;
                prelude.push(temporary.statement());
                Some(temporary.read(ctx))
            }
            other => other,
        };
    }

    Ok((prelude, slots))
}

fn lower_vararg(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    elements: &[VarargElement],
    parameter: Option<DescId>,
) -> LowerResult<Option<ExprId>> {
    if elements.is_empty() {
        return Ok(None);
    }

    let mut lowered = Vec::with_capacity(elements.len());
    for element in elements {
        let expr = lower_expr(ctx, scope, element.expression)?;
        lowered.push(if element.spread {
            let ty = ctx.expr_type(expr);
            ctx.alloc_expr(ty, ExprKind::Spread { expression: expr })
        } else {
            expr
        });
    }

    let binding = ctx.binding;
    let ty = match parameter.and_then(|parameter| binding.descriptor(parameter).as_value_parameter())
    {
        Some(parameter) => ctx.convert(parameter.ty)?,
        None => {
            let nullable_any = ctx.builtins().nullable_any_type;
            ctx.convert(nullable_any)?
        }
    };
    Ok(Some(ctx.alloc_expr(ty, ExprKind::Vararg { elements: lowered })))
}

/// Expressions that may be evaluated out of order without changing behavior
fn has_no_side_effects(ctx: &GeneratorContext<'_>, expr: ExprId) -> bool {
    match &ctx.store[expr].kind {
        ExprKind::Lambda { .. } | ExprKind::ClassReference { .. } | ExprKind::Const { .. } => true,
        ExprKind::CallableReference(access) | ExprKind::QualifiedAccess(access) => {
            access.dispatch_receiver.is_none() && access.extension_receiver.is_none()
        }
        _ => false,
    }
}

/// Translate a name or call node through its resolved call
pub(crate) fn lower_call_node(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    node: NodeId,
    overrides: CallOverrides,
) -> LowerResult<ExprId> {
    let tree = ctx.tree;
    let binding = ctx.binding;
    let ty = ctx.expression_type(node)?;

    if let Some(call) = binding.resolved_call(node) {
        return match tree.kind(node) {
            NodeKind::Call { .. } => {
                let callee_name = binding.descriptor(call.candidate).name;
                let arguments_scope = scope.push(Frame::CalleeName(callee_name));
                build_call(ctx, &arguments_scope, call, ty, overrides)
            }
            _ => build_call(ctx, scope, call, ty, overrides),
        };
    }

    match tree.kind(node) {
        NodeKind::NameReference { .. } => {
            let target = binding
                .reference_target(node)
                .ok_or_else(|| ctx.missing("resolved reference", node))?;
            let symbol = ctx.symbols.symbol_for(target);
            let mut access = Access::plain(symbol);
            access.dispatch_receiver = overrides.explicit_receiver;
            Ok(ctx.alloc_expr(ty, ExprKind::QualifiedAccess(access)))
        }
        NodeKind::Call { .. } => Err(ctx.missing("resolved call", node)),
        _ => Err(ctx.unexpected(node, "name or call")),
    }
}

/// `a.b` lowers through the selector; `a?.b` wraps it in a safe call
pub(crate) fn lower_qualified(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    node: NodeId,
) -> LowerResult<ExprId> {
    let tree = ctx.tree;
    let NodeKind::Qualified {
        receiver,
        selector,
        safe,
    } = tree.kind(node)
    else {
        return Err(ctx.unexpected(node, "qualified expression"));
    };
    let selector = tree.deparenthesize(*selector);

    if !safe {
        return lower_call_node(ctx, scope, selector, CallOverrides::default());
    }

    let (receiver, subject) = safe_call_subject(ctx, scope, *receiver)?;
    let selector = lower_call_node(ctx, scope, selector, CallOverrides::receiver(subject))?;
    let ty = ctx.expression_type(node)?;
    Ok(ctx.alloc_expr(
        ty,
        ExprKind::SafeCall {
            receiver,
            subject,
            selector,
        },
    ))
}

/// The lowered receiver of a safe call and the non-null subject standing in for it
pub(crate) fn safe_call_subject(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    receiver: NodeId,
) -> LowerResult<(ExprId, ExprId)> {
    let receiver = lower_expr(ctx, scope, receiver)?;
    let ty = AstType {
        nullable: false,
        ..ctx.expr_type(receiver)
    };
    let subject = ctx.alloc_expr(
        ty,
        ExprKind::CheckedSafeCallSubject {
            original_receiver: receiver,
        },
    );
    Ok((receiver, subject))
}

/// Indexed read `a[i]` through its `get` operator
pub(crate) fn lower_array_access(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    node: NodeId,
) -> LowerResult<ExprId> {
    let binding = ctx.binding;
    let get = binding
        .indexed_calls(node)
        .and_then(|calls| calls.get.as_ref())
        .ok_or_else(|| ctx.missing("indexed get call", node))?;
    let ty = ctx.expression_type(node)?;
    build_call(ctx, scope, get, ty, CallOverrides::default())
}

/// `this(..)` or `super(..)` from a constructor or a class header
pub(crate) fn lower_delegation_call(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    node: NodeId,
) -> LowerResult<ExprId> {
    let tree = ctx.tree;
    let binding = ctx.binding;
    let NodeKind::DelegationCall { kind, .. } = tree.kind(node) else {
        return Err(ctx.unexpected(node, "delegation call"));
    };
    let call = binding
        .resolved_call(node)
        .ok_or_else(|| ctx.missing("resolved delegation call", node))?;

    let callee = ctx.symbols.get_or_create_constructor_symbol(call.candidate);
    let (mut prelude, arguments) = lower_arguments(ctx, scope, call)?;
    let kind = match kind {
        DelegationKind::This => DelegatedCallKind::This,
        DelegationKind::Super => DelegatedCallKind::Super,
    };
    let ty = ctx.unit_type()?;
    let expr = ctx.alloc_expr(
        ty,
        ExprKind::DelegatedConstructorCall {
            callee,
            kind,
            arguments,
        },
    );
    if prelude.is_empty() {
        return Ok(expr);
    }
    prelude.push(Statement::Expression(expr));
    block(ctx, prelude)
}
