//! Desugarings into the canonical vocabulary
//!
//! Each construct here expands into a block of synthetic temporaries
//! followed by the canonical expressions that use them:
//!
//! ```text
//! for (x in r) body      { val <iterator> = r.iterator()
//!                          while (<iterator>.hasNext()) { val x = <iterator>.next(); body } }
//! val (a, _, c) = e      { val <destruct> = e; val a = <destruct>.component1()
//!                          val c = <destruct>.component3() }
//! x++                    { val <unary> = x; x = <unary>.inc(); <unary> }
//! a[i]++                 { val <array> = a; val <index_0> = i; val <unary> = <array>.get(<index_0>)
//!                          <array>.set(<index_0>, <unary>.inc()); <unary> }
//! a[i] += v              { val <array> = a; val <index_0> = i
//!                          <array>.set(<index_0>, <array>.get(<index_0>).plus(v)) }
//! ```

use super::calls::{build_access, build_call, lower_call_node, safe_call_subject, CallOverrides};
use super::{
    annotation_calls, block, lower_body_block, lower_expr, lower_optional, push_flattened,
    Temporary,
};
use crate::context::GeneratorContext;
use crate::error::LowerResult;
use crate::scope::{Frame, Scope};
use tl_ast::{
    Access, DeclKind, DeclOrigin, DiagnosticKind, ExprId, ExprKind, LoopTarget, PropertyDecl,
    Statement,
};
use tl_intern::Name;
use tl_syntax::{BinaryOp, NodeId, NodeKind};

/// Assignment, compound assignment and their indexed and safe-call forms
pub(super) fn lower_assignment(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    node: NodeId,
    op: BinaryOp,
    left: NodeId,
    right: Option<NodeId>,
) -> LowerResult<ExprId> {
    let tree = ctx.tree;
    let binding = ctx.binding;

    // `a += b` resolved to `a.plusAssign(b)`
    if op.is_augmented_assignment() && binding.is_operator_assignment(node) {
        let call = binding
            .resolved_call(node)
            .ok_or_else(|| ctx.missing("resolved assignment operator", node))?;
        let unit = ctx.unit_type()?;
        return build_call(ctx, scope, call, unit, CallOverrides::default());
    }

    let target = tree.deparenthesize(left);
    if op.is_augmented_assignment() {
        if let NodeKind::ArrayAccess { array, indices } = tree.kind(target) {
            return lower_augmented_indexed(ctx, scope, node, target, *array, indices, right);
        }
    }

    let value = if op == BinaryOp::Assign {
        lower_optional(ctx, scope, right, "assigned value")?
    } else {
        let call = binding
            .resolved_call(node)
            .ok_or_else(|| ctx.missing("resolved operator call", node))?;
        let ty = ctx.convert(call.result_type)?;
        build_call(ctx, scope, call, ty, CallOverrides::default())?
    };
    assign_to(ctx, scope, target, value)
}

/// Store `value` into the variable, property or indexed element denoted by `lvalue`
fn assign_to(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    lvalue: NodeId,
    value: ExprId,
) -> LowerResult<ExprId> {
    let tree = ctx.tree;
    let binding = ctx.binding;
    match tree.kind(lvalue) {
        NodeKind::NameReference { .. } => assignment(ctx, scope, lvalue, value, None),
        NodeKind::Qualified {
            selector,
            safe: false,
            ..
        } => assignment(ctx, scope, tree.deparenthesize(*selector), value, None),
        NodeKind::Qualified {
            receiver,
            selector,
            safe: true,
        } => {
            let (receiver, subject) = safe_call_subject(ctx, scope, *receiver)?;
            let selector =
                assignment(ctx, scope, tree.deparenthesize(*selector), value, Some(subject))?;
            let unit = ctx.unit_type()?;
            Ok(ctx.alloc_expr(
                unit,
                ExprKind::SafeCall {
                    receiver,
                    subject,
                    selector,
                },
            ))
        }
        NodeKind::ArrayAccess { indices, .. } => {
            let set = binding
                .indexed_calls(lvalue)
                .and_then(|calls| calls.set.as_ref())
                .ok_or_else(|| ctx.missing("indexed set call", lvalue))?;
            let mut arguments = Vec::with_capacity(indices.len() + 1);
            for &index in indices {
                arguments.push(Some(lower_expr(ctx, scope, index)?));
            }
            arguments.push(Some(value));
            let unit = ctx.unit_type()?;
            build_call(
                ctx,
                scope,
                set,
                unit,
                CallOverrides::with_arguments(None, arguments),
            )
        }
        _ => ctx.error_expr(DiagnosticKind::VariableExpected, "variable expected"),
    }
}

fn assignment(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    name: NodeId,
    value: ExprId,
    receiver: Option<ExprId>,
) -> LowerResult<ExprId> {
    let binding = ctx.binding;
    let access = match binding.resolved_call(name) {
        Some(call) => build_access(ctx, scope, call, receiver)?,
        None => {
            let target = binding
                .reference_target(name)
                .ok_or_else(|| ctx.missing("assigned variable", name))?;
            let mut access = Access::plain(ctx.symbols.symbol_for(target));
            access.dispatch_receiver = receiver;
            access
        }
    };
    let unit = ctx.unit_type()?;
    Ok(ctx.alloc_expr(unit, ExprKind::Assignment { access, value }))
}

/// `a[i] op= v` without an assignment operator on the element type
fn lower_augmented_indexed(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    node: NodeId,
    access_node: NodeId,
    array: NodeId,
    indices: &[NodeId],
    right: Option<NodeId>,
) -> LowerResult<ExprId> {
    let binding = ctx.binding;
    let operator = binding
        .resolved_call(node)
        .ok_or_else(|| ctx.missing("resolved operator call", node))?;

    let mut statements = Vec::new();
    let place = Place::indexed(ctx, scope, access_node, array, indices, &mut statements)?;
    let element = place.read(ctx, scope)?;

    let value = lower_optional(ctx, scope, right, "assigned value")?;
    let operator_ty = ctx.convert(operator.result_type)?;
    let updated = build_call(
        ctx,
        scope,
        operator,
        operator_ty,
        CallOverrides::with_arguments(Some(element), vec![Some(value)]),
    )?;

    let store = place.store(ctx, scope, updated)?;
    statements.push(Statement::Expression(store));
    block(ctx, statements)
}

/// An lvalue whose receiver and indices are evaluated once, ahead of a read and a store
enum Place {
    /// A variable read and written by name
    Name(NodeId),
    /// `receiver.selector`, the receiver held in `<receiver>`
    Member {
        selector: NodeId,
        receiver: Temporary,
    },
    /// `array[indices]`, each part held in `<array>` and `<index_N>`
    Indexed {
        node: NodeId,
        array: Temporary,
        indices: Vec<Temporary>,
    },
    /// Safe calls and malformed targets, evaluated again by the store
    Other(NodeId),
}

impl Place {
    /// Evaluate the parts of `lvalue` into temporaries appended to `statements`
    fn capture(
        ctx: &mut GeneratorContext<'_>,
        scope: &Scope<'_>,
        lvalue: NodeId,
        statements: &mut Vec<Statement>,
    ) -> LowerResult<Self> {
        let tree = ctx.tree;
        match tree.kind(lvalue) {
            NodeKind::NameReference { .. } => Ok(Self::Name(lvalue)),
            NodeKind::Qualified {
                receiver,
                selector,
                safe: false,
            } => {
                let value = lower_expr(ctx, scope, *receiver)?;
                let receiver = Temporary::new(ctx, "<receiver>", value)?;
                statements.push(receiver.statement());
                Ok(Self::Member {
                    selector: tree.deparenthesize(*selector),
                    receiver,
                })
            }
            NodeKind::ArrayAccess { array, indices } => {
                Self::indexed(ctx, scope, lvalue, *array, indices, statements)
            }
            _ => Ok(Self::Other(lvalue)),
        }
    }

    fn indexed(
        ctx: &mut GeneratorContext<'_>,
        scope: &Scope<'_>,
        node: NodeId,
        array: NodeId,
        indices: &[NodeId],
        statements: &mut Vec<Statement>,
    ) -> LowerResult<Self> {
        let value = lower_expr(ctx, scope, array)?;
        let array = Temporary::new(ctx, "<array>", value)?;
        statements.push(array.statement());
        let mut temporaries = Vec::with_capacity(indices.len());
        for (position, &index) in indices.iter().enumerate() {
            let value = lower_expr(ctx, scope, index)?;
            let temporary = Temporary::new(ctx, &format!("<index_{position}>"), value)?;
            statements.push(temporary.statement());
            temporaries.push(temporary);
        }
        Ok(Self::Indexed {
            node,
            array,
            indices: temporaries,
        })
    }

    const fn is_name(&self) -> bool {
        matches!(self, Self::Name(_))
    }

    fn index_reads(ctx: &mut GeneratorContext<'_>, indices: &[Temporary]) -> Vec<Option<ExprId>> {
        indices
            .iter()
            .map(|temporary| Some(temporary.read(ctx)))
            .collect()
    }

    /// The current value
    fn read(&self, ctx: &mut GeneratorContext<'_>, scope: &Scope<'_>) -> LowerResult<ExprId> {
        match self {
            Self::Name(node) | Self::Other(node) => lower_expr(ctx, scope, *node),
            Self::Member { selector, receiver } => {
                let receiver = receiver.read(ctx);
                lower_call_node(ctx, scope, *selector, CallOverrides::receiver(receiver))
            }
            Self::Indexed {
                node,
                array,
                indices,
            } => {
                let binding = ctx.binding;
                let get = binding
                    .indexed_calls(*node)
                    .and_then(|calls| calls.get.as_ref())
                    .ok_or_else(|| ctx.missing("indexed get call", *node))?;
                let receiver = array.read(ctx);
                let arguments = Self::index_reads(ctx, indices);
                let ty = ctx.convert(get.result_type)?;
                build_call(
                    ctx,
                    scope,
                    get,
                    ty,
                    CallOverrides::with_arguments(Some(receiver), arguments),
                )
            }
        }
    }

    /// Store `value`, reusing the captured parts
    fn store(
        &self,
        ctx: &mut GeneratorContext<'_>,
        scope: &Scope<'_>,
        value: ExprId,
    ) -> LowerResult<ExprId> {
        match self {
            Self::Name(node) | Self::Other(node) => assign_to(ctx, scope, *node, value),
            Self::Member { selector, receiver } => {
                let receiver = receiver.read(ctx);
                assignment(ctx, scope, *selector, value, Some(receiver))
            }
            Self::Indexed {
                node,
                array,
                indices,
            } => {
                let binding = ctx.binding;
                let set = binding
                    .indexed_calls(*node)
                    .and_then(|calls| calls.set.as_ref())
                    .ok_or_else(|| ctx.missing("indexed set call", *node))?;
                let receiver = array.read(ctx);
                let mut arguments = Self::index_reads(ctx, indices);
                arguments.push(Some(value));
                let unit = ctx.unit_type()?;
                build_call(
                    ctx,
                    scope,
                    set,
                    unit,
                    CallOverrides::with_arguments(Some(receiver), arguments),
                )
            }
        }
    }
}

/// `++`/`--` in prefix and postfix position
///
/// The receiver and indices of the operand are evaluated once. Postfix
/// yields the value read before the update. Prefix on a plain name yields a
/// fresh read of the name; on any other lvalue it yields the updated value
/// kept in `<unary-result>`.
pub(super) fn lower_increment(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    node: NodeId,
    operand: NodeId,
    prefix: bool,
) -> LowerResult<ExprId> {
    let tree = ctx.tree;
    let binding = ctx.binding;
    let lvalue = tree.deparenthesize(operand);
    let operator = binding
        .resolved_call(node)
        .ok_or_else(|| ctx.missing("resolved increment operator", node))?;

    let mut statements = Vec::new();
    let place = Place::capture(ctx, scope, lvalue, &mut statements)?;
    let current = place.read(ctx, scope)?;
    let unary = Temporary::new(ctx, "<unary>", current)?;
    statements.push(unary.statement());

    let receiver = unary.read(ctx);
    let operator_ty = ctx.convert(operator.result_type)?;
    let updated = build_call(
        ctx,
        scope,
        operator,
        operator_ty,
        CallOverrides::with_arguments(Some(receiver), Vec::new()),
    )?;

    let result = if !prefix {
        let store = place.store(ctx, scope, updated)?;
        statements.push(Statement::Expression(store));
        unary.read(ctx)
    } else if place.is_name() {
        let store = place.store(ctx, scope, updated)?;
        statements.push(Statement::Expression(store));
        place.read(ctx, scope)?
    } else {
        let result = Temporary::new(ctx, "<unary-result>", updated)?;
        statements.push(result.statement());
        let value = result.read(ctx);
        let store = place.store(ctx, scope, value)?;
        statements.push(Statement::Expression(store));
        result.read(ctx)
    };
    statements.push(Statement::Expression(result));

    block(ctx, statements)
}

/// `val (a, b) = e`
pub(super) fn lower_destructuring(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    node: NodeId,
) -> LowerResult<ExprId> {
    let tree = ctx.tree;
    let NodeKind::Destructuring {
        entries,
        initializer,
    } = tree.kind(node)
    else {
        return Err(ctx.unexpected(node, "destructuring declaration"));
    };

    let value = lower_optional(ctx, scope, *initializer, "destructured value")?;
    let container = Temporary::new(ctx, "<destruct>", value)?;
    let mut statements = vec![container.statement()];
    destructure_into(ctx, scope, entries, &container, &mut statements)?;
    block(ctx, statements)
}

/// One local per named entry, initialized from `componentN()` of the container
///
/// `_` entries are skipped and their component function is never called.
pub(super) fn destructure_into(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    entries: &[NodeId],
    container: &Temporary,
    statements: &mut Vec<Statement>,
) -> LowerResult<()> {
    let tree = ctx.tree;
    let binding = ctx.binding;
    for &entry in entries {
        let NodeKind::DestructuringEntry { name } = tree.kind(entry) else {
            return Err(ctx.unexpected(entry, "destructuring entry"));
        };
        if name.is_none() {
            continue;
        }

        let component = binding
            .component_call(entry)
            .ok_or_else(|| ctx.missing("component call", entry))?;
        let desc = ctx.declared(entry)?;
        let symbol = ctx.symbols.symbol_for(desc);

        let receiver = container.read(ctx);
        let component_ty = ctx.convert(component.result_type)?;
        let value = build_call(
            ctx,
            scope,
            component,
            component_ty.clone(),
            CallOverrides::with_arguments(Some(receiver), Vec::new()),
        )?;

        let mut property = match binding.descriptor(desc).as_property() {
            Some(variable) => {
                let ty = ctx.convert(variable.ty)?;
                let mut property = PropertyDecl::local(ty, Some(value));
                property.is_var = variable.is_var;
                property
            }
            None => PropertyDecl::local(component_ty, Some(value)),
        };
        property.is_local = true;
        let decl = ctx.declare(symbol, DeclOrigin::Source, Vec::new(), DeclKind::Property(property))?;
        statements.push(Statement::Declaration(decl));
    }
    Ok(())
}

/// `for` over the iterator protocol of the range
pub(super) fn lower_for(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    node: NodeId,
    label: Option<Name>,
) -> LowerResult<ExprId> {
    let tree = ctx.tree;
    let binding = ctx.binding;
    let NodeKind::For {
        parameter,
        range,
        body,
    } = tree.kind(node)
    else {
        return Err(ctx.unexpected(node, "for loop"));
    };
    let calls = binding
        .loop_calls(node)
        .ok_or_else(|| ctx.missing("iterator calls", node))?;

    let range = lower_expr(ctx, scope, *range)?;
    let iterator_ty = ctx.convert(calls.iterator.result_type)?;
    let iterator_value = build_call(
        ctx,
        scope,
        &calls.iterator,
        iterator_ty,
        CallOverrides::with_arguments(Some(range), Vec::new()),
    )?;
    let iterator = Temporary::new(ctx, "<iterator>", iterator_value)?;

    let receiver = iterator.read(ctx);
    let boolean = ctx.boolean_type()?;
    let condition = build_call(
        ctx,
        scope,
        &calls.has_next,
        boolean,
        CallOverrides::with_arguments(Some(receiver), Vec::new()),
    )?;

    let target = ctx.store.new_loop_target(LoopTarget::new(label));
    let loop_scope = scope.push(Frame::Loop(target));

    let receiver = iterator.read(ctx);
    let next_ty = ctx.convert(calls.next.result_type)?;
    let next = build_call(
        ctx,
        &loop_scope,
        &calls.next,
        next_ty,
        CallOverrides::with_arguments(Some(receiver), Vec::new()),
    )?;

    let mut statements = Vec::new();
    match tree.kind(*parameter) {
        NodeKind::Parameter {
            destructuring: Some(destructuring),
            ..
        } => {
            let NodeKind::Destructuring { entries, .. } = tree.kind(*destructuring) else {
                return Err(ctx.unexpected(*destructuring, "destructuring declaration"));
            };
            let container = Temporary::new(ctx, "<destruct>", next)?;
            statements.push(container.statement());
            destructure_into(ctx, &loop_scope, entries, &container, &mut statements)?;
        }
        NodeKind::Parameter { annotations, .. } => {
            let desc = ctx.declared(*parameter)?;
            let symbol = ctx.symbols.symbol_for(desc);
            let ty = match binding.descriptor(desc).as_property() {
                Some(variable) => ctx.convert(variable.ty)?,
                None => ctx.expr_type(next),
            };
            let annotations = annotation_calls(ctx, annotations)?;
            let variable = ctx.declare(
                symbol,
                DeclOrigin::Source,
                annotations,
                DeclKind::Property(PropertyDecl::local(ty, Some(next))),
            )?;
            statements.push(Statement::Declaration(variable));
        }
        _ => return Err(ctx.unexpected(*parameter, "loop parameter")),
    }

    let body = lower_body_block(ctx, &loop_scope, *body)?;
    push_flattened(ctx, &mut statements, body);
    let body = block(ctx, statements)?;

    let unit = ctx.unit_type()?;
    let loop_expr = ctx.alloc_expr(
        unit,
        ExprKind::While {
            target,
            condition,
            body,
        },
    );
    ctx.store.bind_loop_target(target, loop_expr)?;

    block(
        ctx,
        vec![iterator.statement(), Statement::Expression(loop_expr)],
    )
}
