//! Syntax tree to AST translation
//!
//! Every function here takes the session context, the current scope chain
//! and the node to translate. Constructs that introduce jump targets push a
//! frame onto the chain for the duration of the nested call, so returning
//! from a visit restores the enclosing scope.

mod calls;
mod control;
mod declarations;
mod desugar;
mod expressions;

use crate::constant::generate_annotation_call;
use crate::context::GeneratorContext;
use crate::error::LowerResult;
use crate::scope::Scope;
use log::{debug, trace};
use tl_ast::{
    Access, AstFile, AstType, DeclId, DeclKind, DeclOrigin, DiagnosticKind, ExprId, ExprKind,
    PropertyDecl, Statement, SymbolId, SymbolKind,
};
use tl_syntax::{NodeId, NodeKind, SourceFile};

use calls::CallOverrides;

/// Translate one source file
///
/// # Errors
///
/// Any fatal [`LowerError`](crate::LowerError) raised while translating
/// its declarations.
pub fn lower_file(ctx: &mut GeneratorContext<'_>, file: &SourceFile) -> LowerResult<AstFile> {
    debug!(
        "lowering file {} ({} declarations)",
        file.name,
        file.declarations.len()
    );
    let scope = Scope::root();
    let annotations = annotation_calls(ctx, &file.annotations)?;

    let mut declarations = Vec::with_capacity(file.declarations.len());
    for &node in &file.declarations {
        declarations.push(declarations::lower_declaration(ctx, &scope, node)?);
    }

    Ok(AstFile {
        name: file.name.clone(),
        package: file.package.clone(),
        annotations,
        declarations,
    })
}

/// Translate an expression node
pub(crate) fn lower_expr(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    node: NodeId,
) -> LowerResult<ExprId> {
    let tree = ctx.tree;
    trace!("lowering {} at {:?}", tree.kind(node).describe(), tree.span(node));

    match tree.kind(node) {
        NodeKind::Class { .. }
        | NodeKind::Property { .. }
        | NodeKind::TypeAlias { .. }
        | NodeKind::Function { name: Some(_), .. } => {
            let decl = declarations::lower_declaration(ctx, scope, node)?;
            block(ctx, vec![Statement::Declaration(decl)])
        }
        NodeKind::Function { name: None, .. } => {
            declarations::lower_anonymous_function(ctx, scope, node, None)
        }
        NodeKind::Destructuring { .. } => desugar::lower_destructuring(ctx, scope, node),

        NodeKind::Constant => expressions::lower_constant(ctx, node),
        NodeKind::StringTemplate { entries } => {
            expressions::lower_string_template(ctx, scope, entries)
        }
        NodeKind::NameReference { .. } | NodeKind::Call { .. } => {
            calls::lower_call_node(ctx, scope, node, CallOverrides::default())
        }
        NodeKind::Qualified { .. } => calls::lower_qualified(ctx, scope, node),
        NodeKind::ArrayAccess { .. } => calls::lower_array_access(ctx, scope, node),
        NodeKind::Unary {
            op,
            operand,
            prefix,
        } => expressions::lower_unary(ctx, scope, node, *op, *operand, *prefix),
        NodeKind::Binary { op, left, right } => {
            expressions::lower_binary(ctx, scope, node, *op, *left, *right)
        }
        NodeKind::TypeCheck {
            expression,
            type_ref,
            negated,
        } => expressions::lower_type_check(ctx, scope, *expression, *type_ref, *negated),
        NodeKind::Cast {
            expression,
            type_ref,
            safe,
        } => expressions::lower_cast(ctx, scope, node, *expression, *type_ref, *safe),

        NodeKind::If { .. } => control::lower_if(ctx, scope, node),
        NodeKind::When { subject, entries } => {
            control::lower_when(ctx, scope, node, *subject, entries)
        }
        NodeKind::While { condition, body } => {
            control::lower_while(ctx, scope, *condition, *body, None)
        }
        NodeKind::DoWhile { body, condition } => {
            control::lower_do_while(ctx, scope, *body, *condition, None)
        }
        NodeKind::For { .. } => desugar::lower_for(ctx, scope, node, None),
        NodeKind::Break { label } => control::lower_break(ctx, scope, node, *label, false),
        NodeKind::Continue { label } => control::lower_break(ctx, scope, node, *label, true),
        NodeKind::Return { label, value } => {
            control::lower_return(ctx, scope, node, *label, *value)
        }
        NodeKind::Labeled { label, body } => control::lower_labeled(ctx, scope, *label, *body),
        NodeKind::Throw { exception } => control::lower_throw(ctx, scope, *exception),
        NodeKind::Try {
            body,
            catches,
            finally,
        } => control::lower_try(ctx, scope, node, *body, catches, *finally),

        NodeKind::Lambda { .. } => declarations::lower_lambda(ctx, scope, node, None),
        NodeKind::ObjectLiteral { declaration } => {
            declarations::lower_object_literal(ctx, node, *declaration)
        }
        NodeKind::Block { statements } => lower_block(ctx, scope, node, statements),
        NodeKind::Parenthesized { inner } => lower_expr(ctx, scope, *inner),
        NodeKind::This { label } => expressions::lower_this(ctx, node, *label),
        NodeKind::Super { .. } => ctx.error_expr(
            DiagnosticKind::SuperNotAllowed,
            "`super` is only allowed as a receiver",
        ),
        NodeKind::ClassLiteral { receiver } => {
            expressions::lower_class_literal(ctx, node, *receiver)
        }
        NodeKind::CallableReference { .. } => {
            expressions::lower_callable_reference(ctx, scope, node)
        }
        NodeKind::Annotated { annotations, base } => {
            expressions::lower_annotated(ctx, scope, annotations, *base)
        }
        NodeKind::Error { message } => ctx.error_expr(DiagnosticKind::Syntax, message),

        NodeKind::EnumEntry { .. }
        | NodeKind::PrimaryConstructor { .. }
        | NodeKind::SecondaryConstructor { .. }
        | NodeKind::DelegationCall { .. }
        | NodeKind::PropertyAccessor { .. }
        | NodeKind::AnonymousInitializer { .. }
        | NodeKind::TypeParameter { .. }
        | NodeKind::Parameter { .. }
        | NodeKind::DestructuringEntry { .. }
        | NodeKind::AnnotationEntry
        | NodeKind::TypeReference => Err(ctx.unexpected(node, "expression")),
    }
}

/// Translate an expression that malformed input may leave out
pub(crate) fn lower_optional(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    node: Option<NodeId>,
    what: &str,
) -> LowerResult<ExprId> {
    match node {
        Some(node) => lower_expr(ctx, scope, node),
        None => ctx.error_expr(
            DiagnosticKind::ExpressionRequired,
            &format!("expected {what}"),
        ),
    }
}

/// Append a lowered statement, splicing in the statements of blocks produced by desugarings
fn push_flattened(ctx: &GeneratorContext<'_>, statements: &mut Vec<Statement>, expr: ExprId) {
    match &ctx.store[expr].kind {
        ExprKind::Block { statements: inner } if ctx.store[expr].annotations.is_empty() => {
            statements.extend(inner.iter().copied());
        }
        _ => statements.push(Statement::Expression(expr)),
    }
}

/// Translate a statement list into a block typed by the recorded block type
fn lower_block(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    node: NodeId,
    statements: &[NodeId],
) -> LowerResult<ExprId> {
    let mut lowered = Vec::with_capacity(statements.len());
    for &statement in statements {
        let expr = lower_expr(ctx, scope, statement)?;
        push_flattened(ctx, &mut lowered, expr);
    }

    match ctx.binding.expression_type(node) {
        Some(ty) => {
            let ty = ctx.convert(ty)?;
            Ok(ctx.alloc_expr(ty, ExprKind::Block { statements: lowered }))
        }
        None => block(ctx, lowered),
    }
}

/// Translate a loop, function or branch body into a block
fn lower_body_block(
    ctx: &mut GeneratorContext<'_>,
    scope: &Scope<'_>,
    node: Option<NodeId>,
) -> LowerResult<ExprId> {
    let Some(node) = node else {
        return block(ctx, Vec::new());
    };
    let tree = ctx.tree;
    match tree.kind(node) {
        NodeKind::Block { statements } => lower_block(ctx, scope, node, statements),
        _ => {
            let expr = lower_expr(ctx, scope, node)?;
            let mut statements = Vec::new();
            push_flattened(ctx, &mut statements, expr);
            block(ctx, statements)
        }
    }
}

/// Block typed by its trailing expression, `Unit` when it ends in a declaration
pub(crate) fn block(
    ctx: &mut GeneratorContext<'_>,
    statements: Vec<Statement>,
) -> LowerResult<ExprId> {
    let ty = match statements.last() {
        Some(Statement::Expression(expr)) => ctx.expr_type(*expr),
        _ => ctx.unit_type()?,
    };
    Ok(ctx.alloc_expr(ty, ExprKind::Block { statements }))
}

/// Annotation constructor calls for annotation entry nodes
pub(crate) fn annotation_calls(
    ctx: &mut GeneratorContext<'_>,
    nodes: &[NodeId],
) -> LowerResult<Vec<ExprId>> {
    let binding = ctx.binding;
    let mut calls = Vec::with_capacity(nodes.len());
    for &node in nodes {
        let annotation = binding
            .annotation(node)
            .ok_or_else(|| ctx.missing("annotation", node))?;
        if let Some(call) = generate_annotation_call(ctx, annotation)? {
            calls.push(call);
        }
    }
    Ok(calls)
}

/// Synthetic local holding an intermediate value of a desugaring
#[derive(Debug, Clone)]
pub(crate) struct Temporary {
    pub decl: DeclId,
    pub symbol: SymbolId,
    pub ty: AstType,
}

impl Temporary {
    /// Declare `name` initialized with `value`
    pub fn new(ctx: &mut GeneratorContext<'_>, name: &str, value: ExprId) -> LowerResult<Self> {
        let name = ctx.intern(name);
        let symbol = ctx.symbols.fresh_local(SymbolKind::Property, name);
        let ty = ctx.expr_type(value);
        let decl = ctx.declare(
            symbol,
            DeclOrigin::Synthetic,
            Vec::new(),
            DeclKind::Property(PropertyDecl::local(ty.clone(), Some(value))),
        )?;
        Ok(Self { decl, symbol, ty })
    }

    /// A fresh read of the temporary
    pub fn read(&self, ctx: &mut GeneratorContext<'_>) -> ExprId {
        ctx.alloc_expr(
            self.ty.clone(),
            ExprKind::QualifiedAccess(Access::plain(self.symbol)),
        )
    }

    /// `val` statement declaring this temporary
    pub fn statement(&self) -> Statement {
        Statement::Declaration(self.decl)
    }
}
