//! Traversal over declarations, expressions and types

use crate::decl::DeclKind;
use crate::expr::{Access, ExprKind, Statement};
use crate::store::AstStore;
use crate::types::{AstType, TypeProjection};
use crate::{DeclId, ExprId, FunctionTargetId, LoopTargetId, SymbolId, WhenRefId};
use rustc_hash::FxHashSet;

/// Visitor over an [`AstStore`]
///
/// Default methods recurse through the `walk_*` functions; override a
/// method and call the matching `walk_*` to keep descending.
pub trait AstVisitor {
    /// A declaration; recurses by default
    fn visit_decl(&mut self, store: &AstStore, id: DeclId) {
        walk_decl(self, store, id);
    }

    /// An expression; recurses by default
    fn visit_expr(&mut self, store: &AstStore, id: ExprId) {
        walk_expr(self, store, id);
    }

    /// A type; recurses by default
    fn visit_type(&mut self, store: &AstStore, ty: &AstType) {
        walk_type(self, store, ty);
    }

    /// A symbol referenced from a type, access or declaration field
    fn visit_symbol_reference(&mut self, _symbol: SymbolId) {}

    /// A `return` target
    fn visit_function_target(&mut self, _target: FunctionTargetId) {}

    /// A `break` or `continue` target
    fn visit_loop_target(&mut self, _target: LoopTargetId) {}

    /// A `when` subject reference
    fn visit_when_ref(&mut self, _when_ref: WhenRefId) {}
}

/// Visit the annotations, types and children of a declaration
pub fn walk_decl<V: AstVisitor + ?Sized>(visitor: &mut V, store: &AstStore, id: DeclId) {
    let decl = &store[id];
    for &annotation in &decl.annotations {
        visitor.visit_expr(store, annotation);
    }

    match &decl.kind {
        DeclKind::Class(class) => {
            walk_decls(visitor, store, &class.type_parameters);
            for supertype in &class.supertypes {
                visitor.visit_type(store, supertype);
            }
            walk_decls(visitor, store, &class.declarations);
        }
        DeclKind::Function(function) => {
            walk_decls(visitor, store, &function.type_parameters);
            walk_optional_type(visitor, store, function.dispatch_receiver_type.as_ref());
            walk_optional_type(visitor, store, function.extension_receiver_type.as_ref());
            walk_decls(visitor, store, &function.value_parameters);
            visitor.visit_type(store, &function.return_type);
            for &overridden in &function.overridden {
                visitor.visit_symbol_reference(overridden);
            }
            walk_optional_expr(visitor, store, function.body);
        }
        DeclKind::Constructor(constructor) => {
            walk_decls(visitor, store, &constructor.value_parameters);
            visitor.visit_type(store, &constructor.return_type);
            walk_optional_expr(visitor, store, constructor.delegated_call);
            walk_optional_expr(visitor, store, constructor.body);
        }
        DeclKind::Property(property) => {
            walk_decls(visitor, store, &property.type_parameters);
            visitor.visit_type(store, &property.return_type);
            walk_optional_type(visitor, store, property.dispatch_receiver_type.as_ref());
            walk_optional_type(visitor, store, property.extension_receiver_type.as_ref());
            walk_optional_expr(visitor, store, property.initializer);
            walk_optional_expr(visitor, store, property.delegate);
            if let Some(getter) = property.getter {
                visitor.visit_decl(store, getter);
            }
            if let Some(setter) = property.setter {
                visitor.visit_decl(store, setter);
            }
        }
        DeclKind::PropertyAccessor(accessor) => {
            visitor.visit_symbol_reference(accessor.property);
            walk_decls(visitor, store, &accessor.value_parameters);
            visitor.visit_type(store, &accessor.return_type);
            walk_optional_expr(visitor, store, accessor.body);
        }
        DeclKind::AnonymousInitializer(initializer) => visitor.visit_expr(store, initializer.body),
        DeclKind::TypeParameter(parameter) => {
            for bound in &parameter.bounds {
                visitor.visit_type(store, bound);
            }
        }
        DeclKind::ValueParameter(parameter) => {
            visitor.visit_type(store, &parameter.ty);
            walk_optional_expr(visitor, store, parameter.default_value);
            if let Some(property) = parameter.corresponding_property {
                visitor.visit_symbol_reference(property);
            }
        }
        DeclKind::TypeAlias(alias) => {
            walk_decls(visitor, store, &alias.type_parameters);
            visitor.visit_type(store, &alias.expanded);
        }
    }
}

#[allow(clippy::too_many_lines, reason = "Walks every expression variant")]
/// Visit the type, annotations and operands of an expression
pub fn walk_expr<V: AstVisitor + ?Sized>(visitor: &mut V, store: &AstStore, id: ExprId) {
    let expr = &store[id];
    visitor.visit_type(store, &expr.ty);
    for &annotation in &expr.annotations {
        visitor.visit_expr(store, annotation);
    }

    match &expr.kind {
        ExprKind::Const { .. }
        | ExprKind::Unit
        | ExprKind::Error { .. }
        | ExprKind::This { .. }
        // The original receiver is owned by the enclosing safe call
        | ExprKind::CheckedSafeCallSubject { .. } => {}
        ExprKind::Block { statements } => {
            for statement in statements {
                match *statement {
                    Statement::Declaration(decl) => visitor.visit_decl(store, decl),
                    Statement::Expression(expr) => visitor.visit_expr(store, expr),
                }
            }
        }
        ExprKind::QualifiedAccess(access) | ExprKind::CallableReference(access) => {
            walk_access(visitor, store, access);
        }
        ExprKind::Call { access, arguments } => {
            walk_access(visitor, store, access);
            for argument in arguments.iter().flatten() {
                visitor.visit_expr(store, *argument);
            }
        }
        ExprKind::DelegatedConstructorCall {
            callee, arguments, ..
        } => {
            visitor.visit_symbol_reference(*callee);
            for argument in arguments.iter().flatten() {
                visitor.visit_expr(store, *argument);
            }
        }
        ExprKind::Assignment { access, value } => {
            walk_access(visitor, store, access);
            visitor.visit_expr(store, *value);
        }
        ExprKind::Intrinsic { arguments, .. } => walk_exprs(visitor, store, arguments),
        ExprKind::StringConcat { parts } => walk_exprs(visitor, store, parts),
        ExprKind::Vararg { elements } => walk_exprs(visitor, store, elements),
        ExprKind::Elvis { left, right } => {
            visitor.visit_expr(store, *left);
            visitor.visit_expr(store, *right);
        }
        ExprKind::TypeOperation {
            argument, operand, ..
        } => {
            visitor.visit_expr(store, *argument);
            visitor.visit_type(store, operand);
        }
        ExprKind::When {
            when_ref,
            subject,
            subject_variable,
            branches,
        } => {
            if let Some(when_ref) = when_ref {
                visitor.visit_when_ref(*when_ref);
            }
            walk_optional_expr(visitor, store, *subject);
            if let Some(variable) = subject_variable {
                visitor.visit_decl(store, *variable);
            }
            for branch in branches {
                walk_optional_expr(visitor, store, branch.condition);
                visitor.visit_expr(store, branch.result);
            }
        }
        ExprKind::WhenSubject { when_ref } => visitor.visit_when_ref(*when_ref),
        ExprKind::While {
            target,
            condition,
            body,
        }
        | ExprKind::DoWhile {
            target,
            condition,
            body,
        } => {
            visitor.visit_loop_target(*target);
            visitor.visit_expr(store, *condition);
            visitor.visit_expr(store, *body);
        }
        ExprKind::Break { target } | ExprKind::Continue { target } => {
            visitor.visit_loop_target(*target);
        }
        ExprKind::Return { target, value } => {
            visitor.visit_function_target(*target);
            visitor.visit_expr(store, *value);
        }
        ExprKind::Throw { exception } => visitor.visit_expr(store, *exception),
        ExprKind::Try {
            body,
            catches,
            finally,
        } => {
            visitor.visit_expr(store, *body);
            for catch in catches {
                visitor.visit_decl(store, catch.parameter);
                visitor.visit_expr(store, catch.body);
            }
            walk_optional_expr(visitor, store, *finally);
        }
        ExprKind::Super { super_type } => walk_optional_type(visitor, store, super_type.as_ref()),
        ExprKind::ClassReference { classifier } => visitor.visit_symbol_reference(*classifier),
        ExprKind::Lambda { function } => visitor.visit_decl(store, *function),
        ExprKind::AnonymousObject { class } => visitor.visit_decl(store, *class),
        ExprKind::SafeCall {
            receiver,
            subject,
            selector,
        } => {
            visitor.visit_expr(store, *receiver);
            visitor.visit_expr(store, *subject);
            visitor.visit_expr(store, *selector);
        }
        ExprKind::Spread { expression } => visitor.visit_expr(store, *expression),
        ExprKind::DelegateFieldAccess { property, receiver } => {
            visitor.visit_symbol_reference(*property);
            walk_optional_expr(visitor, store, *receiver);
        }
    }
}

/// Visit the classifier, arguments and annotations of a type
pub fn walk_type<V: AstVisitor + ?Sized>(visitor: &mut V, store: &AstStore, ty: &AstType) {
    visitor.visit_symbol_reference(ty.classifier);
    for argument in &ty.arguments {
        if let TypeProjection::Projection { ty, .. } = argument {
            visitor.visit_type(store, ty);
        }
    }
    walk_exprs(visitor, store, &ty.annotations);
}

fn walk_access<V: AstVisitor + ?Sized>(visitor: &mut V, store: &AstStore, access: &Access) {
    visitor.visit_symbol_reference(access.callee);
    walk_optional_expr(visitor, store, access.dispatch_receiver);
    walk_optional_expr(visitor, store, access.extension_receiver);
    for argument in &access.type_arguments {
        visitor.visit_type(store, argument);
    }
}

fn walk_decls<V: AstVisitor + ?Sized>(visitor: &mut V, store: &AstStore, decls: &[DeclId]) {
    for &decl in decls {
        visitor.visit_decl(store, decl);
    }
}

fn walk_exprs<V: AstVisitor + ?Sized>(visitor: &mut V, store: &AstStore, exprs: &[ExprId]) {
    for &expr in exprs {
        visitor.visit_expr(store, expr);
    }
}

fn walk_optional_expr<V: AstVisitor + ?Sized>(
    visitor: &mut V,
    store: &AstStore,
    expr: Option<ExprId>,
) {
    if let Some(expr) = expr {
        visitor.visit_expr(store, expr);
    }
}

fn walk_optional_type<V: AstVisitor + ?Sized>(
    visitor: &mut V,
    store: &AstStore,
    ty: Option<&AstType>,
) {
    if let Some(ty) = ty {
        visitor.visit_type(store, ty);
    }
}

/// Everything a subtree points at
#[derive(Debug, Default)]
pub struct ReferenceCollector {
    /// Referenced symbols
    pub symbols: FxHashSet<SymbolId>,
    /// Targets of `return`
    pub function_targets: FxHashSet<FunctionTargetId>,
    /// Targets of `break` and `continue`
    pub loop_targets: FxHashSet<LoopTargetId>,
    /// Subject references
    pub when_refs: FxHashSet<WhenRefId>,
}

impl AstVisitor for ReferenceCollector {
    fn visit_symbol_reference(&mut self, symbol: SymbolId) {
        self.symbols.insert(symbol);
    }

    fn visit_function_target(&mut self, target: FunctionTargetId) {
        self.function_targets.insert(target);
    }

    fn visit_loop_target(&mut self, target: LoopTargetId) {
        self.loop_targets.insert(target);
    }

    fn visit_when_ref(&mut self, when_ref: WhenRefId) {
        self.when_refs.insert(when_ref);
    }
}

/// Collect references reachable from `roots`
pub fn collect_references(store: &AstStore, roots: &[DeclId]) -> ReferenceCollector {
    let mut collector = ReferenceCollector::default();
    walk_decls(&mut collector, store, roots);
    collector
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{Expr, IntrinsicOp};
    use crate::symbol::{Symbol, SymbolIdentity, SymbolKind};
    use la_arena::Arena;
    use tl_intern::Interner;

    #[test]
    fn test_collects_type_and_access_symbols() {
        let interner = Interner::new();
        let mut symbols = Arena::new();
        let boolean = symbols.alloc(Symbol::new(
            SymbolKind::Class,
            SymbolIdentity::local(interner.intern("Boolean")),
        ));
        let flag = symbols.alloc(Symbol::new(
            SymbolKind::Property,
            SymbolIdentity::local(interner.intern("flag")),
        ));

        let mut store = AstStore::new();
        let ty = AstType::simple(boolean);
        let read = store.alloc_expr(Expr::new(
            ty.clone(),
            ExprKind::QualifiedAccess(Access::plain(flag)),
        ));
        let not = store.alloc_expr(Expr::new(
            ty,
            ExprKind::Intrinsic {
                op: IntrinsicOp::Not,
                arguments: vec![read],
            },
        ));

        let mut collector = ReferenceCollector::default();
        collector.visit_expr(&store, not);

        assert!(collector.symbols.contains(&boolean));
        assert!(collector.symbols.contains(&flag));
        assert_eq!(collector.symbols.len(), 2);
    }
}
