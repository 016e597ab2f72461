//! Arena storage for declarations, expressions and jump targets

use crate::decl::Declaration;
use crate::error::AstError;
use crate::expr::Expr;
use crate::target::{FunctionTarget, LoopTarget, WhenRef};
use crate::{DeclId, ExprId, FunctionTargetId, LoopTargetId, WhenRefId};
use la_arena::Arena;
use std::ops::Index;

/// Owns every node of a module fragment
#[derive(Debug, Clone, Default)]
pub struct AstStore {
    /// Declaration nodes
    pub decls: Arena<Declaration>,
    /// Expression nodes
    pub exprs: Arena<Expr>,
    /// `return` anchors
    pub function_targets: Arena<FunctionTarget>,
    /// `break` and `continue` anchors
    pub loop_targets: Arena<LoopTarget>,
    /// `when` subject references
    pub when_refs: Arena<WhenRef>,
}

impl AstStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a declaration
    pub fn alloc_decl(&mut self, decl: Declaration) -> DeclId {
        self.decls.alloc(decl)
    }

    /// Store an expression
    pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        self.exprs.alloc(expr)
    }

    /// Declaration behind `id`
    pub fn decl(&self, id: DeclId) -> &Declaration {
        &self.decls[id]
    }

    /// Expression behind `id`
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id]
    }

    /// Mutable expression behind `id`
    pub fn expr_mut(&mut self, id: ExprId) -> &mut Expr {
        &mut self.exprs[id]
    }

    /// Allocate an unbound function target
    pub fn new_function_target(&mut self, target: FunctionTarget) -> FunctionTargetId {
        self.function_targets.alloc(target)
    }

    /// Allocate an unbound loop target
    pub fn new_loop_target(&mut self, target: LoopTarget) -> LoopTargetId {
        self.loop_targets.alloc(target)
    }

    /// Allocate an unbound `when` reference
    pub fn new_when_ref(&mut self) -> WhenRefId {
        self.when_refs.alloc(WhenRef::default())
    }

    /// Function target behind `id`
    pub fn function_target(&self, id: FunctionTargetId) -> &FunctionTarget {
        &self.function_targets[id]
    }

    /// Loop target behind `id`
    pub fn loop_target(&self, id: LoopTargetId) -> &LoopTarget {
        &self.loop_targets[id]
    }

    /// `when` reference behind `id`
    pub fn when_ref(&self, id: WhenRefId) -> &WhenRef {
        &self.when_refs[id]
    }

    /// Bind a function target to the function that declares it
    ///
    /// # Errors
    ///
    /// Fails if the target already has an owner
    pub fn bind_function_target(
        &mut self,
        id: FunctionTargetId,
        owner: DeclId,
    ) -> Result<(), AstError> {
        self.function_targets[id].bind(owner)
    }

    /// Bind a loop target to its loop expression
    ///
    /// # Errors
    ///
    /// Fails if the target already has an owner
    pub fn bind_loop_target(&mut self, id: LoopTargetId, owner: ExprId) -> Result<(), AstError> {
        self.loop_targets[id].bind(owner)
    }

    /// Bind a subject reference to its `when` expression
    ///
    /// # Errors
    ///
    /// Fails if the reference already has an owner
    pub fn bind_when_ref(&mut self, id: WhenRefId, owner: ExprId) -> Result<(), AstError> {
        self.when_refs[id].bind(owner)
    }
}

impl Index<DeclId> for AstStore {
    type Output = Declaration;

    fn index(&self, index: DeclId) -> &Self::Output {
        &self.decls[index]
    }
}

impl Index<ExprId> for AstStore {
    type Output = Expr;

    fn index(&self, index: ExprId) -> &Self::Output {
        &self.exprs[index]
    }
}
