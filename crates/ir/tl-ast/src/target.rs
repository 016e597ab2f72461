//! Jump targets bound to their node once it has been built

use crate::error::AstError;
use crate::{DeclId, ExprId};
use tl_intern::Name;

/// Anchor for `return`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionTarget {
    /// Explicit or implicit label
    pub label: Option<Name>,
    /// Lambdas are skipped by unlabeled `return`
    pub is_lambda: bool,
    owner: Option<DeclId>,
}

impl FunctionTarget {
    /// Unbound target
    pub fn new(label: Option<Name>, is_lambda: bool) -> Self {
        Self {
            label,
            is_lambda,
            owner: None,
        }
    }

    /// Function that declares the target
    pub fn owner(&self) -> Option<DeclId> {
        self.owner
    }

    pub(crate) fn bind(&mut self, owner: DeclId) -> Result<(), AstError> {
        match self.owner {
            Some(existing) => Err(AstError::FunctionTargetAlreadyBound { existing }),
            None => {
                self.owner = Some(owner);
                Ok(())
            }
        }
    }
}

/// Anchor for `break` and `continue`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopTarget {
    /// Label of a labeled loop
    pub label: Option<Name>,
    owner: Option<ExprId>,
}

impl LoopTarget {
    /// Unbound target
    pub fn new(label: Option<Name>) -> Self {
        Self { label, owner: None }
    }

    /// The loop expression
    pub fn owner(&self) -> Option<ExprId> {
        self.owner
    }

    pub(crate) fn bind(&mut self, owner: ExprId) -> Result<(), AstError> {
        bind_expr(&mut self.owner, owner)
    }
}

/// Lazily bound reference from a subject placeholder to its `when`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WhenRef {
    owner: Option<ExprId>,
}

impl WhenRef {
    /// The `when` expression
    pub fn owner(&self) -> Option<ExprId> {
        self.owner
    }

    pub(crate) fn bind(&mut self, owner: ExprId) -> Result<(), AstError> {
        bind_expr(&mut self.owner, owner)
    }
}

fn bind_expr(slot: &mut Option<ExprId>, owner: ExprId) -> Result<(), AstError> {
    match *slot {
        Some(existing) => Err(AstError::ExprTargetAlreadyBound { existing }),
        None => {
            *slot = Some(owner);
            Ok(())
        }
    }
}
