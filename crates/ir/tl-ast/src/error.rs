//! Errors raised while assembling the AST

use crate::{DeclId, ExprId};
use tl_intern::Name;

/// Violations of the AST's binding rules
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AstError {
    /// A symbol's owner is set once and never replaced
    #[error("symbol {name:?} is already bound to {existing:?}, cannot rebind to {attempted:?}")]
    SymbolAlreadyBound {
        /// Symbol name
        name: Name,
        /// Current owner
        existing: DeclId,
        /// Rejected owner
        attempted: DeclId,
    },

    /// A function target belongs to exactly one function
    #[error("function target is already bound to {existing:?}")]
    FunctionTargetAlreadyBound {
        /// Current owner
        existing: DeclId,
    },

    /// A loop target or when reference belongs to exactly one expression
    #[error("expression target is already bound to {existing:?}")]
    ExprTargetAlreadyBound {
        /// Current owner
        existing: ExprId,
    },
}
