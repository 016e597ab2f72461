//! Structural types of the AST

use crate::{ExprId, SymbolId};
use tl_syntax::Variance;

/// A type as the AST sees it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AstType {
    /// Class or type parameter symbol
    pub classifier: SymbolId,
    /// Marked with `?`
    pub nullable: bool,
    /// Type arguments in parameter order
    pub arguments: Vec<TypeProjection>,
    /// Annotation constructor calls attached to the type
    pub annotations: Vec<ExprId>,
}

impl AstType {
    /// Non-null type without arguments
    pub fn simple(classifier: SymbolId) -> Self {
        Self {
            classifier,
            nullable: false,
            arguments: Vec::new(),
            annotations: Vec::new(),
        }
    }
}

/// One type argument
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeProjection {
    /// `*`
    Star,
    /// `T`, `in T` or `out T`
    Projection {
        /// Use-site variance
        variance: Variance,
        /// Argument type
        ty: AstType,
    },
}
