//! Semantic types as produced by the type checker

use crate::constant::AnnotationDescriptor;
use crate::descriptor::DescId;
use la_arena::Idx;
use tl_syntax::Variance;

/// Semantic type ID
pub type SemTypeId = Idx<SemType>;

/// A type in the host type system
#[derive(Debug, Clone, PartialEq)]
pub enum SemType {
    /// Classifier applied to arguments
    Simple(SimpleType),
    /// Platform type with unknown nullability, bounded by two simple types
    Flexible {
        /// Non-null bound
        lower: SemTypeId,
        /// Nullable bound
        upper: SemTypeId,
    },
    /// Type that failed to resolve
    Error {
        /// Why resolution failed
        message: String,
    },
}

/// Classifier with arguments, nullability and type annotations
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleType {
    /// Class, type parameter or anything else the checker produced
    pub classifier: DescId,
    /// Type arguments in declaration order
    pub arguments: Vec<SemTypeArgument>,
    /// Marked with `?`
    pub nullable: bool,
    /// Type annotations
    pub annotations: Vec<AnnotationDescriptor>,
}

impl SimpleType {
    /// Non-null type without arguments or annotations
    pub fn plain(classifier: DescId) -> Self {
        Self {
            classifier,
            arguments: Vec::new(),
            nullable: false,
            annotations: Vec::new(),
        }
    }
}

/// One type argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemTypeArgument {
    /// `*`
    Star,
    /// Argument with use-site variance
    Projection {
        /// Use-site variance
        variance: Variance,
        /// Argument type
        ty: SemTypeId,
    },
}
