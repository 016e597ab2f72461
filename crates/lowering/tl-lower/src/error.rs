//! Lowering error types.

use tl_ast::AstError;
use tl_syntax::FileSpan;
use thiserror::Error;

/// Result type for lowering operations.
pub type LowerResult<T> = Result<T, LowerError>;

/// Fatal errors that abort a lowering session.
///
/// Malformed source is not fatal: it becomes an error expression in the
/// produced tree. These variants signal inconsistent input from semantic
/// analysis or a broken invariant of the engine itself.
#[derive(Debug, Clone, Error)]
pub enum LowerError {
    /// A type's classifier is neither a class nor a type parameter.
    #[error("unexpected classifier `{name}` ({kind})")]
    UnexpectedClassifier {
        /// Classifier name
        name: String,
        /// Descriptor kind found instead
        kind: &'static str,
    },

    /// Semantic analysis left an error type where a real type is needed.
    #[error("cannot convert error type: {message}")]
    ErrorType {
        /// Message carried by the error type
        message: String,
    },

    /// No enclosing function or loop carries the label.
    #[error("unresolved label `@{label}`")]
    UnresolvedLabel {
        /// The label as written
        label: String,
        /// Location of the jump
        span: FileSpan,
    },

    /// A jump with no enclosing function or loop.
    #[error("`{keyword}` outside of a {expected}")]
    MissingTarget {
        /// `return`, `break` or `continue`
        keyword: &'static str,
        /// What should have enclosed it
        expected: &'static str,
        /// Location of the jump
        span: FileSpan,
    },

    /// A node appeared where the builder cannot translate it.
    #[error("unexpected {found} where {expected} was expected")]
    UnexpectedNode {
        /// Kind of node found
        found: &'static str,
        /// What the position requires
        expected: &'static str,
        /// Location of the node
        span: FileSpan,
    },

    /// A fact the builder relies on was not recorded by semantic analysis.
    #[error("missing {what} for {node}")]
    MissingSemanticInfo {
        /// The missing fact
        what: &'static str,
        /// Kind of node it was looked up for
        node: &'static str,
        /// Location of the node
        span: FileSpan,
    },

    /// Symbols were still unbound after stub generation reached its fixed point.
    #[error("{} symbols left without a declaration: {}", names.len(), names.join(", "))]
    UnboundSymbols {
        /// Names of the unbound symbols
        names: Vec<String>,
    },

    /// A symbol was bound twice.
    #[error(transparent)]
    SymbolAlreadyBound(#[from] AstError),

    /// A descriptor of the wrong kind was used to declare something.
    #[error("unexpected {found} descriptor for `{name}`, expected {expected}")]
    UnexpectedDeclaration {
        /// Declared name
        name: String,
        /// Kind found
        found: &'static str,
        /// Kind required
        expected: &'static str,
    },

    /// An annotation class with neither a primary nor a sole constructor.
    #[error("annotation class `{name}` has no usable constructor")]
    NoAnnotationConstructor {
        /// Annotation class name
        name: String,
    },
}
