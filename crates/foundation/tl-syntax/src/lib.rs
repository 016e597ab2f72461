//! Concrete syntax tree consumed by the lowering engine
//!
//! The tree is an arena of tagged nodes. Every construct the lowering engine
//! understands is one [`NodeKind`] variant, so dispatch over the tree is a
//! single exhaustive match. Semantic facts about a node (its type, the call it
//! resolves to, the declaration it introduces) are not stored here; they are
//! keyed by [`NodeId`] in the semantic model.

pub mod modifiers;
pub mod span;

use la_arena::{Arena, Idx};
use std::ops::Index;
use tl_intern::Name;

pub use modifiers::{ClassKind, Modality, Variance, Visibility};
pub use span::{FileId, FileSpan, Span};

/// Syntax node ID
pub type NodeId = Idx<SyntaxNode>;

/// A node in the concrete syntax tree
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxNode {
    /// What this node is
    pub kind: NodeKind,
    /// Where it came from
    pub span: FileSpan,
}

/// Every syntax form understood by the lowering engine
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Class, interface, object or enum class declaration
    Class {
        /// Declared name, `None` for object literal bodies
        name: Option<Name>,
        /// Type parameter nodes
        type_parameters: Vec<NodeId>,
        /// Primary constructor node if written out
        primary_constructor: Option<NodeId>,
        /// Superclass constructor call from the supertype list
        super_call: Option<NodeId>,
        /// Member declarations
        declarations: Vec<NodeId>,
        /// Annotation entry nodes
        annotations: Vec<NodeId>,
    },
    /// Entry of an enum class
    EnumEntry {
        /// Entry name
        name: Name,
        /// Body declarations
        declarations: Vec<NodeId>,
        /// Annotation entry nodes
        annotations: Vec<NodeId>,
    },
    /// Named function, or anonymous function when `name` is `None`
    Function {
        /// Function name
        name: Option<Name>,
        /// Type parameter nodes
        type_parameters: Vec<NodeId>,
        /// Value parameter nodes
        parameters: Vec<NodeId>,
        /// Block body or expression body
        body: Option<NodeId>,
        /// Annotation entry nodes
        annotations: Vec<NodeId>,
    },
    /// Primary constructor in a class header
    PrimaryConstructor {
        /// Value parameter nodes
        parameters: Vec<NodeId>,
        /// Annotation entry nodes
        annotations: Vec<NodeId>,
    },
    /// Secondary constructor in a class body
    SecondaryConstructor {
        /// Value parameter nodes
        parameters: Vec<NodeId>,
        /// `this(..)` or `super(..)` delegation
        delegation_call: Option<NodeId>,
        /// Constructor body
        body: Option<NodeId>,
        /// Annotation entry nodes
        annotations: Vec<NodeId>,
    },
    /// Constructor delegation or superclass constructor call
    DelegationCall {
        /// Whether this delegates to `this` or `super`
        kind: DelegationKind,
        /// Argument expressions in source order
        arguments: Vec<NodeId>,
    },
    /// Property or local variable
    Property {
        /// Property name
        name: Name,
        /// `var` rather than `val`
        is_var: bool,
        /// Type parameter nodes for generic extension properties
        type_parameters: Vec<NodeId>,
        /// Initializer expression
        initializer: Option<NodeId>,
        /// Expression after `by`
        delegate: Option<NodeId>,
        /// Custom getter
        getter: Option<NodeId>,
        /// Custom setter
        setter: Option<NodeId>,
        /// Annotation entry nodes
        annotations: Vec<NodeId>,
    },
    /// Custom getter or setter
    PropertyAccessor {
        /// Setter rather than getter
        is_setter: bool,
        /// Value parameter nodes (the setter value)
        parameters: Vec<NodeId>,
        /// Accessor body
        body: Option<NodeId>,
        /// Annotation entry nodes
        annotations: Vec<NodeId>,
    },
    /// `init { .. }` block
    AnonymousInitializer {
        /// Initializer block
        body: Option<NodeId>,
        /// Annotation entry nodes
        annotations: Vec<NodeId>,
    },
    /// Type parameter declaration
    TypeParameter {
        /// Parameter name
        name: Name,
        /// Annotation entry nodes
        annotations: Vec<NodeId>,
    },
    /// Value parameter of a function, constructor, lambda, catch clause or for-loop
    Parameter {
        /// Parameter name, `None` when destructured
        name: Option<Name>,
        /// Default value expression
        default_value: Option<NodeId>,
        /// Destructuring declaration replacing the name
        destructuring: Option<NodeId>,
        /// Annotation entry nodes
        annotations: Vec<NodeId>,
    },
    /// `typealias` declaration
    TypeAlias {
        /// Alias name
        name: Name,
        /// Type parameter nodes
        type_parameters: Vec<NodeId>,
        /// Annotation entry nodes
        annotations: Vec<NodeId>,
    },
    /// `val (a, b) = ..`
    Destructuring {
        /// Entry nodes, each a [`NodeKind::DestructuringEntry`]
        entries: Vec<NodeId>,
        /// Container expression, absent for loop and lambda parameters
        initializer: Option<NodeId>,
    },
    /// One name inside a destructuring declaration
    DestructuringEntry {
        /// Entry name, `None` for the `_` placeholder
        name: Option<Name>,
    },

    /// Literal constant, its value is evaluated by semantic analysis
    Constant,
    /// String template
    StringTemplate {
        /// Template entries in order
        entries: Vec<TemplateEntry>,
    },
    /// Simple name
    NameReference {
        /// Referenced name
        name: Name,
    },
    /// Call with a parenthesized or trailing-lambda argument list
    Call {
        /// Callee name node
        callee: NodeId,
        /// Argument expressions in source order
        arguments: Vec<NodeId>,
    },
    /// `a.b` or `a?.b`
    Qualified {
        /// Receiver expression
        receiver: NodeId,
        /// Selector (a name or call)
        selector: NodeId,
        /// `?.` rather than `.`
        safe: bool,
    },
    /// `a[i, j]`
    ArrayAccess {
        /// Indexed expression
        array: NodeId,
        /// Index expressions
        indices: Vec<NodeId>,
    },
    /// Prefix or postfix operator
    Unary {
        /// Operator
        op: UnaryOp,
        /// Operand
        operand: NodeId,
        /// Prefix form
        prefix: bool,
    },
    /// Binary operator including assignments
    Binary {
        /// Operator
        op: BinaryOp,
        /// Left operand
        left: NodeId,
        /// Right operand, missing in malformed input
        right: Option<NodeId>,
    },
    /// `a is T` / `a !is T`
    TypeCheck {
        /// Checked expression
        expression: NodeId,
        /// Type reference node
        type_ref: NodeId,
        /// `!is`
        negated: bool,
    },
    /// `a as T` / `a as? T`
    Cast {
        /// Cast expression
        expression: NodeId,
        /// Type reference node
        type_ref: NodeId,
        /// `as?`
        safe: bool,
    },
    /// `if` expression
    If {
        /// Condition, missing in malformed input
        condition: Option<NodeId>,
        /// Then branch
        then_branch: Option<NodeId>,
        /// Else branch
        else_branch: Option<NodeId>,
    },
    /// `when` expression
    When {
        /// Subject in parentheses
        subject: Option<WhenSubject>,
        /// Branches in order
        entries: Vec<WhenEntry>,
    },
    /// `while` loop
    While {
        /// Loop condition
        condition: Option<NodeId>,
        /// Loop body
        body: Option<NodeId>,
    },
    /// `do .. while` loop
    DoWhile {
        /// Loop body
        body: Option<NodeId>,
        /// Loop condition
        condition: Option<NodeId>,
    },
    /// `for (x in range)` loop
    For {
        /// Loop parameter, possibly destructured
        parameter: NodeId,
        /// Iterated expression
        range: NodeId,
        /// Loop body
        body: Option<NodeId>,
    },
    /// `break` with optional label
    Break {
        /// Label name
        label: Option<Name>,
    },
    /// `continue` with optional label
    Continue {
        /// Label name
        label: Option<Name>,
    },
    /// `return` with optional label
    Return {
        /// Label name
        label: Option<Name>,
        /// Returned value
        value: Option<NodeId>,
    },
    /// `label@ expr`
    Labeled {
        /// Label name
        label: Name,
        /// Labeled expression
        body: NodeId,
    },
    /// `{ a, b -> .. }`
    Lambda {
        /// Parameter nodes
        parameters: Vec<NodeId>,
        /// Body block
        body: NodeId,
    },
    /// `{ .. }` statement list
    Block {
        /// Statements and local declarations
        statements: Vec<NodeId>,
    },
    /// `( .. )`
    Parenthesized {
        /// Inner expression
        inner: NodeId,
    },
    /// `this` or `this@label`
    This {
        /// Label name
        label: Option<Name>,
    },
    /// `super` or `super<T>`
    Super {
        /// Type qualifier node
        super_type: Option<NodeId>,
    },
    /// `throw e`
    Throw {
        /// Thrown expression
        exception: Option<NodeId>,
    },
    /// `try` with catches and finally
    Try {
        /// Try block
        body: NodeId,
        /// Catch clauses
        catches: Vec<CatchClause>,
        /// Finally block
        finally: Option<NodeId>,
    },
    /// `object : T { .. }`
    ObjectLiteral {
        /// The anonymous class declaration node
        declaration: NodeId,
    },
    /// `T::class`
    ClassLiteral {
        /// Left-hand side expression or type
        receiver: NodeId,
    },
    /// `a::b` or `::b`
    CallableReference {
        /// Left-hand side
        receiver: Option<NodeId>,
        /// Referenced name node
        callee: NodeId,
    },
    /// `@A expr`
    Annotated {
        /// Annotation entry nodes
        annotations: Vec<NodeId>,
        /// Annotated expression
        base: NodeId,
    },
    /// `@A(..)`, the instance is resolved by semantic analysis
    AnnotationEntry,
    /// Written type, resolved by semantic analysis
    TypeReference,
    /// Unparseable input
    Error {
        /// Parser message
        message: String,
    },
}

/// Kind of constructor delegation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DelegationKind {
    /// `this(..)`
    This,
    /// `super(..)`
    Super,
}

/// One piece of a string template
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateEntry {
    /// Literal text
    Literal(String),
    /// Escape sequence with its unescaped value
    Escape(String),
    /// `$name` or `${expr}`
    Expression(NodeId),
}

/// Subject of a `when` expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhenSubject {
    /// `when (expr)`
    Expression(NodeId),
    /// `when (val x = expr)`, the node is a [`NodeKind::Property`]
    Variable(NodeId),
}

/// A `when` branch
#[derive(Debug, Clone, PartialEq)]
pub struct WhenEntry {
    /// Conditions joined by commas
    pub conditions: Vec<WhenCondition>,
    /// Branch result
    pub body: Option<NodeId>,
    /// `else ->`
    pub is_else: bool,
}

/// One condition of a `when` branch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhenCondition {
    /// Plain expression, missing in malformed input
    Expression(Option<NodeId>),
    /// `in range` / `!in range`
    InRange {
        /// Range expression
        range: NodeId,
        /// `!in`
        negated: bool,
    },
    /// `is T` / `!is T`
    IsPattern {
        /// Type reference node
        type_ref: NodeId,
        /// `!is`
        negated: bool,
    },
}

/// `catch (e: T) { .. }`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatchClause {
    /// Catch parameter node
    pub parameter: NodeId,
    /// Catch block
    pub body: NodeId,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `++`
    Increment,
    /// `--`
    Decrement,
    /// Unary `-`
    Minus,
    /// Unary `+`
    Plus,
    /// `!`
    Not,
    /// Postfix `!!`
    NotNull,
}

impl UnaryOp {
    /// Source spelling of the operator
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Increment => "++",
            Self::Decrement => "--",
            Self::Minus => "-",
            Self::Plus => "+",
            Self::Not => "!",
            Self::NotNull => "!!",
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `=`
    Assign,
    /// `+=`
    PlusAssign,
    /// `-=`
    MinusAssign,
    /// `*=`
    TimesAssign,
    /// `/=`
    DivAssign,
    /// `%=`
    RemAssign,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Times,
    /// `/`
    Div,
    /// `%`
    Rem,
    /// `..`
    RangeTo,
    /// `<`
    Less,
    /// `<=`
    LessOrEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterOrEqual,
    /// `==`
    Equals,
    /// `!=`
    NotEquals,
    /// `===`
    IdentityEquals,
    /// `!==`
    IdentityNotEquals,
    /// `&&`
    And,
    /// `||`
    Or,
    /// `in`
    In,
    /// `!in`
    NotIn,
    /// `?:`
    Elvis,
    /// Infix function call `a foo b`
    Infix(Name),
}

impl BinaryOp {
    /// `=` or any compound assignment
    pub fn is_assignment(self) -> bool {
        matches!(
            self,
            Self::Assign
                | Self::PlusAssign
                | Self::MinusAssign
                | Self::TimesAssign
                | Self::DivAssign
                | Self::RemAssign
        )
    }

    /// Compound assignment such as `+=`
    pub fn is_augmented_assignment(self) -> bool {
        self.is_assignment() && self != Self::Assign
    }

    /// Source spelling of the operator
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Assign => "=",
            Self::PlusAssign => "+=",
            Self::MinusAssign => "-=",
            Self::TimesAssign => "*=",
            Self::DivAssign => "/=",
            Self::RemAssign => "%=",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Times => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::RangeTo => "..",
            Self::Less => "<",
            Self::LessOrEqual => "<=",
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
            Self::Equals => "==",
            Self::NotEquals => "!=",
            Self::IdentityEquals => "===",
            Self::IdentityNotEquals => "!==",
            Self::And => "&&",
            Self::Or => "||",
            Self::In => "in",
            Self::NotIn => "!in",
            Self::Elvis => "?:",
            Self::Infix(_) => "infix",
        }
    }
}

impl NodeKind {
    /// Short human-readable name used in diagnostics
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Class { .. } => "class",
            Self::EnumEntry { .. } => "enum entry",
            Self::Function { .. } => "function",
            Self::PrimaryConstructor { .. } => "primary constructor",
            Self::SecondaryConstructor { .. } => "secondary constructor",
            Self::DelegationCall { .. } => "delegation call",
            Self::Property { .. } => "property",
            Self::PropertyAccessor { .. } => "property accessor",
            Self::AnonymousInitializer { .. } => "anonymous initializer",
            Self::TypeParameter { .. } => "type parameter",
            Self::Parameter { .. } => "parameter",
            Self::TypeAlias { .. } => "type alias",
            Self::Destructuring { .. } => "destructuring declaration",
            Self::DestructuringEntry { .. } => "destructuring entry",
            Self::Constant => "constant",
            Self::StringTemplate { .. } => "string template",
            Self::NameReference { .. } => "name reference",
            Self::Call { .. } => "call",
            Self::Qualified { .. } => "qualified expression",
            Self::ArrayAccess { .. } => "array access",
            Self::Unary { .. } => "unary expression",
            Self::Binary { .. } => "binary expression",
            Self::TypeCheck { .. } => "type check",
            Self::Cast { .. } => "cast",
            Self::If { .. } => "if",
            Self::When { .. } => "when",
            Self::While { .. } => "while",
            Self::DoWhile { .. } => "do-while",
            Self::For { .. } => "for",
            Self::Break { .. } => "break",
            Self::Continue { .. } => "continue",
            Self::Return { .. } => "return",
            Self::Labeled { .. } => "labeled expression",
            Self::Lambda { .. } => "lambda",
            Self::Block { .. } => "block",
            Self::Parenthesized { .. } => "parenthesized expression",
            Self::This { .. } => "this",
            Self::Super { .. } => "super",
            Self::Throw { .. } => "throw",
            Self::Try { .. } => "try",
            Self::ObjectLiteral { .. } => "object literal",
            Self::ClassLiteral { .. } => "class literal",
            Self::CallableReference { .. } => "callable reference",
            Self::Annotated { .. } => "annotated expression",
            Self::AnnotationEntry => "annotation entry",
            Self::TypeReference => "type reference",
            Self::Error { .. } => "error",
        }
    }
}

/// A parsed source file
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    /// File ID
    pub id: FileId,
    /// File name
    pub name: String,
    /// Package path segments
    pub package: Vec<Name>,
    /// File-level annotation entry nodes
    pub annotations: Vec<NodeId>,
    /// Top-level declaration nodes
    pub declarations: Vec<NodeId>,
}

/// All syntax nodes of a translation unit
#[derive(Debug, Default, Clone)]
pub struct SyntaxTree {
    nodes: Arena<SyntaxNode>,
    files: Vec<SourceFile>,
}

impl SyntaxTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a node
    pub fn alloc(&mut self, kind: NodeKind, span: FileSpan) -> NodeId {
        self.nodes.alloc(SyntaxNode { kind, span })
    }

    /// Register a source file
    pub fn add_file(&mut self, file: SourceFile) {
        self.files.push(file);
    }

    /// Source files in registration order
    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    /// Node kind by ID
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id].kind
    }

    /// Node span by ID
    pub fn span(&self, id: NodeId) -> FileSpan {
        self.nodes[id].span
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Strip any number of parentheses around an expression
    pub fn deparenthesize(&self, mut id: NodeId) -> NodeId {
        while let NodeKind::Parenthesized { inner } = self.kind(id) {
            id = *inner;
        }
        id
    }
}

impl Index<NodeId> for SyntaxTree {
    type Output = SyntaxNode;

    fn index(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tl_intern::Interner;

    fn make_span() -> FileSpan {
        FileSpan::new(FileId(0), Span::new(0, 1))
    }

    #[test]
    fn test_deparenthesize() {
        let interner = Interner::new();
        let mut tree = SyntaxTree::new();
        let name = tree.alloc(
            NodeKind::NameReference {
                name: interner.intern("x"),
            },
            make_span(),
        );
        let once = tree.alloc(NodeKind::Parenthesized { inner: name }, make_span());
        let twice = tree.alloc(NodeKind::Parenthesized { inner: once }, make_span());
        assert_eq!(tree.deparenthesize(twice), name);
        assert_eq!(tree.deparenthesize(name), name);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_binary_op_classification() {
        assert!(BinaryOp::Assign.is_assignment());
        assert!(!BinaryOp::Assign.is_augmented_assignment());
        assert!(BinaryOp::PlusAssign.is_augmented_assignment());
        assert!(!BinaryOp::Plus.is_assignment());
        assert_eq!(BinaryOp::NotIn.symbol(), "!in");
    }
}
