//! AST expressions and statements

use crate::decl::DelegatedCallKind;
use crate::types::AstType;
use crate::{DeclId, ExprId, FunctionTargetId, LoopTargetId, SymbolId, WhenRefId};
use tl_intern::Name;

/// An expression with its structural type
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    /// Type of the value the expression produces
    pub ty: AstType,
    /// Annotation constructor calls from an annotated expression
    pub annotations: Vec<ExprId>,
    /// What the expression is
    pub kind: ExprKind,
}

impl Expr {
    /// Unannotated expression
    pub fn new(ty: AstType, kind: ExprKind) -> Self {
        Self {
            ty,
            annotations: Vec::new(),
            kind,
        }
    }
}

/// One entry of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Statement {
    /// Local declaration
    Declaration(DeclId),
    /// Expression evaluated for its effect or, last in a block, its value
    Expression(ExprId),
}

/// Reference to a callable or variable with its receivers
#[derive(Debug, Clone, PartialEq)]
pub struct Access {
    /// Referenced declaration
    pub callee: SymbolId,
    /// `this` of a member
    pub dispatch_receiver: Option<ExprId>,
    /// Receiver of an extension
    pub extension_receiver: Option<ExprId>,
    /// Inferred type arguments, in type parameter order
    pub type_arguments: Vec<AstType>,
}

impl Access {
    /// Access without receivers or type arguments
    pub fn plain(callee: SymbolId) -> Self {
        Self {
            callee,
            dispatch_receiver: None,
            extension_receiver: None,
            type_arguments: Vec::new(),
        }
    }

    /// Same access through `receiver`
    #[must_use]
    pub fn with_dispatch_receiver(mut self, receiver: ExprId) -> Self {
        self.dispatch_receiver = Some(receiver);
        self
    }
}

/// Literal kinds; unsigned literals are folded onto the signed kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstKind {
    /// `String`
    String,
    /// `Int`, also `UInt`
    Int,
    /// `Long`, also `ULong`
    Long,
    /// `Short`, also `UShort`
    Short,
    /// `Byte`, also `UByte`
    Byte,
    /// `Boolean`
    Boolean,
    /// `Float`
    Float,
    /// `Double`
    Double,
    /// `Char`
    Char,
    /// `null`
    Null,
}

/// Raw literal value
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    /// String contents
    Str(String),
    /// Any integral kind, holding the raw bits sign-extended
    Integer(i64),
    /// `Float` or `Double`
    Float(f64),
    /// Boolean value
    Bool(bool),
    /// Character value
    Char(char),
    /// `null`
    Null,
}

/// Operators with fixed semantics that are not user-overloadable calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntrinsicOp {
    /// `==`
    Equals,
    /// `!=`
    NotEquals,
    /// `===`
    IdentityEquals,
    /// `!==`
    IdentityNotEquals,
    /// `<`
    Less,
    /// `<=`
    LessOrEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterOrEqual,
    /// `&&`, right operand evaluated only when the left is true
    LazyAnd,
    /// `||`, right operand evaluated only when the left is false
    LazyOr,
    /// `!`
    Not,
    /// `!!`
    CheckNotNull,
}

impl IntrinsicOp {
    /// Source spelling of the operator
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Equals => "==",
            Self::NotEquals => "!=",
            Self::IdentityEquals => "===",
            Self::IdentityNotEquals => "!==",
            Self::Less => "<",
            Self::LessOrEqual => "<=",
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
            Self::LazyAnd => "&&",
            Self::LazyOr => "||",
            Self::Not => "!",
            Self::CheckNotNull => "!!",
        }
    }
}

/// Casts and type checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeOperator {
    /// `as`
    As,
    /// `as?`
    SafeAs,
    /// `is`
    Is,
    /// `!is`
    NotIs,
}

impl TypeOperator {
    /// Source spelling of the operator
    pub fn keyword(self) -> &'static str {
        match self {
            Self::As => "as",
            Self::SafeAs => "as?",
            Self::Is => "is",
            Self::NotIs => "!is",
        }
    }
}

/// Tag carried by error expressions produced for malformed input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// The parser produced an error node
    Syntax,
    /// A required sub-expression is missing
    ExpressionRequired,
    /// Assignment to something that is not a variable
    VariableExpected,
    /// `super` outside of a receiver position
    SuperNotAllowed,
}

/// A `when` branch, `condition` is `None` for `else`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WhenBranch {
    /// Guard of the branch
    pub condition: Option<ExprId>,
    /// Value of the branch
    pub result: ExprId,
}

/// One `catch` clause of a `try`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Catch {
    /// Catch parameter declaration
    pub parameter: DeclId,
    /// Handler body
    pub body: ExprId,
}

/// Expression forms of the canonical vocabulary
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Literal
    Const {
        /// Literal type
        kind: ConstKind,
        /// Literal value
        value: ConstValue,
    },
    /// Statements evaluated in order, valued by the last one
    Block {
        /// Block contents
        statements: Vec<Statement>,
    },
    /// Read of a variable, property or object
    QualifiedAccess(Access),
    /// Function or constructor call
    Call {
        /// Callee and receivers
        access: Access,
        /// One slot per value parameter, `None` where the default applies
        arguments: Vec<Option<ExprId>>,
    },
    /// `this(..)` or `super(..)` at the start of a constructor
    DelegatedConstructorCall {
        /// Called constructor
        callee: SymbolId,
        /// Which of the two forms
        kind: DelegatedCallKind,
        /// One slot per value parameter
        arguments: Vec<Option<ExprId>>,
    },
    /// Store into a variable or property
    Assignment {
        /// Assigned variable and its receivers
        access: Access,
        /// Stored value
        value: ExprId,
    },
    /// Built-in operator
    Intrinsic {
        /// Operator
        op: IntrinsicOp,
        /// Operands in source order
        arguments: Vec<ExprId>,
    },
    /// Concatenation of string parts
    StringConcat {
        /// Parts, each already a `String`
        parts: Vec<ExprId>,
    },
    /// `left ?: right`
    Elvis {
        /// Value used when not null
        left: ExprId,
        /// Fallback
        right: ExprId,
    },
    /// Cast or type check
    TypeOperation {
        /// Operator
        op: TypeOperator,
        /// Checked or cast value
        argument: ExprId,
        /// Target type
        operand: AstType,
    },
    /// `when` and `if` chains
    When {
        /// Set when branches refer to the subject
        when_ref: Option<WhenRefId>,
        /// Value the branches compare against
        subject: Option<ExprId>,
        /// `when (val x = ..)`
        subject_variable: Option<DeclId>,
        /// Branches in source order
        branches: Vec<WhenBranch>,
    },
    /// Placeholder for the subject of the referenced `when`
    WhenSubject {
        /// The `when` whose subject is read
        when_ref: WhenRefId,
    },
    /// `while` loop
    While {
        /// Target of jumps out of this loop
        target: LoopTargetId,
        /// Checked before each iteration
        condition: ExprId,
        /// Loop body
        body: ExprId,
    },
    /// `do .. while` loop
    DoWhile {
        /// Target of jumps out of this loop
        target: LoopTargetId,
        /// Checked after each iteration
        condition: ExprId,
        /// Loop body
        body: ExprId,
    },
    /// `break`
    Break {
        /// Loop left
        target: LoopTargetId,
    },
    /// `continue`
    Continue {
        /// Loop continued
        target: LoopTargetId,
    },
    /// `return`
    Return {
        /// Function returned from
        target: FunctionTargetId,
        /// Returned value, `Unit` when none is written
        value: ExprId,
    },
    /// `throw`
    Throw {
        /// Thrown value
        exception: ExprId,
    },
    /// `try`/`catch`/`finally`
    Try {
        /// Protected body
        body: ExprId,
        /// Handlers in source order
        catches: Vec<Catch>,
        /// Always-run block
        finally: Option<ExprId>,
    },
    /// `this` or `this@label`
    This {
        /// Label naming the receiver
        label: Option<Name>,
    },
    /// `super` as a receiver
    Super {
        /// Supertype the call goes to
        super_type: Option<AstType>,
    },
    /// `T::class`
    ClassReference {
        /// Referenced class
        classifier: SymbolId,
    },
    /// `::f` or `receiver::f`
    CallableReference(Access),
    /// Lambda literal
    Lambda {
        /// The lambda's function declaration
        function: DeclId,
    },
    /// `object : T { .. }` in expression position
    AnonymousObject {
        /// The anonymous class declaration
        class: DeclId,
    },
    /// `receiver?.selector`; `selector` reads the receiver through `subject`
    SafeCall {
        /// Possibly null receiver, evaluated once
        receiver: ExprId,
        /// A [`ExprKind::CheckedSafeCallSubject`] of the receiver
        subject: ExprId,
        /// Member access run when the receiver is not null
        selector: ExprId,
    },
    /// The non-null receiver inside a safe call
    CheckedSafeCallSubject {
        /// Receiver before the null check
        original_receiver: ExprId,
    },
    /// Arguments collected into a `vararg` parameter
    Vararg {
        /// Elements, spreads included
        elements: Vec<ExprId>,
    },
    /// `*array` inside a vararg
    Spread {
        /// Spread array
        expression: ExprId,
    },
    /// Backing delegate of a `by` property
    DelegateFieldAccess {
        /// Delegated property
        property: SymbolId,
        /// Instance holding the delegate, for members
        receiver: Option<ExprId>,
    },
    /// The `Unit` value
    Unit,
    /// Stand-in for a construct that could not be translated
    Error {
        /// What went wrong
        kind: DiagnosticKind,
        /// Human-readable explanation
        message: String,
    },
}
