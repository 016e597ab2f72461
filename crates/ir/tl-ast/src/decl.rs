//! AST declarations

use crate::types::AstType;
use crate::{DeclId, ExprId, SymbolId};
use tl_intern::Name;
use tl_syntax::{ClassKind, Modality, Variance, Visibility};

/// Where a declaration came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclOrigin {
    /// Translated from syntax in the unit
    Source,
    /// Signature-only declaration for an out-of-unit reference
    Stub,
    /// Introduced by a desugaring
    Synthetic,
}

/// A declaration together with the symbol it binds
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// The symbol this declaration owns
    pub symbol: SymbolId,
    /// How the declaration came to exist
    pub origin: DeclOrigin,
    /// Annotation constructor calls
    pub annotations: Vec<ExprId>,
    /// Kind-specific data
    pub kind: DeclKind,
}

/// Kind-specific declaration data
#[derive(Debug, Clone, PartialEq)]
pub enum DeclKind {
    /// Class-like declaration
    Class(ClassDecl),
    /// Named function or lambda
    Function(FunctionDecl),
    /// Primary or secondary constructor
    Constructor(ConstructorDecl),
    /// Property or local variable
    Property(PropertyDecl),
    /// Getter or setter
    PropertyAccessor(AccessorDecl),
    /// `init` block
    AnonymousInitializer(InitializerDecl),
    /// Type parameter of a class, function, property or alias
    TypeParameter(TypeParameterDecl),
    /// Value parameter
    ValueParameter(ValueParameterDecl),
    /// `typealias`
    TypeAlias(TypeAliasDecl),
}

impl DeclKind {
    /// Human-readable kind, used in error messages
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Class(_) => "class",
            Self::Function(_) => "function",
            Self::Constructor(_) => "constructor",
            Self::Property(_) => "property",
            Self::PropertyAccessor(_) => "property accessor",
            Self::AnonymousInitializer(_) => "anonymous initializer",
            Self::TypeParameter(_) => "type parameter",
            Self::ValueParameter(_) => "value parameter",
            Self::TypeAlias(_) => "type alias",
        }
    }
}

/// Class, interface, object, enum class or enum entry
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    /// Class, interface, object, enum class or enum entry
    pub class_kind: ClassKind,
    /// Declared visibility
    pub visibility: Visibility,
    /// `final`, `open`, `abstract` or `sealed`
    pub modality: Modality,
    /// `data class`
    pub is_data: bool,
    /// `inner class`
    pub is_inner: bool,
    /// `companion object`
    pub is_companion: bool,
    /// Type parameter declarations
    pub type_parameters: Vec<DeclId>,
    /// Direct supertypes
    pub supertypes: Vec<AstType>,
    /// Members in declaration order
    pub declarations: Vec<DeclId>,
}

/// Function flags carried from the signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FunctionFlags {
    /// `operator fun`
    pub is_operator: bool,
    /// `infix fun`
    pub is_infix: bool,
    /// `inline fun`
    pub is_inline: bool,
    /// `suspend fun`
    pub is_suspend: bool,
    /// `tailrec fun`
    pub is_tailrec: bool,
}

/// Named function or lambda
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    /// Declared visibility
    pub visibility: Visibility,
    /// Inheritance modality
    pub modality: Modality,
    /// Modifier flags
    pub flags: FunctionFlags,
    /// Type parameter declarations
    pub type_parameters: Vec<DeclId>,
    /// Class the function is a member of
    pub dispatch_receiver_type: Option<AstType>,
    /// Receiver type of an extension
    pub extension_receiver_type: Option<AstType>,
    /// Value parameter declarations
    pub value_parameters: Vec<DeclId>,
    /// Declared or inferred return type
    pub return_type: AstType,
    /// Body; `None` for abstract functions and stubs
    pub body: Option<ExprId>,
    /// Functions this one overrides
    pub overridden: Vec<SymbolId>,
    /// Lambda label, explicit or taken from the enclosing call
    pub label: Option<Name>,
}

/// Kind of constructor delegation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DelegatedCallKind {
    /// `this(..)`
    This,
    /// `super(..)`
    Super,
}

/// Primary or secondary constructor
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorDecl {
    /// Declared in the class header, or synthesized in its place
    pub is_primary: bool,
    /// Declared visibility
    pub visibility: Visibility,
    /// Value parameter declarations
    pub value_parameters: Vec<DeclId>,
    /// The constructed class type
    pub return_type: AstType,
    /// `this(..)` or `super(..)` call
    pub delegated_call: Option<ExprId>,
    /// Statements after the delegation call
    pub body: Option<ExprId>,
}

/// Property, local variable or desugaring temporary
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDecl {
    /// Declared visibility
    pub visibility: Visibility,
    /// Inheritance modality
    pub modality: Modality,
    /// `var` rather than `val`
    pub is_var: bool,
    /// Declared inside a function body
    pub is_local: bool,
    /// `const val`
    pub is_const: bool,
    /// `lateinit var`
    pub is_lateinit: bool,
    /// Property type
    pub return_type: AstType,
    /// Class the property is a member of
    pub dispatch_receiver_type: Option<AstType>,
    /// Receiver type of an extension property
    pub extension_receiver_type: Option<AstType>,
    /// Type parameter declarations
    pub type_parameters: Vec<DeclId>,
    /// Initial value
    pub initializer: Option<ExprId>,
    /// Initializer of the delegate field for `by` properties
    pub delegate: Option<ExprId>,
    /// Getter declaration
    pub getter: Option<DeclId>,
    /// Setter declaration
    pub setter: Option<DeclId>,
}

impl PropertyDecl {
    /// Local `val` with an initializer
    pub fn local(return_type: AstType, initializer: Option<ExprId>) -> Self {
        Self {
            visibility: Visibility::Local,
            modality: Modality::Final,
            is_var: false,
            is_local: true,
            is_const: false,
            is_lateinit: false,
            return_type,
            dispatch_receiver_type: None,
            extension_receiver_type: None,
            type_parameters: Vec::new(),
            initializer,
            delegate: None,
            getter: None,
            setter: None,
        }
    }
}

/// Getter or setter
#[derive(Debug, Clone, PartialEq)]
pub struct AccessorDecl {
    /// Property this accessor belongs to
    pub property: SymbolId,
    /// Setter rather than getter
    pub is_setter: bool,
    /// Declared visibility
    pub visibility: Visibility,
    /// Property type for a getter, `Unit` for a setter
    pub return_type: AstType,
    /// The setter's value parameter
    pub value_parameters: Vec<DeclId>,
    /// Accessor body, absent for default accessors
    pub body: Option<ExprId>,
}

/// `init { .. }`
#[derive(Debug, Clone, PartialEq)]
pub struct InitializerDecl {
    /// Initializer statements
    pub body: ExprId,
}

/// Generic parameter
#[derive(Debug, Clone, PartialEq)]
pub struct TypeParameterDecl {
    /// Position in the owner's parameter list
    pub index: usize,
    /// Declaration-site variance
    pub variance: Variance,
    /// `reified`
    pub is_reified: bool,
    /// Upper bounds
    pub bounds: Vec<AstType>,
}

/// Parameter of a function, constructor, accessor or lambda
#[derive(Debug, Clone, PartialEq)]
pub struct ValueParameterDecl {
    /// Parameter type; for a vararg, the array type
    pub ty: AstType,
    /// Default value; stubs carry an empty block placeholder
    pub default_value: Option<ExprId>,
    /// `vararg`
    pub is_vararg: bool,
    /// `crossinline`
    pub is_crossinline: bool,
    /// `noinline`
    pub is_noinline: bool,
    /// Property declared by a primary constructor parameter
    pub corresponding_property: Option<SymbolId>,
}

impl ValueParameterDecl {
    /// Plain parameter of type `ty`
    pub fn new(ty: AstType) -> Self {
        Self {
            ty,
            default_value: None,
            is_vararg: false,
            is_crossinline: false,
            is_noinline: false,
            corresponding_property: None,
        }
    }
}

/// `typealias Name<T> = Expanded`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAliasDecl {
    /// Declared visibility
    pub visibility: Visibility,
    /// Type parameter declarations
    pub type_parameters: Vec<DeclId>,
    /// The aliased type
    pub expanded: AstType,
}
