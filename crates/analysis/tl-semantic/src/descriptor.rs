//! Semantic declaration descriptors

use crate::constant::AnnotationDescriptor;
use crate::types::SemTypeId;
use la_arena::Idx;
use tl_intern::Name;
use tl_syntax::{ClassKind, Modality, Variance, Visibility};

/// Descriptor ID
pub type DescId = Idx<Descriptor>;

/// The type checker's view of one named program entity
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptor {
    /// Simple name
    pub name: Name,
    /// Package path segments
    pub package: Vec<Name>,
    /// Enclosing declaration, `None` for top-level declarations
    pub container: Option<DescId>,
    /// Declared or inferred visibility
    pub visibility: Visibility,
    /// Annotations on the declaration
    pub annotations: Vec<AnnotationDescriptor>,
    /// Kind-specific data
    pub kind: DescriptorKind,
}

impl Descriptor {
    /// Create a public descriptor without annotations
    pub fn new(name: Name, package: Vec<Name>, container: Option<DescId>, kind: DescriptorKind) -> Self {
        Self {
            name,
            package,
            container,
            visibility: Visibility::Public,
            annotations: Vec::new(),
            kind,
        }
    }

    /// Class data, if this is a class
    pub fn as_class(&self) -> Option<&ClassDescriptor> {
        match &self.kind {
            DescriptorKind::Class(class) => Some(class),
            _ => None,
        }
    }

    /// Function data, if this is a function
    pub fn as_function(&self) -> Option<&FunctionDescriptor> {
        match &self.kind {
            DescriptorKind::Function(function) => Some(function),
            _ => None,
        }
    }

    /// Constructor data, if this is a constructor
    pub fn as_constructor(&self) -> Option<&ConstructorDescriptor> {
        match &self.kind {
            DescriptorKind::Constructor(constructor) => Some(constructor),
            _ => None,
        }
    }

    /// Property data, if this is a property or local variable
    pub fn as_property(&self) -> Option<&PropertyDescriptor> {
        match &self.kind {
            DescriptorKind::Property(property) => Some(property),
            _ => None,
        }
    }

    /// Parameter data, if this is a value parameter
    pub fn as_value_parameter(&self) -> Option<&ValueParameterDescriptor> {
        match &self.kind {
            DescriptorKind::ValueParameter(parameter) => Some(parameter),
            _ => None,
        }
    }

    /// Value parameters of a callable, empty for anything else
    pub fn value_parameters(&self) -> &[DescId] {
        match &self.kind {
            DescriptorKind::Function(function) => &function.value_parameters,
            DescriptorKind::Constructor(constructor) => &constructor.value_parameters,
            DescriptorKind::PropertyAccessor(accessor) => &accessor.value_parameters,
            _ => &[],
        }
    }
}

/// Kind-specific descriptor data
#[derive(Debug, Clone, PartialEq)]
pub enum DescriptorKind {
    /// Class, object, interface or enum entry
    Class(ClassDescriptor),
    /// Function or lambda
    Function(FunctionDescriptor),
    /// Primary or secondary constructor
    Constructor(ConstructorDescriptor),
    /// Member, top-level or local variable
    Property(PropertyDescriptor),
    /// Property getter or setter
    PropertyAccessor(AccessorDescriptor),
    /// Type parameter of a class or callable
    TypeParameter(TypeParameterDescriptor),
    /// Value parameter of a callable
    ValueParameter(ValueParameterDescriptor),
    /// Type alias
    TypeAlias(TypeAliasDescriptor),
}

impl DescriptorKind {
    /// Kind name used in diagnostics
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Class(_) => "class",
            Self::Function(_) => "function",
            Self::Constructor(_) => "constructor",
            Self::Property(_) => "property",
            Self::PropertyAccessor(_) => "property accessor",
            Self::TypeParameter(_) => "type parameter",
            Self::ValueParameter(_) => "value parameter",
            Self::TypeAlias(_) => "type alias",
        }
    }
}

/// Class-like declaration, including objects and enum entries
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassDescriptor {
    /// Class, interface, object or enum
    pub class_kind: ClassKind,
    /// `final`, `open`, `abstract` or `sealed`
    pub modality: Modality,
    /// `data` class
    pub is_data: bool,
    /// `inner` class
    pub is_inner: bool,
    /// `companion` object
    pub is_companion: bool,
    /// Type parameters in declaration order
    pub type_parameters: Vec<DescId>,
    /// Direct supertypes
    pub supertypes: Vec<SemTypeId>,
    /// All constructors, primary included
    pub constructors: Vec<DescId>,
    /// Primary constructor, if declared
    pub primary_constructor: Option<DescId>,
}

impl ClassDescriptor {
    /// Final class of the given kind with nothing else set
    pub fn new(class_kind: ClassKind) -> Self {
        Self {
            class_kind,
            ..Self::default()
        }
    }

    /// The primary constructor, or the only constructor when there is exactly one
    pub fn primary_or_sole_constructor(&self) -> Option<DescId> {
        self.primary_constructor.or_else(|| match self.constructors.as_slice() {
            [single] => Some(*single),
            _ => None,
        })
    }
}

/// Named or anonymous function
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDescriptor {
    /// `final`, `open` or `abstract`
    pub modality: Modality,
    /// Type parameters in declaration order
    pub type_parameters: Vec<DescId>,
    /// Value parameters in declaration order
    pub value_parameters: Vec<DescId>,
    /// Declared or inferred return type
    pub return_type: SemTypeId,
    /// Type of the dispatch receiver for members
    pub dispatch_receiver: Option<SemTypeId>,
    /// Type of the extension receiver
    pub extension_receiver: Option<SemTypeId>,
    /// `operator` modifier
    pub is_operator: bool,
    /// `infix` modifier
    pub is_infix: bool,
    /// `inline` modifier
    pub is_inline: bool,
    /// `suspend` modifier
    pub is_suspend: bool,
    /// `tailrec` modifier
    pub is_tailrec: bool,
    /// Lambdas and anonymous `fun` expressions
    pub is_anonymous: bool,
    /// Declarations this one overrides
    pub overridden: Vec<DescId>,
}

impl FunctionDescriptor {
    /// Final, non-anonymous function returning `return_type`
    pub fn new(return_type: SemTypeId) -> Self {
        Self {
            modality: Modality::Final,
            type_parameters: Vec::new(),
            value_parameters: Vec::new(),
            return_type,
            dispatch_receiver: None,
            extension_receiver: None,
            is_operator: false,
            is_infix: false,
            is_inline: false,
            is_suspend: false,
            is_tailrec: false,
            is_anonymous: false,
            overridden: Vec::new(),
        }
    }
}

/// Primary or secondary constructor
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorDescriptor {
    /// Declared in the class header
    pub is_primary: bool,
    /// Value parameters in declaration order
    pub value_parameters: Vec<DescId>,
    /// Type of the constructed class
    pub return_type: SemTypeId,
}

/// Property or local variable
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDescriptor {
    /// Declared type
    pub ty: SemTypeId,
    /// `var` rather than `val`
    pub is_var: bool,
    /// Local variable
    pub is_local: bool,
    /// `const val`
    pub is_const: bool,
    /// `lateinit var`
    pub is_lateinit: bool,
    /// `final`, `open` or `abstract`
    pub modality: Modality,
    /// Type of the dispatch receiver for members
    pub dispatch_receiver: Option<SemTypeId>,
    /// Type of the extension receiver
    pub extension_receiver: Option<SemTypeId>,
    /// Type parameters of a generic extension property
    pub type_parameters: Vec<DescId>,
    /// Getter, if declared
    pub getter: Option<DescId>,
    /// Setter, if declared
    pub setter: Option<DescId>,
}

impl PropertyDescriptor {
    /// Final member or top-level property
    pub fn new(ty: SemTypeId, is_var: bool) -> Self {
        Self {
            ty,
            is_var,
            is_local: false,
            is_const: false,
            is_lateinit: false,
            modality: Modality::Final,
            dispatch_receiver: None,
            extension_receiver: None,
            type_parameters: Vec::new(),
            getter: None,
            setter: None,
        }
    }

    /// Local variable
    pub fn local(ty: SemTypeId, is_var: bool) -> Self {
        Self {
            is_local: true,
            ..Self::new(ty, is_var)
        }
    }
}

/// Getter or setter of a property
#[derive(Debug, Clone, PartialEq)]
pub struct AccessorDescriptor {
    /// Owning property
    pub property: DescId,
    /// Setter rather than getter
    pub is_setter: bool,
    /// Return type
    pub return_type: SemTypeId,
    /// Setter value parameter, empty for getters
    pub value_parameters: Vec<DescId>,
}

/// Type parameter
#[derive(Debug, Clone, PartialEq)]
pub struct TypeParameterDescriptor {
    /// Position in the owner's type parameter list
    pub index: usize,
    /// Declaration-site variance
    pub variance: Variance,
    /// `reified` modifier
    pub is_reified: bool,
    /// Declared upper bounds
    pub upper_bounds: Vec<SemTypeId>,
}

/// Value parameter of a callable
#[derive(Debug, Clone, PartialEq)]
pub struct ValueParameterDescriptor {
    /// Position in the owner's value parameter list
    pub index: usize,
    /// Declared type
    pub ty: SemTypeId,
    /// Declares a default value
    pub declares_default: bool,
    /// `vararg` modifier
    pub is_vararg: bool,
    /// `crossinline` modifier
    pub is_crossinline: bool,
    /// `noinline` modifier
    pub is_noinline: bool,
}

impl ValueParameterDescriptor {
    /// Plain parameter at `index`
    pub fn new(index: usize, ty: SemTypeId) -> Self {
        Self {
            index,
            ty,
            declares_default: false,
            is_vararg: false,
            is_crossinline: false,
            is_noinline: false,
        }
    }
}

/// Type alias
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAliasDescriptor {
    /// Type parameters in declaration order
    pub type_parameters: Vec<DescId>,
    /// Type the alias expands to
    pub expanded: SemTypeId,
}
