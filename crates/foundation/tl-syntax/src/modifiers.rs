//! Declaration modifiers shared by the syntax tree, the semantic model and the AST

use serde::{Deserialize, Serialize};

/// Declared variance of a type parameter or projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Variance {
    /// No variance annotation
    #[default]
    Invariant,
    /// `in`
    In,
    /// `out`
    Out,
}

impl Variance {
    /// Keyword used when rendering, empty for invariant
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Invariant => "",
            Self::In => "in",
            Self::Out => "out",
        }
    }
}

/// Visibility modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Visibility {
    /// Visible everywhere
    #[default]
    Public,
    /// Visible inside the module
    Internal,
    /// Visible to subclasses
    Protected,
    /// Visible inside the containing declaration
    Private,
    /// Declared inside a function body
    Local,
}

/// Inheritance modality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Modality {
    /// Cannot be overridden
    #[default]
    Final,
    /// `open`
    Open,
    /// `abstract`
    Abstract,
    /// `sealed`
    Sealed,
}

/// Kind of class-like declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ClassKind {
    /// `class`
    #[default]
    Class,
    /// `interface`
    Interface,
    /// `enum class`
    Enum,
    /// Entry of an enum class
    EnumEntry,
    /// `object`
    Object,
    /// `annotation class`
    Annotation,
}

impl ClassKind {
    /// Keyword used when rendering
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Enum => "enum class",
            Self::EnumEntry => "enum entry",
            Self::Object => "object",
            Self::Annotation => "annotation class",
        }
    }
}
