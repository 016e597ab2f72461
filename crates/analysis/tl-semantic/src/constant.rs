//! Compile-time constant values and annotation instances

use crate::descriptor::DescId;
use crate::types::SemTypeId;
use indexmap::IndexMap;
use tl_intern::Name;

/// A value computed by constant evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    /// String literal
    String(String),
    /// `Int`
    Int(i32),
    /// `Long`
    Long(i64),
    /// `Short`
    Short(i16),
    /// `Byte`
    Byte(i8),
    /// `UInt`
    UInt(u32),
    /// `ULong`
    ULong(u64),
    /// `UShort`
    UShort(u16),
    /// `UByte`
    UByte(u8),
    /// `Boolean`
    Boolean(bool),
    /// `Float`
    Float(f32),
    /// `Double`
    Double(f64),
    /// `Char`
    Char(char),
    /// `null`
    Null,
    /// Array argument of an annotation
    Array {
        /// Element values
        elements: Vec<ConstantValue>,
        /// Array type
        ty: SemTypeId,
    },
    /// Reference to an enum entry
    Enum {
        /// Enum entry descriptor
        entry: DescId,
        /// Type of the enum class
        ty: SemTypeId,
    },
    /// Nested annotation instance
    Annotation(Box<AnnotationDescriptor>),
    /// `T::class`
    Class {
        /// The referenced type `T`
        referenced: SemTypeId,
        /// Type of the class literal itself
        ty: SemTypeId,
    },
    /// Value that failed to evaluate
    Error {
        /// Why evaluation failed
        message: String,
    },
}

/// A resolved annotation instance
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationDescriptor {
    /// Annotation class type
    pub ty: SemTypeId,
    /// Explicit arguments by parameter name, in source order
    pub arguments: IndexMap<Name, ConstantValue>,
}

impl AnnotationDescriptor {
    /// Annotation of type `ty` with no arguments
    pub fn new(ty: SemTypeId) -> Self {
        Self {
            ty,
            arguments: IndexMap::new(),
        }
    }

    /// Add a named argument
    #[must_use]
    pub fn with_argument(mut self, name: Name, value: ConstantValue) -> Self {
        self.arguments.insert(name, value);
        self
    }
}
