//! Built-in classes every translation unit can refer to

use crate::descriptor::{ClassDescriptor, DescId, Descriptor, DescriptorKind, FunctionDescriptor};
use crate::types::{SemType, SemTypeId, SimpleType};
use la_arena::Arena;
use tl_intern::{Interner, Name};
use tl_syntax::{ClassKind, Modality};

/// Descriptors and types of the language's built-in classes
#[derive(Debug, Clone)]
pub struct Builtins {
    /// `Any` class
    pub any: DescId,
    /// `Any.toString()`
    pub any_to_string: DescId,
    /// `Unit` class
    pub unit: DescId,
    /// `Boolean` class
    pub boolean: DescId,
    /// `String` class
    pub string: DescId,
    /// `Nothing` class
    pub nothing: DescId,
    /// `Any`
    pub any_type: SemTypeId,
    /// `Any?`
    pub nullable_any_type: SemTypeId,
    /// `Unit`
    pub unit_type: SemTypeId,
    /// `Boolean`
    pub boolean_type: SemTypeId,
    /// `String`
    pub string_type: SemTypeId,
    /// `Char`
    pub char_type: SemTypeId,
    /// `Byte`
    pub byte_type: SemTypeId,
    /// `Short`
    pub short_type: SemTypeId,
    /// `Int`
    pub int_type: SemTypeId,
    /// `Long`
    pub long_type: SemTypeId,
    /// `Float`
    pub float_type: SemTypeId,
    /// `Double`
    pub double_type: SemTypeId,
    /// `Nothing`
    pub nothing_type: SemTypeId,
    /// `Nothing?`, the type of `null`
    pub nullable_nothing_type: SemTypeId,
}

struct Installer<'a> {
    descriptors: &'a mut Arena<Descriptor>,
    types: &'a mut Arena<SemType>,
    package: Vec<Name>,
    interner: &'a Interner,
}

impl Installer<'_> {
    fn class(&mut self, name: &str, modality: Modality) -> DescId {
        let mut class = ClassDescriptor::new(ClassKind::Class);
        class.modality = modality;
        self.descriptors.alloc(Descriptor::new(
            self.interner.intern(name),
            self.package.clone(),
            None,
            DescriptorKind::Class(class),
        ))
    }

    fn ty(&mut self, classifier: DescId, nullable: bool) -> SemTypeId {
        let mut simple = SimpleType::plain(classifier);
        simple.nullable = nullable;
        self.types.alloc(SemType::Simple(simple))
    }

    fn class_with_type(&mut self, name: &str) -> SemTypeId {
        let class = self.class(name, Modality::Final);
        self.ty(class, false)
    }
}

/// Allocate the built-in descriptors into fresh arenas
pub(crate) fn install(
    descriptors: &mut Arena<Descriptor>,
    types: &mut Arena<SemType>,
    interner: &Interner,
) -> Builtins {
    let mut installer = Installer {
        descriptors,
        types,
        package: vec![interner.intern("kotlin")],
        interner,
    };

    let any = installer.class("Any", Modality::Open);
    let any_type = installer.ty(any, false);
    let nullable_any_type = installer.ty(any, true);
    let unit = installer.class("Unit", Modality::Final);
    let unit_type = installer.ty(unit, false);
    let boolean = installer.class("Boolean", Modality::Final);
    let boolean_type = installer.ty(boolean, false);
    let string = installer.class("String", Modality::Final);
    let string_type = installer.ty(string, false);
    let nothing = installer.class("Nothing", Modality::Final);
    let nothing_type = installer.ty(nothing, false);
    let nullable_nothing_type = installer.ty(nothing, true);
    let char_type = installer.class_with_type("Char");
    let byte_type = installer.class_with_type("Byte");
    let short_type = installer.class_with_type("Short");
    let int_type = installer.class_with_type("Int");
    let long_type = installer.class_with_type("Long");
    let float_type = installer.class_with_type("Float");
    let double_type = installer.class_with_type("Double");

    let mut to_string = FunctionDescriptor::new(string_type);
    to_string.modality = Modality::Open;
    to_string.dispatch_receiver = Some(any_type);
    let package = installer.package.clone();
    let any_to_string = installer.descriptors.alloc(Descriptor::new(
        interner.intern("toString"),
        package,
        Some(any),
        DescriptorKind::Function(to_string),
    ));

    Builtins {
        any,
        any_to_string,
        unit,
        boolean,
        string,
        nothing,
        any_type,
        nullable_any_type,
        unit_type,
        boolean_type,
        string_type,
        char_type,
        byte_type,
        short_type,
        int_type,
        long_type,
        float_type,
        double_type,
        nothing_type,
        nullable_nothing_type,
    }
}
