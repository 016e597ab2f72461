//! Test utilities for lowering sessions
//!
//! A [`Fixture`] builds a syntax tree together with the facts semantic
//! analysis would have recorded about it, then lowers the whole unit.

use anyhow::Result;
use std::path::Path;
use tl_ast::{DeclId, ModuleFragment};
use tl_intern::{Interner, Name};
use tl_lower::{LowerConfig, LowerResult, Lowering};
use tl_semantic::{
    BindingContext, Builtins, ClassDescriptor, ConstantValue, DescId, Descriptor, DescriptorKind,
    FunctionDescriptor, PropertyDescriptor, ResolvedCall, SemType, SemTypeId, SimpleType,
    ValueParameterDescriptor,
};
use tl_syntax::{ClassKind, FileId, FileSpan, NodeId, NodeKind, SourceFile, Span, SyntaxTree};

/// Test fixture for one source file
pub struct Fixture {
    /// Interner shared by the tree, the binding and the output
    pub interner: Interner,
    /// Tree under construction
    pub tree: SyntaxTree,
    /// Facts recorded for the tree
    pub binding: BindingContext,
    /// Options for the lowering session
    pub config: LowerConfig,
    package: Vec<Name>,
    declarations: Vec<NodeId>,
    offset: u32,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    /// Creates an empty fixture in package `demo`
    #[must_use]
    pub fn new() -> Self {
        let interner = Interner::new();
        let binding = BindingContext::new(&interner);
        let package = vec![interner.intern("demo")];
        Self {
            interner,
            tree: SyntaxTree::new(),
            binding,
            config: LowerConfig::default(),
            package,
            declarations: Vec::new(),
            offset: 0,
        }
    }

    /// Interns `text`
    pub fn name(&self, text: &str) -> Name {
        self.interner.intern(text)
    }

    /// Built-in classes of the binding
    pub fn builtins(&self) -> Builtins {
        self.binding.builtins().clone()
    }

    /// Allocates a node with its own one-character span
    pub fn node(&mut self, kind: NodeKind) -> NodeId {
        let span = FileSpan::new(FileId(0), Span::new(self.offset, self.offset + 1));
        self.offset += 1;
        self.tree.alloc(kind, span)
    }

    /// Allocates an expression node of type `ty`
    pub fn typed(&mut self, kind: NodeKind, ty: SemTypeId) -> NodeId {
        let node = self.node(kind);
        self.binding.record_expression_type(node, ty);
        node
    }

    /// Allocates a descriptor in package `demo`
    pub fn descriptor(
        &mut self,
        name: &str,
        container: Option<DescId>,
        kind: DescriptorKind,
    ) -> DescId {
        let name = self.name(name);
        self.binding
            .alloc_descriptor(Descriptor::new(name, self.package.clone(), container, kind))
    }

    /// Allocates a top-level class descriptor
    pub fn class(&mut self, name: &str, kind: ClassKind) -> DescId {
        self.descriptor(name, None, DescriptorKind::Class(ClassDescriptor::new(kind)))
    }

    /// Non-null type of `class`
    pub fn class_type(&mut self, class: DescId) -> SemTypeId {
        self.binding.alloc_type(SemType::Simple(SimpleType::plain(class)))
    }

    /// Nullable type of `class`
    pub fn nullable_type(&mut self, class: DescId) -> SemTypeId {
        let mut simple = SimpleType::plain(class);
        simple.nullable = true;
        self.binding.alloc_type(SemType::Simple(simple))
    }

    /// Mutable class data of a class descriptor
    pub fn class_descriptor_mut(&mut self, class: DescId) -> Option<&mut ClassDescriptor> {
        match &mut self.binding.descriptor_mut(class).kind {
            DescriptorKind::Class(class) => Some(class),
            _ => None,
        }
    }

    /// Classifier behind a simple type, such as one of the built-ins
    pub fn classifier(&self, ty: SemTypeId) -> Option<DescId> {
        match self.binding.ty(ty) {
            SemType::Simple(simple) => Some(simple.classifier),
            _ => None,
        }
    }

    /// Function with one value parameter per `(name, type)` pair
    pub fn function(
        &mut self,
        name: &str,
        container: Option<DescId>,
        return_type: SemTypeId,
        parameters: &[(&str, SemTypeId)],
    ) -> DescId {
        let function = self.descriptor(
            name,
            container,
            DescriptorKind::Function(FunctionDescriptor::new(return_type)),
        );
        let parameters: Vec<DescId> = parameters
            .iter()
            .enumerate()
            .map(|(index, &(name, ty))| {
                self.descriptor(
                    name,
                    Some(function),
                    DescriptorKind::ValueParameter(ValueParameterDescriptor::new(index, ty)),
                )
            })
            .collect();
        if let DescriptorKind::Function(descriptor) = &mut self.binding.descriptor_mut(function).kind {
            descriptor.value_parameters = parameters;
        }
        function
    }

    /// Operator member of the class behind `receiver`, like `Int.inc`
    pub fn operator(
        &mut self,
        receiver: SemTypeId,
        name: &str,
        return_type: SemTypeId,
        parameters: &[(&str, SemTypeId)],
    ) -> DescId {
        let container = self.classifier(receiver);
        let function = self.function(name, container, return_type, parameters);
        if let DescriptorKind::Function(descriptor) = &mut self.binding.descriptor_mut(function).kind {
            descriptor.dispatch_receiver = Some(receiver);
            descriptor.is_operator = true;
        }
        function
    }

    /// Signature of a lambda literal inside `container`
    pub fn lambda_descriptor(
        &mut self,
        container: DescId,
        return_type: SemTypeId,
        parameters: &[(&str, SemTypeId)],
    ) -> DescId {
        let function = self.function("<anonymous>", Some(container), return_type, parameters);
        if let DescriptorKind::Function(descriptor) = &mut self.binding.descriptor_mut(function).kind {
            descriptor.is_anonymous = true;
        }
        function
    }

    /// Local variable of a function
    pub fn local(&mut self, name: &str, container: DescId, ty: SemTypeId, is_var: bool) -> DescId {
        self.descriptor(
            name,
            Some(container),
            DescriptorKind::Property(PropertyDescriptor::local(ty, is_var)),
        )
    }

    /// The `index`-th value parameter of a function descriptor
    pub fn parameter_of(&self, function: DescId, index: usize) -> Option<DescId> {
        self.binding
            .descriptor(function)
            .value_parameters()
            .get(index)
            .copied()
    }

    /// Constant node with value `value`
    pub fn constant(&mut self, value: ConstantValue, ty: SemTypeId) -> NodeId {
        let node = self.typed(NodeKind::Constant, ty);
        self.binding.record_constant(node, value);
        node
    }

    /// `Int` literal
    pub fn int(&mut self, value: i32) -> NodeId {
        let ty = self.binding.builtins().int_type;
        self.constant(ConstantValue::Int(value), ty)
    }

    /// `String` literal
    pub fn string(&mut self, text: &str) -> NodeId {
        let ty = self.binding.builtins().string_type;
        self.constant(ConstantValue::String(text.to_owned()), ty)
    }

    /// `Boolean` literal
    pub fn boolean(&mut self, value: bool) -> NodeId {
        let ty = self.binding.builtins().boolean_type;
        self.constant(ConstantValue::Boolean(value), ty)
    }

    /// Name reference resolved to `target`
    pub fn reference(&mut self, target: DescId, ty: SemTypeId) -> NodeId {
        let name = self.binding.descriptor(target).name;
        let node = self.typed(NodeKind::NameReference { name }, ty);
        self.binding.record_reference_target(node, target);
        node
    }

    /// Call node resolved to `call`, with a plain name as its callee
    pub fn call(&mut self, call: ResolvedCall, arguments: Vec<NodeId>) -> NodeId {
        let name = self.binding.descriptor(call.candidate).name;
        let callee = self.node(NodeKind::NameReference { name });
        let node = self.typed(NodeKind::Call { callee, arguments }, call.result_type);
        self.binding.record_resolved_call(node, call);
        node
    }

    /// Block node
    pub fn block(&mut self, statements: Vec<NodeId>) -> NodeId {
        self.node(NodeKind::Block { statements })
    }

    /// Named function declaration of `desc`
    pub fn function_node(
        &mut self,
        desc: DescId,
        parameters: Vec<NodeId>,
        body: Option<NodeId>,
    ) -> NodeId {
        let name = self.binding.descriptor(desc).name;
        let node = self.node(NodeKind::Function {
            name: Some(name),
            type_parameters: Vec::new(),
            parameters,
            body,
            annotations: Vec::new(),
        });
        self.binding.record_declaration(node, desc);
        node
    }

    /// Parameter node for every value parameter of `function`
    pub fn parameter_nodes(&mut self, function: DescId) -> Vec<NodeId> {
        let parameters = self.binding.descriptor(function).value_parameters().to_vec();
        parameters
            .into_iter()
            .map(|parameter| self.parameter(parameter))
            .collect()
    }

    /// Parameter node declaring `desc`
    pub fn parameter(&mut self, desc: DescId) -> NodeId {
        let name = self.binding.descriptor(desc).name;
        let node = self.node(NodeKind::Parameter {
            name: Some(name),
            default_value: None,
            destructuring: None,
            annotations: Vec::new(),
        });
        self.binding.record_declaration(node, desc);
        node
    }

    /// `val`/`var` declaration of a property descriptor
    pub fn variable(&mut self, desc: DescId, initializer: Option<NodeId>) -> NodeId {
        self.property_node(desc, initializer, None)
    }

    /// Property declaration with an optional `by` delegate
    pub fn property_node(
        &mut self,
        desc: DescId,
        initializer: Option<NodeId>,
        delegate: Option<NodeId>,
    ) -> NodeId {
        let descriptor = self.binding.descriptor(desc);
        let name = descriptor.name;
        let is_var = descriptor.as_property().is_some_and(|property| property.is_var);
        let node = self.node(NodeKind::Property {
            name,
            is_var,
            type_parameters: Vec::new(),
            initializer,
            delegate,
            getter: None,
            setter: None,
            annotations: Vec::new(),
        });
        self.binding.record_declaration(node, desc);
        node
    }

    /// Adds a top-level declaration to the file
    pub fn add_declaration(&mut self, node: NodeId) {
        self.declarations.push(node);
    }

    /// Registers the source file once; later declarations are ignored
    fn register_file(&mut self) {
        if !self.tree.files().is_empty() {
            return;
        }
        let declarations = std::mem::take(&mut self.declarations);
        self.tree.add_file(SourceFile {
            id: FileId(0),
            name: "main.kt".to_owned(),
            package: self.package.clone(),
            annotations: Vec::new(),
            declarations,
        });
    }

    /// Lowers the file with the fixture's configuration
    ///
    /// # Errors
    ///
    /// Any fatal lowering error.
    pub fn lower(&mut self) -> LowerResult<ModuleFragment> {
        self.register_file();
        tl_lower::lower_module(&self.tree, &self.binding, &self.interner, &self.config)
    }

    /// Lowers the file with a configuration read from disk
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or lowering fails
    pub fn lower_with_config_file(&mut self, path: &Path) -> Result<ModuleFragment> {
        self.config = LowerConfig::from_file(path)?;
        Ok(self.lower()?)
    }

    /// Session over the file, for driving the stages one at a time
    pub fn session(&mut self) -> Lowering<'_> {
        self.register_file();
        Lowering::new(&self.tree, &self.binding, &self.interner, &self.config)
    }

    /// Renders the whole fragment
    pub fn render(&self, fragment: &ModuleFragment) -> String {
        tl_ast::render::render(fragment, &self.interner)
    }

    /// Renders one declaration of the fragment
    pub fn render_decl(&self, fragment: &ModuleFragment, decl: DeclId) -> String {
        tl_ast::render::render_decl(fragment, &self.interner, decl)
    }
}
