//! Semantic analysis results consumed by the lowering engine
//!
//! [`BindingContext`] is the query surface over the concrete syntax tree:
//! expression types, resolved calls, the declaration behind a syntax node,
//! annotation instances and evaluated constants. The analyzer fills it in
//! through the `record_*` methods; lowering only reads it.

pub mod builtins;
pub mod call;
pub mod constant;
pub mod descriptor;
pub mod types;

use la_arena::Arena;
use rustc_hash::{FxHashMap, FxHashSet};
use tl_intern::Interner;
use tl_syntax::NodeId;

pub use builtins::Builtins;
pub use call::{ReceiverValue, ResolvedCall, ResolvedValueArgument, VarargElement};
pub use constant::{AnnotationDescriptor, ConstantValue};
pub use descriptor::{
    AccessorDescriptor, ClassDescriptor, ConstructorDescriptor, DescId, Descriptor,
    DescriptorKind, FunctionDescriptor, PropertyDescriptor, TypeAliasDescriptor,
    TypeParameterDescriptor, ValueParameterDescriptor,
};
pub use types::{SemType, SemTypeArgument, SemTypeId, SimpleType};

/// Calls a `for` loop is desugared into
#[derive(Debug, Clone, PartialEq)]
pub struct LoopCalls {
    /// `range.iterator()`
    pub iterator: ResolvedCall,
    /// `iterator.hasNext()`
    pub has_next: ResolvedCall,
    /// `iterator.next()`
    pub next: ResolvedCall,
}

/// Operator calls behind an indexed access `a[i]`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IndexedCalls {
    /// `a.get(i)`
    pub get: Option<ResolvedCall>,
    /// `a.set(i, v)`
    pub set: Option<ResolvedCall>,
}

/// Convention calls of a delegated property
#[derive(Debug, Clone, PartialEq)]
pub struct DelegateCalls {
    /// `delegate.getValue(thisRef, property)`
    pub get_value: ResolvedCall,
    /// `delegate.setValue(thisRef, property, value)` for `var`
    pub set_value: Option<ResolvedCall>,
    /// `expr.provideDelegate(thisRef, property)`
    pub provide_delegate: Option<ResolvedCall>,
}

/// Read-only view of everything semantic analysis learned about a unit
#[derive(Debug)]
pub struct BindingContext {
    descriptors: Arena<Descriptor>,
    types: Arena<SemType>,
    builtins: Builtins,
    expression_types: FxHashMap<NodeId, SemTypeId>,
    type_references: FxHashMap<NodeId, SemTypeId>,
    resolved_calls: FxHashMap<NodeId, ResolvedCall>,
    reference_targets: FxHashMap<NodeId, DescId>,
    declarations: FxHashMap<NodeId, DescId>,
    annotations: FxHashMap<NodeId, AnnotationDescriptor>,
    constants: FxHashMap<NodeId, ConstantValue>,
    loop_calls: FxHashMap<NodeId, LoopCalls>,
    component_calls: FxHashMap<NodeId, ResolvedCall>,
    indexed_calls: FxHashMap<NodeId, IndexedCalls>,
    delegate_calls: FxHashMap<NodeId, DelegateCalls>,
    condition_calls: FxHashMap<NodeId, ResolvedCall>,
    operator_assignments: FxHashSet<NodeId>,
    constructor_properties: FxHashMap<NodeId, DescId>,
}

impl BindingContext {
    /// Create a context holding only the built-in declarations
    pub fn new(interner: &Interner) -> Self {
        let mut descriptors = Arena::default();
        let mut types = Arena::default();
        let builtins = builtins::install(&mut descriptors, &mut types, interner);
        Self {
            descriptors,
            types,
            builtins,
            expression_types: FxHashMap::default(),
            type_references: FxHashMap::default(),
            resolved_calls: FxHashMap::default(),
            reference_targets: FxHashMap::default(),
            declarations: FxHashMap::default(),
            annotations: FxHashMap::default(),
            constants: FxHashMap::default(),
            loop_calls: FxHashMap::default(),
            component_calls: FxHashMap::default(),
            indexed_calls: FxHashMap::default(),
            delegate_calls: FxHashMap::default(),
            condition_calls: FxHashMap::default(),
            operator_assignments: FxHashSet::default(),
            constructor_properties: FxHashMap::default(),
        }
    }

    /// Built-in classes and types
    pub fn builtins(&self) -> &Builtins {
        &self.builtins
    }

    /// Descriptor behind `id`
    pub fn descriptor(&self, id: DescId) -> &Descriptor {
        &self.descriptors[id]
    }

    /// Type behind `id`
    pub fn ty(&self, id: SemTypeId) -> &SemType {
        &self.types[id]
    }

    /// All descriptors with their IDs
    pub fn descriptors(&self) -> impl Iterator<Item = (DescId, &Descriptor)> {
        self.descriptors.iter()
    }

    /// Static type of an expression
    pub fn expression_type(&self, node: NodeId) -> Option<SemTypeId> {
        self.expression_types.get(&node).copied()
    }

    /// Type written at a type reference
    pub fn type_reference(&self, node: NodeId) -> Option<SemTypeId> {
        self.type_references.get(&node).copied()
    }

    /// Call a name, call, operator or delegation node resolved to
    pub fn resolved_call(&self, node: NodeId) -> Option<&ResolvedCall> {
        self.resolved_calls.get(&node)
    }

    /// Declaration a name refers to when no call was resolved
    pub fn reference_target(&self, node: NodeId) -> Option<DescId> {
        self.reference_targets.get(&node).copied()
    }

    /// Declaration introduced by a declaration node
    pub fn declaration(&self, node: NodeId) -> Option<DescId> {
        self.declarations.get(&node).copied()
    }

    /// Annotation instance of an annotation entry node
    pub fn annotation(&self, node: NodeId) -> Option<&AnnotationDescriptor> {
        self.annotations.get(&node)
    }

    /// Compile-time value of a constant expression
    pub fn constant(&self, node: NodeId) -> Option<&ConstantValue> {
        self.constants.get(&node)
    }

    /// Iterator protocol calls of a `for` node
    pub fn loop_calls(&self, node: NodeId) -> Option<&LoopCalls> {
        self.loop_calls.get(&node)
    }

    /// `componentN()` call of a destructuring entry
    pub fn component_call(&self, entry: NodeId) -> Option<&ResolvedCall> {
        self.component_calls.get(&entry)
    }

    /// `get`/`set` calls of an array access node
    pub fn indexed_calls(&self, node: NodeId) -> Option<&IndexedCalls> {
        self.indexed_calls.get(&node)
    }

    /// Delegate convention calls of a property node
    pub fn delegate_calls(&self, property: NodeId) -> Option<&DelegateCalls> {
        self.delegate_calls.get(&property)
    }

    /// `contains` call of a `when` range condition, keyed by the range node
    pub fn condition_call(&self, range: NodeId) -> Option<&ResolvedCall> {
        self.condition_calls.get(&range)
    }

    /// Whether a compound assignment resolved to an assignment operator such as `plusAssign`
    pub fn is_operator_assignment(&self, node: NodeId) -> bool {
        self.operator_assignments.contains(&node)
    }

    /// Property declared by a primary constructor parameter
    pub fn constructor_property(&self, parameter: NodeId) -> Option<DescId> {
        self.constructor_properties.get(&parameter).copied()
    }

    /// Add a descriptor
    pub fn alloc_descriptor(&mut self, descriptor: Descriptor) -> DescId {
        self.descriptors.alloc(descriptor)
    }

    /// Mutable descriptor behind `id`
    pub fn descriptor_mut(&mut self, id: DescId) -> &mut Descriptor {
        &mut self.descriptors[id]
    }

    /// Add a type
    pub fn alloc_type(&mut self, ty: SemType) -> SemTypeId {
        self.types.alloc(ty)
    }

    /// Set the static type of an expression
    pub fn record_expression_type(&mut self, node: NodeId, ty: SemTypeId) {
        self.expression_types.insert(node, ty);
    }

    /// Set the type written at a type reference
    pub fn record_type_reference(&mut self, node: NodeId, ty: SemTypeId) {
        self.type_references.insert(node, ty);
    }

    /// Set the call a node resolved to
    pub fn record_resolved_call(&mut self, node: NodeId, call: ResolvedCall) {
        self.resolved_calls.insert(node, call);
    }

    /// Set the declaration a name refers to
    pub fn record_reference_target(&mut self, node: NodeId, target: DescId) {
        self.reference_targets.insert(node, target);
    }

    /// Set the declaration a declaration node introduces
    pub fn record_declaration(&mut self, node: NodeId, descriptor: DescId) {
        self.declarations.insert(node, descriptor);
    }

    /// Set the annotation instance of an annotation entry node
    pub fn record_annotation(&mut self, node: NodeId, annotation: AnnotationDescriptor) {
        self.annotations.insert(node, annotation);
    }

    /// Set the value of a constant expression
    pub fn record_constant(&mut self, node: NodeId, value: ConstantValue) {
        self.constants.insert(node, value);
    }

    /// Set the iterator calls of a `for` node
    pub fn record_loop_calls(&mut self, node: NodeId, calls: LoopCalls) {
        self.loop_calls.insert(node, calls);
    }

    /// Set the `componentN()` call of a destructuring entry
    pub fn record_component_call(&mut self, entry: NodeId, call: ResolvedCall) {
        self.component_calls.insert(entry, call);
    }

    /// Set the `get`/`set` calls of an array access node
    pub fn record_indexed_calls(&mut self, node: NodeId, calls: IndexedCalls) {
        self.indexed_calls.insert(node, calls);
    }

    /// Set the delegate calls of a property node
    pub fn record_delegate_calls(&mut self, property: NodeId, calls: DelegateCalls) {
        self.delegate_calls.insert(property, calls);
    }

    /// Set the `contains` call of a range condition
    pub fn record_condition_call(&mut self, range: NodeId, call: ResolvedCall) {
        self.condition_calls.insert(range, call);
    }

    /// Mark a compound assignment as resolved to an assignment operator
    pub fn record_operator_assignment(&mut self, node: NodeId) {
        self.operator_assignments.insert(node);
    }

    /// Set the property declared by a constructor parameter
    pub fn record_constructor_property(&mut self, parameter: NodeId, property: DescId) {
        self.constructor_properties.insert(parameter, property);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_are_installed() {
        let interner = Interner::new();
        let context = BindingContext::new(&interner);
        let builtins = context.builtins();
        let any = context.descriptor(builtins.any);
        assert_eq!(interner.resolve(any.name), "Any");
        assert!(any.as_class().is_some());

        let to_string = context.descriptor(builtins.any_to_string);
        assert_eq!(to_string.container, Some(builtins.any));
        let function = to_string.as_function().map(|function| function.return_type);
        assert_eq!(function, Some(builtins.string_type));
    }

    #[test]
    fn test_string_type_is_simple() {
        let interner = Interner::new();
        let context = BindingContext::new(&interner);
        let builtins = context.builtins();
        match context.ty(builtins.string_type) {
            SemType::Simple(simple) => {
                assert_eq!(simple.classifier, builtins.string);
                assert!(!simple.nullable);
            }
            other => panic!("unexpected type {other:?}"),
        }
    }
}
