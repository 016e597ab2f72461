//! Symbol table mapping semantic descriptors to AST symbols

use crate::error::LowerResult;
use la_arena::Arena;
use rustc_hash::FxHashMap;
use tl_ast::{DeclId, Symbol, SymbolId, SymbolIdentity, SymbolKind};
use tl_intern::Name;
use tl_semantic::{BindingContext, DescId, DescriptorKind};

/// Get-or-create cache from descriptors to symbols, one cache per kind
#[derive(Debug)]
pub struct SymbolTable<'m> {
    binding: &'m BindingContext,
    symbols: Arena<Symbol>,
    caches: FxHashMap<SymbolKind, FxHashMap<DescId, SymbolId>>,
    descriptors: FxHashMap<SymbolId, DescId>,
}

impl<'m> SymbolTable<'m> {
    /// Empty table reading descriptors from `binding`
    pub fn new(binding: &'m BindingContext) -> Self {
        Self {
            binding,
            symbols: Arena::default(),
            caches: FxHashMap::default(),
            descriptors: FxHashMap::default(),
        }
    }

    /// Class symbol for `desc`
    pub fn get_or_create_class_symbol(&mut self, desc: DescId) -> SymbolId {
        self.get_or_create(SymbolKind::Class, desc)
    }

    /// Function symbol for `desc`
    pub fn get_or_create_function_symbol(&mut self, desc: DescId) -> SymbolId {
        self.get_or_create(SymbolKind::Function, desc)
    }

    /// Lambda or anonymous function symbol for `desc`
    pub fn get_or_create_anonymous_function_symbol(&mut self, desc: DescId) -> SymbolId {
        self.get_or_create(SymbolKind::AnonymousFunction, desc)
    }

    /// Constructor symbol for `desc`
    pub fn get_or_create_constructor_symbol(&mut self, desc: DescId) -> SymbolId {
        self.get_or_create(SymbolKind::Constructor, desc)
    }

    /// Property symbol for `desc`
    pub fn get_or_create_property_symbol(&mut self, desc: DescId) -> SymbolId {
        self.get_or_create(SymbolKind::Property, desc)
    }

    /// Getter or setter symbol for `desc`
    pub fn get_or_create_property_accessor_symbol(&mut self, desc: DescId) -> SymbolId {
        self.get_or_create(SymbolKind::PropertyAccessor, desc)
    }

    /// Type parameter symbol for `desc`
    pub fn get_or_create_type_parameter_symbol(&mut self, desc: DescId) -> SymbolId {
        self.get_or_create(SymbolKind::TypeParameter, desc)
    }

    /// Value parameter symbol for `desc`
    pub fn get_or_create_value_parameter_symbol(&mut self, desc: DescId) -> SymbolId {
        self.get_or_create(SymbolKind::ValueParameter, desc)
    }

    /// Type alias symbol for `desc`
    pub fn get_or_create_type_alias_symbol(&mut self, desc: DescId) -> SymbolId {
        self.get_or_create(SymbolKind::TypeAlias, desc)
    }

    /// Symbol for any descriptor, picking the cache from its kind
    pub fn symbol_for(&mut self, desc: DescId) -> SymbolId {
        match &self.binding.descriptor(desc).kind {
            DescriptorKind::Class(_) => self.get_or_create_class_symbol(desc),
            DescriptorKind::Function(function) if function.is_anonymous => {
                self.get_or_create_anonymous_function_symbol(desc)
            }
            DescriptorKind::Function(_) => self.get_or_create_function_symbol(desc),
            DescriptorKind::Constructor(_) => self.get_or_create_constructor_symbol(desc),
            DescriptorKind::Property(_) => self.get_or_create_property_symbol(desc),
            DescriptorKind::PropertyAccessor(_) => {
                self.get_or_create_property_accessor_symbol(desc)
            }
            DescriptorKind::TypeParameter(_) => self.get_or_create_type_parameter_symbol(desc),
            DescriptorKind::ValueParameter(_) => self.get_or_create_value_parameter_symbol(desc),
            DescriptorKind::TypeAlias(_) => self.get_or_create_type_alias_symbol(desc),
        }
    }

    fn get_or_create(&mut self, kind: SymbolKind, desc: DescId) -> SymbolId {
        if let Some(&symbol) = self.caches.get(&kind).and_then(|cache| cache.get(&desc)) {
            return symbol;
        }

        let identity = self.identity(desc);
        let symbol = self.symbols.alloc(Symbol::new(kind, identity));
        self.caches.entry(kind).or_default().insert(desc, symbol);
        self.descriptors.insert(symbol, desc);
        symbol
    }

    /// Symbol with no descriptor, for temporaries and other synthesized declarations
    pub fn fresh_symbol(&mut self, kind: SymbolKind, identity: SymbolIdentity) -> SymbolId {
        self.symbols.alloc(Symbol::new(kind, identity))
    }

    /// Local symbol named `name`
    pub fn fresh_local(&mut self, kind: SymbolKind, name: Name) -> SymbolId {
        self.fresh_symbol(kind, SymbolIdentity::local(name))
    }

    fn identity(&self, desc: DescId) -> SymbolIdentity {
        let descriptor = self.binding.descriptor(desc);
        let mut enclosing = Vec::new();
        let mut is_local = matches!(
            &descriptor.kind,
            DescriptorKind::Property(property) if property.is_local
        );

        let mut container = descriptor.container;
        while let Some(parent) = container {
            let parent_descriptor = self.binding.descriptor(parent);
            match &parent_descriptor.kind {
                DescriptorKind::Class(_) => enclosing.push(parent_descriptor.name),
                DescriptorKind::Function(_)
                | DescriptorKind::Constructor(_)
                | DescriptorKind::PropertyAccessor(_) => is_local = true,
                _ => {}
            }
            container = parent_descriptor.container;
        }
        enclosing.reverse();

        SymbolIdentity {
            package: descriptor.package.clone(),
            enclosing,
            name: descriptor.name,
            is_local,
        }
    }

    /// Symbol behind `symbol`
    pub fn get(&self, symbol: SymbolId) -> &Symbol {
        &self.symbols[symbol]
    }

    /// Descriptor a symbol was created for
    pub fn descriptor_of(&self, symbol: SymbolId) -> Option<DescId> {
        self.descriptors.get(&symbol).copied()
    }

    /// Set a symbol's owner
    ///
    /// # Errors
    ///
    /// Fails if the symbol is already bound
    pub fn bind(&mut self, symbol: SymbolId, declaration: DeclId) -> LowerResult<()> {
        self.symbols[symbol].bind(declaration)?;
        Ok(())
    }

    /// Descriptor-backed symbols without an owner, in creation order
    pub fn unbound_symbols(&self) -> Vec<(DescId, SymbolId)> {
        self.symbols
            .iter()
            .filter(|(_, symbol)| !symbol.is_bound())
            .filter_map(|(id, _)| self.descriptors.get(&id).map(|&desc| (desc, id)))
            .collect()
    }

    /// Every symbol without an owner, including synthesized ones
    pub fn all_unbound(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.symbols
            .iter()
            .filter(|(_, symbol)| !symbol.is_bound())
            .map(|(id, _)| id)
    }

    /// Number of symbols created
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether no symbol was created yet
    pub fn is_empty(&self) -> bool {
        self.symbols.len() == 0
    }

    /// Hand the symbols over to the fragment
    pub fn into_arena(self) -> Arena<Symbol> {
        self.symbols
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tl_intern::Interner;
    use tl_semantic::{ClassDescriptor, Descriptor, FunctionDescriptor};
    use tl_syntax::ClassKind;

    #[test]
    fn test_same_descriptor_same_symbol() {
        let interner = Interner::new();
        let mut binding = BindingContext::new(&interner);
        let package = vec![interner.intern("app")];
        let class = binding.alloc_descriptor(Descriptor::new(
            interner.intern("Outer"),
            package.clone(),
            None,
            DescriptorKind::Class(ClassDescriptor::new(ClassKind::Class)),
        ));
        let unit = binding.builtins().unit_type;
        let function = binding.alloc_descriptor(Descriptor::new(
            interner.intern("run"),
            package,
            Some(class),
            DescriptorKind::Function(FunctionDescriptor::new(unit)),
        ));

        let mut table = SymbolTable::new(&binding);
        let first = table.get_or_create_function_symbol(function);
        let second = table.symbol_for(function);
        assert_eq!(first, second);
        assert_eq!(table.len(), 1);

        let identity = &table.get(first).identity;
        assert_eq!(identity.enclosing, vec![interner.intern("Outer")]);
        assert!(!identity.is_local);
    }

    #[test]
    fn test_kinds_are_cached_separately() {
        let interner = Interner::new();
        let binding = BindingContext::new(&interner);
        let any = binding.builtins().any;

        let mut table = SymbolTable::new(&binding);
        let class = table.get_or_create_class_symbol(any);
        let alias = table.get_or_create_type_alias_symbol(any);
        assert_ne!(class, alias);
        assert_eq!(table.unbound_symbols().len(), 2);
    }

    #[test]
    fn test_fresh_symbols_are_not_stub_candidates() {
        let interner = Interner::new();
        let binding = BindingContext::new(&interner);
        let mut table = SymbolTable::new(&binding);
        let temp = table.fresh_local(SymbolKind::Property, interner.intern("<tmp>"));
        assert!(table.unbound_symbols().is_empty());
        assert_eq!(table.all_unbound().collect::<Vec<_>>(), vec![temp]);
        assert!(table.get(temp).identity.is_local);
    }
}
