//! Typed AST produced by lowering
//!
//! Nodes live in arenas owned by an [`AstStore`]. Cross references go
//! through [`Symbol`]s rather than node ids, so a declaration can be
//! referenced before it exists. Every symbol gets exactly one owner.

pub mod decl;
pub mod error;
pub mod expr;
pub mod render;
pub mod store;
pub mod symbol;
pub mod target;
pub mod types;
pub mod visitor;

pub use decl::*;
pub use error::AstError;
pub use expr::*;
pub use store::AstStore;
pub use symbol::{Symbol, SymbolId, SymbolIdentity, SymbolKind};
pub use target::{FunctionTarget, LoopTarget, WhenRef};
pub use types::{AstType, TypeProjection};

use la_arena::{Arena, Idx};
use tl_intern::Name;

/// Declaration ID
pub type DeclId = Idx<Declaration>;
/// Expression ID
pub type ExprId = Idx<Expr>;
/// Function target ID
pub type FunctionTargetId = Idx<FunctionTarget>;
/// Loop target ID
pub type LoopTargetId = Idx<LoopTarget>;
/// When subject reference ID
pub type WhenRefId = Idx<WhenRef>;

/// One translated source file
#[derive(Debug, Clone, PartialEq)]
pub struct AstFile {
    /// File name, for diagnostics
    pub name: String,
    /// Package path segments
    pub package: Vec<Name>,
    /// File-level annotation calls
    pub annotations: Vec<ExprId>,
    /// Top-level declarations in source order
    pub declarations: Vec<DeclId>,
}

/// Self-contained result of lowering a compilation unit
#[derive(Debug, Clone)]
pub struct ModuleFragment {
    /// Module name from the configuration
    pub name: String,
    /// Translated files in input order
    pub files: Vec<AstFile>,
    /// Root stubs for declarations outside the unit
    pub external_declarations: Vec<DeclId>,
    /// Every symbol of the fragment, bound or not
    pub symbols: Arena<Symbol>,
    /// Declarations, expressions and targets
    pub store: AstStore,
}

impl ModuleFragment {
    /// Symbol behind `id`
    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id]
    }

    /// Symbols that never received a declaration
    pub fn unbound_symbols(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.symbols
            .iter()
            .filter(|(_, symbol)| !symbol.is_bound())
            .map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tl_intern::Interner;

    #[test]
    fn test_symbol_binds_once() {
        let interner = Interner::new();
        let mut store = AstStore::new();
        let mut symbols = Arena::new();
        let name = interner.intern("Foo");
        let id = symbols.alloc(Symbol::new(SymbolKind::TypeAlias, SymbolIdentity::local(name)));
        let decl = store.alloc_decl(Declaration {
            symbol: id,
            origin: DeclOrigin::Stub,
            annotations: Vec::new(),
            kind: DeclKind::TypeAlias(TypeAliasDecl {
                visibility: tl_syntax::Visibility::Public,
                type_parameters: Vec::new(),
                expanded: AstType::simple(id),
            }),
        });

        assert!(symbols[id].bind(decl).is_ok());
        assert!(matches!(
            symbols[id].bind(decl),
            Err(AstError::SymbolAlreadyBound { .. })
        ));
        assert_eq!(symbols[id].owner(), Some(decl));
    }

    #[test]
    fn test_loop_target_binds_once() {
        let mut store = AstStore::new();
        let target = store.new_loop_target(LoopTarget::new(None));
        let expr = store.alloc_expr(Expr::new(
            AstType::simple(SymbolId::from_raw(la_arena::RawIdx::from(0u32))),
            ExprKind::Unit,
        ));

        assert!(store.bind_loop_target(target, expr).is_ok());
        assert_eq!(store.loop_target(target).owner(), Some(expr));
        assert!(store.bind_loop_target(target, expr).is_err());
    }
}
