//! Symbols give every declaration an identity independent of tree position

use crate::error::AstError;
use crate::DeclId;
use la_arena::Idx;
use tl_intern::Name;

/// Symbol ID
pub type SymbolId = Idx<Symbol>;

/// Kind of declaration a symbol stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// Class, interface, object or enum entry
    Class,
    /// Named function
    Function,
    /// Lambda or anonymous function
    AnonymousFunction,
    /// Constructor
    Constructor,
    /// Property, local variable or temporary
    Property,
    /// Getter or setter
    PropertyAccessor,
    /// Type parameter
    TypeParameter,
    /// Value parameter
    ValueParameter,
    /// Type alias
    TypeAlias,
    /// `init` block
    AnonymousInitializer,
}

/// Qualified identity of a declaration
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SymbolIdentity {
    /// Package path segments
    pub package: Vec<Name>,
    /// Names of enclosing classes, outermost first
    pub enclosing: Vec<Name>,
    /// Simple name
    pub name: Name,
    /// Declared inside a callable body
    pub is_local: bool,
}

impl SymbolIdentity {
    /// Identity of a synthetic local with no package path
    pub fn local(name: Name) -> Self {
        Self {
            package: Vec::new(),
            enclosing: Vec::new(),
            name,
            is_local: true,
        }
    }
}

/// Stable identity of one declaration with a once-only owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// What the symbol stands for
    pub kind: SymbolKind,
    /// Qualified identity
    pub identity: SymbolIdentity,
    owner: Option<DeclId>,
}

impl Symbol {
    /// Create an unbound symbol
    pub fn new(kind: SymbolKind, identity: SymbolIdentity) -> Self {
        Self {
            kind,
            identity,
            owner: None,
        }
    }

    /// Simple name of the declaration
    pub fn name(&self) -> Name {
        self.identity.name
    }

    /// Declaration that owns this symbol
    pub fn owner(&self) -> Option<DeclId> {
        self.owner
    }

    /// Whether a declaration owns the symbol
    pub fn is_bound(&self) -> bool {
        self.owner.is_some()
    }

    /// Set the owning declaration; a bound symbol can never be rebound
    ///
    /// # Errors
    ///
    /// Returns [`AstError::SymbolAlreadyBound`] if an owner is already set
    pub fn bind(&mut self, declaration: DeclId) -> Result<(), AstError> {
        match self.owner {
            Some(existing) => Err(AstError::SymbolAlreadyBound {
                name: self.identity.name,
                existing,
                attempted: declaration,
            }),
            None => {
                self.owner = Some(declaration);
                Ok(())
            }
        }
    }
}
