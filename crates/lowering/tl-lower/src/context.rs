//! State shared by every stage of a lowering session

use crate::config::LowerConfig;
use crate::error::{LowerError, LowerResult};
use crate::symbol_table::SymbolTable;
use crate::type_converter::convert_type;
use rustc_hash::FxHashMap;
use tl_ast::{
    AstStore, AstType, DeclId, DeclKind, DeclOrigin, Declaration, DiagnosticKind, Expr, ExprId,
    ExprKind, SymbolId,
};
use tl_intern::{Interner, Name};
use tl_semantic::{BindingContext, Builtins, SemTypeId};
use tl_syntax::{NodeId, SyntaxTree};

/// Counters reported after a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoweringStats {
    /// Declarations translated from source or synthesized
    pub declarations: usize,
    /// Signature-only declarations generated for outside references
    pub stubs: usize,
    /// Passes the stub driver needed to reach its fixed point
    pub fixed_point_passes: usize,
}

/// Everything a lowering session reads and writes
///
/// Inputs are borrowed for `'m`; outputs are owned and handed to the
/// module fragment when the session finishes.
pub struct GeneratorContext<'m> {
    /// Facts recorded by semantic analysis
    pub binding: &'m BindingContext,
    /// Tree being lowered
    pub tree: &'m SyntaxTree,
    /// Interner shared with the tree
    pub interner: &'m Interner,
    /// Session options
    pub config: &'m LowerConfig,
    /// Descriptor to symbol mapping
    pub symbols: SymbolTable<'m>,
    pub(crate) type_cache: FxHashMap<SemTypeId, AstType>,
    /// Declarations and expressions built so far
    pub store: AstStore,
    /// Counters for this session
    pub stats: LoweringStats,
}

impl<'m> GeneratorContext<'m> {
    /// Context with an empty store and symbol table
    pub fn new(
        tree: &'m SyntaxTree,
        binding: &'m BindingContext,
        interner: &'m Interner,
        config: &'m LowerConfig,
    ) -> Self {
        Self {
            binding,
            tree,
            interner,
            config,
            symbols: SymbolTable::new(binding),
            type_cache: FxHashMap::default(),
            store: AstStore::new(),
            stats: LoweringStats::default(),
        }
    }

    /// Built-in classes
    pub fn builtins(&self) -> &'m Builtins {
        self.binding.builtins()
    }

    /// Intern `text`
    pub fn intern(&self, text: &str) -> Name {
        self.interner.intern(text)
    }

    /// Convert a semantic type, memoized
    pub fn convert(&mut self, ty: SemTypeId) -> LowerResult<AstType> {
        convert_type(self, ty)
    }

    /// `Unit`
    pub fn unit_type(&mut self) -> LowerResult<AstType> {
        let ty = self.builtins().unit_type;
        self.convert(ty)
    }

    /// `Boolean`
    pub fn boolean_type(&mut self) -> LowerResult<AstType> {
        let ty = self.builtins().boolean_type;
        self.convert(ty)
    }

    /// `Nothing`
    pub fn nothing_type(&mut self) -> LowerResult<AstType> {
        let ty = self.builtins().nothing_type;
        self.convert(ty)
    }

    /// `String`
    pub fn string_type(&mut self) -> LowerResult<AstType> {
        let ty = self.builtins().string_type;
        self.convert(ty)
    }

    /// Converted static type of an expression node, `Unit` when none was recorded
    pub fn expression_type(&mut self, node: NodeId) -> LowerResult<AstType> {
        match self.binding.expression_type(node) {
            Some(ty) => self.convert(ty),
            None => self.unit_type(),
        }
    }

    /// Allocate an expression
    pub fn alloc_expr(&mut self, ty: AstType, kind: ExprKind) -> ExprId {
        self.store.alloc_expr(Expr::new(ty, kind))
    }

    /// Type of an already built expression
    pub fn expr_type(&self, expr: ExprId) -> AstType {
        self.store[expr].ty.clone()
    }

    /// Value type of a property or parameter declaration
    pub fn declared_type(&self, decl: DeclId) -> Option<AstType> {
        match &self.store[decl].kind {
            DeclKind::Property(property) => Some(property.return_type.clone()),
            DeclKind::ValueParameter(parameter) => Some(parameter.ty.clone()),
            _ => None,
        }
    }

    /// `Unit` value
    pub fn unit(&mut self) -> LowerResult<ExprId> {
        let ty = self.unit_type()?;
        Ok(self.alloc_expr(ty, ExprKind::Unit))
    }

    /// Recoverable error node standing in for malformed source
    pub fn error_expr(&mut self, kind: DiagnosticKind, message: &str) -> LowerResult<ExprId> {
        let ty = self.nothing_type()?;
        Ok(self.alloc_expr(
            ty,
            ExprKind::Error {
                kind,
                message: message.to_string(),
            },
        ))
    }

    /// Allocate a declaration and bind its symbol to it
    pub fn declare(
        &mut self,
        symbol: SymbolId,
        origin: DeclOrigin,
        annotations: Vec<ExprId>,
        kind: DeclKind,
    ) -> LowerResult<DeclId> {
        let decl = self.store.alloc_decl(Declaration {
            symbol,
            origin,
            annotations,
            kind,
        });
        self.symbols.bind(symbol, decl)?;
        match origin {
            DeclOrigin::Stub => self.stats.stubs += 1,
            DeclOrigin::Source | DeclOrigin::Synthetic => self.stats.declarations += 1,
        }
        Ok(decl)
    }

    /// Fatal error for a fact analysis should have recorded
    pub fn missing(&self, what: &'static str, node: NodeId) -> LowerError {
        LowerError::MissingSemanticInfo {
            what,
            node: self.tree.kind(node).describe(),
            span: self.tree.span(node),
        }
    }

    /// Fatal error for a node of the wrong kind
    pub fn unexpected(&self, node: NodeId, expected: &'static str) -> LowerError {
        LowerError::UnexpectedNode {
            found: self.tree.kind(node).describe(),
            expected,
            span: self.tree.span(node),
        }
    }

    /// Descriptor declared by a declaration node
    pub fn declared(&self, node: NodeId) -> LowerResult<tl_semantic::DescId> {
        self.binding
            .declaration(node)
            .ok_or_else(|| self.missing("declaration descriptor", node))
    }

    /// Text of an interned name
    pub fn name(&self, name: Name) -> &'m str {
        self.interner.resolve(name)
    }
}
