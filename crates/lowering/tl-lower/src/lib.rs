//! Lowering of an analyzed syntax tree into the typed AST
//!
//! A session reads the syntax tree and the facts semantic analysis recorded
//! about it, translates every source file, then stubs the declarations the
//! unit references but does not define. The result is a self-contained
//! [`ModuleFragment`].
//!
//! ```ignore
//! let fragment = tl_lower::lower_module(&tree, &binding, &interner, &LowerConfig::default())?;
//! println!("{}", tl_ast::render::render(&fragment, &interner));
//! ```

pub mod builder;
pub mod config;
pub mod constant;
pub mod context;
pub mod error;
pub mod scope;
pub mod stub;
pub mod symbol_table;
pub mod type_converter;

pub use config::{ConfigError, LowerConfig};
pub use context::{GeneratorContext, LoweringStats};
pub use error::{LowerError, LowerResult};
pub use symbol_table::SymbolTable;

use log::{debug, info};
use tl_ast::visitor::collect_references;
use tl_ast::{AstFile, DeclId, ModuleFragment};
use tl_intern::Interner;
use tl_semantic::{BindingContext, DescId};
use tl_syntax::SyntaxTree;

/// One lowering session over a compilation unit
pub struct Lowering<'m> {
    ctx: GeneratorContext<'m>,
    files: Vec<AstFile>,
    external: Vec<DeclId>,
}

impl<'m> Lowering<'m> {
    /// Start a session over an analyzed tree
    pub fn new(
        tree: &'m SyntaxTree,
        binding: &'m BindingContext,
        interner: &'m Interner,
        config: &'m LowerConfig,
    ) -> Self {
        Self {
            ctx: GeneratorContext::new(tree, binding, interner, config),
            files: Vec::new(),
            external: Vec::new(),
        }
    }

    /// Translate every file of the tree
    ///
    /// # Errors
    ///
    /// Stops at the first fatal error.
    pub fn lower_files(&mut self) -> LowerResult<()> {
        let tree = self.ctx.tree;
        for file in tree.files() {
            let lowered = builder::lower_file(&mut self.ctx, file)?;
            self.files.push(lowered);
        }
        Ok(())
    }

    /// Stub everything referenced but not declared so far
    ///
    /// Runs after all source files are translated, so local declarations are
    /// already bound and never stubbed.
    ///
    /// # Errors
    ///
    /// See [`stub::generate_unbound_stubs`].
    pub fn generate_stubs(&mut self) -> LowerResult<()> {
        let roots = stub::generate_unbound_stubs(&mut self.ctx)?;
        debug!("generated {} root stubs", roots.len());
        self.external.extend(roots);
        Ok(())
    }

    /// The declaration for a descriptor, stubbing it if the unit has none
    ///
    /// # Errors
    ///
    /// Propagates failures building the stub.
    pub fn declaration_for(&mut self, desc: DescId) -> LowerResult<DeclId> {
        let symbol = self.ctx.symbols.symbol_for(desc);
        stub::get_declaration(&mut self.ctx, symbol, desc)
    }

    /// Files translated so far
    pub fn files(&self) -> &[AstFile] {
        &self.files
    }

    /// Counters for this session
    pub fn stats(&self) -> LoweringStats {
        self.ctx.stats
    }

    /// Stub what is still unbound, verify and hand over the fragment
    ///
    /// # Errors
    ///
    /// [`LowerError::UnboundSymbols`] when verification finds a referenced
    /// symbol without a declaration.
    pub fn finish(mut self) -> LowerResult<ModuleFragment> {
        self.generate_stubs()?;
        if self.ctx.config.verify.bound_symbols {
            self.verify_bound()?;
        }

        let stats = self.ctx.stats;
        info!(
            "lowered module `{}`: {} declarations, {} stubs in {} passes",
            self.ctx.config.module_name,
            stats.declarations,
            stats.stubs,
            stats.fixed_point_passes
        );

        let Self {
            ctx,
            files,
            external,
        } = self;
        Ok(ModuleFragment {
            name: ctx.config.module_name.clone(),
            files,
            external_declarations: external,
            symbols: ctx.symbols.into_arena(),
            store: ctx.store,
        })
    }

    fn verify_bound(&self) -> LowerResult<()> {
        let mut roots: Vec<DeclId> = self
            .files
            .iter()
            .flat_map(|file| file.declarations.iter().copied())
            .collect();
        roots.extend(self.external.iter().copied());

        let references = collect_references(&self.ctx.store, &roots);
        let mut unbound: Vec<String> = references
            .symbols
            .iter()
            .filter(|&&symbol| !self.ctx.symbols.get(symbol).is_bound())
            .map(|&symbol| self.ctx.name(self.ctx.symbols.get(symbol).name()).to_string())
            .collect();
        if unbound.is_empty() {
            return Ok(());
        }
        unbound.sort();
        Err(LowerError::UnboundSymbols { names: unbound })
    }
}

/// Lower a whole compilation unit in one call
///
/// # Errors
///
/// Any fatal error from translation, stub generation or verification.
pub fn lower_module(
    tree: &SyntaxTree,
    binding: &BindingContext,
    interner: &Interner,
    config: &LowerConfig,
) -> LowerResult<ModuleFragment> {
    let mut lowering = Lowering::new(tree, binding, interner, config);
    lowering.lower_files()?;
    lowering.finish()
}
