//! Name interning shared by the syntax tree, the semantic model and the AST

use lasso::ThreadedRodeo;
use std::fmt;
use std::sync::Arc;

pub use lasso::Spur as Name;

/// Thread-safe string interner
#[derive(Clone)]
pub struct Interner {
    inner: Arc<ThreadedRodeo>,
}

impl Interner {
    /// Create an empty interner
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ThreadedRodeo::new()),
        }
    }

    /// Intern a string, returning the existing name if it was seen before
    pub fn intern(&self, text: &str) -> Name {
        self.inner.get_or_intern(text)
    }

    /// Resolve a name back to its text
    pub fn resolve(&self, name: Name) -> &str {
        self.inner.resolve(&name)
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Interner {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Interner")
            .field("len", &self.inner.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_is_stable() {
        let interner = Interner::new();
        let first = interner.intern("iterator");
        let second = interner.intern("iterator");
        assert_eq!(first, second);
        assert_eq!(interner.resolve(first), "iterator");
        assert_ne!(interner.intern("next"), first);
    }

    #[test]
    fn test_clones_share_storage() {
        let interner = Interner::new();
        let clone = interner.clone();
        let name = clone.intern("<unary>");
        assert_eq!(interner.intern("<unary>"), name);
        assert_eq!(interner.resolve(name), "<unary>");
    }
}
