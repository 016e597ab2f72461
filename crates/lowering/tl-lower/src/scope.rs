//! Lexical chain of jump targets threaded through the builder
//!
//! Each nested construct pushes a frame by borrowing its parent, so leaving
//! a construct restores the enclosing state without any bookkeeping.

use crate::error::{LowerError, LowerResult};
use tl_ast::{AstStore, FunctionTargetId, LoopTargetId};
use tl_intern::{Interner, Name};
use tl_syntax::FileSpan;

/// What a scope frame contributes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    /// Outermost frame
    Root,
    /// Body of a function, constructor, accessor or lambda
    Function(FunctionTargetId),
    /// Body of a loop
    Loop(LoopTargetId),
    /// Arguments of a call, whose lambdas are implicitly labeled with the callee name
    CalleeName(Name),
}

/// One link of the scope chain
#[derive(Debug, Clone, Copy)]
pub struct Scope<'p> {
    parent: Option<&'p Scope<'p>>,
    frame: Frame,
}

impl Scope<'static> {
    /// Empty chain
    pub fn root() -> Self {
        Scope {
            parent: None,
            frame: Frame::Root,
        }
    }
}

impl<'p> Scope<'p> {
    /// Child scope with `frame` on top
    pub fn push(&'p self, frame: Frame) -> Scope<'p> {
        Scope {
            parent: Some(self),
            frame,
        }
    }

    fn frames(&self) -> impl Iterator<Item = Frame> + '_ {
        let mut current = Some(self);
        std::iter::from_fn(move || {
            let scope = current?;
            current = scope.parent;
            Some(scope.frame)
        })
    }

    /// Implicit label for a lambda: the callee name of the nearest call, unless a function intervenes
    pub fn implicit_lambda_label(&self) -> Option<Name> {
        for frame in self.frames() {
            match frame {
                Frame::CalleeName(name) => return Some(name),
                Frame::Function(_) => return None,
                Frame::Root | Frame::Loop(_) => {}
            }
        }
        None
    }

    /// Target of `return` or `return@label`
    ///
    /// # Errors
    ///
    /// [`LowerError::UnresolvedLabel`] when no function carries the label,
    /// [`LowerError::MissingTarget`] when there is no enclosing function.
    pub fn return_target(
        &self,
        label: Option<Name>,
        store: &AstStore,
        interner: &Interner,
        span: FileSpan,
    ) -> LowerResult<FunctionTargetId> {
        let mut functions = self.frames().filter_map(|frame| match frame {
            Frame::Function(target) => Some(target),
            _ => None,
        });

        let found = match label {
            Some(label) => {
                functions.find(|&target| store.function_target(target).label == Some(label))
            }
            None => functions.find(|&target| !store.function_target(target).is_lambda),
        };

        found.ok_or_else(|| match label {
            Some(label) => LowerError::UnresolvedLabel {
                label: interner.resolve(label).to_string(),
                span,
            },
            None => LowerError::MissingTarget {
                keyword: "return",
                expected: "function",
                span,
            },
        })
    }

    /// Target of `break`/`continue`, optionally labeled
    ///
    /// Unlabeled jumps do not cross function boundaries.
    ///
    /// # Errors
    ///
    /// [`LowerError::UnresolvedLabel`] when no loop carries the label,
    /// [`LowerError::MissingTarget`] when there is no enclosing loop.
    pub fn loop_target(
        &self,
        keyword: &'static str,
        label: Option<Name>,
        store: &AstStore,
        interner: &Interner,
        span: FileSpan,
    ) -> LowerResult<LoopTargetId> {
        for frame in self.frames() {
            match (frame, label) {
                (Frame::Loop(target), Some(label))
                    if store.loop_target(target).label == Some(label) =>
                {
                    return Ok(target);
                }
                (Frame::Loop(target), None) => return Ok(target),
                (Frame::Function(_), None) => break,
                _ => {}
            }
        }

        Err(match label {
            Some(label) => LowerError::UnresolvedLabel {
                label: interner.resolve(label).to_string(),
                span,
            },
            None => LowerError::MissingTarget {
                keyword,
                expected: "loop",
                span,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tl_ast::{FunctionTarget, LoopTarget};

    #[test]
    fn test_unlabeled_return_skips_lambdas() {
        let interner = Interner::new();
        let mut store = AstStore::new();
        let function = store.new_function_target(FunctionTarget::new(
            Some(interner.intern("main")),
            false,
        ));
        let lambda = store.new_function_target(FunctionTarget::new(
            Some(interner.intern("forEach")),
            true,
        ));

        let root = Scope::root();
        let in_function = root.push(Frame::Function(function));
        let in_lambda = in_function.push(Frame::Function(lambda));
        let span = FileSpan::detached();

        assert_eq!(
            in_lambda.return_target(None, &store, &interner, span).unwrap(),
            function
        );
        assert_eq!(
            in_lambda
                .return_target(Some(interner.intern("forEach")), &store, &interner, span)
                .unwrap(),
            lambda
        );
        assert!(matches!(
            in_lambda.return_target(Some(interner.intern("outer")), &store, &interner, span),
            Err(LowerError::UnresolvedLabel { .. })
        ));
    }

    #[test]
    fn test_break_stops_at_function_boundary() {
        let interner = Interner::new();
        let mut store = AstStore::new();
        let outer = store.new_loop_target(LoopTarget::new(Some(interner.intern("outer"))));
        let lambda = store.new_function_target(FunctionTarget::new(None, true));

        let root = Scope::root();
        let in_loop = root.push(Frame::Loop(outer));
        let in_lambda = in_loop.push(Frame::Function(lambda));
        let span = FileSpan::detached();

        assert_eq!(
            in_loop.loop_target("break", None, &store, &interner, span).unwrap(),
            outer
        );
        assert!(matches!(
            in_lambda.loop_target("break", None, &store, &interner, span),
            Err(LowerError::MissingTarget { .. })
        ));
        assert_eq!(
            in_lambda
                .loop_target("continue", Some(interner.intern("outer")), &store, &interner, span)
                .unwrap(),
            outer
        );
    }

    #[test]
    fn test_implicit_label_from_callee() {
        let interner = Interner::new();
        let mut store = AstStore::new();
        let function = store.new_function_target(FunctionTarget::new(None, false));
        let name = interner.intern("run");

        let root = Scope::root();
        let in_function = root.push(Frame::Function(function));
        let in_call = in_function.push(Frame::CalleeName(name));
        assert_eq!(in_call.implicit_lambda_label(), Some(name));
        assert_eq!(in_function.implicit_lambda_label(), None);
    }
}
