//! Resolved calls

use crate::descriptor::DescId;
use crate::types::SemTypeId;
use tl_syntax::NodeId;

/// Result of overload resolution for one call site
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCall {
    /// Chosen callee
    pub candidate: DescId,
    /// Inferred type arguments in declaration order
    pub type_arguments: Vec<SemTypeId>,
    /// Receiver the candidate is dispatched on
    pub dispatch_receiver: Option<ReceiverValue>,
    /// Receiver bound to the candidate's extension receiver
    pub extension_receiver: Option<ReceiverValue>,
    /// One entry per value parameter of the candidate, by parameter index
    pub value_arguments: Vec<ResolvedValueArgument>,
    /// Parameter indices in source evaluation order, empty when positional
    pub evaluation_order: Vec<usize>,
    /// Type of the call expression
    pub result_type: SemTypeId,
}

impl ResolvedCall {
    /// Call of `candidate` with no receivers or arguments yet
    pub fn new(candidate: DescId, result_type: SemTypeId) -> Self {
        Self {
            candidate,
            type_arguments: Vec::new(),
            dispatch_receiver: None,
            extension_receiver: None,
            value_arguments: Vec::new(),
            evaluation_order: Vec::new(),
            result_type,
        }
    }

    /// Set the dispatch receiver
    #[must_use]
    pub fn with_dispatch_receiver(mut self, receiver: ReceiverValue) -> Self {
        self.dispatch_receiver = Some(receiver);
        self
    }

    /// Set the extension receiver
    #[must_use]
    pub fn with_extension_receiver(mut self, receiver: ReceiverValue) -> Self {
        self.extension_receiver = Some(receiver);
        self
    }

    /// Append the argument for the next value parameter
    #[must_use]
    pub fn with_argument(mut self, argument: ResolvedValueArgument) -> Self {
        self.value_arguments.push(argument);
        self
    }

    /// Source order of value arguments, as parameter indices
    #[must_use]
    pub fn with_evaluation_order(mut self, order: Vec<usize>) -> Self {
        self.evaluation_order = order;
        self
    }

    /// Named arguments were written in a different order than the parameters
    pub fn is_reordering_required(&self) -> bool {
        self.evaluation_order
            .windows(2)
            .any(|window| window[0] > window[1])
    }

    /// Parameter indices in the order their arguments must be evaluated
    pub fn arguments_in_evaluation_order(&self) -> Vec<usize> {
        if self.evaluation_order.is_empty() {
            (0..self.value_arguments.len()).collect()
        } else {
            self.evaluation_order.clone()
        }
    }

    /// The receiver written in source, if any
    pub fn explicit_receiver(&self) -> Option<NodeId> {
        [&self.extension_receiver, &self.dispatch_receiver]
            .into_iter()
            .flatten()
            .find_map(|receiver| match receiver {
                ReceiverValue::Expression(node) => Some(*node),
                _ => None,
            })
    }
}

/// Where a receiver value comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverValue {
    /// Receiver written in source
    Expression(NodeId),
    /// Implicit `this` of an enclosing class
    ImplicitThis {
        /// Enclosing class
        class: DescId,
        /// Type of `this`
        ty: SemTypeId,
    },
    /// Implicit `this` of an enclosing extension callable
    ExtensionThis {
        /// Enclosing extension callable
        callable: DescId,
        /// Type of the extension receiver
        ty: SemTypeId,
    },
    /// `super`
    Super {
        /// Supertype being called
        ty: SemTypeId,
    },
    /// Class name used as a value, an object or companion
    ClassValue {
        /// Object or companion class
        class: DescId,
        /// Type of the class value
        ty: SemTypeId,
    },
}

/// How one value parameter receives its argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedValueArgument {
    /// Parameter default is used
    Default,
    /// Single argument expression
    Expression(NodeId),
    /// Arguments collected into a vararg parameter
    Vararg(Vec<VarargElement>),
}

/// One argument collected into a vararg
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarargElement {
    /// Argument expression
    pub expression: NodeId,
    /// `*array`
    pub spread: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use la_arena::{Arena, RawIdx};

    fn ids() -> (DescId, SemTypeId) {
        (
            DescId::from_raw(RawIdx::from(0_u32)),
            SemTypeId::from_raw(RawIdx::from(0_u32)),
        )
    }

    #[test]
    fn test_reordering_detection() {
        let (candidate, ty) = ids();
        let positional = ResolvedCall::new(candidate, ty).with_evaluation_order(vec![0, 1, 2]);
        assert!(!positional.is_reordering_required());
        let named = ResolvedCall::new(candidate, ty).with_evaluation_order(vec![1, 0]);
        assert!(named.is_reordering_required());
        assert_eq!(named.arguments_in_evaluation_order(), vec![1, 0]);
    }

    #[test]
    fn test_explicit_receiver_prefers_source_expression() {
        let (candidate, ty) = ids();
        let mut nodes: Arena<tl_syntax::SyntaxNode> = Arena::default();
        let node = nodes.alloc(tl_syntax::SyntaxNode {
            kind: tl_syntax::NodeKind::Constant,
            span: tl_syntax::FileSpan::detached(),
        });
        let call = ResolvedCall::new(candidate, ty)
            .with_dispatch_receiver(ReceiverValue::ImplicitThis {
                class: candidate,
                ty,
            })
            .with_extension_receiver(ReceiverValue::Expression(node));
        assert_eq!(call.explicit_receiver(), Some(node));
    }
}
