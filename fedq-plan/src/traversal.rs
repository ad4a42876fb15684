//! Generic iterative traversal utilities for plan trees.
//!
//! Formulas built by a planner are frequently long left-deep `AND`/`OR`
//! chains. Recursing over them would tie the supported query size to the
//! thread's stack size, so folds over formula and expression trees use the
//! explicit work/result stacks below instead.
//!
//! # Two Entry Points
//!
//! - [`Traversable`] + [`traverse_postorder`] when a node type has one
//!   natural fold (used by Materialize).
//! - [`fold_postorder`] when the same node type is folded several ways, with
//!   the child enumeration and the combine step passed as closures (used by
//!   Transform and by pushdown translation). [`formula_children`] and
//!   [`expression_children`] are the child enumerations for the physical
//!   trees.
//!
//! # Example
//!
//! ```
//! use fedq_plan::traversal::{Traversable, traverse_postorder};
//! use fedq_result::Result;
//!
//! enum MyExpr {
//!     Add(Box<MyExpr>, Box<MyExpr>),
//!     Value(i32),
//! }
//!
//! impl Traversable for MyExpr {
//!     type Output = i32;
//!
//!     fn visit_children(&self) -> Result<Vec<&Self>> {
//!         match self {
//!             MyExpr::Add(left, right) => Ok(vec![left.as_ref(), right.as_ref()]),
//!             MyExpr::Value(_) => Ok(vec![]),
//!         }
//!     }
//!
//!     fn construct(&self, children: Vec<i32>) -> Result<i32> {
//!         match self {
//!             MyExpr::Add(_, _) => Ok(children[0] + children[1]),
//!             MyExpr::Value(v) => Ok(*v),
//!         }
//!     }
//! }
//!
//! let expr = MyExpr::Add(
//!     Box::new(MyExpr::Value(2)),
//!     Box::new(MyExpr::Value(3)),
//! );
//! assert_eq!(traverse_postorder(&expr).unwrap(), 5);
//! ```

use fedq_expr::{Expression, Formula};
use fedq_result::{Error, Result};

/// A frame in the traversal work stack.
enum Frame<'a, T> {
    Enter(&'a T),
    Exit(&'a T, usize), // node and expected child count
}

/// Trait for types that support iterative postorder traversal.
///
/// The traversal guarantees postorder: children are fully processed before
/// their parent's `construct` is called.
pub trait Traversable: Sized {
    /// The result type produced by traversing this tree.
    type Output;

    /// Children of this node, in the order their results are passed to
    /// `construct`. Leaf nodes return an empty vec.
    fn visit_children(&self) -> Result<Vec<&Self>>;

    /// Build this node's result from its children's results.
    fn construct(&self, children: Vec<Self::Output>) -> Result<Self::Output>;
}

/// Fold a tree in postorder using [`Traversable`].
pub fn traverse_postorder<T>(root: &T) -> Result<T::Output>
where
    T: Traversable,
{
    fold_postorder(root, T::visit_children, |node, children| {
        node.construct(children)
    })
}

/// Fold a tree in postorder with explicit child enumeration and combine
/// closures.
///
/// # Errors
/// Returns the first error produced by `children` or `construct`, or
/// `Error::Internal` if the result stack is found in an inconsistent state.
pub fn fold_postorder<'a, T, O, C, F>(root: &'a T, children: C, mut construct: F) -> Result<O>
where
    C: Fn(&'a T) -> Result<Vec<&'a T>>,
    F: FnMut(&'a T, Vec<O>) -> Result<O>,
{
    let mut work_stack: Vec<Frame<'a, T>> = vec![Frame::Enter(root)];
    let mut result_stack: Vec<O> = Vec::new();

    while let Some(frame) = work_stack.pop() {
        match frame {
            Frame::Enter(node) => {
                let node_children = children(node)?;
                work_stack.push(Frame::Exit(node, node_children.len()));
                for child in node_children.into_iter().rev() {
                    work_stack.push(Frame::Enter(child));
                }
            }
            Frame::Exit(node, child_count) => {
                if result_stack.len() < child_count {
                    return Err(Error::Internal(
                        "fold_postorder: result stack underflow".into(),
                    ));
                }
                let start = result_stack.len() - child_count;
                let child_results: Vec<O> = result_stack.drain(start..).collect();
                let output = construct(node, child_results)?;
                result_stack.push(output);
            }
        }
    }

    if result_stack.len() != 1 {
        return Err(Error::Internal(format!(
            "fold_postorder: expected 1 result, got {}",
            result_stack.len()
        )));
    }
    result_stack
        .pop()
        .ok_or_else(|| Error::Internal("fold_postorder: empty result stack".into()))
}

/// Direct sub-formulas of `formula`. Predicates are leaves.
pub fn formula_children(formula: &Formula) -> Result<Vec<&Formula>> {
    match formula {
        Formula::And(left, right) | Formula::Or(left, right) => {
            Ok(vec![left.as_ref(), right.as_ref()])
        }
        Formula::Not(inner) => Ok(vec![inner.as_ref()]),
        Formula::Constant(_) | Formula::Predicate { .. } => Ok(vec![]),
        other => Err(Error::internal(format!(
            "unsupported formula variant {other:?}"
        ))),
    }
}

/// Direct sub-expressions of `expr`. Only tuples have children.
pub fn expression_children(expr: &Expression) -> Result<Vec<&Expression>> {
    match expr {
        Expression::Tuple(items) => Ok(items.iter().collect()),
        Expression::Variable(_) | Expression::Constant(_) => Ok(vec![]),
        other => Err(Error::internal(format!(
            "unsupported expression variant {other:?}"
        ))),
    }
}

pub(crate) fn take_two<T>(children: Vec<T>) -> Result<(T, T)> {
    let mut iter = children.into_iter();
    match (iter.next(), iter.next(), iter.next()) {
        (Some(left), Some(right), None) => Ok((left, right)),
        _ => Err(Error::internal("binary formula expects two children")),
    }
}

pub(crate) fn take_one<T>(children: Vec<T>) -> Result<T> {
    let mut iter = children.into_iter();
    match (iter.next(), iter.next()) {
        (Some(child), None) => Ok(child),
        _ => Err(Error::internal("unary formula expects one child")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum TestExpr {
        Add(Box<TestExpr>, Box<TestExpr>),
        Mul(Box<TestExpr>, Box<TestExpr>),
        Value(i32),
    }

    impl Traversable for TestExpr {
        type Output = i32;

        fn visit_children(&self) -> Result<Vec<&Self>> {
            match self {
                TestExpr::Add(left, right) | TestExpr::Mul(left, right) => {
                    Ok(vec![left.as_ref(), right.as_ref()])
                }
                TestExpr::Value(_) => Ok(vec![]),
            }
        }

        fn construct(&self, children: Vec<i32>) -> Result<i32> {
            match self {
                TestExpr::Add(_, _) => Ok(children[0] + children[1]),
                TestExpr::Mul(_, _) => Ok(children[0] * children[1]),
                TestExpr::Value(v) => Ok(*v),
            }
        }
    }

    #[test]
    fn nested_evaluation() {
        // (2 + 3) * 4 = 20
        let expr = TestExpr::Mul(
            Box::new(TestExpr::Add(
                Box::new(TestExpr::Value(2)),
                Box::new(TestExpr::Value(3)),
            )),
            Box::new(TestExpr::Value(4)),
        );
        assert_eq!(traverse_postorder(&expr).unwrap(), 20);
    }

    #[test]
    fn fold_with_closures_sees_children_in_order() {
        let expr = TestExpr::Add(
            Box::new(TestExpr::Value(1)),
            Box::new(TestExpr::Mul(
                Box::new(TestExpr::Value(2)),
                Box::new(TestExpr::Value(3)),
            )),
        );
        let rendered = fold_postorder(&expr, TestExpr::visit_children, |node, children| {
            Ok(match node {
                TestExpr::Add(..) => format!("({} + {})", children[0], children[1]),
                TestExpr::Mul(..) => format!("({} * {})", children[0], children[1]),
                TestExpr::Value(v) => v.to_string(),
            })
        })
        .unwrap();
        assert_eq!(rendered, "(1 + (2 * 3))");
    }

    #[test]
    fn errors_stop_the_fold() {
        let expr = TestExpr::Add(
            Box::new(TestExpr::Value(1)),
            Box::new(TestExpr::Value(-1)),
        );
        let mut visited = Vec::new();
        let err = fold_postorder(&expr, TestExpr::visit_children, |node, _children| {
            if let TestExpr::Value(v) = node {
                visited.push(*v);
                if *v < 0 {
                    return Err(Error::InvalidArgumentError("negative".into()));
                }
            }
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, Error::InvalidArgumentError(_)));
        assert_eq!(visited, vec![1, -1]);
    }

    #[test]
    fn deeply_nested() {
        let mut expr = TestExpr::Value(1);
        for _ in 0..1000 {
            expr = TestExpr::Add(Box::new(expr), Box::new(TestExpr::Value(1)));
        }
        assert_eq!(traverse_postorder(&expr).unwrap(), 1001);
    }
}
