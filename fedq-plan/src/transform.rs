//! Transform: bottom-up rewriting of physical trees.
//!
//! Hooks are looked up in explicit per-kind dispatch tables. A tree is
//! rebuilt children first, then the hook registered for the rebuilt value's
//! kind (if any) is applied to it. Trees are never mutated in place.

use std::fmt;
use std::sync::Arc;

use fedq_expr::{Expression, ExpressionKind, Formula, FormulaKind};
use fedq_result::{Error, Result};
use fedq_types::QueryContext;
use rustc_hash::FxHashMap;

use crate::node::{Node, NodeKind};
use crate::traversal::{
    expression_children, fold_postorder, formula_children, take_one, take_two,
};

pub type NodeRewrite = Arc<dyn Fn(Node) -> Node + Send + Sync>;
pub type ExpressionRewrite = Arc<dyn Fn(Expression) -> Expression + Send + Sync>;
pub type FormulaRewrite = Arc<dyn Fn(Formula) -> Formula + Send + Sync>;

/// Rewrite hooks keyed by element kind. Missing entries are the identity.
#[derive(Clone, Default)]
pub struct Transformers {
    node: FxHashMap<NodeKind, NodeRewrite>,
    expression: FxHashMap<ExpressionKind, ExpressionRewrite>,
    formula: FxHashMap<FormulaKind, FormulaRewrite>,
}

impl Transformers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node<F>(mut self, kind: NodeKind, rewrite: F) -> Self
    where
        F: Fn(Node) -> Node + Send + Sync + 'static,
    {
        self.node.insert(kind, Arc::new(rewrite));
        self
    }

    pub fn with_expression<F>(mut self, kind: ExpressionKind, rewrite: F) -> Self
    where
        F: Fn(Expression) -> Expression + Send + Sync + 'static,
    {
        self.expression.insert(kind, Arc::new(rewrite));
        self
    }

    pub fn with_formula<F>(mut self, kind: FormulaKind, rewrite: F) -> Self
    where
        F: Fn(Formula) -> Formula + Send + Sync + 'static,
    {
        self.formula.insert(kind, Arc::new(rewrite));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.node.is_empty() && self.expression.is_empty() && self.formula.is_empty()
    }

    fn rewrite_node(&self, node: Node) -> Node {
        match self.node.get(&node.kind()) {
            Some(rewrite) => rewrite(node),
            None => node,
        }
    }

    fn rewrite_expression(&self, expr: Expression) -> Expression {
        match self.expression.get(&expr.kind()) {
            Some(rewrite) => rewrite(expr),
            None => expr,
        }
    }

    fn rewrite_formula(&self, formula: Formula) -> Formula {
        match self.formula.get(&formula.kind()) {
            Some(rewrite) => rewrite(formula),
            None => formula,
        }
    }
}

impl fmt::Debug for Transformers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transformers")
            .field("node", &self.node.keys().collect::<Vec<_>>())
            .field("expression", &self.expression.keys().collect::<Vec<_>>())
            .field("formula", &self.formula.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Produce a rewritten copy of `self`.
pub trait Transform: Sized {
    fn transform(&self, ctx: &QueryContext, transformers: &Transformers) -> Result<Self>;
}

impl Transform for Node {
    fn transform(&self, ctx: &QueryContext, transformers: &Transformers) -> Result<Self> {
        ctx.check()?;
        let rebuilt = match self {
            Node::Requalifier { qualifier, source } => Node::Requalifier {
                qualifier: qualifier.clone(),
                source: Box::new(source.transform(ctx, transformers)?),
            },
            Node::Filter { formula, source } => Node::Filter {
                formula: formula.transform(ctx, transformers)?,
                source: Box::new(source.transform(ctx, transformers)?),
            },
            Node::GroupBy {
                source,
                key,
                fields,
                aggregates,
                output,
                options,
            } => Node::GroupBy {
                source: Box::new(source.transform(ctx, transformers)?),
                key: transform_all(key, ctx, transformers)?,
                fields: transform_all(fields, ctx, transformers)?,
                aggregates: aggregates.clone(),
                output: output.clone(),
                options: *options,
            },
            Node::DataSource {
                alias,
                builder,
                filter,
            } => Node::DataSource {
                alias: alias.clone(),
                builder: Arc::clone(builder),
                filter: filter.transform(ctx, transformers)?,
            },
        };
        Ok(transformers.rewrite_node(rebuilt))
    }
}

fn transform_all(
    exprs: &[Expression],
    ctx: &QueryContext,
    transformers: &Transformers,
) -> Result<Vec<Expression>> {
    exprs
        .iter()
        .map(|expr| expr.transform(ctx, transformers))
        .collect()
}

impl Transform for Formula {
    fn transform(&self, ctx: &QueryContext, transformers: &Transformers) -> Result<Self> {
        if transformers.formula.is_empty() && transformers.expression.is_empty() {
            return Ok(self.clone());
        }
        fold_postorder(self, formula_children, |formula, children| {
            let rebuilt = match formula {
                Formula::And(..) => {
                    let (left, right) = take_two(children)?;
                    Formula::and(left, right)
                }
                Formula::Or(..) => {
                    let (left, right) = take_two(children)?;
                    Formula::or(left, right)
                }
                Formula::Not(_) => Formula::not(take_one(children)?),
                Formula::Constant(value) => Formula::Constant(*value),
                Formula::Predicate {
                    left,
                    relation,
                    right,
                } => Formula::Predicate {
                    left: left.transform(ctx, transformers)?,
                    relation: *relation,
                    right: right.transform(ctx, transformers)?,
                },
                other => {
                    return Err(Error::internal(format!(
                        "unsupported formula variant {other:?}"
                    )));
                }
            };
            Ok(transformers.rewrite_formula(rebuilt))
        })
    }
}

impl Transform for Expression {
    fn transform(&self, _ctx: &QueryContext, transformers: &Transformers) -> Result<Self> {
        if transformers.expression.is_empty() {
            return Ok(self.clone());
        }
        fold_postorder(self, expression_children, |expr, children| {
            let rebuilt = match expr {
                Expression::Variable(name) => Expression::Variable(name.clone()),
                Expression::Constant(value) => Expression::Constant(value.clone()),
                Expression::Tuple(_) => Expression::Tuple(children),
                other => {
                    return Err(Error::internal(format!(
                        "unsupported expression variant {other:?}"
                    )));
                }
            };
            Ok(transformers.rewrite_expression(rebuilt))
        })
    }
}
