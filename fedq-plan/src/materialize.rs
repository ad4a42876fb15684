//! Materialize: compile physical trees into runtime operators.
//!
//! Compilation is post-order. A failure is wrapped in `Error::Compile` naming
//! the kind of the element whose compilation failed, and again by every
//! enclosing plan node, so the error's source chain spells out the path from
//! the root to the cause.

use fedq_aggregate::descriptor;
use fedq_executor::{self as exec, ExecutionNode, FilterExec, GroupByExec, RequalifierExec};
use fedq_expr::{Expression, Formula};
use fedq_result::{Error, Result};
use fedq_types::QueryContext;

use crate::node::Node;
use crate::traversal::{
    Traversable, expression_children, formula_children, take_one, take_two, traverse_postorder,
};

/// Compile `self` into its runtime counterpart.
///
/// Called once per query activation, before any record flows. `ctx` is
/// forwarded unchanged to every collaborator involved in the compilation.
pub trait Materialize {
    type Output;

    fn materialize(&self, ctx: &QueryContext) -> Result<Self::Output>;
}

impl Materialize for Node {
    type Output = Box<dyn ExecutionNode>;

    fn materialize(&self, ctx: &QueryContext) -> Result<Self::Output> {
        let kind = self.kind();
        tracing::debug!(kind = kind.as_str(), "materializing node");
        materialize_node(self, ctx).map_err(|err| Error::compile(kind.as_str(), err))
    }
}

fn materialize_node(node: &Node, ctx: &QueryContext) -> Result<Box<dyn ExecutionNode>> {
    ctx.check()?;
    match node {
        Node::Requalifier { qualifier, source } => {
            let source = source.materialize(ctx)?;
            Ok(Box::new(RequalifierExec::new(qualifier.clone(), source)))
        }
        Node::Filter { formula, source } => {
            let source = source.materialize(ctx)?;
            let formula = formula.materialize(ctx)?;
            Ok(Box::new(FilterExec::new(formula, source)))
        }
        Node::GroupBy {
            source,
            key,
            fields,
            aggregates,
            output,
            options,
        } => {
            let source = source.materialize(ctx)?;
            let key = key
                .iter()
                .map(|expr| expr.materialize(ctx))
                .collect::<Result<Vec<_>>>()?;
            let fields = fields
                .iter()
                .map(|expr| expr.materialize(ctx))
                .collect::<Result<Vec<_>>>()?;
            let aggregates = aggregates
                .iter()
                .map(|name| {
                    descriptor(name).ok_or_else(|| {
                        Error::InvalidArgumentError(format!("unknown aggregate '{name}'"))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            let exec = GroupByExec::new(source, key, fields, aggregates, output.clone(), *options)?;
            Ok(Box::new(exec))
        }
        Node::DataSource {
            alias,
            builder,
            filter,
        } => {
            tracing::debug!(source = builder.name(), alias = %alias, "materializing data source");
            builder.materialize(ctx, filter, alias)
        }
    }
}

impl Materialize for Formula {
    type Output = exec::Formula;

    fn materialize(&self, _ctx: &QueryContext) -> Result<Self::Output> {
        traverse_postorder(self)
    }
}

impl Materialize for Expression {
    type Output = exec::Expression;

    fn materialize(&self, _ctx: &QueryContext) -> Result<Self::Output> {
        traverse_postorder(self)
    }
}

impl Traversable for Formula {
    type Output = exec::Formula;

    fn visit_children(&self) -> Result<Vec<&Self>> {
        formula_children(self)
    }

    fn construct(&self, children: Vec<exec::Formula>) -> Result<exec::Formula> {
        let compiled = match self {
            Formula::And(..) => {
                let (left, right) = take_two(children)?;
                Ok(exec::Formula::And(Box::new(left), Box::new(right)))
            }
            Formula::Or(..) => {
                let (left, right) = take_two(children)?;
                Ok(exec::Formula::Or(Box::new(left), Box::new(right)))
            }
            Formula::Not(_) => take_one(children).map(|inner| exec::Formula::Not(Box::new(inner))),
            Formula::Constant(value) => Ok(exec::Formula::Constant(*value)),
            Formula::Predicate {
                left,
                relation,
                right,
            } => traverse_postorder(left).and_then(|left| {
                Ok(exec::Formula::Predicate {
                    left,
                    relation: *relation,
                    right: traverse_postorder(right)?,
                })
            }),
            other => Err(Error::internal(format!(
                "unsupported formula variant {other:?}"
            ))),
        };
        compiled.map_err(|err| Error::compile(self.kind().as_str(), err))
    }
}

impl Traversable for Expression {
    type Output = exec::Expression;

    fn visit_children(&self) -> Result<Vec<&Self>> {
        expression_children(self)
    }

    fn construct(&self, children: Vec<exec::Expression>) -> Result<exec::Expression> {
        match self {
            Expression::Variable(name) => Ok(exec::Expression::Variable(name.clone())),
            Expression::Constant(value) => Ok(exec::Expression::Constant(value.clone())),
            Expression::Tuple(_) => Ok(exec::Expression::Tuple(children)),
            other => Err(Error::compile(
                other.kind().as_str(),
                Error::internal(format!("unsupported expression variant {other:?}")),
            )),
        }
    }
}
