//! Physical plan nodes.

use std::fmt;
use std::sync::Arc;

use fedq_executor::GroupByOptions;
use fedq_expr::{Expression, Formula, VariableName};

use crate::datasource::DataSourceBuilder;

/// A node of the physical plan.
///
/// Nodes own their children; rewriting a plan builds a new tree. Data source
/// builders are the only shared component and are immutable.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub enum Node {
    /// Re-qualify every column of `source` with `qualifier`.
    Requalifier {
        qualifier: String,
        source: Box<Node>,
    },
    /// Keep the records of `source` for which `formula` holds.
    Filter { formula: Formula, source: Box<Node> },
    /// Group `source` by `key` and aggregate `fields`, one aggregate per field.
    GroupBy {
        source: Box<Node>,
        key: Vec<Expression>,
        fields: Vec<Expression>,
        /// Aggregate names, resolved through the registry at Materialize.
        aggregates: Vec<String>,
        /// Output column names: the key columns, then the aggregates.
        output: Vec<VariableName>,
        options: GroupByOptions,
    },
    /// Leaf reading from an external source, with a filter it should apply
    /// (or push down) itself.
    DataSource {
        alias: String,
        builder: Arc<dyn DataSourceBuilder>,
        filter: Formula,
    },
}

/// Field-less mirror of [`Node`] used as a dispatch key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Requalifier,
    Filter,
    GroupBy,
    DataSource,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Requalifier => "requalifier",
            NodeKind::Filter => "filter",
            NodeKind::GroupBy => "group by",
            NodeKind::DataSource => "data source",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Node {
    pub fn requalifier(qualifier: impl Into<String>, source: Node) -> Self {
        Node::Requalifier {
            qualifier: qualifier.into(),
            source: Box::new(source),
        }
    }

    pub fn filter(formula: Formula, source: Node) -> Self {
        Node::Filter {
            formula,
            source: Box::new(source),
        }
    }

    /// Grouping node with default options. `output` names the key columns
    /// followed by one column per aggregate.
    pub fn group_by(
        source: Node,
        key: Vec<Expression>,
        aggregates: impl IntoIterator<Item = (impl Into<String>, Expression)>,
        output: Vec<VariableName>,
    ) -> Self {
        let (aggregates, fields): (Vec<String>, Vec<Expression>) = aggregates
            .into_iter()
            .map(|(name, field)| (name.into(), field))
            .unzip();
        Node::GroupBy {
            source: Box::new(source),
            key,
            fields,
            aggregates,
            output,
            options: GroupByOptions::default(),
        }
    }

    /// Replace the options of a grouping node; other nodes are returned as is.
    pub fn with_group_by_options(self, options: GroupByOptions) -> Self {
        match self {
            Node::GroupBy {
                source,
                key,
                fields,
                aggregates,
                output,
                ..
            } => Node::GroupBy {
                source,
                key,
                fields,
                aggregates,
                output,
                options,
            },
            other => other,
        }
    }

    pub fn data_source(
        alias: impl Into<String>,
        builder: Arc<dyn DataSourceBuilder>,
        filter: Formula,
    ) -> Self {
        Node::DataSource {
            alias: alias.into(),
            builder,
            filter,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Requalifier { .. } => NodeKind::Requalifier,
            Node::Filter { .. } => NodeKind::Filter,
            Node::GroupBy { .. } => NodeKind::GroupBy,
            Node::DataSource { .. } => NodeKind::DataSource,
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Node::Requalifier {
                    qualifier: q1,
                    source: s1,
                },
                Node::Requalifier {
                    qualifier: q2,
                    source: s2,
                },
            ) => q1 == q2 && s1 == s2,
            (
                Node::Filter {
                    formula: f1,
                    source: s1,
                },
                Node::Filter {
                    formula: f2,
                    source: s2,
                },
            ) => f1 == f2 && s1 == s2,
            (
                Node::GroupBy {
                    source: s1,
                    key: k1,
                    fields: f1,
                    aggregates: a1,
                    output: o1,
                    options: p1,
                },
                Node::GroupBy {
                    source: s2,
                    key: k2,
                    fields: f2,
                    aggregates: a2,
                    output: o2,
                    options: p2,
                },
            ) => s1 == s2 && k1 == k2 && f1 == f2 && a1 == a2 && o1 == o2 && p1 == p2,
            (
                Node::DataSource {
                    alias: a1,
                    builder: b1,
                    filter: f1,
                },
                Node::DataSource {
                    alias: a2,
                    builder: b2,
                    filter: f2,
                },
            ) => a1 == a2 && Arc::ptr_eq(b1, b2) && f1 == f2,
            _ => false,
        }
    }
}
