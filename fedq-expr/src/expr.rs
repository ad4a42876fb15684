//! Expression and formula trees.

use fedq_types::Value;

use crate::name::VariableName;

/// Comparison relation of a predicate.
///
/// The set is closed. It is marked non-exhaustive so that every match site
/// outside this crate carries an explicit branch for an unknown relation and
/// reports it as an internal-invariant error instead of guessing.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Relation {
    Equal,
    NotEqual,
    MoreThan,
    LessThan,
    In,
    Like,
}

/// Scalar expression.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    Variable(VariableName),
    Constant(Value),
    Tuple(Vec<Expression>),
}

/// Field-less mirror of [`Expression`] used as a dispatch key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExpressionKind {
    Variable,
    Constant,
    Tuple,
}

/// Boolean formula over predicates.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq)]
pub enum Formula {
    And(Box<Formula>, Box<Formula>),
    Or(Box<Formula>, Box<Formula>),
    Not(Box<Formula>),
    Constant(bool),
    Predicate {
        left: Expression,
        relation: Relation,
        right: Expression,
    },
}

/// Field-less mirror of [`Formula`] used as a dispatch key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FormulaKind {
    And,
    Or,
    Not,
    Constant,
    Predicate,
}

impl Expression {
    pub fn variable(name: impl Into<VariableName>) -> Self {
        Expression::Variable(name.into())
    }

    pub fn constant(value: impl Into<Value>) -> Self {
        Expression::Constant(value.into())
    }

    pub fn tuple(items: impl IntoIterator<Item = Expression>) -> Self {
        Expression::Tuple(items.into_iter().collect())
    }

    pub fn kind(&self) -> ExpressionKind {
        match self {
            Expression::Variable(_) => ExpressionKind::Variable,
            Expression::Constant(_) => ExpressionKind::Constant,
            Expression::Tuple(_) => ExpressionKind::Tuple,
        }
    }

    /// Every variable referenced by this expression, in left-to-right order.
    pub fn variables(&self) -> Vec<&VariableName> {
        let mut out = Vec::new();
        collect_expression_variables(self, &mut out);
        out
    }
}

impl Formula {
    pub fn and(left: Formula, right: Formula) -> Self {
        Formula::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Formula, right: Formula) -> Self {
        Formula::Or(Box::new(left), Box::new(right))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(inner: Formula) -> Self {
        Formula::Not(Box::new(inner))
    }

    pub fn predicate(left: Expression, relation: Relation, right: Expression) -> Self {
        Formula::Predicate {
            left,
            relation,
            right,
        }
    }

    /// Left-deep AND chain of `formulas`; `Constant(true)` when empty.
    pub fn all_of(formulas: impl IntoIterator<Item = Formula>) -> Self {
        let mut iter = formulas.into_iter();
        match iter.next() {
            Some(first) => iter.fold(first, Formula::and),
            None => Formula::Constant(true),
        }
    }

    /// Left-deep OR chain of `formulas`; `Constant(false)` when empty.
    pub fn any_of(formulas: impl IntoIterator<Item = Formula>) -> Self {
        let mut iter = formulas.into_iter();
        match iter.next() {
            Some(first) => iter.fold(first, Formula::or),
            None => Formula::Constant(false),
        }
    }

    pub fn kind(&self) -> FormulaKind {
        match self {
            Formula::And(..) => FormulaKind::And,
            Formula::Or(..) => FormulaKind::Or,
            Formula::Not(_) => FormulaKind::Not,
            Formula::Constant(_) => FormulaKind::Constant,
            Formula::Predicate { .. } => FormulaKind::Predicate,
        }
    }

    /// Every variable referenced by this formula's predicates, in
    /// left-to-right order.
    pub fn variables(&self) -> Vec<&VariableName> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(formula) = stack.pop() {
            match formula {
                Formula::And(left, right) | Formula::Or(left, right) => {
                    stack.push(right);
                    stack.push(left);
                }
                Formula::Not(inner) => stack.push(inner),
                Formula::Constant(_) => {}
                Formula::Predicate { left, right, .. } => {
                    collect_expression_variables(left, &mut out);
                    collect_expression_variables(right, &mut out);
                }
            }
        }
        out
    }

    /// Split a formula into its top-level AND conjuncts.
    pub fn conjuncts(&self) -> Vec<&Formula> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(formula) = stack.pop() {
            match formula {
                Formula::And(left, right) => {
                    stack.push(right);
                    stack.push(left);
                }
                other => out.push(other),
            }
        }
        out
    }
}

fn collect_expression_variables<'a>(expr: &'a Expression, out: &mut Vec<&'a VariableName>) {
    let mut stack = vec![expr];
    while let Some(expr) = stack.pop() {
        match expr {
            Expression::Variable(name) => out.push(name),
            Expression::Constant(_) => {}
            Expression::Tuple(items) => stack.extend(items.iter().rev()),
        }
    }
}
