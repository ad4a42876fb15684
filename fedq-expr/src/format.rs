//! Lightweight formatting helpers for expression enums.

use std::fmt;

use crate::{Expression, ExpressionKind, Formula, FormulaKind, Relation};

impl Relation {
    /// Render the relation as the token shown in plan displays.
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::Equal => "=",
            Relation::NotEqual => "<>",
            Relation::MoreThan => ">",
            Relation::LessThan => "<",
            Relation::In => "IN",
            Relation::Like => "LIKE",
        }
    }
}

impl ExpressionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpressionKind::Variable => "variable",
            ExpressionKind::Constant => "constant",
            ExpressionKind::Tuple => "tuple",
        }
    }
}

impl FormulaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormulaKind::And => "and",
            FormulaKind::Or => "or",
            FormulaKind::Not => "not",
            FormulaKind::Constant => "constant formula",
            FormulaKind::Predicate => "predicate",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Variable(name) => write!(f, "{name}"),
            Expression::Constant(value) => write!(f, "{value}"),
            Expression::Tuple(items) => {
                f.write_str("(")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formula::And(left, right) => write!(f, "({left}) AND ({right})"),
            Formula::Or(left, right) => write!(f, "({left}) OR ({right})"),
            Formula::Not(inner) => write!(f, "NOT ({inner})"),
            Formula::Constant(true) => f.write_str("TRUE"),
            Formula::Constant(false) => f.write_str("FALSE"),
            Formula::Predicate {
                left,
                relation,
                right,
            } => write!(f, "{left} {relation} {right}"),
        }
    }
}
