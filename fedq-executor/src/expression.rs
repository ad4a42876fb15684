//! Runtime expressions and formulas.
//!
//! These are the compiled counterparts of the physical trees in `fedq-expr`.
//! Formula evaluation is iterative and short-circuits `AND`/`OR`, so deep
//! conjunction chains neither overflow the stack nor evaluate predicates whose
//! outcome cannot matter.

use std::cmp::Ordering;

use fedq_expr::{Relation, VariableName};
use fedq_result::{Error, Result};
use fedq_types::Value;

use crate::like::like_match;
use crate::variables::Variables;

/// Compiled scalar expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    Variable(VariableName),
    Constant(Value),
    Tuple(Vec<Expression>),
}

impl Expression {
    pub fn evaluate(&self, variables: &Variables) -> Result<Value> {
        match self {
            Expression::Variable(name) => variables.get(name).cloned(),
            Expression::Constant(value) => Ok(value.clone()),
            Expression::Tuple(items) => items
                .iter()
                .map(|item| item.evaluate(variables))
                .collect::<Result<Vec<_>>>()
                .map(Value::Tuple),
        }
    }
}

/// Compiled boolean formula.
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

enum Frame<'a> {
    Enter(&'a Formula),
    AfterAndLeft(&'a Formula),
    AfterOrLeft(&'a Formula),
    ExitNot,
}

impl Formula {
    pub fn evaluate(&self, variables: &Variables) -> Result<bool> {
        let mut work_stack = vec![Frame::Enter(self)];
        let mut result_stack: Vec<bool> = Vec::new();

        while let Some(frame) = work_stack.pop() {
            match frame {
                Frame::Enter(formula) => match formula {
                    Formula::And(left, right) => {
                        work_stack.push(Frame::AfterAndLeft(right));
                        work_stack.push(Frame::Enter(left));
                    }
                    Formula::Or(left, right) => {
                        work_stack.push(Frame::AfterOrLeft(right));
                        work_stack.push(Frame::Enter(left));
                    }
                    Formula::Not(inner) => {
                        work_stack.push(Frame::ExitNot);
                        work_stack.push(Frame::Enter(inner));
                    }
                    Formula::Constant(value) => result_stack.push(*value),
                    Formula::Predicate {
                        left,
                        relation,
                        right,
                    } => {
                        let left = left.evaluate(variables)?;
                        let right = right.evaluate(variables)?;
                        result_stack.push(evaluate_relation(*relation, &left, &right)?);
                    }
                },
                // The right operand's result, if evaluated, becomes the result.
                Frame::AfterAndLeft(right) => {
                    if pop(&mut result_stack)? {
                        work_stack.push(Frame::Enter(right));
                    } else {
                        result_stack.push(false);
                    }
                }
                Frame::AfterOrLeft(right) => {
                    if pop(&mut result_stack)? {
                        result_stack.push(true);
                    } else {
                        work_stack.push(Frame::Enter(right));
                    }
                }
                Frame::ExitNot => {
                    let value = pop(&mut result_stack)?;
                    result_stack.push(!value);
                }
            }
        }

        let result = pop(&mut result_stack)?;
        if !result_stack.is_empty() {
            return Err(Error::internal(
                "formula evaluation left unconsumed results",
            ));
        }
        Ok(result)
    }
}

fn pop(stack: &mut Vec<bool>) -> Result<bool> {
    stack
        .pop()
        .ok_or_else(|| Error::internal("formula evaluation stack underflow"))
}

/// Apply `relation` to two evaluated operands.
///
/// Ordering relations involving `Null` are false. `IN` needs a tuple on the
/// right and tests membership by structural equality; `LIKE` needs two
/// strings.
pub fn evaluate_relation(relation: Relation, left: &Value, right: &Value) -> Result<bool> {
    match relation {
        Relation::Equal => Ok(left == right),
        Relation::NotEqual => Ok(left != right),
        Relation::MoreThan | Relation::LessThan if left.is_null() || right.is_null() => Ok(false),
        Relation::MoreThan => Ok(left.compare(right)? == Ordering::Greater),
        Relation::LessThan => Ok(left.compare(right)? == Ordering::Less),
        Relation::In => match right {
            Value::Tuple(items) => Ok(items.contains(left)),
            other => Err(Error::InvalidType {
                context: "IN",
                kind: other.kind().to_string(),
                value: other.to_string(),
            }),
        },
        Relation::Like => match (left, right) {
            (Value::String(value), Value::String(pattern)) => Ok(like_match(value, pattern)),
            (Value::String(_), other) | (other, _) => Err(Error::InvalidType {
                context: "LIKE",
                kind: other.kind().to_string(),
                value: other.to_string(),
            }),
        },
        other => Err(Error::internal(format!(
            "unsupported relation {other:?} reached evaluation"
        ))),
    }
}
