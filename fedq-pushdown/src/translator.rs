//! Translation of formulas into a parameterised SQL `WHERE` fragment.
//!
//! Columns of the native source are emitted by name. Every other expression
//! (columns of other sources, constants, tuples) becomes a numbered
//! placeholder whose value is computed locally and bound as a query
//! parameter at execution time.

use fedq_executor as exec;
use fedq_executor::Variables;
use fedq_expr::{Expression, Formula, Relation};
use fedq_plan::Materialize;
use fedq_plan::traversal::{fold_postorder, formula_children};
use fedq_result::{Error, Result};
use fedq_types::{QueryContext, Value};

use crate::dialect::Dialect;

/// Placeholder table built while translating one formula.
///
/// Entries are kept in allocation order, which is also the textual order of
/// the placeholders in the generated fragment.
#[derive(Clone, Debug, PartialEq)]
pub struct Aliases {
    entries: Vec<(String, Expression)>,
    counter: usize,
    alias: String,
    dialect: Dialect,
}

impl Aliases {
    pub fn new(alias: impl Into<String>, dialect: &Dialect) -> Self {
        Self {
            entries: Vec::new(),
            counter: 1,
            alias: alias.into(),
            dialect: dialect.clone(),
        }
    }

    /// Alias of the source whose columns are referenced natively.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Allocate the next placeholder. Placeholders are never reused.
    pub fn new_placeholder(&mut self) -> String {
        let placeholder = format!("{}{}", self.dialect.placeholder_prefix, self.counter);
        self.counter += 1;
        placeholder
    }

    pub fn get(&self, placeholder: &str) -> Option<&Expression> {
        self.entries
            .iter()
            .find(|(p, _)| p == placeholder)
            .map(|(_, expr)| expr)
    }

    pub fn entries(&self) -> &[(String, Expression)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn record(&mut self, expr: &Expression) -> String {
        let placeholder = self.new_placeholder();
        self.entries.push((placeholder.clone(), expr.clone()));
        placeholder
    }

    /// Compile every recorded expression for local evaluation.
    pub fn materialize(&self, ctx: &QueryContext) -> Result<ExecutionAliases> {
        let entries = self
            .entries
            .iter()
            .map(|(placeholder, expr)| match expr.materialize(ctx) {
                Ok(compiled) => Ok((placeholder.clone(), compiled)),
                Err(err) => {
                    tracing::debug!(
                        placeholder = %placeholder,
                        error = %err,
                        "placeholder failed to compile"
                    );
                    Err(Error::compile("expression", err))
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(ExecutionAliases { entries })
    }
}

/// Compiled placeholder table.
#[derive(Clone, Debug, PartialEq)]
pub struct ExecutionAliases {
    entries: Vec<(String, exec::Expression)>,
}

impl ExecutionAliases {
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(p, _)| p.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Evaluate every placeholder against `variables`, in placeholder order.
    /// Element `i` is the value of parameter `i + 1`.
    pub fn bind(&self, variables: &Variables) -> Result<Vec<Value>> {
        self.entries
            .iter()
            .map(|(_, expr)| expr.evaluate(variables))
            .collect()
    }
}

/// A translated `WHERE` fragment and its placeholder table.
#[derive(Clone, Debug, PartialEq)]
pub struct PushdownFragment {
    pub sql: String,
    pub aliases: Aliases,
}

pub fn relation_to_sql(relation: Relation) -> Result<&'static str> {
    match relation {
        Relation::Equal => Ok("="),
        Relation::NotEqual => Ok("<>"),
        Relation::MoreThan => Ok(">"),
        Relation::LessThan => Ok("<"),
        Relation::In => Ok("IN"),
        Relation::Like => Ok("LIKE"),
        other => Err(Error::internal(format!("invalid relation {other:?}"))),
    }
}

pub fn expression_to_sql(expr: &Expression, aliases: &mut Aliases) -> String {
    if let Expression::Variable(name) = expr
        && name.source() == Some(aliases.alias())
    {
        return name.name().to_string();
    }
    aliases.record(expr)
}

/// Render `formula` as SQL in the dialect of `aliases`, recording
/// placeholders in it.
///
/// Every operand is parenthesised, so the output never depends on the
/// dialect's operator precedence.
pub fn formula_to_sql(formula: &Formula, aliases: &mut Aliases) -> Result<String> {
    fold_postorder(formula, formula_children, |formula, children| {
        match formula {
            Formula::And(..) => {
                let [left, right] = binary(children)?;
                Ok(format!("({left}) AND ({right})"))
            }
            Formula::Or(..) => {
                let [left, right] = binary(children)?;
                Ok(format!("({left}) OR ({right})"))
            }
            Formula::Not(_) => {
                let [child]: [String; 1] = children
                    .try_into()
                    .map_err(|_| Error::internal("NOT expects one operand"))?;
                Ok(format!("NOT ({child})"))
            }
            Formula::Constant(value) => Ok(aliases.dialect.bool_token(*value).to_string()),
            Formula::Predicate {
                left,
                relation,
                right,
            } => {
                let left = expression_to_sql(left, aliases);
                let right = expression_to_sql(right, aliases);
                let relation = relation_to_sql(*relation)?;
                Ok(format!("({left}) {relation} ({right})"))
            }
            other => Err(Error::internal(format!(
                "unknown formula variant {other:?}"
            ))),
        }
    })
}

fn binary(children: Vec<String>) -> Result<[String; 2]> {
    children
        .try_into()
        .map_err(|_| Error::internal("binary formula expects two operands"))
}

/// Translate `formula` for the source known locally as `alias`.
pub fn translate(formula: &Formula, alias: &str, dialect: &Dialect) -> Result<PushdownFragment> {
    let mut aliases = Aliases::new(alias, dialect);
    let sql = formula_to_sql(formula, &mut aliases)?;
    tracing::debug!(
        alias,
        sql = %sql,
        placeholders = aliases.len(),
        "translated pushdown filter"
    );
    Ok(PushdownFragment { sql, aliases })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fedq_expr::VariableName;

    fn native(column: &str) -> Expression {
        Expression::variable(VariableName::qualified("t", column))
    }

    fn foreign(source: &str, column: &str) -> Expression {
        Expression::variable(VariableName::qualified(source, column))
    }

    #[test]
    fn native_columns_are_inlined_and_foreign_ones_bound() {
        let formula = Formula::predicate(native("a"), Relation::Equal, foreign("u", "b"));
        let fragment = translate(&formula, "t", &Dialect::postgres()).unwrap();
        assert_eq!(fragment.sql, "(a) = ($1)");
        assert_eq!(fragment.aliases.len(), 1);
        assert_eq!(fragment.aliases.get("$1"), Some(&foreign("u", "b")));
    }

    #[test]
    fn placeholders_are_never_reused() {
        let formula = Formula::and(
            Formula::predicate(native("a"), Relation::Equal, foreign("u", "b")),
            Formula::predicate(native("c"), Relation::LessThan, foreign("u", "b")),
        );
        let fragment = translate(&formula, "t", &Dialect::postgres()).unwrap();
        assert_eq!(fragment.sql, "((a) = ($1)) AND ((c) < ($2))");
        let placeholders: Vec<&str> = fragment
            .aliases
            .entries()
            .iter()
            .map(|(p, _)| p.as_str())
            .collect();
        assert_eq!(placeholders, vec!["$1", "$2"]);
    }

    #[test]
    fn every_relation_has_a_token() {
        let cases = [
            (Relation::Equal, "="),
            (Relation::NotEqual, "<>"),
            (Relation::MoreThan, ">"),
            (Relation::LessThan, "<"),
            (Relation::In, "IN"),
            (Relation::Like, "LIKE"),
        ];
        for (relation, token) in cases {
            assert_eq!(relation_to_sql(relation).unwrap(), token);
        }
    }

    #[test]
    fn connectives_and_constants_are_parenthesised() {
        let formula = Formula::or(
            Formula::not(Formula::predicate(
                native("name"),
                Relation::Like,
                Expression::constant("a%"),
            )),
            Formula::and(Formula::Constant(true), Formula::Constant(false)),
        );
        let fragment = translate(&formula, "t", &Dialect::postgres()).unwrap();
        assert_eq!(
            fragment.sql,
            "(NOT ((name) LIKE ($1))) OR ((TRUE) AND (FALSE))"
        );
        assert_eq!(
            fragment.aliases.get("$1"),
            Some(&Expression::constant("a%"))
        );
    }

    #[test]
    fn nested_clauses_are_fully_parenthesised() {
        let formula = Formula::and(
            Formula::predicate(native("a"), Relation::Equal, Expression::constant(1)),
            Formula::or(
                Formula::predicate(native("b"), Relation::MoreThan, foreign("u", "b")),
                Formula::not(Formula::predicate(
                    native("c"),
                    Relation::In,
                    Expression::tuple([Expression::constant(1), Expression::constant(2)]),
                )),
            ),
        );
        let fragment = translate(&formula, "t", &Dialect::postgres()).unwrap();
        assert_eq!(
            fragment.sql,
            "((a) = ($1)) AND (((b) > ($2)) OR (NOT ((c) IN ($3))))"
        );
    }

    #[test]
    fn unqualified_and_tuple_operands_become_placeholders() {
        let formula = Formula::predicate(
            Expression::variable("a"),
            Relation::In,
            Expression::tuple([native("x"), Expression::constant(1)]),
        );
        let fragment = translate(&formula, "t", &Dialect::postgres()).unwrap();
        assert_eq!(fragment.sql, "($1) IN ($2)");
        assert_eq!(fragment.aliases.len(), 2);
    }

    #[test]
    fn dialect_controls_tokens() {
        let dialect = Dialect::postgres()
            .with_placeholder_prefix(":p")
            .with_bool_tokens("1 = 1", "1 = 0");
        let formula = Formula::and(
            Formula::Constant(true),
            Formula::predicate(native("a"), Relation::MoreThan, Expression::constant(3)),
        );
        let fragment = translate(&formula, "t", &dialect).unwrap();
        assert_eq!(fragment.sql, "(1 = 1) AND ((a) > (:p1))");
    }

    #[test]
    fn deep_conjunctions_translate_iteratively() {
        let formula = Formula::all_of((0..2_000).map(|i| {
            Formula::predicate(native("a"), Relation::NotEqual, Expression::constant(i as i64))
        }));
        let fragment = translate(&formula, "t", &Dialect::postgres()).unwrap();
        assert_eq!(fragment.aliases.len(), 2_000);
        assert!(fragment.sql.ends_with("((a) <> ($2000))"));
    }

    #[test]
    fn bind_evaluates_in_placeholder_order() {
        let formula = Formula::and(
            Formula::predicate(native("a"), Relation::MoreThan, foreign("p", "low")),
            Formula::predicate(native("a"), Relation::LessThan, foreign("p", "high")),
        );
        let fragment = translate(&formula, "t", &Dialect::postgres()).unwrap();
        let compiled = fragment.aliases.materialize(&QueryContext::new()).unwrap();
        let placeholders: Vec<&str> = compiled.placeholders().collect();
        assert_eq!(placeholders, vec!["$1", "$2"]);

        let variables = Variables::from_bindings([
            (VariableName::qualified("p", "high"), Value::Int(20)),
            (VariableName::qualified("p", "low"), Value::Int(5)),
        ]);
        assert_eq!(
            compiled.bind(&variables).unwrap(),
            vec![Value::Int(5), Value::Int(20)]
        );
    }

    #[test]
    fn bind_fails_on_missing_variables() {
        let formula = Formula::predicate(native("a"), Relation::Equal, foreign("p", "missing"));
        let fragment = translate(&formula, "t", &Dialect::postgres()).unwrap();
        let compiled = fragment.aliases.materialize(&QueryContext::new()).unwrap();
        let err = compiled.bind(&Variables::new()).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
