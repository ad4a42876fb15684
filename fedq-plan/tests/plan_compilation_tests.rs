use std::sync::Arc;

use fedq_executor::{EmitMode, ExecutionContext, GroupByOptions, Record};
use fedq_expr::{Expression, ExpressionKind, Formula, FormulaKind, Relation, VariableName};
use fedq_plan::{InMemorySource, Materialize, Node, NodeKind, Transform, Transformers};
use fedq_result::Error;
use fedq_test_utils::{collect_ok, init_tracing_for_tests};
use fedq_types::{QueryContext, Value};

fn orders() -> Arc<InMemorySource> {
    let rows = [
        ("eu", "alice", 30),
        ("us", "bob", 12),
        ("eu", "carol", 18),
        ("us", "dave", 50),
        ("apac", "erin", 7),
    ];
    Arc::new(
        InMemorySource::new(
            "orders",
            vec!["region".into(), "customer".into(), "amount".into()],
            rows.iter()
                .map(|(region, customer, amount)| {
                    vec![
                        Value::from(*region),
                        Value::from(*customer),
                        Value::Int(*amount),
                    ]
                })
                .collect(),
        )
        .unwrap(),
    )
}

fn var(name: &str) -> Expression {
    Expression::variable(VariableName::parse(name))
}

/// SELECT region, max(amount), count(amount) FROM orders o
/// WHERE amount > 10 GROUP BY region
fn totals_by_region(aggregate: &str) -> Node {
    let scan = Node::data_source(
        "o",
        orders(),
        Formula::predicate(var("o.amount"), Relation::MoreThan, Expression::constant(10)),
    );
    Node::group_by(
        Node::requalifier("t", scan),
        vec![var("t.region")],
        [(aggregate, var("t.amount")), ("count", var("t.amount"))],
        vec![
            VariableName::unqualified("region"),
            VariableName::unqualified("top"),
            VariableName::unqualified("orders"),
        ],
    )
    .with_group_by_options(GroupByOptions::default().with_emit(EmitMode::Final))
}

fn run(plan: &Node) -> Vec<Record> {
    let query = QueryContext::begin("plan-test");
    let exec = plan.materialize(&query).unwrap();
    collect_ok(exec.get(&ExecutionContext::new(query)).unwrap())
}

#[test]
fn materialized_plan_executes_end_to_end() {
    init_tracing_for_tests();
    let rows: Vec<Vec<Value>> = run(&totals_by_region("max"))
        .into_iter()
        .map(Record::into_values)
        .collect();
    assert_eq!(
        rows,
        vec![
            vec![Value::from("eu"), Value::Int(30), Value::Int(2)],
            vec![Value::from("us"), Value::Int(50), Value::Int(2)],
        ]
    );
}

#[test]
fn unknown_aggregate_reports_compile_path() {
    init_tracing_for_tests();
    let plan = Node::requalifier("outer", totals_by_region("median"));
    let err = plan.materialize(&QueryContext::new()).unwrap_err();
    assert_eq!(err.compile_path(), vec!["requalifier", "group by"]);
    assert!(matches!(
        err.root_cause(),
        Error::InvalidArgumentError(msg) if msg.contains("median")
    ));
    assert!(err.to_string().starts_with("couldn't materialize requalifier: "));
}

#[test]
fn malformed_group_by_fails_inside_enclosing_filter() {
    // One key plus one aggregate, but a single output column.
    let scan = Node::data_source("o", orders(), Formula::Constant(true));
    let plan = Node::filter(
        Formula::predicate(var("o.region"), Relation::Equal, Expression::constant("eu")),
        Node::GroupBy {
            source: Box::new(scan),
            key: vec![var("o.region")],
            fields: vec![var("o.amount")],
            aggregates: vec!["sum".into()],
            output: vec![VariableName::unqualified("region")],
            options: GroupByOptions::default(),
        },
    );
    let err = plan.materialize(&QueryContext::new()).unwrap_err();
    assert_eq!(err.compile_path(), vec!["filter", "group by"]);
    assert!(matches!(err.root_cause(), Error::InvalidArgumentError(_)));
}

#[test]
fn cancelled_queries_do_not_materialize() {
    let ctx = QueryContext::new();
    ctx.cancel();
    let err = totals_by_region("max").materialize(&ctx).unwrap_err();
    assert_eq!(err.compile_path(), vec!["group by"]);
    assert!(matches!(err.root_cause(), Error::Cancelled(_)));
}

#[test]
fn transform_without_hooks_returns_an_equal_plan() {
    let plan = totals_by_region("max");
    let out = plan
        .transform(&QueryContext::new(), &Transformers::new())
        .unwrap();
    assert_eq!(out, plan);
}

#[test]
fn transform_rewrites_then_materializes() {
    init_tracing_for_tests();
    // Swap the aggregate on every grouping node and tighten the scan filter.
    let transformers = Transformers::new()
        .with_node(NodeKind::GroupBy, |node| match node {
            Node::GroupBy {
                source,
                key,
                fields,
                output,
                options,
                ..
            } => Node::GroupBy {
                source,
                key,
                fields,
                aggregates: vec!["min".into(), "count".into()],
                output,
                options,
            },
            other => other,
        })
        .with_expression(ExpressionKind::Constant, |expr| match expr {
            Expression::Constant(Value::Int(10)) => Expression::constant(15),
            other => other,
        });

    let original = totals_by_region("max");
    let rewritten = original
        .transform(&QueryContext::new(), &transformers)
        .unwrap();
    assert_ne!(rewritten, original);

    let rows: Vec<Vec<Value>> = run(&rewritten)
        .into_iter()
        .map(Record::into_values)
        .collect();
    assert_eq!(
        rows,
        vec![
            vec![Value::from("eu"), Value::Int(18), Value::Int(2)],
            vec![Value::from("us"), Value::Int(50), Value::Int(1)],
        ]
    );

    // The original plan is untouched.
    let rows: Vec<Vec<Value>> = run(&original)
        .into_iter()
        .map(Record::into_values)
        .collect();
    assert_eq!(rows[0], vec![Value::from("eu"), Value::Int(30), Value::Int(2)]);
}

#[test]
fn formula_hooks_apply_inside_node_filters() {
    let transformers = Transformers::new().with_formula(FormulaKind::Predicate, |_| {
        Formula::Constant(true)
    });
    let rewritten = totals_by_region("max")
        .transform(&QueryContext::new(), &transformers)
        .unwrap();
    let rows = run(&rewritten);
    // Without the amount filter "apac" shows up as well.
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2].values()[0], Value::from("apac"));
}
