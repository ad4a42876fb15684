use fedq_aggregate::descriptor;
use fedq_executor::{
    EmitMode, ExecutionContext, ExecutionNode, Expression, FilterExec, Formula, GroupByExec,
    GroupByOptions, RequalifierExec, ValuesExec,
};
use fedq_expr::{Relation, VariableName};
use fedq_result::Error;
use fedq_test_utils::{collect_ok, expect_err, init_tracing_for_tests};
use fedq_types::{QueryContext, Value};
use time::Duration;

fn events() -> ValuesExec {
    let rows = [
        ("checkout", 120, "ok"),
        ("search", 40, "ok"),
        ("checkout", 300, "timeout"),
        ("search", 60, "ok"),
        ("checkout", 90, "ok"),
    ];
    ValuesExec::from_rows(
        vec![
            VariableName::parse("e.endpoint"),
            VariableName::parse("e.latency"),
            VariableName::parse("e.status"),
        ],
        rows.iter()
            .map(|(endpoint, ms, status)| {
                vec![
                    Value::from(*endpoint),
                    Value::Duration(Duration::milliseconds(*ms)),
                    Value::from(*status),
                ]
            })
            .collect(),
    )
    .unwrap()
}

fn var(name: &str) -> Expression {
    Expression::Variable(VariableName::parse(name))
}

/// requalify(events as r) -> filter(status = "ok") -> avg(latency) by endpoint
fn pipeline() -> GroupByExec {
    let requalified = RequalifierExec::new("r", Box::new(events()));
    let filtered = FilterExec::new(
        Formula::Predicate {
            left: var("r.status"),
            relation: Relation::Equal,
            right: Expression::Constant(Value::from("ok")),
        },
        Box::new(requalified),
    );
    GroupByExec::new(
        Box::new(filtered),
        vec![var("r.endpoint")],
        vec![var("r.latency"), var("r.latency")],
        vec![descriptor("avg").unwrap(), descriptor("count").unwrap()],
        vec![
            VariableName::parse("endpoint"),
            VariableName::parse("avg_latency"),
            VariableName::parse("calls"),
        ],
        GroupByOptions::default().with_emit(EmitMode::Final),
    )
    .unwrap()
}

#[test]
fn filtered_grouped_average_over_requalified_source() {
    init_tracing_for_tests();

    let rows: Vec<Vec<Value>> = collect_ok(pipeline().get(&ExecutionContext::default()).unwrap())
        .into_iter()
        .map(|record| record.into_values())
        .collect();

    assert_eq!(
        rows,
        vec![
            vec![
                Value::from("checkout"),
                Value::Duration(Duration::milliseconds(105)),
                Value::Int(2),
            ],
            vec![
                Value::from("search"),
                Value::Duration(Duration::milliseconds(50)),
                Value::Int(2),
            ],
        ]
    );
}

#[test]
fn cancelled_context_stops_execution() {
    init_tracing_for_tests();

    let query = QueryContext::begin("cancelled");
    let ctx = ExecutionContext::new(query.clone());
    let exec = pipeline();

    query.cancel();
    match exec.get(&ctx) {
        Err(err) => assert!(matches!(err, Error::Cancelled(_))),
        Ok(stream) => assert!(matches!(expect_err(stream), Error::Cancelled(_))),
    }
}

#[test]
fn old_qualifier_no_longer_resolves() {
    let requalified = RequalifierExec::new("r", Box::new(events()));
    let filtered = FilterExec::new(
        Formula::Predicate {
            left: var("e.status"),
            relation: Relation::Equal,
            right: Expression::Constant(Value::from("ok")),
        },
        Box::new(requalified),
    );
    let err = expect_err(filtered.get(&ExecutionContext::default()).unwrap());
    assert!(matches!(err, Error::NotFound(msg) if msg.contains("e.status")));
}
