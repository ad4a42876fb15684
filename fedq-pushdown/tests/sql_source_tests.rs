use std::sync::{Arc, Mutex};

use fedq_executor::{EmitMode, ExecutionContext, GroupByOptions, Record, RecordIter, Variables};
use fedq_expr::{Expression, Formula, Relation, VariableName};
use fedq_plan::{Materialize, Node};
use fedq_pushdown::{Dialect, SqlClient, SqlSourceBuilder};
use fedq_result::{Error, Result};
use fedq_test_utils::{collect_ok, expect_err, init_tracing_for_tests};
use fedq_types::{QueryContext, Value};
use time::Duration;

/// Serves a fixed table and records every query it receives.
#[derive(Debug)]
struct FakeWarehouse {
    columns: Vec<&'static str>,
    rows: Vec<Vec<Value>>,
    queries: Mutex<Vec<(String, Vec<Value>)>>,
}

impl FakeWarehouse {
    fn requests() -> Arc<Self> {
        let rows = [
            ("checkout", 120),
            ("search", 40),
            ("checkout", 300),
            ("search", 60),
        ];
        Arc::new(Self {
            columns: vec!["endpoint", "latency"],
            rows: rows
                .iter()
                .map(|(endpoint, ms)| {
                    vec![
                        Value::from(*endpoint),
                        Value::Duration(Duration::milliseconds(*ms)),
                    ]
                })
                .collect(),
            queries: Mutex::new(Vec::new()),
        })
    }

    fn queries(&self) -> Vec<(String, Vec<Value>)> {
        self.queries.lock().unwrap().clone()
    }
}

impl SqlClient for FakeWarehouse {
    fn query(&self, sql: &str, params: &[Value]) -> Result<RecordIter> {
        self.queries
            .lock()
            .map_err(|_| Error::internal("query log poisoned"))?
            .push((sql.to_string(), params.to_vec()));
        let fields: Vec<VariableName> = self
            .columns
            .iter()
            .map(|column| VariableName::unqualified(*column))
            .collect();
        let records = self
            .rows
            .iter()
            .map(|row| Record::new(fields.clone(), row.clone()))
            .collect::<Vec<_>>();
        Ok(Box::new(records.into_iter()))
    }
}

fn var(name: &str) -> Expression {
    Expression::variable(VariableName::parse(name))
}

#[test]
fn pushed_filter_binds_outer_variables_per_activation() {
    init_tracing_for_tests();
    let warehouse = FakeWarehouse::requests();
    let scan = Node::data_source(
        "r",
        Arc::new(SqlSourceBuilder::new("requests", warehouse.clone())),
        Formula::and(
            Formula::predicate(var("r.endpoint"), Relation::Equal, var("q.endpoint")),
            Formula::predicate(var("r.latency"), Relation::MoreThan, var("q.threshold")),
        ),
    );
    let plan = Node::group_by(
        scan,
        vec![var("r.endpoint")],
        [("avg", var("r.latency"))],
        vec![
            VariableName::unqualified("endpoint"),
            VariableName::unqualified("mean"),
        ],
    )
    .with_group_by_options(GroupByOptions::default().with_emit(EmitMode::Final));

    let query = QueryContext::begin("pushdown");
    let exec = plan.materialize(&query).unwrap();

    for (endpoint, threshold) in [("checkout", 100), ("search", 50)] {
        let ctx = ExecutionContext::new(query.clone()).with_variables(Variables::from_bindings([
            (VariableName::qualified("q", "endpoint"), Value::from(endpoint)),
            (
                VariableName::qualified("q", "threshold"),
                Value::Duration(Duration::milliseconds(threshold)),
            ),
        ]));
        collect_ok(exec.get(&ctx).unwrap());
    }

    let queries = warehouse.queries();
    let expected_sql =
        "SELECT * FROM requests r WHERE ((endpoint) = ($1)) AND ((latency) > ($2))";
    assert_eq!(queries.len(), 2);
    assert_eq!(queries[0].0, expected_sql);
    assert_eq!(queries[1].0, expected_sql);
    assert_eq!(
        queries[0].1,
        vec![
            Value::from("checkout"),
            Value::Duration(Duration::milliseconds(100))
        ]
    );
    assert_eq!(
        queries[1].1,
        vec![Value::from("search"), Value::Duration(Duration::milliseconds(50))]
    );
}

#[test]
fn records_from_the_client_are_qualified_with_the_alias() {
    let warehouse = FakeWarehouse::requests();
    let plan = Node::data_source(
        "r",
        Arc::new(SqlSourceBuilder::new("requests", warehouse.clone())),
        Formula::Constant(true),
    );
    let query = QueryContext::new();
    let exec = plan.materialize(&query).unwrap();
    let records = collect_ok(exec.get(&ExecutionContext::new(query)).unwrap());

    assert_eq!(records.len(), 4);
    assert_eq!(
        records[0].fields(),
        &[
            VariableName::qualified("r", "endpoint"),
            VariableName::qualified("r", "latency"),
        ]
    );
    assert_eq!(
        warehouse.queries()[0].0,
        "SELECT * FROM requests r WHERE TRUE"
    );
}

#[test]
fn grouped_averages_over_pushed_rows() {
    let warehouse = FakeWarehouse::requests();
    let plan = Node::group_by(
        Node::data_source(
            "r",
            Arc::new(SqlSourceBuilder::new("requests", warehouse)),
            Formula::Constant(true),
        ),
        vec![var("r.endpoint")],
        [("avg", var("r.latency")), ("max", var("r.latency"))],
        vec![
            VariableName::unqualified("endpoint"),
            VariableName::unqualified("mean"),
            VariableName::unqualified("worst"),
        ],
    )
    .with_group_by_options(GroupByOptions::default().with_emit(EmitMode::Final));

    let query = QueryContext::new();
    let exec = plan.materialize(&query).unwrap();
    let rows: Vec<Vec<Value>> = collect_ok(exec.get(&ExecutionContext::new(query)).unwrap())
        .into_iter()
        .map(Record::into_values)
        .collect();
    assert_eq!(
        rows,
        vec![
            vec![
                Value::from("checkout"),
                Value::Duration(Duration::milliseconds(210)),
                Value::Duration(Duration::milliseconds(300)),
            ],
            vec![
                Value::from("search"),
                Value::Duration(Duration::milliseconds(50)),
                Value::Duration(Duration::milliseconds(60)),
            ],
        ]
    );
}

#[test]
fn dialect_is_applied_to_pushed_queries() {
    let warehouse = FakeWarehouse::requests();
    let builder = SqlSourceBuilder::new("requests", warehouse.clone())
        .with_dialect(Dialect::postgres().with_placeholder_prefix("?"));
    let plan = Node::data_source(
        "r",
        Arc::new(builder),
        Formula::not(Formula::predicate(
            var("r.endpoint"),
            Relation::Like,
            Expression::constant("check%"),
        )),
    );
    let query = QueryContext::new();
    let exec = plan.materialize(&query).unwrap();
    collect_ok(exec.get(&ExecutionContext::new(query)).unwrap());
    assert_eq!(
        warehouse.queries()[0],
        (
            "SELECT * FROM requests r WHERE NOT ((endpoint) LIKE (?1))".to_string(),
            vec![Value::from("check%")]
        )
    );
}

#[test]
fn cancellation_stops_the_source_before_querying() {
    let warehouse = FakeWarehouse::requests();
    let plan = Node::requalifier(
        "x",
        Node::data_source(
            "r",
            Arc::new(SqlSourceBuilder::new("requests", warehouse.clone())),
            Formula::Constant(true),
        ),
    );
    let query = QueryContext::new();
    let exec = plan.materialize(&query).unwrap();
    query.cancel();
    let err = exec
        .get(&ExecutionContext::new(query))
        .map(expect_err)
        .unwrap_or_else(|err| err);
    assert!(matches!(err, Error::Cancelled(_)));
    assert!(warehouse.queries().is_empty());
}
