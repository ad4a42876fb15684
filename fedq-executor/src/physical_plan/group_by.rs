use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use fedq_aggregate::{Aggregate, AggregateDescriptor};
use fedq_expr::VariableName;
use fedq_result::{Error, Result};
use fedq_types::{GroupKey, GroupingMap, QueryContext, Value};

use crate::expression::Expression;
use crate::physical_plan::{ExecutionNode, RecordIter};
use crate::record::Record;
use crate::variables::{ExecutionContext, Variables};

/// When a grouping operator emits its results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EmitMode {
    /// After every input record, retract the group's previous row (if any)
    /// and emit its new one. Rows that did not change are not re-emitted.
    #[default]
    Updates,
    /// Emit one row per group once the input is exhausted.
    Final,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GroupByOptions {
    pub emit: EmitMode,
}

impl GroupByOptions {
    pub fn with_emit(mut self, emit: EmitMode) -> Self {
        self.emit = emit;
        self
    }
}

/// Groups its source's records by key and maintains one aggregate per output
/// column.
///
/// Output rows hold the key values followed by the aggregated values, named
/// by `output`. Groups appear in first-seen order. Aggregate state is created
/// fresh on every [`ExecutionNode::get`].
pub struct GroupByExec {
    pub source: Box<dyn ExecutionNode>,
    pub key: Arc<[Expression]>,
    pub inputs: Arc<[Expression]>,
    pub aggregates: Arc<[&'static AggregateDescriptor]>,
    pub output: Arc<[VariableName]>,
    pub options: GroupByOptions,
}

impl GroupByExec {
    pub fn new(
        source: Box<dyn ExecutionNode>,
        key: Vec<Expression>,
        inputs: Vec<Expression>,
        aggregates: Vec<&'static AggregateDescriptor>,
        output: Vec<VariableName>,
        options: GroupByOptions,
    ) -> Result<Self> {
        if inputs.len() != aggregates.len() {
            return Err(Error::InvalidArgumentError(format!(
                "group by has {} aggregates but {} aggregate inputs",
                aggregates.len(),
                inputs.len()
            )));
        }
        if output.len() != key.len() + aggregates.len() {
            return Err(Error::InvalidArgumentError(format!(
                "group by produces {} columns but names {}",
                key.len() + aggregates.len(),
                output.len()
            )));
        }
        Ok(Self {
            source,
            key: key.into(),
            inputs: inputs.into(),
            aggregates: aggregates.into(),
            output: output.into(),
            options,
        })
    }
}

impl fmt::Debug for GroupByExec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let aggregates: Vec<&str> = self.aggregates.iter().map(|d| d.name).collect();
        f.debug_struct("GroupByExec")
            .field("key", &self.key)
            .field("aggregates", &aggregates)
            .field("output", &self.output)
            .field("options", &self.options)
            .field("source", &self.source)
            .finish()
    }
}

impl ExecutionNode for GroupByExec {
    fn get(&self, ctx: &ExecutionContext) -> Result<RecordIter> {
        tracing::debug!(
            emit = ?self.options.emit,
            keys = self.key.len(),
            aggregates = self.aggregates.len(),
            "group by started"
        );
        let input = self.source.get(ctx)?;
        Ok(Box::new(GroupByStream {
            input,
            query: ctx.query.clone(),
            parent: Arc::clone(&ctx.variables),
            key: Arc::clone(&self.key),
            inputs: Arc::clone(&self.inputs),
            output: Arc::clone(&self.output),
            emit: self.options.emit,
            state: self.aggregates.iter().map(|d| d.create()).collect(),
            seen: GroupingMap::new(),
            pending: VecDeque::new(),
            finished: false,
        }))
    }
}

struct GroupByStream {
    input: RecordIter,
    query: QueryContext,
    parent: Arc<Variables>,
    key: Arc<[Expression]>,
    inputs: Arc<[Expression]>,
    output: Arc<[VariableName]>,
    emit: EmitMode,
    state: Vec<Box<dyn Aggregate>>,
    seen: GroupingMap<()>,
    pending: VecDeque<Record>,
    finished: bool,
}

impl GroupByStream {
    fn row(&self, key: &GroupKey) -> Result<Record> {
        let mut values = Vec::with_capacity(self.output.len());
        values.extend(key.values().iter().cloned());
        for aggregate in &self.state {
            values.push(aggregate.get_aggregated(key)?);
        }
        Record::new(self.output.to_vec(), values)
    }

    fn consume(&mut self, record: Record) -> Result<()> {
        self.query.check()?;
        if record.is_undo() {
            return Err(Error::InvalidArgumentError(format!(
                "group by cannot consume retraction {record}"
            )));
        }

        let scope = Variables::with_record(&self.parent, &record);
        let key = self
            .key
            .iter()
            .map(|expr| expr.evaluate(&scope))
            .collect::<Result<GroupKey>>()?;
        let values = self
            .inputs
            .iter()
            .map(|expr| expr.evaluate(&scope))
            .collect::<Result<Vec<Value>>>()?;

        let existed = self.seen.contains_key(&key);
        let previous = match (self.emit, existed) {
            (EmitMode::Updates, true) => Some(self.row(&key)?),
            _ => None,
        };

        // Not atomic across aggregates: a failure leaves earlier ones updated,
        // but the stream ends with that error so no row reflects it.
        for (aggregate, value) in self.state.iter_mut().zip(values) {
            aggregate.add_record(&key, value)?;
        }
        if !existed {
            self.seen.set(key.clone(), ());
        }

        if self.emit == EmitMode::Updates {
            let current = self.row(&key)?;
            if previous.as_ref() != Some(&current) {
                if let Some(previous) = previous {
                    self.pending.push_back(previous.into_undo());
                }
                self.pending.push_back(current);
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        tracing::trace!(groups = self.seen.len(), "group by emitting final rows");
        let rows = self
            .seen
            .keys()
            .map(|key| self.row(key))
            .collect::<Result<Vec<_>>>()?;
        self.pending.extend(rows);
        Ok(())
    }
}

impl Iterator for GroupByStream {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.pending.pop_front() {
                return Some(Ok(record));
            }
            if self.finished {
                return None;
            }
            let step = match self.input.next() {
                Some(Ok(record)) => self.consume(record),
                Some(Err(err)) => Err(err),
                None => {
                    self.finished = true;
                    match self.emit {
                        EmitMode::Final => self.flush(),
                        EmitMode::Updates => Ok(()),
                    }
                }
            };
            if let Err(err) = step {
                self.finished = true;
                self.pending.clear();
                return Some(Err(err));
            }
        }
    }
}
