//! A data source backed by an external SQL database.

use std::fmt;
use std::sync::Arc;

use fedq_executor::{ExecutionContext, ExecutionNode, RecordIter};
use fedq_expr::Formula;
use fedq_plan::DataSourceBuilder;
use fedq_result::Result;
use fedq_types::{QueryContext, Value};

use crate::dialect::Dialect;
use crate::translator::{ExecutionAliases, translate};

/// Connection to the external database.
///
/// `params[i]` binds placeholder `i + 1` of `sql`. Returned records may carry
/// unqualified field names; the source qualifies them with its alias.
pub trait SqlClient: fmt::Debug + Send + Sync {
    fn query(&self, sql: &str, params: &[Value]) -> Result<RecordIter>;
}

/// Builds [`SqlSourceExec`] operators reading one table, with the plan's
/// filter pushed into the query.
#[derive(Debug, Clone)]
pub struct SqlSourceBuilder {
    table: String,
    client: Arc<dyn SqlClient>,
    dialect: Dialect,
}

impl SqlSourceBuilder {
    pub fn new(table: impl Into<String>, client: Arc<dyn SqlClient>) -> Self {
        Self {
            table: table.into(),
            client,
            dialect: Dialect::default(),
        }
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

impl DataSourceBuilder for SqlSourceBuilder {
    fn name(&self) -> &str {
        &self.table
    }

    fn materialize(
        &self,
        ctx: &QueryContext,
        filter: &Formula,
        alias: &str,
    ) -> Result<Box<dyn ExecutionNode>> {
        let fragment = translate(filter, alias, &self.dialect)?;
        let aliases = fragment.aliases.materialize(ctx)?;
        let sql = format!(
            "SELECT * FROM {} {} WHERE {}",
            self.table, alias, fragment.sql
        );
        Ok(Box::new(SqlSourceExec {
            sql,
            alias: alias.to_string(),
            aliases,
            client: Arc::clone(&self.client),
        }))
    }
}

/// Runs a pushed-down query, binding its parameters from the execution
/// variables on every activation.
pub struct SqlSourceExec {
    sql: String,
    alias: String,
    aliases: ExecutionAliases,
    client: Arc<dyn SqlClient>,
}

impl SqlSourceExec {
    pub fn sql(&self) -> &str {
        &self.sql
    }
}

impl fmt::Debug for SqlSourceExec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlSourceExec")
            .field("sql", &self.sql)
            .field("alias", &self.alias)
            .field("placeholders", &self.aliases.len())
            .finish()
    }
}

impl ExecutionNode for SqlSourceExec {
    fn get(&self, ctx: &ExecutionContext) -> Result<RecordIter> {
        ctx.query.check()?;
        let params = self.aliases.bind(&ctx.variables)?;
        tracing::debug!(sql = %self.sql, params = params.len(), "querying sql source");
        let records = self.client.query(&self.sql, &params)?;
        let alias = self.alias.clone();
        Ok(Box::new(
            records.map(move |record| record.map(|record| record.requalify(&alias))),
        ))
    }
}
