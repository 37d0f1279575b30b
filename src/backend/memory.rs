//! Backend that replays steps against an in-memory [`SchemaModel`].

use async_trait::async_trait;
use tracing::debug;

use crate::error::BackendError;
use crate::migrate::schema::SchemaModel;
use crate::transpiler::ToSql;

use super::{MigrationBackend, Step};

/// In-memory stand-in for a database.
///
/// Each [`apply`](MigrationBackend::apply) works on a copy of the schema and
/// swaps it in only when every operation succeeded, which gives the same
/// all-or-nothing outcome as a PostgreSQL transaction.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    pub schema: SchemaModel,
    marker: Option<String>,
    marker_table_exists: bool,
    transactions: usize,
    executed: Vec<String>,
    fail_at: Option<(String, usize)>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing schema and marker.
    pub fn with_state(schema: SchemaModel, marker: Option<&str>) -> Self {
        Self {
            schema,
            marker: marker.map(str::to_string),
            marker_table_exists: marker.is_some(),
            ..Self::default()
        }
    }

    /// Make the `op_index`-th operation of `revision` fail, whichever
    /// direction it runs in.
    pub fn fail_at(mut self, revision: &str, op_index: usize) -> Self {
        self.fail_at = Some((revision.to_string(), op_index));
        self
    }

    pub fn marker(&self) -> Option<&str> {
        self.marker.as_deref()
    }

    pub fn marker_table_exists(&self) -> bool {
        self.marker_table_exists
    }

    /// Committed transactions so far.
    pub fn transactions(&self) -> usize {
        self.transactions
    }

    /// SQL of committed steps, in execution order.
    pub fn executed(&self) -> &[String] {
        &self.executed
    }
}

#[async_trait]
impl MigrationBackend for MemoryBackend {
    async fn current_revision(&mut self) -> Result<Option<String>, BackendError> {
        Ok(self.marker.clone())
    }

    async fn apply(&mut self, step: &Step<'_>) -> Result<(), BackendError> {
        let mut scratch = self.schema.clone();
        let mut sql = Vec::new();

        for (index, op) in step.operations().iter().enumerate() {
            if let Some((rev, at)) = &self.fail_at {
                if rev == step.revision() && *at == index {
                    return Err(BackendError::Injected { index });
                }
            }
            debug!(
                revision = step.revision(),
                op = op.kind(),
                table = op.table().unwrap_or_default(),
                "replay"
            );
            scratch.apply(op)?;
            sql.extend(op.to_statements());
        }

        self.schema = scratch;
        self.marker = step.marker_after().map(str::to_string);
        self.marker_table_exists = true;
        self.transactions += 1;
        self.executed.extend(sql);
        Ok(())
    }
}
