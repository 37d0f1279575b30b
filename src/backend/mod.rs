//! Execution backends.
//!
//! A backend owns the target database: it reads the applied-revision marker
//! and applies one [`Step`] per transaction. The runner never talks SQL
//! directly, so the same plan can run against PostgreSQL or the in-memory
//! schema model.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::BackendError;
use crate::migrate::record::{Direction, Migration};

pub use memory::MemoryBackend;
pub use postgres::PgBackend;

/// Default name of the marker table.
pub const DEFAULT_VERSION_TABLE: &str = "alembic_version";

/// One record applied in one direction.
#[derive(Debug, Clone, Copy)]
pub struct Step<'a> {
    pub migration: &'a Migration,
    pub direction: Direction,
}

impl<'a> Step<'a> {
    pub fn new(migration: &'a Migration, direction: Direction) -> Self {
        Self {
            migration,
            direction,
        }
    }

    pub fn revision(&self) -> &'static str {
        self.migration.revision
    }

    pub fn operations(&self) -> &'a [crate::ast::Operation] {
        self.migration.operations(self.direction)
    }

    /// Marker value committed together with this step.
    pub fn marker_after(&self) -> Option<&'static str> {
        self.migration.marker_after(self.direction)
    }
}

#[async_trait]
pub trait MigrationBackend: Send {
    /// The applied-revision marker; `None` when the marker table is absent
    /// or empty.
    async fn current_revision(&mut self) -> Result<Option<String>, BackendError>;

    /// Run the step's operations and move the marker to
    /// [`Step::marker_after`], all in one transaction. On error nothing of
    /// the step is kept.
    async fn apply(&mut self, step: &Step<'_>) -> Result<(), BackendError>;
}
