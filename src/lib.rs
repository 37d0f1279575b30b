//! # remarkable-migrate
//!
//! Schema migration chain for the remarkable database and the runner that
//! replays it, plus the bundled predictor option sets.
//!
//! ```no_run
//! use remarkable_migrate::backend::PgBackend;
//! use remarkable_migrate::migrate::Runner;
//! use remarkable_migrate::versions;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let graph = versions::graph()?;
//! let backend = PgBackend::connect("postgres://localhost/remarkable", "alembic_version").await?;
//! let mut runner = Runner::new(&graph, backend);
//! let report = runner.upgrade("head").await?;
//! println!("applied {:?}", report.applied());
//! # Ok(())
//! # }
//! ```

pub mod ast;
pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod migrate;
pub mod predictor;
pub mod transpiler;
pub mod versions;

pub mod prelude {
    pub use crate::ast::{ColumnDef, ColumnType, DefaultValue, Operation};
    pub use crate::backend::{MemoryBackend, MigrationBackend, PgBackend, Step};
    pub use crate::error::{BackendError, GraphError, MigrateError, TargetError};
    pub use crate::migrate::{Direction, Migration, MigrationGraph, RunReport, Runner, Target};
    pub use crate::predictor::{PredictorStore, ProphetConfig};
    pub use crate::transpiler::ToSql;
}
