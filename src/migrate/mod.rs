//! Migration chain: records, graph validation, target resolution, the
//! in-memory schema model and the runner.

pub mod graph;
pub mod record;
pub mod runner;
pub mod schema;
pub mod target;

pub use graph::{MigrationGraph, Path};
pub use record::{Direction, Migration};
pub use runner::{Plan, RunReport, Runner, StepOutcome, StepState};
pub use schema::SchemaModel;
pub use target::Target;
