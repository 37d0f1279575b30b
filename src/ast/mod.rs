//! Schema-change AST.
//!
//! Migrations are written as lists of [`Operation`] values instead of SQL
//! strings, so the same record can be rendered for PostgreSQL, replayed
//! against the in-memory [`SchemaModel`](crate::migrate::schema::SchemaModel),
//! and inspected by the CLI.

pub mod columns;
pub mod operation;

pub use columns::{ColumnDef, ColumnType, DefaultValue};
pub use operation::{AlterColumn, Operation};
