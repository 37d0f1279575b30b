//! add answer.updated_utc (indexed)

use crate::ast::{ColumnDef, ColumnType, Operation};
use crate::migrate::Migration;

pub fn migration() -> Migration {
    Migration::new("d6a2f81b3c47", Some("8c3c1ec8e62f"), "add answer.updated_utc")
        .created("2023-11-27 09:58:21.345910")
        .forward(Operation::add_indexed_column(
            "answer",
            ColumnDef::new("updated_utc", ColumnType::Integer),
        ))
        .reverse(Operation::drop_index("ix_answer_updated_utc", "answer"))
        .reverse(Operation::drop_column("answer", "updated_utc"))
}
