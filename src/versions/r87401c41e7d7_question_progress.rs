//! add question.progress

use crate::ast::{ColumnDef, ColumnType, Operation};
use crate::migrate::Migration;

pub fn migration() -> Migration {
    Migration::new("87401c41e7d7", Some("c8bab52d800b"), "add question.progress")
        .created("2023-09-12 10:25:07.930284")
        .forward(Operation::add_column(
            "question",
            ColumnDef::new("progress", ColumnType::String(32)),
        ))
        .reverse(Operation::drop_column("question", "progress"))
}
