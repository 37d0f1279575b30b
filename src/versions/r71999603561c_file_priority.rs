//! add file.priority

use crate::ast::{ColumnDef, ColumnType, Operation};
use crate::migrate::Migration;

pub fn migration() -> Migration {
    Migration::new("71999603561c", Some("a9d3e6f0b812"), "add file.priority")
        .created("2024-04-24 09:12:55.390657")
        .forward(Operation::add_column(
            "file",
            ColumnDef::new("priority", ColumnType::Integer).server_default("9"),
        ))
        .reverse(Operation::drop_column("file", "priority"))
}
