//! add mold.public and file.task_type

use crate::ast::{ColumnDef, ColumnType, Operation};
use crate::migrate::Migration;

pub fn migration() -> Migration {
    Migration::new("a9d3e6f0b812", Some("3e5d0c8a91b4"), "add mold.public and file.task_type")
        .created("2024-04-02 17:35:08.816421")
        .forward(Operation::add_column(
            "mold",
            ColumnDef::new("public", ColumnType::Boolean)
                .not_null()
                .server_default(false),
        ))
        .forward(Operation::add_column(
            "file",
            ColumnDef::new("task_type", ColumnType::String(32)).server_default(""),
        ))
        .reverse(Operation::drop_column("file", "task_type"))
        .reverse(Operation::drop_column("mold", "public"))
}
