//! add file.meta_info

use crate::ast::{ColumnDef, ColumnType, Operation};
use crate::migrate::Migration;

pub fn migration() -> Migration {
    Migration::new("0d41b614d5c8", Some("b9b246457beb"), "add file.meta_info")
        .created("2023-07-03 15:47:26.912035")
        .forward(Operation::add_column(
            "file",
            ColumnDef::new("meta_info", ColumnType::Json),
        ))
        .reverse(Operation::drop_column("file", "meta_info"))
}
