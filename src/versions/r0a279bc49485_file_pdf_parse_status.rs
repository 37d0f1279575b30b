//! add file.pdf_parse_status

use crate::ast::{ColumnDef, ColumnType, Operation};
use crate::migrate::Migration;

pub fn migration() -> Migration {
    Migration::new("0a279bc49485", Some("c32162744c79"), "add file.pdf_parse_status")
        .created("2023-04-11 09:05:37.204913")
        .forward(Operation::add_column(
            "file",
            ColumnDef::new("pdf_parse_status", ColumnType::Integer),
        ))
        .reverse(Operation::drop_column("file", "pdf_parse_status"))
}
