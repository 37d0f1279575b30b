//! add nafmii_file_info.deleted_utc

use crate::ast::{ColumnDef, ColumnType, Operation};
use crate::migrate::Migration;

pub fn migration() -> Migration {
    Migration::new("07930e245345", Some("f2ceaddf7354"), "add nafmii_file_info.deleted_utc")
        .created("2024-02-05 15:23:10.058716")
        .forward(Operation::add_column(
            "nafmii_file_info",
            ColumnDef::new("deleted_utc", ColumnType::Integer)
                .not_null()
                .server_default(0),
        ))
        .reverse(Operation::drop_column("nafmii_file_info", "deleted_utc"))
}
