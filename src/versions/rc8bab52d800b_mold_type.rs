//! add mold.mold_type

use crate::ast::{ColumnDef, ColumnType, Operation};
use crate::migrate::Migration;

pub fn migration() -> Migration {
    Migration::new("c8bab52d800b", Some("5b3de4ad2921"), "add mold.mold_type")
        .created("2023-08-29 18:02:13.486620")
        .forward(Operation::add_column(
            "mold",
            ColumnDef::new("mold_type", ColumnType::Integer)
                .not_null()
                .server_default(0),
        ))
        .forward(Operation::raw_sql(
            "UPDATE mold SET mold_type = 1 WHERE id IN (SELECT DISTINCT mold FROM training_data)",
        ))
        // The backfill goes away with the column.
        .reverse(Operation::drop_column("mold", "mold_type"))
}
