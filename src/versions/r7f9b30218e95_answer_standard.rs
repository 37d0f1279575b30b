//! add answer.standard

use crate::ast::{ColumnDef, ColumnType, Operation};
use crate::migrate::Migration;

pub fn migration() -> Migration {
    Migration::new("7f9b30218e95", Some("34b3977dcd23"), "add answer.standard")
        .created("2023-05-08 11:52:31.028741")
        .forward(Operation::add_column(
            "answer",
            ColumnDef::new("standard", ColumnType::Integer),
        ))
        .reverse(Operation::drop_column("answer", "standard"))
}
