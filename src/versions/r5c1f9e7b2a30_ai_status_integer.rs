//! question.ai_status varchar to integer

use crate::ast::{ColumnType, Operation};
use crate::migrate::Migration;

pub fn migration() -> Migration {
    Migration::new("5c1f9e7b2a30", Some("d6a2f81b3c47"), "question.ai_status to integer")
        .created("2023-12-18 14:30:56.781203")
        .forward(
            Operation::alter_column("question", "ai_status")
                .new_type(ColumnType::Integer)
                .using("ai_status::integer"),
        )
        .reverse(
            Operation::alter_column("question", "ai_status")
                .new_type(ColumnType::String(16))
                .using("ai_status::varchar"),
        )
}
