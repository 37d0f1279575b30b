//! question.preset_answer text to json
//!
//! Left without a downgrade: casting back to text loses the original
//! formatting of the stored documents.

use crate::ast::{ColumnType, Operation};
use crate::migrate::Migration;

pub fn migration() -> Migration {
    Migration::new("5b3de4ad2921", Some("9ff57621aa88"), "question.preset_answer to json")
        .created("2023-08-07 13:14:59.503318")
        .forward(
            Operation::alter_column("question", "preset_answer")
                .new_type(ColumnType::Json)
                .using("preset_answer::json"),
        )
}
