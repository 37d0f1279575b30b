//! index answer.standard

use crate::ast::Operation;
use crate::migrate::Migration;

pub fn migration() -> Migration {
    Migration::new("e4b7a9d2c6f1", Some("87401c41e7d7"), "index answer.standard")
        .created("2023-10-09 16:11:48.217659")
        .forward(Operation::create_index(
            "ix_answer_standard",
            "answer",
            ["standard"],
        ))
        .reverse(Operation::drop_index("ix_answer_standard", "answer"))
}
