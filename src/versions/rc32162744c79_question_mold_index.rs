//! index question.mold

use crate::ast::Operation;
use crate::migrate::Migration;

pub fn migration() -> Migration {
    Migration::new("c32162744c79", Some("1f0a5c3e9b21"), "index question.mold")
        .created("2023-03-20 16:40:02.581022")
        .forward(Operation::create_index("ix_question_mold", "question", ["mold"]))
        .reverse(Operation::drop_index("ix_question_mold", "question"))
}
