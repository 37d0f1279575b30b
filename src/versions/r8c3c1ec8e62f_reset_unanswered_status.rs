//! reset status of questions without answers
//!
//! The downgrade is lossy: every `status = 0` row goes back to `1`,
//! including rows that were `0` before this revision.

use crate::ast::Operation;
use crate::migrate::Migration;

pub fn migration() -> Migration {
    Migration::new("8c3c1ec8e62f", Some("e4b7a9d2c6f1"), "reset status of unanswered questions")
        .created("2023-11-01 11:40:33.602147")
        .forward(Operation::raw_sql(
            "UPDATE question SET status = 0 WHERE id NOT IN (SELECT qid FROM answer)",
        ))
        .reverse(Operation::raw_sql(
            "UPDATE question SET status = 1 WHERE status = 0",
        ))
}
