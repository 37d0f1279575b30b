//! delete answers whose question is gone
//!
//! The deleted rows cannot be restored, so there is no downgrade.

use crate::ast::Operation;
use crate::migrate::Migration;

pub fn migration() -> Migration {
    Migration::new("34b3977dcd23", Some("0a279bc49485"), "delete orphan answers")
        .created("2023-04-26 14:18:09.660150")
        .forward(Operation::raw_sql(
            "DELETE FROM answer WHERE qid NOT IN (SELECT id FROM question)",
        ))
}
