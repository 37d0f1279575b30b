//! rename rule_result to cgs_result

use crate::ast::Operation;
use crate::migrate::Migration;

pub fn migration() -> Migration {
    Migration::new("a2ae2d2589ce", Some("7f9b30218e95"), "rename rule_result to cgs_result")
        .created("2023-05-30 17:21:44.391550")
        .forward(Operation::rename_table("rule_result", "cgs_result"))
        .reverse(Operation::rename_table("cgs_result", "rule_result"))
}
