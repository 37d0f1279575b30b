//! backfill file.pdf_parse_status
//!
//! No downgrade: the previous NULLs are not recoverable.

use crate::ast::Operation;
use crate::migrate::Migration;

pub fn migration() -> Migration {
    Migration::new("b9b246457beb", Some("a2ae2d2589ce"), "backfill file.pdf_parse_status")
        .created("2023-06-14 10:03:18.774402")
        .forward(Operation::raw_sql(
            "UPDATE file SET pdf_parse_status = 4 WHERE pdf IS NOT NULL AND pdf_parse_status IS NULL",
        ))
}
