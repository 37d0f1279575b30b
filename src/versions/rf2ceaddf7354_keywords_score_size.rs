//! add nafmii_file_info.keywords, answer.score, file.size

use crate::ast::{ColumnDef, ColumnType, Operation};
use crate::migrate::Migration;

pub fn migration() -> Migration {
    Migration::new("f2ceaddf7354", Some("5c1f9e7b2a30"), "add keywords, score and size")
        .created("2024-01-15 10:07:42.629384")
        .forward(Operation::add_column(
            "nafmii_file_info",
            ColumnDef::new("keywords", ColumnType::Json),
        ))
        .forward(Operation::add_column(
            "answer",
            ColumnDef::new("score", ColumnType::Float),
        ))
        .forward(Operation::add_column(
            "file",
            ColumnDef::new("size", ColumnType::BigInteger),
        ))
        .reverse(Operation::drop_column("file", "size"))
        .reverse(Operation::drop_column("answer", "score"))
        .reverse(Operation::drop_column("nafmii_file_info", "keywords"))
}
