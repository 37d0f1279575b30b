//! initial tables

use crate::ast::{ColumnDef, ColumnType, Operation};
use crate::migrate::Migration;

pub const REVISION: &str = "1f0a5c3e9b21";

fn id() -> ColumnDef {
    ColumnDef::new("id", ColumnType::Integer).primary_key()
}

fn utc(name: &str) -> ColumnDef {
    ColumnDef::new(name, ColumnType::Integer)
}

/// `training_data` as created here; `3e5d0c8a91b4` recreates it on downgrade.
pub fn training_data_columns() -> Vec<ColumnDef> {
    vec![
        id(),
        ColumnDef::new("mold", ColumnType::Integer).not_null(),
        ColumnDef::new("from_id", ColumnType::Integer),
        ColumnDef::new("to_id", ColumnType::Integer),
        ColumnDef::new("dirs", ColumnType::Json),
        ColumnDef::new("task_done", ColumnType::Integer).server_default(0),
        utc("created_utc"),
    ]
}

pub fn migration() -> Migration {
    Migration::new(REVISION, None, "initial tables")
        .created("2023-03-02 10:12:45.117306")
        .forward(Operation::create_table(
            "mold",
            [
                id(),
                ColumnDef::new("name", ColumnType::String(255)).not_null(),
                ColumnDef::new("data", ColumnType::Json),
                ColumnDef::new("checksum", ColumnType::String(32)),
                utc("created_utc"),
                utc("updated_utc"),
            ],
        ))
        .forward(Operation::create_table(
            "file",
            [
                id(),
                ColumnDef::new("name", ColumnType::String(255)).not_null(),
                ColumnDef::new("hash", ColumnType::String(32)),
                ColumnDef::new("pdf", ColumnType::String(32)),
                ColumnDef::new("mold", ColumnType::Integer),
                ColumnDef::new("qid", ColumnType::Integer),
                ColumnDef::new("uid", ColumnType::Integer),
                utc("created_utc"),
                utc("updated_utc"),
            ],
        ))
        .forward(Operation::create_table(
            "question",
            [
                id(),
                ColumnDef::new("fid", ColumnType::Integer).not_null(),
                ColumnDef::new("mold", ColumnType::Integer),
                ColumnDef::new("status", ColumnType::Integer).server_default(1),
                ColumnDef::new("ai_status", ColumnType::String(16)),
                ColumnDef::new("preset_answer", ColumnType::Text),
                utc("created_utc"),
                utc("updated_utc"),
            ],
        ))
        .forward(Operation::create_table(
            "answer",
            [
                id(),
                ColumnDef::new("qid", ColumnType::Integer).not_null(),
                ColumnDef::new("uid", ColumnType::Integer),
                ColumnDef::new("data", ColumnType::Json),
                utc("created_utc"),
            ],
        ))
        .forward(Operation::create_table(
            "rule_result",
            [
                id(),
                ColumnDef::new("fid", ColumnType::Integer).not_null(),
                ColumnDef::new("rule", ColumnType::String(255)),
                ColumnDef::new("result", ColumnType::Json),
                utc("created_utc"),
            ],
        ))
        .forward(Operation::create_table(
            "training_data",
            training_data_columns(),
        ))
        .forward(Operation::create_table(
            "nafmii_file_info",
            [
                id(),
                ColumnDef::new("fid", ColumnType::Integer).not_null(),
                ColumnDef::new("org_name", ColumnType::String(255)),
                utc("created_utc"),
            ],
        ))
        .reverse(Operation::drop_table("nafmii_file_info"))
        .reverse(Operation::drop_table("training_data"))
        .reverse(Operation::drop_table("rule_result"))
        .reverse(Operation::drop_table("answer"))
        .reverse(Operation::drop_table("question"))
        .reverse(Operation::drop_table("file"))
        .reverse(Operation::drop_table("mold"))
}
