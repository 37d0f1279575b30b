//! Bundled revisions.
//!
//! Each file holds one record; the file name starts with its revision id.
//! The list below is grouped by the table a record touches and is not in
//! chain order: [`MigrationGraph::new`] derives the order from
//! `down_revision` alone.

mod r07930e245345_nafmii_deleted_utc;
mod r0a279bc49485_file_pdf_parse_status;
mod r0d41b614d5c8_file_meta_info;
mod r1f0a5c3e9b21_initial_tables;
mod r34b3977dcd23_delete_orphan_answers;
mod r3e5d0c8a91b4_drop_training_data;
mod r5b3de4ad2921_preset_answer_json;
mod r5c1f9e7b2a30_ai_status_integer;
mod r71999603561c_file_priority;
mod r7f9b30218e95_answer_standard;
mod r87401c41e7d7_question_progress;
mod r8c3c1ec8e62f_reset_unanswered_status;
mod r9ff57621aa88_rename_nafmii_org_name;
mod ra2ae2d2589ce_rename_rule_result;
mod ra9d3e6f0b812_mold_public_file_task_type;
mod rb9b246457beb_backfill_pdf_parse_status;
mod rc32162744c79_question_mold_index;
mod rc8bab52d800b_mold_type;
mod rd6a2f81b3c47_answer_updated_utc;
mod re4b7a9d2c6f1_answer_standard_index;
mod rf2ceaddf7354_keywords_score_size;

use crate::error::GraphError;
use crate::migrate::{Migration, MigrationGraph};

pub use r1f0a5c3e9b21_initial_tables::REVISION as BASE;

/// Every bundled record.
pub fn all() -> Vec<Migration> {
    vec![
        // file
        r71999603561c_file_priority::migration(),
        r0a279bc49485_file_pdf_parse_status::migration(),
        rb9b246457beb_backfill_pdf_parse_status::migration(),
        r0d41b614d5c8_file_meta_info::migration(),
        // question
        r87401c41e7d7_question_progress::migration(),
        rc32162744c79_question_mold_index::migration(),
        r5b3de4ad2921_preset_answer_json::migration(),
        r8c3c1ec8e62f_reset_unanswered_status::migration(),
        r5c1f9e7b2a30_ai_status_integer::migration(),
        // answer
        rd6a2f81b3c47_answer_updated_utc::migration(),
        r7f9b30218e95_answer_standard::migration(),
        re4b7a9d2c6f1_answer_standard_index::migration(),
        r34b3977dcd23_delete_orphan_answers::migration(),
        rf2ceaddf7354_keywords_score_size::migration(),
        // mold
        ra9d3e6f0b812_mold_public_file_task_type::migration(),
        rc8bab52d800b_mold_type::migration(),
        // nafmii
        r07930e245345_nafmii_deleted_utc::migration(),
        r9ff57621aa88_rename_nafmii_org_name::migration(),
        // other tables
        ra2ae2d2589ce_rename_rule_result::migration(),
        r3e5d0c8a91b4_drop_training_data::migration(),
        r1f0a5c3e9b21_initial_tables::migration(),
    ]
}

/// The bundled chain, validated.
pub fn graph() -> Result<MigrationGraph, GraphError> {
    MigrationGraph::new(all())
}
