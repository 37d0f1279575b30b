//! rename nafmii_file_info.org_name to organization

use crate::ast::Operation;
use crate::migrate::Migration;

pub fn migration() -> Migration {
    Migration::new(
        "9ff57621aa88",
        Some("0d41b614d5c8"),
        "rename nafmii_file_info.org_name to organization",
    )
    .created("2023-07-19 09:36:50.145877")
    .forward(Operation::alter_column("nafmii_file_info", "org_name").rename("organization"))
    .reverse(Operation::alter_column("nafmii_file_info", "organization").rename("org_name"))
}
