//! DDL statement builders.

use crate::ast::operation::column_index_name;
use crate::ast::{AlterColumn, ColumnDef, Operation};

use super::{escape_identifier as q, ToSql};

impl ToSql for Operation {
    fn to_statements(&self) -> Vec<String> {
        match self {
            Operation::AddColumn { table, column, index } => {
                let mut stmts = vec![format!(
                    "ALTER TABLE {} ADD COLUMN {}",
                    q(table),
                    build_column_def(column)
                )];
                if *index {
                    stmts.push(build_create_index(
                        &column_index_name(table, &column.name),
                        table,
                        std::slice::from_ref(&column.name),
                        false,
                    ));
                }
                stmts
            }
            Operation::DropColumn { table, name } => {
                vec![format!("ALTER TABLE {} DROP COLUMN {}", q(table), q(name))]
            }
            Operation::AlterColumn(alter) => build_alter_column(alter),
            Operation::CreateIndex {
                name,
                table,
                columns,
                unique,
            } => vec![build_create_index(name, table, columns, *unique)],
            Operation::DropIndex { name, .. } => vec![format!("DROP INDEX {}", q(name))],
            Operation::RenameTable { old, new } => {
                vec![format!("ALTER TABLE {} RENAME TO {}", q(old), q(new))]
            }
            Operation::DropTable { name } => vec![format!("DROP TABLE {}", q(name))],
            Operation::CreateTable { name, columns } => vec![build_create_table(name, columns)],
            Operation::RawSql { statement } => {
                vec![statement.trim().trim_end_matches(';').to_string()]
            }
        }
    }
}

/// Column definition as it appears in `ADD COLUMN` / `CREATE TABLE`.
pub fn build_column_def(col: &ColumnDef) -> String {
    let mut sql = format!("{} {}", q(&col.name), col.sql_type.sql_name());
    if let Some(default) = &col.server_default {
        sql.push_str(" DEFAULT ");
        sql.push_str(&default.to_literal());
    }
    if !col.nullable {
        sql.push_str(" NOT NULL");
    }
    sql
}

pub fn build_create_index(name: &str, table: &str, columns: &[String], unique: bool) -> String {
    let cols: Vec<String> = columns.iter().map(|c| q(c)).collect();
    format!(
        "CREATE {}INDEX {} ON {} ({})",
        if unique { "UNIQUE " } else { "" },
        q(name),
        q(table),
        cols.join(", ")
    )
}

/// Type change, then nullability, then rename last so the earlier
/// statements can still address the column by its old name.
pub fn build_alter_column(alter: &AlterColumn) -> Vec<String> {
    let table = q(&alter.table);
    let column = q(&alter.name);
    let mut stmts = Vec::new();

    if let Some(new_type) = &alter.new_type {
        let mut sql = format!(
            "ALTER TABLE {} ALTER COLUMN {} TYPE {}",
            table,
            column,
            new_type.sql_name()
        );
        if let Some(using) = &alter.using {
            sql.push_str(" USING ");
            sql.push_str(using);
        }
        stmts.push(sql);
    }

    match alter.nullable {
        Some(false) => stmts.push(format!(
            "ALTER TABLE {} ALTER COLUMN {} SET NOT NULL",
            table, column
        )),
        Some(true) => stmts.push(format!(
            "ALTER TABLE {} ALTER COLUMN {} DROP NOT NULL",
            table, column
        )),
        None => {}
    }

    if let Some(new_name) = &alter.new_name {
        stmts.push(format!(
            "ALTER TABLE {} RENAME COLUMN {} TO {}",
            table,
            column,
            q(new_name)
        ));
    }

    stmts
}

pub fn build_create_table(name: &str, columns: &[ColumnDef]) -> String {
    let mut defs: Vec<String> = columns
        .iter()
        .map(|col| match (col.primary_key, col.sql_type.serial_name()) {
            (true, Some(serial)) => format!("{} {} NOT NULL", q(&col.name), serial),
            _ => build_column_def(col),
        })
        .collect();

    let pk: Vec<String> = columns
        .iter()
        .filter(|c| c.primary_key)
        .map(|c| q(&c.name))
        .collect();
    if !pk.is_empty() {
        defs.push(format!("PRIMARY KEY ({})", pk.join(", ")));
    }

    format!("CREATE TABLE {} (\n    {}\n)", q(name), defs.join(",\n    "))
}
