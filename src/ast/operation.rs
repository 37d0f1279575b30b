use serde::Serialize;
use std::fmt;

use super::columns::{ColumnDef, ColumnType};

/// One schema or data change inside a migration record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    AddColumn {
        table: String,
        column: ColumnDef,
        /// Also create `ix_<table>_<column>`.
        index: bool,
    },
    DropColumn {
        table: String,
        name: String,
    },
    AlterColumn(AlterColumn),
    CreateIndex {
        name: String,
        table: String,
        columns: Vec<String>,
        unique: bool,
    },
    DropIndex {
        name: String,
        table: String,
    },
    RenameTable {
        old: String,
        new: String,
    },
    DropTable {
        name: String,
    },
    CreateTable {
        name: String,
        columns: Vec<ColumnDef>,
    },
    /// Backfills and conditional updates, executed verbatim.
    RawSql {
        statement: String,
    },
}

/// `alter_column(table, name, new_name?, new_type?, nullable?, using?)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlterColumn {
    pub table: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_type: Option<ColumnType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    /// Pasted verbatim into `USING ...`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub using: Option<String>,
}

impl AlterColumn {
    pub fn rename(mut self, new_name: impl Into<String>) -> Self {
        self.new_name = Some(new_name.into());
        self
    }

    pub fn new_type(mut self, sql_type: ColumnType) -> Self {
        self.new_type = Some(sql_type);
        self
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }

    pub fn using(mut self, expr: impl Into<String>) -> Self {
        self.using = Some(expr.into());
        self
    }
}

impl From<AlterColumn> for Operation {
    fn from(alter: AlterColumn) -> Self {
        Operation::AlterColumn(alter)
    }
}

impl Operation {
    pub fn add_column(table: impl Into<String>, column: ColumnDef) -> Self {
        Operation::AddColumn {
            table: table.into(),
            column,
            index: false,
        }
    }

    /// `add_column` that also creates `ix_<table>_<column>`.
    pub fn add_indexed_column(table: impl Into<String>, column: ColumnDef) -> Self {
        Operation::AddColumn {
            table: table.into(),
            column,
            index: true,
        }
    }

    pub fn drop_column(table: impl Into<String>, name: impl Into<String>) -> Self {
        Operation::DropColumn {
            table: table.into(),
            name: name.into(),
        }
    }

    /// Start an `alter_column`; finish it with the [`AlterColumn`] builder methods.
    pub fn alter_column(table: impl Into<String>, name: impl Into<String>) -> AlterColumn {
        AlterColumn {
            table: table.into(),
            name: name.into(),
            new_name: None,
            new_type: None,
            nullable: None,
            using: None,
        }
    }

    pub fn create_index<I, S>(name: impl Into<String>, table: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Operation::CreateIndex {
            name: name.into(),
            table: table.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            unique: false,
        }
    }

    pub fn drop_index(name: impl Into<String>, table: impl Into<String>) -> Self {
        Operation::DropIndex {
            name: name.into(),
            table: table.into(),
        }
    }

    pub fn rename_table(old: impl Into<String>, new: impl Into<String>) -> Self {
        Operation::RenameTable {
            old: old.into(),
            new: new.into(),
        }
    }

    pub fn drop_table(name: impl Into<String>) -> Self {
        Operation::DropTable { name: name.into() }
    }

    pub fn create_table<I>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = ColumnDef>,
    {
        Operation::CreateTable {
            name: name.into(),
            columns: columns.into_iter().collect(),
        }
    }

    pub fn raw_sql(statement: impl Into<String>) -> Self {
        Operation::RawSql {
            statement: statement.into(),
        }
    }

    /// Short label for log events.
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::AddColumn { .. } => "add_column",
            Operation::DropColumn { .. } => "drop_column",
            Operation::AlterColumn(_) => "alter_column",
            Operation::CreateIndex { .. } => "create_index",
            Operation::DropIndex { .. } => "drop_index",
            Operation::RenameTable { .. } => "rename_table",
            Operation::DropTable { .. } => "drop_table",
            Operation::CreateTable { .. } => "create_table",
            Operation::RawSql { .. } => "raw_sql",
        }
    }

    /// Table the operation targets, if any.
    pub fn table(&self) -> Option<&str> {
        match self {
            Operation::AddColumn { table, .. }
            | Operation::DropColumn { table, .. }
            | Operation::CreateIndex { table, .. }
            | Operation::DropIndex { table, .. } => Some(table.as_str()),
            Operation::AlterColumn(alter) => Some(alter.table.as_str()),
            Operation::RenameTable { old, .. } => Some(old.as_str()),
            Operation::DropTable { name } | Operation::CreateTable { name, .. } => {
                Some(name.as_str())
            }
            Operation::RawSql { .. } => None,
        }
    }
}

/// Name alembic gives the index created by `add_column(..., index=True)`.
pub fn column_index_name(table: &str, column: &str) -> String {
    format!("ix_{}_{}", table, column)
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::AddColumn { table, column, .. } => {
                write!(f, "add_column {}.{}", table, column.name)
            }
            Operation::DropColumn { table, name } => write!(f, "drop_column {}.{}", table, name),
            Operation::AlterColumn(alter) => write!(f, "alter_column {}.{}", alter.table, alter.name),
            Operation::CreateIndex { name, table, .. } => {
                write!(f, "create_index {} on {}", name, table)
            }
            Operation::DropIndex { name, .. } => write!(f, "drop_index {}", name),
            Operation::RenameTable { old, new } => write!(f, "rename_table {} -> {}", old, new),
            Operation::DropTable { name } => write!(f, "drop_table {}", name),
            Operation::CreateTable { name, .. } => write!(f, "create_table {}", name),
            Operation::RawSql { statement } => {
                let first = statement.lines().next().unwrap_or("").trim();
                write!(f, "raw_sql {}", first)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alter_column_builder() {
        let op: Operation = Operation::alter_column("question", "ai_status")
            .new_type(ColumnType::Integer)
            .using("ai_status::integer")
            .into();

        let Operation::AlterColumn(alter) = &op else {
            panic!("Expected AlterColumn");
        };
        assert_eq!(alter.new_type, Some(ColumnType::Integer));
        assert_eq!(alter.using.as_deref(), Some("ai_status::integer"));
        assert_eq!(alter.new_name, None);
        assert_eq!(op.table(), Some("question"));
    }

    #[test]
    fn test_display() {
        let op = Operation::create_index("ix_question_mold", "question", ["mold"]);
        assert_eq!(op.to_string(), "create_index ix_question_mold on question");
        let op = Operation::raw_sql("UPDATE question\nSET status = 1");
        assert_eq!(op.to_string(), "raw_sql UPDATE question");
        assert_eq!(op.kind(), "raw_sql");
    }

    #[test]
    fn test_column_index_name() {
        assert_eq!(column_index_name("answer", "updated_utc"), "ix_answer_updated_utc");
    }
}
