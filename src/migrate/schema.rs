//! In-memory schema model.
//!
//! Operations can be replayed against a [`SchemaModel`] without a database.
//! The model follows PostgreSQL's structural rules closely enough to catch
//! records that would fail on a real server (missing tables, duplicate
//! columns, type changes lacking `USING`), and renders a stable dump so two
//! states can be compared byte for byte.
//!
//! ```text
//! table file
//!   id INTEGER NOT NULL PRIMARY KEY
//!   priority INTEGER DEFAULT '9'
//! index ix_question_mold ON question (mold)
//! ```

use std::collections::BTreeMap;
use std::fmt::Write as _;

use thiserror::Error;

use crate::ast::operation::column_index_name;
use crate::ast::{AlterColumn, ColumnDef, ColumnType, Operation};

/// A structural error PostgreSQL would raise for the same statement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("relation \"{0}\" does not exist")]
    NoSuchTable(String),

    #[error("relation \"{0}\" already exists")]
    TableExists(String),

    #[error("column \"{column}\" of relation \"{table}\" does not exist")]
    NoSuchColumn { table: String, column: String },

    #[error("column \"{column}\" of relation \"{table}\" already exists")]
    ColumnExists { table: String, column: String },

    #[error("index \"{0}\" does not exist")]
    NoSuchIndex(String),

    #[error("relation \"{0}\" already exists (index)")]
    IndexExists(String),

    #[error("column \"{column}\" cannot be cast automatically to type {target}; a USING clause is required")]
    CastRequiresUsing { column: String, target: ColumnType },
}

/// A column in the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub data_type: ColumnType,
    pub nullable: bool,
    pub primary_key: bool,
    /// Rendered SQL literal.
    pub default: Option<String>,
}

impl From<&ColumnDef> for Column {
    fn from(def: &ColumnDef) -> Self {
        Self {
            name: def.name.clone(),
            data_type: def.sql_type,
            nullable: def.nullable,
            primary_key: def.primary_key,
            default: def.server_default.as_ref().map(|d| d.to_literal()),
        }
    }
}

/// A table definition.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }
}

/// An index definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    pub name: String,
    pub table: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

/// A complete database schema.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SchemaModel {
    pub tables: BTreeMap<String, Table>,
    pub indexes: BTreeMap<String, Index>,
    /// Data statements replayed so far, in order.
    pub journal: Vec<String>,
}

impl SchemaModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn column(&self, table: &str, column: &str) -> Option<&Column> {
        self.tables.get(table).and_then(|t| t.column(column))
    }

    pub fn index(&self, name: &str) -> Option<&Index> {
        self.indexes.get(name)
    }

    fn table_mut(&mut self, name: &str) -> Result<&mut Table, SchemaError> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| SchemaError::NoSuchTable(name.to_string()))
    }

    /// Apply one operation. On error the model is left unchanged.
    pub fn apply(&mut self, op: &Operation) -> Result<(), SchemaError> {
        match op {
            Operation::AddColumn { table, column, index } => {
                self.add_column(table, column)?;
                if *index {
                    let name = column_index_name(table, &column.name);
                    if let Err(e) = self.create_index(&name, table, &[column.name.clone()], false) {
                        self.table_mut(table)?.columns.pop();
                        return Err(e);
                    }
                }
                Ok(())
            }
            Operation::DropColumn { table, name } => self.drop_column(table, name),
            Operation::AlterColumn(alter) => self.alter_column(alter),
            Operation::CreateIndex {
                name,
                table,
                columns,
                unique,
            } => self.create_index(name, table, columns, *unique),
            Operation::DropIndex { name, .. } => self
                .indexes
                .remove(name)
                .map(|_| ())
                .ok_or_else(|| SchemaError::NoSuchIndex(name.clone())),
            Operation::RenameTable { old, new } => self.rename_table(old, new),
            Operation::DropTable { name } => {
                self.tables
                    .remove(name)
                    .ok_or_else(|| SchemaError::NoSuchTable(name.clone()))?;
                self.indexes.retain(|_, idx| &idx.table != name);
                Ok(())
            }
            Operation::CreateTable { name, columns } => {
                if self.tables.contains_key(name) {
                    return Err(SchemaError::TableExists(name.clone()));
                }
                self.tables.insert(
                    name.clone(),
                    Table {
                        name: name.clone(),
                        columns: columns.iter().map(Column::from).collect(),
                    },
                );
                Ok(())
            }
            Operation::RawSql { statement } => {
                self.journal.push(statement.trim().to_string());
                Ok(())
            }
        }
    }

    /// Apply operations in order, all or nothing.
    pub fn apply_all<'a>(
        &mut self,
        ops: impl IntoIterator<Item = &'a Operation>,
    ) -> Result<(), SchemaError> {
        let mut scratch = self.clone();
        for op in ops {
            scratch.apply(op)?;
        }
        *self = scratch;
        Ok(())
    }

    fn add_column(&mut self, table: &str, def: &ColumnDef) -> Result<(), SchemaError> {
        let t = self.table_mut(table)?;
        if t.column(&def.name).is_some() {
            return Err(SchemaError::ColumnExists {
                table: table.to_string(),
                column: def.name.clone(),
            });
        }
        t.columns.push(Column::from(def));
        Ok(())
    }

    fn drop_column(&mut self, table: &str, name: &str) -> Result<(), SchemaError> {
        let t = self.table_mut(table)?;
        let before = t.columns.len();
        t.columns.retain(|c| c.name != name);
        if t.columns.len() == before {
            return Err(SchemaError::NoSuchColumn {
                table: table.to_string(),
                column: name.to_string(),
            });
        }
        // PostgreSQL drops indexes that depend on the column.
        self.indexes
            .retain(|_, idx| !(idx.table == table && idx.columns.iter().any(|c| c == name)));
        Ok(())
    }

    fn alter_column(&mut self, alter: &AlterColumn) -> Result<(), SchemaError> {
        let table = alter.table.clone();
        let t = self.table_mut(&table)?;
        let no_such_column = || SchemaError::NoSuchColumn {
            table: alter.table.clone(),
            column: alter.name.clone(),
        };

        if let Some(new_name) = &alter.new_name {
            if new_name != &alter.name && t.column(new_name).is_some() {
                return Err(SchemaError::ColumnExists {
                    table: alter.table.clone(),
                    column: new_name.clone(),
                });
            }
        }

        let col = t.column_mut(&alter.name).ok_or_else(no_such_column)?;
        let mut updated = col.clone();

        if let Some(new_type) = alter.new_type {
            if alter.using.is_none() && !updated.data_type.casts_implicitly_to(&new_type) {
                return Err(SchemaError::CastRequiresUsing {
                    column: alter.name.clone(),
                    target: new_type,
                });
            }
            updated.data_type = new_type;
        }
        if let Some(nullable) = alter.nullable {
            updated.nullable = nullable;
        }
        if let Some(new_name) = &alter.new_name {
            updated.name = new_name.clone();
        }
        *col = updated;

        if let Some(new_name) = &alter.new_name {
            for idx in self.indexes.values_mut().filter(|i| i.table == table) {
                for c in idx.columns.iter_mut().filter(|c| **c == alter.name) {
                    *c = new_name.clone();
                }
            }
        }
        Ok(())
    }

    fn create_index(
        &mut self,
        name: &str,
        table: &str,
        columns: &[String],
        unique: bool,
    ) -> Result<(), SchemaError> {
        if self.indexes.contains_key(name) || self.tables.contains_key(name) {
            return Err(SchemaError::IndexExists(name.to_string()));
        }
        let t = self
            .tables
            .get(table)
            .ok_or_else(|| SchemaError::NoSuchTable(table.to_string()))?;
        if let Some(missing) = columns.iter().find(|c| t.column(c).is_none()) {
            return Err(SchemaError::NoSuchColumn {
                table: table.to_string(),
                column: missing.clone(),
            });
        }
        self.indexes.insert(
            name.to_string(),
            Index {
                name: name.to_string(),
                table: table.to_string(),
                columns: columns.to_vec(),
                unique,
            },
        );
        Ok(())
    }

    fn rename_table(&mut self, old: &str, new: &str) -> Result<(), SchemaError> {
        if self.tables.contains_key(new) || self.indexes.contains_key(new) {
            return Err(SchemaError::TableExists(new.to_string()));
        }
        let mut t = self
            .tables
            .remove(old)
            .ok_or_else(|| SchemaError::NoSuchTable(old.to_string()))?;
        t.name = new.to_string();
        self.tables.insert(new.to_string(), t);
        for idx in self.indexes.values_mut().filter(|i| i.table == old) {
            idx.table = new.to_string();
        }
        Ok(())
    }

    /// Stable textual form of the structure (tables, columns, indexes). The
    /// data journal is not part of the dump.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for table in self.tables.values() {
            let _ = writeln!(out, "table {}", table.name);
            for col in &table.columns {
                let mut line = format!("  {} {}", col.name, col.data_type.sql_name());
                if let Some(default) = &col.default {
                    line.push_str(&format!(" DEFAULT {}", default));
                }
                if !col.nullable {
                    line.push_str(" NOT NULL");
                }
                if col.primary_key {
                    line.push_str(" PRIMARY KEY");
                }
                let _ = writeln!(out, "{}", line);
            }
        }
        for idx in self.indexes.values() {
            let _ = writeln!(
                out,
                "{}index {} ON {} ({})",
                if idx.unique { "unique " } else { "" },
                idx.name,
                idx.table,
                idx.columns.join(", ")
            );
        }
        out
    }
}
