//! PostgreSQL backend over a single sqlx connection.

use async_trait::async_trait;
use sqlx::postgres::PgConnection;
use sqlx::{Connection, Row};
use tracing::{debug, warn};

use crate::ast::ColumnType;
use crate::error::BackendError;
use crate::migrate::schema::{Column, Index, SchemaModel, Table};
use crate::transpiler::{escape_identifier, ToSql};

use super::{MigrationBackend, Step};

/// Runs steps against PostgreSQL, one transaction per step.
pub struct PgBackend {
    conn: PgConnection,
    version_table: String,
}

impl PgBackend {
    pub async fn connect(url: &str, version_table: &str) -> Result<Self, BackendError> {
        let conn = PgConnection::connect(url).await?;
        Ok(Self {
            conn,
            version_table: version_table.to_string(),
        })
    }

    /// DDL creating the marker table when it is missing.
    pub fn version_table_ddl(version_table: &str) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    version_num VARCHAR(32) NOT NULL,\n    CONSTRAINT {} PRIMARY KEY (version_num)\n)",
            escape_identifier(version_table),
            escape_identifier(&format!("{}_pkc", version_table))
        )
    }

    async fn marker_table_exists(&mut self) -> Result<bool, BackendError> {
        let found: Option<String> = sqlx::query_scalar("SELECT to_regclass($1)::text")
            .bind(escape_identifier(&self.version_table))
            .fetch_one(&mut self.conn)
            .await?;
        Ok(found.is_some())
    }

    /// Introspect the current schema (excluding the marker table) into a
    /// [`SchemaModel`], so database states can be compared with
    /// [`SchemaModel::dump`].
    pub async fn snapshot(&mut self) -> Result<SchemaModel, BackendError> {
        let rows = sqlx::query(
            "SELECT c.table_name::text AS table_name,
                    c.column_name::text AS column_name,
                    c.udt_name::text AS udt_name,
                    c.character_maximum_length::int4 AS max_len,
                    c.is_nullable::text AS is_nullable,
                    c.column_default::text AS column_default,
                    EXISTS (
                        SELECT 1
                        FROM information_schema.table_constraints tc
                        JOIN information_schema.key_column_usage k
                          ON tc.constraint_name = k.constraint_name
                         AND tc.table_schema = k.table_schema
                        WHERE tc.constraint_type = 'PRIMARY KEY'
                          AND tc.table_schema = c.table_schema
                          AND tc.table_name = c.table_name
                          AND k.column_name = c.column_name
                    ) AS primary_key
             FROM information_schema.columns c
             JOIN information_schema.tables t
               ON t.table_schema = c.table_schema AND t.table_name = c.table_name
             WHERE c.table_schema = current_schema()
               AND t.table_type = 'BASE TABLE'
             ORDER BY c.table_name, c.ordinal_position",
        )
        .fetch_all(&mut self.conn)
        .await?;

        let mut schema = SchemaModel::new();
        for row in rows {
            let table_name: String = row.try_get("table_name")?;
            if table_name == self.version_table {
                continue;
            }
            let udt_name: String = row.try_get("udt_name")?;
            let max_len: Option<i32> = row.try_get("max_len")?;
            let is_nullable: String = row.try_get("is_nullable")?;

            let column = Column {
                name: row.try_get("column_name")?,
                data_type: column_type_from_udt(&udt_name, max_len),
                nullable: is_nullable == "YES",
                primary_key: row.try_get("primary_key")?,
                default: row.try_get("column_default")?,
            };

            schema
                .tables
                .entry(table_name.clone())
                .or_insert_with(|| Table {
                    name: table_name,
                    ..Table::default()
                })
                .columns
                .push(column);
        }

        let rows = sqlx::query(
            "SELECT i.relname::text AS index_name,
                    t.relname::text AS table_name,
                    ix.indisunique AS is_unique,
                    array_agg(a.attname::text ORDER BY array_position(ix.indkey::int2[], a.attnum)) AS columns
             FROM pg_index ix
             JOIN pg_class i ON i.oid = ix.indexrelid
             JOIN pg_class t ON t.oid = ix.indrelid
             JOIN pg_namespace n ON n.oid = t.relnamespace
             JOIN pg_attribute a ON a.attrelid = t.oid AND a.attnum = ANY(ix.indkey)
             WHERE n.nspname = current_schema()
               AND NOT ix.indisprimary
             GROUP BY i.relname, t.relname, ix.indisunique",
        )
        .fetch_all(&mut self.conn)
        .await?;

        for row in rows {
            let index = Index {
                name: row.try_get("index_name")?,
                table: row.try_get("table_name")?,
                columns: row.try_get("columns")?,
                unique: row.try_get("is_unique")?,
            };
            if index.table == self.version_table {
                continue;
            }
            schema.indexes.insert(index.name.clone(), index);
        }

        Ok(schema)
    }
}

fn column_type_from_udt(udt_name: &str, max_len: Option<i32>) -> ColumnType {
    match udt_name {
        "int4" | "int2" => ColumnType::Integer,
        "int8" => ColumnType::BigInteger,
        "float4" | "float8" | "numeric" => ColumnType::Float,
        "varchar" | "bpchar" => ColumnType::String(max_len.unwrap_or(0).max(0) as u32),
        "bool" => ColumnType::Boolean,
        "json" | "jsonb" => ColumnType::Json,
        _ => ColumnType::Text,
    }
}

/// Everything a step does, on the caller's open transaction.
async fn run_step(
    conn: &mut PgConnection,
    version_table: &str,
    step: &Step<'_>,
) -> Result<(), BackendError> {
    sqlx::query(&PgBackend::version_table_ddl(version_table))
        .execute(&mut *conn)
        .await?;

    for op in step.operations() {
        for stmt in op.to_statements() {
            debug!(
                revision = step.revision(),
                op = op.kind(),
                table = op.table().unwrap_or_default(),
                sql = %stmt,
                "execute"
            );
            sqlx::query(&stmt).execute(&mut *conn).await?;
        }
    }

    let table = escape_identifier(version_table);
    sqlx::query(&format!("DELETE FROM {}", table))
        .execute(&mut *conn)
        .await?;
    if let Some(rev) = step.marker_after() {
        sqlx::query(&format!("INSERT INTO {} (version_num) VALUES ($1)", table))
            .bind(rev)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

#[async_trait]
impl MigrationBackend for PgBackend {
    async fn current_revision(&mut self) -> Result<Option<String>, BackendError> {
        if !self.marker_table_exists().await? {
            return Ok(None);
        }
        let rows: Vec<String> = sqlx::query_scalar(&format!(
            "SELECT version_num FROM {}",
            escape_identifier(&self.version_table)
        ))
        .fetch_all(&mut self.conn)
        .await?;

        match rows.len() {
            0 => Ok(None),
            1 => Ok(rows.into_iter().next()),
            n => Err(BackendError::CorruptMarker {
                table: self.version_table.clone(),
                rows: n,
            }),
        }
    }

    async fn apply(&mut self, step: &Step<'_>) -> Result<(), BackendError> {
        let mut tx = self.conn.begin().await?;
        match run_step(&mut tx, &self.version_table, step).await {
            Ok(()) => {
                tx.commit().await?;
                Ok(())
            }
            Err(e) => {
                warn!(revision = step.revision(), error = %e, "rolling back");
                if let Err(rollback) = tx.rollback().await {
                    warn!(revision = step.revision(), error = %rollback, "rollback failed");
                }
                Err(e)
            }
        }
    }
}
