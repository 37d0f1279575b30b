//! `--sql` mode: render the plan as a script instead of running it.
//!
//! Each record becomes its own `BEGIN; ... COMMIT;` block ending with the
//! marker update, mirroring what the online runner does per transaction.

use std::fmt::Write as _;

use anyhow::Result;

use crate::backend::{PgBackend, Step};
use crate::migrate::runner::plan_path;
use crate::migrate::target::parse_range;
use crate::migrate::{Direction, MigrationGraph};
use crate::transpiler::{escape_identifier, ToSql};

fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Statement moving the marker from `before` to `after`.
pub fn marker_statement(version_table: &str, before: Option<&str>, after: Option<&str>) -> String {
    let table = escape_identifier(version_table);
    match (before, after) {
        (None, Some(after)) => format!(
            "INSERT INTO {} (version_num) VALUES ({})",
            table,
            quote(after)
        ),
        (Some(before), Some(after)) => format!(
            "UPDATE {} SET version_num={} WHERE {}.version_num = {}",
            table,
            quote(after),
            table,
            quote(before)
        ),
        (Some(before), None) => format!(
            "DELETE FROM {} WHERE {}.version_num = {}",
            table,
            table,
            quote(before)
        ),
        (None, None) => String::new(),
    }
}

/// Build the script for `target` (a target or a `from:to` range). Without a
/// `from`, upgrades start at base and downgrades at head.
pub fn offline_script(
    graph: &MigrationGraph,
    direction: Direction,
    target: &str,
    version_table: &str,
) -> Result<String> {
    let (from, to) = parse_range(target)?;
    let start: Option<&str> = match (&from, direction) {
        (Some(from), _) => from.resolve(graph, None)?,
        (None, Direction::Forward) => None,
        (None, Direction::Reverse) => Some(graph.head().revision),
    };
    let plan = plan_path(graph, direction, start.map(str::to_string), &to)?;

    let mut out = String::new();
    let _ = writeln!(
        out,
        "-- {} {} -> {}\n",
        direction,
        start.unwrap_or("base"),
        plan.to.unwrap_or("base")
    );
    if direction == Direction::Forward {
        let _ = writeln!(out, "{};\n", PgBackend::version_table_ddl(version_table));
    }

    let mut marker = start;
    for step in plan.steps() {
        write_step(&mut out, &step, marker, version_table);
        marker = step.marker_after();
    }
    Ok(out)
}

fn write_step(out: &mut String, step: &Step<'_>, before: Option<&str>, version_table: &str) {
    let m = step.migration;
    let _ = writeln!(
        out,
        "-- Running {} {} -> {} ({})\n",
        step.direction,
        before.unwrap_or("base"),
        step.marker_after().unwrap_or("base"),
        m.description
    );
    let _ = writeln!(out, "BEGIN;\n");
    for op in step.operations() {
        for stmt in op.to_statements() {
            let _ = writeln!(out, "{};\n", stmt);
        }
    }
    let _ = writeln!(
        out,
        "{};\n",
        marker_statement(version_table, before, step.marker_after())
    );
    let _ = writeln!(out, "COMMIT;\n");
}
