//! Read-only commands: current, heads, history, show.

use std::io::Write;

use anyhow::Result;
use colored::*;
use serde::Serialize;
use tracing::info;

use crate::backend::MigrationBackend;
use crate::migrate::{Direction, Migration, MigrationGraph, Runner, Target};
use crate::transpiler::ToSql;

/// The applied revision, or an empty string when nothing is applied.
pub fn current_line(current: Option<&str>) -> String {
    current.unwrap_or_default().to_string()
}

/// Print the applied revision, or an empty line.
pub async fn migrate_current<B: MigrationBackend, W: Write>(
    graph: &MigrationGraph,
    backend: B,
    out: &mut W,
) -> Result<()> {
    let mut runner = Runner::new(graph, backend);
    let current = runner.current().await?;
    if let Some(rev) = current.as_deref() {
        if graph.heads().iter().any(|h| *h == rev) {
            info!(revision = rev, "database is at head");
        }
    }
    writeln!(out, "{}", current_line(current.as_deref()))?;
    Ok(())
}

pub fn migrate_heads<W: Write>(graph: &MigrationGraph, out: &mut W) -> Result<()> {
    for head in graph.heads() {
        writeln!(out, "{}", head)?;
    }
    Ok(())
}

#[derive(Serialize)]
struct HistoryEntry<'a> {
    revision: &'a str,
    down_revision: Option<&'a str>,
    description: &'a str,
    created_at: &'a str,
    reversible: bool,
}

/// `<revision>  <down_revision>  <description>` per line, base first.
pub fn history_lines(graph: &MigrationGraph) -> Vec<String> {
    graph
        .history()
        .map(|m| {
            format!(
                "{}  {:<12}  {}",
                m.revision,
                m.down_revision.unwrap_or(""),
                m.description
            )
        })
        .collect()
}

pub fn history_json(graph: &MigrationGraph) -> Result<String> {
    let entries: Vec<HistoryEntry<'_>> = graph
        .history()
        .map(|m| HistoryEntry {
            revision: m.revision,
            down_revision: m.down_revision,
            description: m.description,
            created_at: m.created_at,
            reversible: m.is_reversible(),
        })
        .collect();
    Ok(serde_json::to_string_pretty(&entries)?)
}

pub fn migrate_history<W: Write>(graph: &MigrationGraph, json: bool, out: &mut W) -> Result<()> {
    if json {
        writeln!(out, "{}", history_json(graph)?)?;
    } else {
        for line in history_lines(graph) {
            writeln!(out, "{}", line)?;
        }
    }
    Ok(())
}

fn write_sql<W: Write>(out: &mut W, m: &Migration, direction: Direction) -> Result<()> {
    let ops = m.operations(direction);
    if ops.is_empty() {
        writeln!(out, "  {}", "(none)".red())?;
        return Ok(());
    }
    for op in ops {
        for stmt in op.to_statements() {
            writeln!(out, "  {};", stmt)?;
        }
    }
    Ok(())
}

/// Describe one revision and print its SQL in both directions.
pub fn migrate_show<W: Write>(
    graph: &MigrationGraph,
    target: &Target,
    current: Option<&str>,
    out: &mut W,
) -> Result<()> {
    let Some(rev) = target.resolve(graph, current)? else {
        anyhow::bail!("'{}' resolves to base, which is not a revision", target);
    };
    let Some(m) = graph.get(rev) else {
        anyhow::bail!("Can't locate revision identified by '{}'", rev);
    };

    writeln!(out, "{} {}", "Revision:".cyan().bold(), m.revision.yellow())?;
    writeln!(
        out,
        "{} {}",
        "Parent:".cyan(),
        m.down_revision.unwrap_or("<base>")
    )?;
    if m.revision == graph.head().revision {
        writeln!(out, "{} {}", "Head:".cyan(), "yes".green())?;
    }
    match m.created_at() {
        Some(ts) => writeln!(out, "{} {}", "Created:".cyan(), ts.format("%Y-%m-%d %H:%M:%S"))?,
        None => writeln!(out, "{} {}", "Created:".cyan(), "unknown".dimmed())?,
    }
    writeln!(out, "{} {}", "Description:".cyan(), m.description)?;
    writeln!(
        out,
        "{} {}",
        "Reversible:".cyan(),
        if m.is_reversible() { "yes".green() } else { "no".red() }
    )?;

    writeln!(out)?;
    writeln!(out, "{}", "-- upgrade".dimmed())?;
    write_sql(out, m, Direction::Forward)?;
    writeln!(out, "{}", "-- downgrade".dimmed())?;
    write_sql(out, m, Direction::Reverse)?;
    Ok(())
}
