//! upgrade / downgrade against a live database.

use std::io::Write;

use anyhow::Result;
use colored::*;

use crate::backend::MigrationBackend;
use crate::migrate::{MigrationGraph, RunReport, Runner, StepState};
use crate::migrate::target::parse_range;

/// A `from:to` range only makes sense for `--sql`.
fn reject_range(target: &str) -> Result<()> {
    if let (Some(_), _) = parse_range(target)? {
        anyhow::bail!("Range '{}' is only allowed with --sql", target);
    }
    Ok(())
}

fn write_report<W: Write>(out: &mut W, report: &RunReport) -> Result<()> {
    if report.is_noop() {
        writeln!(
            out,
            "{} {}",
            "Already at".green(),
            report.from.as_deref().unwrap_or("base").yellow()
        )?;
        return Ok(());
    }
    for step in &report.steps {
        let mark = match step.state {
            StepState::Applied => "✓".green(),
            StepState::Failed => "✗".red(),
            StepState::Pending | StepState::Applying => "·".dimmed(),
        };
        writeln!(out, "  {} {} {}", mark, report.direction, step.revision.yellow())?;
    }
    writeln!(
        out,
        "{} {} {}",
        "Done:".green().bold(),
        report.applied().len(),
        "revision(s)".dimmed()
    )?;
    writeln!(
        out,
        "{} {}",
        "Now at:".cyan(),
        report.to.unwrap_or("base").yellow()
    )?;
    Ok(())
}

pub async fn migrate_upgrade<B: MigrationBackend, W: Write>(
    graph: &MigrationGraph,
    backend: B,
    target: &str,
    out: &mut W,
) -> Result<()> {
    reject_range(target)?;
    writeln!(out, "{} {}", "Upgrading to:".cyan().bold(), target.yellow())?;
    let mut runner = Runner::new(graph, backend);
    let report = runner.upgrade(target).await?;
    write_report(out, &report)?;
    Ok(())
}

pub async fn migrate_downgrade<B: MigrationBackend, W: Write>(
    graph: &MigrationGraph,
    backend: B,
    target: &str,
    out: &mut W,
) -> Result<()> {
    reject_range(target)?;
    writeln!(out, "{} {}", "Downgrading to:".cyan().bold(), target.yellow())?;
    let mut runner = Runner::new(graph, backend);
    let report = runner.downgrade(target).await?;
    write_report(out, &report)?;
    Ok(())
}
