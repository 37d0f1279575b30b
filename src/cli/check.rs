//! `migrate check`: validate and replay the chain without a database.

use std::io::Write;

use anyhow::Result;
use colored::*;

use crate::backend::MemoryBackend;
use crate::error::{BackendError, MigrateError};
use crate::migrate::schema::SchemaError;
use crate::migrate::{Direction, MigrationGraph, Runner, SchemaModel};

/// Outcome of replaying one record forward and back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundTrip {
    pub revision: &'static str,
    /// `None` for records without a reverse.
    pub restored: Option<bool>,
    pub before: String,
    pub after: String,
}

/// Walk the chain from an empty schema. For each reversible record, apply
/// its forward then its reverse to the schema its predecessor left and
/// compare dumps.
pub fn round_trips(graph: &MigrationGraph) -> Result<Vec<RoundTrip>, MigrateError> {
    let failed = |revision: &str, direction: Direction, e: SchemaError| MigrateError::Execution {
        revision: revision.to_string(),
        direction,
        source: BackendError::Schema(e),
    };
    let mut schema = SchemaModel::new();
    let mut out = Vec::with_capacity(graph.len());

    for m in graph.history() {
        let before = schema.dump();
        let mut forward = schema.clone();
        forward
            .apply_all(m.operations(Direction::Forward))
            .map_err(|e| failed(m.revision, Direction::Forward, e))?;

        let (restored, after) = if m.is_reversible() {
            let mut back = forward.clone();
            back.apply_all(m.operations(Direction::Reverse))
                .map_err(|e| failed(m.revision, Direction::Reverse, e))?;
            let after = back.dump();
            (Some(after == before), after)
        } else {
            (None, String::new())
        };

        out.push(RoundTrip {
            revision: m.revision,
            restored,
            before,
            after,
        });
        schema = forward;
    }
    Ok(out)
}

pub async fn check_chain<W: Write>(graph: &MigrationGraph, out: &mut W) -> Result<()> {
    writeln!(
        out,
        "{} {} revisions, base {}, head {}",
        "✓ Graph:".green(),
        graph.len(),
        graph.base().revision.yellow(),
        graph.head().revision.yellow()
    )?;

    let mut runner = Runner::new(graph, MemoryBackend::new());
    let report = runner.upgrade("head").await?;
    writeln!(
        out,
        "{} {} revision(s) applied to an empty schema",
        "✓ Upgrade:".green(),
        report.applied().len()
    )?;

    let trips = round_trips(graph)?;

    let mut broken = Vec::new();
    for trip in &trips {
        match trip.restored {
            Some(true) => {}
            Some(false) => {
                writeln!(out, "  {} {} does not restore its parent schema", "✗".red(), trip.revision.yellow())?;
                broken.push(trip.revision);
            }
            None => writeln!(
                out,
                "  {} {} has no downgrade",
                "⚠".yellow(),
                trip.revision.yellow()
            )?,
        }
    }

    if !broken.is_empty() {
        anyhow::bail!("Round trip failed for: {}", broken.join(", "));
    }
    writeln!(
        out,
        "{} {} reversible revision(s) round-trip",
        "✓ Downgrade:".green(),
        trips.iter().filter(|t| t.restored.is_some()).count()
    )?;
    Ok(())
}
