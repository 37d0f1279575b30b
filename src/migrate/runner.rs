//! Migration runner.
//!
//! Reads the marker, plans a path through the graph, and applies each record
//! in its own transaction. The marker only advances when a record commits, so
//! between invocations the database is always at a known revision.

use serde::Serialize;
use tracing::{error, info};

use crate::backend::{MigrationBackend, Step};
use crate::error::{MigrateError, MigrateResult, TargetError};

use super::graph::{MigrationGraph, Path};
use super::record::{Direction, Migration};
use super::target::Target;

/// Lifecycle of one record during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepState {
    Pending,
    Applying,
    Applied,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    pub revision: &'static str,
    pub state: StepState,
}

/// What a run did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub direction: Direction,
    pub from: Option<String>,
    pub to: Option<&'static str>,
    pub steps: Vec<StepOutcome>,
}

impl RunReport {
    /// Revisions committed during the run, in order.
    pub fn applied(&self) -> Vec<&'static str> {
        self.steps
            .iter()
            .filter(|s| s.state == StepState::Applied)
            .map(|s| s.revision)
            .collect()
    }

    pub fn is_noop(&self) -> bool {
        self.steps.is_empty()
    }
}

/// A resolved, not yet executed plan.
#[derive(Debug, Clone)]
pub struct Plan<'g> {
    pub from: Option<String>,
    pub to: Option<&'static str>,
    pub path: Path<'g>,
}

impl<'g> Plan<'g> {
    pub fn steps(&self) -> impl Iterator<Item = Step<'g>> + '_ {
        self.path
            .steps
            .iter()
            .map(|m| Step::new(m, self.path.direction))
    }
}

pub struct Runner<'g, B> {
    graph: &'g MigrationGraph,
    backend: B,
}

impl<'g, B: MigrationBackend> Runner<'g, B> {
    pub fn new(graph: &'g MigrationGraph, backend: B) -> Self {
        Self { graph, backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// The applied revision, `None` when nothing is applied.
    pub async fn current(&mut self) -> MigrateResult<Option<String>> {
        Ok(self.backend.current_revision().await?)
    }

    pub fn heads(&self) -> Vec<&'static str> {
        self.graph.heads()
    }

    pub fn history(&self) -> impl DoubleEndedIterator<Item = &'g Migration> {
        self.graph.history()
    }

    /// Resolve `target` from `from` (`None` = read the marker) and check the
    /// path runs in `direction`. Nothing is executed.
    pub async fn plan(
        &mut self,
        direction: Direction,
        from: Option<Option<String>>,
        target: &Target,
    ) -> MigrateResult<Plan<'g>> {
        let current = match from {
            Some(from) => from,
            None => self.current().await?,
        };
        plan_path(self.graph, direction, current, target)
    }

    /// Apply forward up to `target` (`head` accepted).
    pub async fn upgrade(&mut self, target: &str) -> MigrateResult<RunReport> {
        let target = Target::parse(target)?;
        let plan = self.plan(Direction::Forward, None, &target).await?;
        self.execute(plan).await
    }

    /// Apply reverses down to `target` (`base` accepted). Refuses before any
    /// SQL when a record on the path has no reverse.
    pub async fn downgrade(&mut self, target: &str) -> MigrateResult<RunReport> {
        let target = Target::parse(target)?;
        let plan = self.plan(Direction::Reverse, None, &target).await?;
        self.execute(plan).await
    }

    async fn execute(&mut self, plan: Plan<'g>) -> MigrateResult<RunReport> {
        let direction = plan.path.direction;
        let mut steps: Vec<StepOutcome> = plan
            .path
            .steps
            .iter()
            .map(|m| StepOutcome {
                revision: m.revision,
                state: StepState::Pending,
            })
            .collect();

        if steps.is_empty() {
            info!(
                current = plan.from.as_deref().unwrap_or(""),
                "already at target, nothing to do"
            );
        }

        for (i, step) in plan.steps().enumerate() {
            steps[i].state = StepState::Applying;
            info!(
                revision = step.revision(),
                %direction,
                description = step.migration.description,
                "applying"
            );

            if let Err(source) = self.backend.apply(&step).await {
                steps[i].state = StepState::Failed;
                error!(revision = step.revision(), %direction, error = %source, "step failed");
                return Err(MigrateError::Execution {
                    revision: step.revision().to_string(),
                    direction,
                    source,
                });
            }
            steps[i].state = StepState::Applied;
        }

        Ok(RunReport {
            direction,
            from: plan.from,
            to: plan.to,
            steps,
        })
    }
}

/// Plan a run from a known marker value.
pub fn plan_path<'g>(
    graph: &'g MigrationGraph,
    direction: Direction,
    current: Option<String>,
    target: &Target,
) -> MigrateResult<Plan<'g>> {
    let to = target.resolve(graph, current.as_deref())?;
    let path = graph.path_from(current.as_deref(), to)?;

    if !path.is_empty() && path.direction != direction {
        let current = current.clone().unwrap_or_else(|| "base".to_string());
        let target = to.unwrap_or("base").to_string();
        return Err(match direction {
            Direction::Forward => TargetError::BehindCurrent { current, target },
            Direction::Reverse => TargetError::AheadOfCurrent { current, target },
        }
        .into());
    }

    if direction == Direction::Reverse {
        let irreversible = path.irreversible();
        if !irreversible.is_empty() {
            return Err(MigrateError::Irreversible {
                target: to.unwrap_or("base").to_string(),
                revisions: irreversible.iter().map(|r| r.to_string()).collect(),
            });
        }
    }

    Ok(Plan {
        from: current,
        to,
        path,
    })
}
