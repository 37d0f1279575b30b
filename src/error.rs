//! Error types for graph loading, target resolution, and execution.

use thiserror::Error;

use crate::migrate::record::Direction;

/// The record set does not form a single valid chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("No migrations registered")]
    Empty,

    #[error("Invalid revision id '{0}': expected 12 lowercase hex characters")]
    InvalidRevision(String),

    #[error("Duplicate revision '{0}'")]
    DuplicateRevision(String),

    #[error("Revision '{revision}' points at unknown down_revision '{down_revision}'")]
    MissingPredecessor {
        revision: String,
        down_revision: String,
    },

    #[error("Cycle detected through revision '{0}'")]
    Cycle(String),

    #[error("Revision '{revision}' has more than one successor: {}", children.join(", "))]
    Branch {
        revision: String,
        children: Vec<String>,
    },

    #[error("No base revision (every revision has a down_revision)")]
    NoBase,

    #[error("Multiple base revisions: {}", .0.join(", "))]
    MultipleBases(Vec<String>),

    #[error("Multiple head revisions: {}", .0.join(", "))]
    MultipleHeads(Vec<String>),
}

/// A requested target cannot be resolved against the graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
    #[error("Invalid target '{0}'")]
    Syntax(String),

    #[error("Can't locate revision identified by '{0}'")]
    UnknownRevision(String),

    #[error("Revision prefix '{prefix}' is ambiguous: {}", candidates.join(", "))]
    Ambiguous {
        prefix: String,
        candidates: Vec<String>,
    },

    #[error("Relative target '{0}' moves past the end of the chain")]
    OutOfRange(String),

    #[error("Target '{target}' is behind the current revision '{current}'; use downgrade")]
    BehindCurrent { current: String, target: String },

    #[error("Target '{target}' is ahead of the current revision '{current}'; use upgrade")]
    AheadOfCurrent { current: String, target: String },
}

/// Failure inside a backend while reading the marker or applying a step.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Schema error: {0}")]
    Schema(#[from] crate::migrate::schema::SchemaError),

    #[error("Marker table '{table}' holds {rows} rows; expected at most one")]
    CorruptMarker { table: String, rows: usize },

    #[error("Injected failure at operation {index}")]
    Injected { index: usize },
}

/// Top-level error for runner operations.
#[derive(Debug, Error)]
pub enum MigrateError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Target(#[from] TargetError),

    #[error(
        "Downgrade to '{target}' is not supported: revision(s) {} have no downgrade",
        revisions.join(", ")
    )]
    Irreversible {
        target: String,
        revisions: Vec<String>,
    },

    #[error("{direction} of revision '{revision}' failed: {source}")]
    Execution {
        revision: String,
        direction: Direction,
        #[source]
        source: BackendError,
    },

    #[error("Failed to read current revision: {0}")]
    Backend(#[from] BackendError),
}

impl MigrateError {
    /// Process exit code the CLI reports for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            MigrateError::Graph(_) => 2,
            _ => 1,
        }
    }
}

pub type MigrateResult<T> = Result<T, MigrateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_offenders() {
        let err = GraphError::MissingPredecessor {
            revision: "0a279bc49485".into(),
            down_revision: "c32162744c79".into(),
        };
        assert!(err.to_string().contains("c32162744c79"));

        let err = MigrateError::Irreversible {
            target: "base".into(),
            revisions: vec!["34b3977dcd23".into(), "b9b246457beb".into()],
        };
        assert_eq!(
            err.to_string(),
            "Downgrade to 'base' is not supported: revision(s) 34b3977dcd23, b9b246457beb have no downgrade"
        );
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(MigrateError::Graph(GraphError::NoBase).exit_code(), 2);
        let err = MigrateError::Target(TargetError::UnknownRevision("ffff".into()));
        assert_eq!(err.exit_code(), 1);
    }
}
