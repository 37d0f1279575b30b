//! Migration records.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;

use crate::ast::Operation;

/// Which list of operations a step replays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Reverse,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "upgrade"),
            Direction::Reverse => write!(f, "downgrade"),
        }
    }
}

/// One atomic schema delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Migration {
    pub revision: &'static str,
    pub down_revision: Option<&'static str>,
    pub description: &'static str,
    pub created_at: &'static str,
    pub forward: Vec<Operation>,
    /// Empty when the step cannot be undone.
    pub reverse: Vec<Operation>,
}

impl Migration {
    pub fn new(
        revision: &'static str,
        down_revision: Option<&'static str>,
        description: &'static str,
    ) -> Self {
        Self {
            revision,
            down_revision,
            description,
            created_at: "",
            forward: Vec::new(),
            reverse: Vec::new(),
        }
    }

    pub fn created(mut self, created_at: &'static str) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn forward(mut self, op: impl Into<Operation>) -> Self {
        self.forward.push(op.into());
        self
    }

    pub fn reverse(mut self, op: impl Into<Operation>) -> Self {
        self.reverse.push(op.into());
        self
    }

    pub fn is_base(&self) -> bool {
        self.down_revision.is_none()
    }

    pub fn is_reversible(&self) -> bool {
        !self.reverse.is_empty()
    }

    pub fn operations(&self, direction: Direction) -> &[Operation] {
        match direction {
            Direction::Forward => &self.forward,
            Direction::Reverse => &self.reverse,
        }
    }

    /// Parsed `created_at`; `None` if the header timestamp is malformed.
    pub fn created_at(&self) -> Option<NaiveDateTime> {
        ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(self.created_at, fmt).ok())
    }

    /// Marker value once this record has been applied in `direction`.
    pub fn marker_after(&self, direction: Direction) -> Option<&'static str> {
        match direction {
            Direction::Forward => Some(self.revision),
            Direction::Reverse => self.down_revision,
        }
    }
}

/// A revision id is 12 lowercase hex digits.
pub fn is_valid_revision(id: &str) -> bool {
    id.len() == 12 && id.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f'))
}
