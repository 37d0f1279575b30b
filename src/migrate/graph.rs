//! Migration graph: records indexed by revision and linked by `down_revision`.

use std::collections::{HashMap, HashSet};

use crate::error::{GraphError, TargetError};

use super::record::{is_valid_revision, Direction, Migration};

/// Records to replay to move between two revisions.
#[derive(Debug, Clone)]
pub struct Path<'g> {
    pub direction: Direction,
    /// In application order.
    pub steps: Vec<&'g Migration>,
}

impl Path<'_> {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Revisions on the path whose `reverse` is empty.
    pub fn irreversible(&self) -> Vec<&'static str> {
        self.steps
            .iter()
            .filter(|m| !m.is_reversible())
            .map(|m| m.revision)
            .collect()
    }
}

/// A validated, linear chain of migration records.
#[derive(Debug, Clone)]
pub struct MigrationGraph {
    /// Base first, head last.
    chain: Vec<Migration>,
    index: HashMap<&'static str, usize>,
}

impl MigrationGraph {
    /// Validate `records` and link them into a chain. Registration order is
    /// irrelevant; only `revision`/`down_revision` determine the order.
    pub fn new(records: Vec<Migration>) -> Result<Self, GraphError> {
        if records.is_empty() {
            return Err(GraphError::Empty);
        }

        let mut by_rev: HashMap<&'static str, Migration> = HashMap::with_capacity(records.len());
        for record in records {
            if !is_valid_revision(record.revision) {
                return Err(GraphError::InvalidRevision(record.revision.to_string()));
            }
            if by_rev.contains_key(record.revision) {
                return Err(GraphError::DuplicateRevision(record.revision.to_string()));
            }
            by_rev.insert(record.revision, record);
        }

        let mut revisions: Vec<&'static str> = by_rev.keys().copied().collect();
        revisions.sort_unstable();

        let mut children: HashMap<&'static str, Vec<&'static str>> = HashMap::new();
        for rev in &revisions {
            if let Some(down) = by_rev[rev].down_revision {
                if !by_rev.contains_key(down) {
                    return Err(GraphError::MissingPredecessor {
                        revision: rev.to_string(),
                        down_revision: down.to_string(),
                    });
                }
                children.entry(down).or_default().push(*rev);
            }
        }

        detect_cycle(&by_rev, &revisions)?;

        for rev in &revisions {
            if let Some(kids) = children.get(rev) {
                if kids.len() > 1 {
                    return Err(GraphError::Branch {
                        revision: rev.to_string(),
                        children: kids.iter().map(|k| k.to_string()).collect(),
                    });
                }
            }
        }

        let bases: Vec<&'static str> = revisions
            .iter()
            .copied()
            .filter(|rev| by_rev[rev].is_base())
            .collect();
        let base = match bases.as_slice() {
            [] => return Err(GraphError::NoBase),
            [base] => *base,
            _ => {
                return Err(GraphError::MultipleBases(
                    bases.iter().map(|b| b.to_string()).collect(),
                ));
            }
        };

        let heads: Vec<String> = revisions
            .iter()
            .filter(|rev| !children.contains_key(*rev))
            .map(|rev| rev.to_string())
            .collect();
        if heads.len() > 1 {
            return Err(GraphError::MultipleHeads(heads));
        }

        // Acyclic, branch-free, single base: walking successors from the base
        // visits every record exactly once.
        let mut chain = Vec::with_capacity(by_rev.len());
        let mut cursor = Some(base);
        while let Some(rev) = cursor {
            cursor = children.get(rev).and_then(|kids| kids.first().copied());
            if let Some(record) = by_rev.remove(rev) {
                chain.push(record);
            }
        }

        let index = chain
            .iter()
            .enumerate()
            .map(|(i, m)| (m.revision, i))
            .collect();

        Ok(Self { chain, index })
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn get(&self, revision: &str) -> Option<&Migration> {
        self.index.get(revision).map(|&i| &self.chain[i])
    }

    pub fn contains(&self, revision: &str) -> bool {
        self.index.contains_key(revision)
    }

    pub fn base(&self) -> &Migration {
        &self.chain[0]
    }

    pub fn head(&self) -> &Migration {
        &self.chain[self.chain.len() - 1]
    }

    /// Head revisions. A validated graph always has exactly one.
    pub fn heads(&self) -> Vec<&'static str> {
        vec![self.head().revision]
    }

    /// Records in forward order, base first.
    pub fn history(&self) -> impl DoubleEndedIterator<Item = &Migration> + ExactSizeIterator {
        self.chain.iter()
    }

    /// Position in the chain; `None` (empty marker) sits before the base at 0,
    /// so record `i` is at `i + 1`.
    pub fn position(&self, revision: Option<&str>) -> Result<usize, TargetError> {
        match revision {
            None => Ok(0),
            Some(rev) => self
                .index
                .get(rev)
                .map(|i| i + 1)
                .ok_or_else(|| TargetError::UnknownRevision(rev.to_string())),
        }
    }

    /// Revision at a chain position (inverse of [`position`](Self::position)).
    pub fn at_position(&self, position: usize) -> Option<Option<&'static str>> {
        match position {
            0 => Some(None),
            p if p <= self.chain.len() => Some(Some(self.chain[p - 1].revision)),
            _ => None,
        }
    }

    /// Resolve a unique revision prefix to a full revision.
    pub fn resolve_prefix(&self, prefix: &str) -> Result<&'static str, TargetError> {
        if let Some(m) = self.get(prefix) {
            return Ok(m.revision);
        }
        let candidates: Vec<&'static str> = self
            .chain
            .iter()
            .map(|m| m.revision)
            .filter(|rev| rev.starts_with(prefix))
            .collect();
        match candidates.as_slice() {
            [] => Err(TargetError::UnknownRevision(prefix.to_string())),
            [only] => Ok(*only),
            _ => Err(TargetError::Ambiguous {
                prefix: prefix.to_string(),
                candidates: candidates.iter().map(|c| c.to_string()).collect(),
            }),
        }
    }

    /// Records to apply to move from `from` to `to` (`None` = empty marker).
    ///
    /// Forward when `to` descends from `from`: the records after `from` up to
    /// and including `to`. Reverse when `to` is an ancestor: the records from
    /// `from` back to, but excluding, `to`, in the order their reverses run.
    /// A linear chain makes every pair of known revisions comparable, so the
    /// only failure is an unknown revision.
    pub fn path_from(&self, from: Option<&str>, to: Option<&str>) -> Result<Path<'_>, TargetError> {
        let start = self.position(from)?;
        let end = self.position(to)?;

        if end >= start {
            Ok(Path {
                direction: Direction::Forward,
                steps: self.chain[start..end].iter().collect(),
            })
        } else {
            Ok(Path {
                direction: Direction::Reverse,
                steps: self.chain[end..start].iter().rev().collect(),
            })
        }
    }
}

/// Follow `down_revision` links from every record; a walk longer than the
/// record count must revisit something.
fn detect_cycle(
    by_rev: &HashMap<&'static str, Migration>,
    revisions: &[&'static str],
) -> Result<(), GraphError> {
    let mut acyclic: HashSet<&'static str> = HashSet::new();
    for &start in revisions {
        let mut seen: HashSet<&'static str> = HashSet::new();
        let mut cursor = Some(start);
        while let Some(rev) = cursor {
            if acyclic.contains(rev) {
                break;
            }
            if !seen.insert(rev) {
                return Err(GraphError::Cycle(rev.to_string()));
            }
            cursor = by_rev.get(rev).and_then(|m| m.down_revision);
        }
        acyclic.extend(seen);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Operation;

    fn rec(rev: &'static str, down: Option<&'static str>) -> Migration {
        Migration::new(rev, down, "test")
            .forward(Operation::raw_sql("SELECT 1"))
            .reverse(Operation::raw_sql("SELECT 1"))
    }

    fn chain() -> MigrationGraph {
        // Registered out of order on purpose.
        MigrationGraph::new(vec![
            rec("cccccccccccc", Some("bbbbbbbbbbbb")),
            rec("aaaaaaaaaaaa", None),
            rec("dddddddddddd", Some("cccccccccccc")),
            rec("bbbbbbbbbbbb", Some("aaaaaaaaaaaa")),
        ])
        .unwrap()
    }

    fn revs(path: &Path<'_>) -> Vec<&'static str> {
        path.steps.iter().map(|m| m.revision).collect()
    }

    #[test]
    fn test_chain_order_ignores_registration_order() {
        let g = chain();
        let order: Vec<_> = g.history().map(|m| m.revision).collect();
        assert_eq!(
            order,
            ["aaaaaaaaaaaa", "bbbbbbbbbbbb", "cccccccccccc", "dddddddddddd"]
        );
        assert_eq!(g.base().revision, "aaaaaaaaaaaa");
        assert_eq!(g.heads(), vec!["dddddddddddd"]);
    }

    #[test]
    fn test_path_forward() {
        let g = chain();
        let p = g.path_from(Some("aaaaaaaaaaaa"), Some("cccccccccccc")).unwrap();
        assert_eq!(p.direction, Direction::Forward);
        assert_eq!(revs(&p), ["bbbbbbbbbbbb", "cccccccccccc"]);

        let p = g.path_from(None, Some("bbbbbbbbbbbb")).unwrap();
        assert_eq!(revs(&p), ["aaaaaaaaaaaa", "bbbbbbbbbbbb"]);
    }

    #[test]
    fn test_path_reverse() {
        let g = chain();
        let p = g.path_from(Some("dddddddddddd"), Some("bbbbbbbbbbbb")).unwrap();
        assert_eq!(p.direction, Direction::Reverse);
        assert_eq!(revs(&p), ["dddddddddddd", "cccccccccccc"]);

        let p = g.path_from(Some("bbbbbbbbbbbb"), None).unwrap();
        assert_eq!(revs(&p), ["bbbbbbbbbbbb", "aaaaaaaaaaaa"]);
    }

    #[test]
    fn test_path_same_revision_is_empty() {
        let g = chain();
        let p = g.path_from(Some("cccccccccccc"), Some("cccccccccccc")).unwrap();
        assert!(p.is_empty());
    }

    #[test]
    fn test_path_unknown_revision() {
        let g = chain();
        let err = g.path_from(Some("aaaaaaaaaaaa"), Some("eeeeeeeeeeee")).unwrap_err();
        assert_eq!(err, TargetError::UnknownRevision("eeeeeeeeeeee".into()));
    }

    #[test]
    fn test_resolve_prefix() {
        let g = MigrationGraph::new(vec![
            rec("abc111111111", None),
            rec("abc222222222", Some("abc111111111")),
            rec("def333333333", Some("abc222222222")),
        ])
        .unwrap();
        assert_eq!(g.resolve_prefix("def3").unwrap(), "def333333333");
        assert_eq!(g.resolve_prefix("abc111111111").unwrap(), "abc111111111");
        assert!(matches!(
            g.resolve_prefix("abc"),
            Err(TargetError::Ambiguous { .. })
        ));
        assert!(matches!(
            g.resolve_prefix("fff"),
            Err(TargetError::UnknownRevision(_))
        ));
    }

    #[test]
    fn test_irreversible_on_path() {
        let g = MigrationGraph::new(vec![
            rec("aaaaaaaaaaaa", None),
            Migration::new("bbbbbbbbbbbb", Some("aaaaaaaaaaaa"), "cleanup")
                .forward(Operation::raw_sql("DELETE FROM answer")),
            rec("cccccccccccc", Some("bbbbbbbbbbbb")),
        ])
        .unwrap();
        let p = g.path_from(Some("cccccccccccc"), None).unwrap();
        assert_eq!(p.irreversible(), ["bbbbbbbbbbbb"]);
        let p = g.path_from(Some("cccccccccccc"), Some("bbbbbbbbbbbb")).unwrap();
        assert!(p.irreversible().is_empty());
    }

    #[test]
    fn test_empty() {
        assert_eq!(MigrationGraph::new(vec![]).unwrap_err(), GraphError::Empty);
    }

    #[test]
    fn test_invalid_revision_id() {
        let err = MigrationGraph::new(vec![rec("not-a-revision", None)]).unwrap_err();
        assert_eq!(err, GraphError::InvalidRevision("not-a-revision".into()));
    }

    #[test]
    fn test_duplicate_revision() {
        let err = MigrationGraph::new(vec![
            rec("aaaaaaaaaaaa", None),
            rec("aaaaaaaaaaaa", None),
        ])
        .unwrap_err();
        assert_eq!(err, GraphError::DuplicateRevision("aaaaaaaaaaaa".into()));
    }

    #[test]
    fn test_missing_predecessor() {
        let err = MigrationGraph::new(vec![
            rec("aaaaaaaaaaaa", None),
            rec("0a279bc49485", Some("c32162744c79")),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            GraphError::MissingPredecessor {
                revision: "0a279bc49485".into(),
                down_revision: "c32162744c79".into(),
            }
        );
    }

    #[test]
    fn test_cycle() {
        let err = MigrationGraph::new(vec![
            rec("aaaaaaaaaaaa", None),
            rec("bbbbbbbbbbbb", Some("cccccccccccc")),
            rec("cccccccccccc", Some("bbbbbbbbbbbb")),
        ])
        .unwrap_err();
        assert!(matches!(err, GraphError::Cycle(_)));
    }

    #[test]
    fn test_branch() {
        let err = MigrationGraph::new(vec![
            rec("aaaaaaaaaaaa", None),
            rec("bbbbbbbbbbbb", Some("aaaaaaaaaaaa")),
            rec("cccccccccccc", Some("aaaaaaaaaaaa")),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            GraphError::Branch {
                revision: "aaaaaaaaaaaa".into(),
                children: vec!["bbbbbbbbbbbb".into(), "cccccccccccc".into()],
            }
        );
    }

    #[test]
    fn test_multiple_bases() {
        let err = MigrationGraph::new(vec![
            rec("aaaaaaaaaaaa", None),
            rec("bbbbbbbbbbbb", None),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            GraphError::MultipleBases(vec!["aaaaaaaaaaaa".into(), "bbbbbbbbbbbb".into()])
        );
    }
}
