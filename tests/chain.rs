//! Bundled chain against the in-memory backend.

use pretty_assertions::assert_eq;

use remarkable_migrate::ast::ColumnType;
use remarkable_migrate::backend::{MemoryBackend, MigrationBackend};
use remarkable_migrate::cli::round_trips;
use remarkable_migrate::error::{GraphError, MigrateError};
use remarkable_migrate::migrate::{Direction, Migration, MigrationGraph, Runner, SchemaModel};
use remarkable_migrate::versions;

const HEAD: &str = "71999603561c";

/// Backend sitting at `revision`, built by replaying the chain.
async fn at(graph: &MigrationGraph, revision: &str) -> MemoryBackend {
    let mut runner = Runner::new(graph, MemoryBackend::new());
    runner.upgrade(revision).await.unwrap();
    runner.into_backend()
}

#[test]
fn test_bundled_graph_is_a_single_chain() {
    let graph = versions::graph().unwrap();
    assert_eq!(graph.len(), 21);
    assert_eq!(graph.heads(), vec![HEAD]);
    assert!(graph.base().is_base());

    let mut seen = std::collections::HashSet::new();
    let mut previous: Option<&str> = None;
    for m in graph.history() {
        assert!(seen.insert(m.revision), "duplicate {}", m.revision);
        assert_eq!(m.down_revision, previous);
        previous = Some(m.revision);
    }
}

#[test]
fn test_predecessors_named_out_of_file_order_resolve() {
    let graph = versions::graph().unwrap();
    for (rev, down) in [
        ("0a279bc49485", "c32162744c79"),
        ("a2ae2d2589ce", "7f9b30218e95"),
        ("9ff57621aa88", "0d41b614d5c8"),
    ] {
        assert_eq!(graph.get(rev).unwrap().down_revision, Some(down));
        assert!(graph.contains(down));
    }
}

#[test]
fn test_broken_registries_are_rejected() {
    let mut records = versions::all();
    records.retain(|m| m.revision != "c8bab52d800b");
    assert_eq!(
        MigrationGraph::new(records).unwrap_err(),
        GraphError::MissingPredecessor {
            revision: "87401c41e7d7".into(),
            down_revision: "c8bab52d800b".into(),
        }
    );

    let mut records = versions::all();
    records.push(Migration::new("e4b7a9d2c6f1", Some("87401c41e7d7"), "again"));
    assert_eq!(
        MigrationGraph::new(records).unwrap_err(),
        GraphError::DuplicateRevision("e4b7a9d2c6f1".into())
    );

    let mut records = versions::all();
    records.push(Migration::new("abcdefabcdef", Some("87401c41e7d7"), "fork"));
    assert!(matches!(
        MigrationGraph::new(records).unwrap_err(),
        GraphError::Branch { .. }
    ));
}

#[test]
fn test_every_reversible_record_restores_its_parent_schema() {
    let graph = versions::graph().unwrap();
    let trips = round_trips(&graph).unwrap();
    let mut reversible = 0;
    for trip in trips {
        if let Some(restored) = trip.restored {
            reversible += 1;
            assert!(restored, "{} does not round-trip", trip.revision);
            assert_eq!(trip.before, trip.after);
        }
    }
    assert_eq!(reversible, 18);
}

#[tokio::test]
async fn test_reversible_tail_downgrades_to_identical_schema() {
    let graph = versions::graph().unwrap();
    let at_progress = at(&graph, "87401c41e7d7").await;
    let expected = at_progress.schema.dump();

    let mut runner = Runner::new(&graph, at(&graph, HEAD).await);
    runner.downgrade("87401c41e7d7").await.unwrap();
    assert_eq!(runner.backend().schema.dump(), expected);
}

#[tokio::test]
async fn test_second_upgrade_head_is_a_noop() {
    let graph = versions::graph().unwrap();
    let mut runner = Runner::new(&graph, MemoryBackend::new());

    runner.upgrade("head").await.unwrap();
    let first = runner.backend().transactions();
    assert_eq!(first, 21);
    let schema = runner.backend().schema.clone();

    let report = runner.upgrade("head").await.unwrap();
    assert!(report.is_noop());
    assert_eq!(runner.backend().transactions(), first);
    assert_eq!(runner.backend().schema, schema);
}

#[tokio::test]
async fn test_stepwise_upgrade_matches_single_upgrade() {
    let graph = versions::graph().unwrap();
    let all_at_once = at(&graph, "head").await;

    let mut runner = Runner::new(&graph, MemoryBackend::new());
    for m in graph.history() {
        let report = runner.upgrade(m.revision).await.unwrap();
        assert_eq!(report.applied(), vec![m.revision]);
    }
    let stepwise = runner.into_backend();

    assert_eq!(stepwise.schema.dump(), all_at_once.schema.dump());
    assert_eq!(stepwise.marker(), all_at_once.marker());
    assert_eq!(stepwise.executed(), all_at_once.executed());

    let mut runner = Runner::new(&graph, MemoryBackend::new());
    for _ in 0..graph.len() {
        runner.upgrade("+1").await.unwrap();
    }
    assert_eq!(runner.backend().schema.dump(), all_at_once.schema.dump());
}

#[tokio::test]
async fn test_failing_record_leaves_no_trace() {
    let graph = versions::graph().unwrap();
    let before = at(&graph, "07930e245345").await;

    // a9d3e6f0b812 adds two columns; fail on the second.
    let backend = MemoryBackend::with_state(before.schema.clone(), before.marker())
        .fail_at("a9d3e6f0b812", 1);
    let mut runner = Runner::new(&graph, backend);
    let err = runner.upgrade("head").await.unwrap_err();

    match &err {
        MigrateError::Execution {
            revision,
            direction,
            ..
        } => {
            assert_eq!(revision, "a9d3e6f0b812");
            assert_eq!(*direction, Direction::Forward);
        }
        other => panic!("unexpected error: {other}"),
    }

    let backend = runner.into_backend();
    // 3e5d0c8a91b4 committed before the failure.
    assert_eq!(backend.marker(), Some("3e5d0c8a91b4"));
    assert!(backend.schema.column("mold", "public").is_none());
    assert!(backend.schema.column("file", "task_type").is_none());
    assert!(backend.schema.table("training_data").is_none());
}

#[tokio::test]
async fn test_downgrade_base_is_refused_without_side_effects() {
    let graph = versions::graph().unwrap();
    let head = at(&graph, "head").await;
    let schema = head.schema.clone();
    let transactions = head.transactions();

    let mut runner = Runner::new(&graph, head);
    let err = runner.downgrade("base").await.unwrap_err();
    assert_eq!(err.exit_code(), 1);

    match &err {
        MigrateError::Irreversible { target, revisions } => {
            assert_eq!(target, "base");
            assert!(revisions.contains(&"34b3977dcd23".to_string()));
            assert_eq!(revisions.len(), 3);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("34b3977dcd23"));

    let backend = runner.into_backend();
    assert_eq!(backend.transactions(), transactions);
    assert_eq!(backend.marker(), Some(HEAD));
    assert_eq!(backend.schema, schema);
}

#[tokio::test]
async fn test_empty_database_to_head() {
    let graph = versions::graph().unwrap();
    let mut runner = Runner::new(&graph, MemoryBackend::new());
    assert_eq!(runner.current().await.unwrap(), None);

    runner.upgrade("head").await.unwrap();
    assert_eq!(runner.current().await.unwrap().as_deref(), Some(HEAD));

    let priority = runner.backend().schema.column("file", "priority").unwrap().clone();
    assert_eq!(priority.data_type, ColumnType::Integer);
    assert!(priority.nullable);
    assert_eq!(priority.default.as_deref(), Some("'9'"));
    assert!(
        runner
            .backend()
            .executed()
            .iter()
            .any(|sql| sql == "ALTER TABLE file ADD COLUMN priority INTEGER DEFAULT '9'")
    );
}

#[tokio::test]
async fn test_single_step_from_f2ceaddf7354() {
    let graph = versions::graph().unwrap();
    let mut runner = Runner::new(&graph, at(&graph, "f2ceaddf7354").await);

    let report = runner.upgrade("07930e245345").await.unwrap();
    assert_eq!(report.applied(), vec!["07930e245345"]);
    assert_eq!(runner.backend().transactions(), 18);

    let col = runner
        .backend()
        .schema
        .column("nafmii_file_info", "deleted_utc")
        .unwrap();
    assert_eq!(col.data_type, ColumnType::Integer);
    assert!(!col.nullable);
    assert_eq!(col.default.as_deref(), Some("0"));
    assert_eq!(runner.backend().marker(), Some("07930e245345"));
}

#[tokio::test]
async fn test_downgrade_head_to_87401c41e7d7() {
    let graph = versions::graph().unwrap();
    let mut runner = Runner::new(&graph, at(&graph, "head").await);

    let report = runner.downgrade("87401c41e7d7").await.unwrap();
    assert_eq!(report.direction, Direction::Reverse);
    assert_eq!(report.applied().first(), Some(&HEAD));
    assert_eq!(report.applied().last(), Some(&"e4b7a9d2c6f1"));

    let schema: &SchemaModel = &runner.backend().schema;
    assert!(schema.index("ix_answer_standard").is_none());
    assert!(schema.index("ix_answer_updated_utc").is_none());
    assert!(schema.index("ix_question_mold").is_some());
    assert!(schema.table("training_data").is_some());
    assert_eq!(runner.backend().marker(), Some("87401c41e7d7"));
}

#[tokio::test]
async fn test_lossy_reverse_still_runs() {
    let graph = versions::graph().unwrap();
    let mut runner = Runner::new(&graph, at(&graph, "d6a2f81b3c47").await);

    runner.downgrade("e4b7a9d2c6f1").await.unwrap();
    assert_eq!(runner.backend().marker(), Some("e4b7a9d2c6f1"));
    let journal = &runner.backend().schema.journal;
    assert_eq!(
        journal.last().map(String::as_str),
        Some("UPDATE question SET status = 1 WHERE status = 0")
    );
}

#[tokio::test]
async fn test_marker_reads_none_until_first_commit() {
    let mut backend = MemoryBackend::new();
    assert_eq!(backend.current_revision().await.unwrap(), None);
    assert!(!backend.marker_table_exists());
}

#[tokio::test]
async fn test_downgrade_refuses_forward_target() {
    let graph = versions::graph().unwrap();
    let mut runner = Runner::new(&graph, at(&graph, "87401c41e7d7").await);
    let err = runner.downgrade("head").await.unwrap_err();
    assert!(matches!(err, MigrateError::Target(_)));
    assert_eq!(runner.backend().marker(), Some("87401c41e7d7"));
}
