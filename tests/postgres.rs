//! Scenarios against a live PostgreSQL database.
//!
//! Ignored by default. Point `DATABASE_URL` at a scratch database (its
//! public schema is dropped and recreated) and run with `--ignored`.

use pretty_assertions::assert_eq;
use sqlx::{Connection, PgConnection};

use remarkable_migrate::ast::{ColumnDef, ColumnType, Operation};
use remarkable_migrate::backend::{MigrationBackend, PgBackend};
use remarkable_migrate::cli;
use remarkable_migrate::error::{BackendError, MigrateError};
use remarkable_migrate::migrate::{Migration, MigrationGraph, Runner};
use remarkable_migrate::versions;

const VERSION_TABLE: &str = "alembic_version";

/// Empty the public schema and return a side connection for fixtures.
async fn fresh_database() -> (String, PgConnection) {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let mut conn = PgConnection::connect(&url).await.unwrap();
    sqlx::query("DROP SCHEMA public CASCADE")
        .execute(&mut conn)
        .await
        .unwrap();
    sqlx::query("CREATE SCHEMA public")
        .execute(&mut conn)
        .await
        .unwrap();
    (url, conn)
}

async fn fresh_backend() -> PgBackend {
    let (url, _) = fresh_database().await;
    PgBackend::connect(&url, VERSION_TABLE).await.unwrap()
}

#[tokio::test]
#[ignore]
async fn test_upgrade_head_then_noop() {
    let graph = versions::graph().unwrap();
    let mut runner = Runner::new(&graph, fresh_backend().await);

    assert_eq!(runner.current().await.unwrap(), None);
    let report = runner.upgrade("head").await.unwrap();
    assert_eq!(report.applied().len(), graph.len());
    assert_eq!(runner.current().await.unwrap().as_deref(), Some("71999603561c"));

    let report = runner.upgrade("head").await.unwrap();
    assert!(report.is_noop());
}

#[tokio::test]
#[ignore]
async fn test_downgrade_tail_matches_stepwise_schema() {
    let graph = versions::graph().unwrap();
    let mut runner = Runner::new(&graph, fresh_backend().await);

    runner.upgrade("87401c41e7d7").await.unwrap();
    let mut backend = runner.into_backend();
    let at_progress = backend.snapshot().await.unwrap().dump();

    let mut runner = Runner::new(&graph, backend);
    runner.upgrade("head").await.unwrap();
    runner.downgrade("87401c41e7d7").await.unwrap();
    let mut backend = runner.into_backend();
    assert_eq!(backend.snapshot().await.unwrap().dump(), at_progress);
    assert_eq!(
        backend.current_revision().await.unwrap().as_deref(),
        Some("87401c41e7d7")
    );
}

#[tokio::test]
#[ignore]
async fn test_downgrade_base_refused_before_sql() {
    let graph = versions::graph().unwrap();
    let mut runner = Runner::new(&graph, fresh_backend().await);
    runner.upgrade("head").await.unwrap();

    let err = runner.downgrade("base").await.unwrap_err();
    assert!(matches!(err, MigrateError::Irreversible { .. }));
    assert_eq!(runner.current().await.unwrap().as_deref(), Some("71999603561c"));
}

#[tokio::test]
#[ignore]
async fn test_priority_column_default() {
    let graph = versions::graph().unwrap();
    let mut runner = Runner::new(&graph, fresh_backend().await);
    runner.upgrade("head").await.unwrap();

    let mut backend = runner.into_backend();
    let schema = backend.snapshot().await.unwrap();
    let priority = schema.column("file", "priority").unwrap();
    assert!(priority.nullable);
    assert_eq!(priority.default.as_deref(), Some("9"));
}

#[tokio::test]
#[ignore]
async fn test_empty_marker_table_reads_as_nothing_applied() {
    let (url, mut conn) = fresh_database().await;
    sqlx::query(&PgBackend::version_table_ddl(VERSION_TABLE))
        .execute(&mut conn)
        .await
        .unwrap();

    let mut backend = PgBackend::connect(&url, VERSION_TABLE).await.unwrap();
    assert_eq!(backend.current_revision().await.unwrap(), None);

    let graph = versions::graph().unwrap();
    let mut runner = Runner::new(&graph, backend);
    let report = runner.upgrade("+1").await.unwrap();
    assert_eq!(report.applied(), [versions::BASE]);
}

#[tokio::test]
#[ignore]
async fn test_two_marker_rows_refuse_to_run() {
    let (url, mut conn) = fresh_database().await;
    let graph = versions::graph().unwrap();
    let backend = PgBackend::connect(&url, VERSION_TABLE).await.unwrap();
    let mut runner = Runner::new(&graph, backend);
    runner.upgrade("c32162744c79").await.unwrap();

    sqlx::query("INSERT INTO alembic_version (version_num) VALUES ('1f0a5c3e9b21')")
        .execute(&mut conn)
        .await
        .unwrap();

    let err = runner.upgrade("head").await.unwrap_err();
    assert!(matches!(
        err,
        MigrateError::Backend(BackendError::CorruptMarker { rows: 2, .. })
    ));
    assert_eq!(cli::exit_code(&anyhow::Error::new(err)), 1);

    let mut backend = runner.into_backend();
    let schema = backend.snapshot().await.unwrap();
    assert!(schema.column("file", "pdf_parse_status").is_none());
}

#[tokio::test]
#[ignore]
async fn test_failing_record_rolls_back_on_postgres() {
    let graph = MigrationGraph::new(vec![
        Migration::new("aaaaaaaaaaaa", None, "create t")
            .forward(Operation::create_table(
                "t",
                [ColumnDef::new("id", ColumnType::Integer).primary_key()],
            ))
            .reverse(Operation::drop_table("t")),
        Migration::new("bbbbbbbbbbbb", Some("aaaaaaaaaaaa"), "add x then fail")
            .forward(Operation::add_column("t", ColumnDef::new("x", ColumnType::Integer)))
            .forward(Operation::raw_sql("UPDATE nope SET x = 1"))
            .reverse(Operation::drop_column("t", "x")),
    ])
    .unwrap();
    let mut runner = Runner::new(&graph, fresh_backend().await);

    let err = runner.upgrade("head").await.unwrap_err();
    match &err {
        MigrateError::Execution { revision, source, .. } => {
            assert_eq!(revision, "bbbbbbbbbbbb");
            assert!(matches!(source, BackendError::Sqlx(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(runner.current().await.unwrap().as_deref(), Some("aaaaaaaaaaaa"));

    let mut backend = runner.into_backend();
    let schema = backend.snapshot().await.unwrap();
    assert!(schema.table("t").is_some());
    assert!(schema.column("t", "x").is_none());
}
