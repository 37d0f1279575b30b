//! `migrate` command-line interface.
//!
//! Submodules:
//! - `status`: current, heads, history, show
//! - `apply`: upgrade and downgrade against PostgreSQL
//! - `offline`: `--sql` script generation
//! - `check`: graph validation and sandbox replay

mod apply;
mod check;
mod offline;
mod status;

pub use apply::{migrate_downgrade, migrate_upgrade};
pub use check::{check_chain, round_trips, RoundTrip};
pub use offline::offline_script;
pub use status::{current_line, migrate_current, migrate_heads, migrate_history, migrate_show};

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::backend::{MigrationBackend, PgBackend};
use crate::config::{Config, ConfigError, Overrides};
use crate::error::{GraphError, MigrateError};
use crate::migrate::{Direction, MigrationGraph, Target};
use crate::predictor::PredictorError;
use crate::versions;

#[derive(Debug, Parser)]
#[command(name = "migrate", version, about = "Schema migrations for the remarkable database")]
pub struct Cli {
    /// PostgreSQL connection URL
    #[arg(long, global = true, env = "DATABASE_URL", hide_env_values = true)]
    pub url: Option<String>,

    /// Config file (default: ./migrate.toml, then the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Name of the applied-revision table
    #[arg(long, global = true)]
    pub version_table: Option<String>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the applied revision (empty when none)
    Current,
    /// List revisions in forward order
    History {
        /// Emit a JSON array instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print the head revision(s)
    Heads,
    /// Show one revision and its SQL
    Show { target: String },
    /// Apply forward to a target (`head`, a revision, `+N`)
    Upgrade {
        target: String,
        /// Print the SQL instead of running it; accepts `from:to`
        #[arg(long)]
        sql: bool,
    },
    /// Apply reverse to a target (`base`, a revision, `-N`)
    Downgrade {
        target: String,
        /// Print the SQL instead of running it; accepts `from:to`
        #[arg(long)]
        sql: bool,
    },
    /// Validate the chain and replay it without a database
    Check,
}

impl Cli {
    fn config(&self) -> Result<Config, ConfigError> {
        Config::load(
            self.config.as_deref(),
            Overrides {
                database_url: self.url.clone(),
                version_table: self.version_table.clone(),
            },
        )
    }
}

async fn connect(config: &Config) -> Result<PgBackend> {
    let url = config.require_url()?;
    Ok(PgBackend::connect(url, &config.version_table).await?)
}

/// Run a parsed command line.
pub async fn run(cli: Cli) -> Result<()> {
    let config = cli.config()?;
    let graph: MigrationGraph = versions::graph()?;
    let mut out = io::stdout();

    match &cli.command {
        Commands::Current => {
            let backend = connect(&config).await?;
            migrate_current(&graph, backend, &mut out).await
        }
        Commands::History { json } => migrate_history(&graph, *json, &mut out),
        Commands::Heads => migrate_heads(&graph, &mut out),
        Commands::Show { target } => {
            let target = Target::parse(target)?;
            let current = if target.needs_current() {
                let mut backend = connect(&config).await?;
                backend.current_revision().await?
            } else {
                None
            };
            migrate_show(&graph, &target, current.as_deref(), &mut out)
        }
        Commands::Upgrade { target, sql: true } => {
            let script = offline_script(&graph, Direction::Forward, target, &config.version_table)?;
            out.write_all(script.as_bytes())?;
            Ok(())
        }
        Commands::Downgrade { target, sql: true } => {
            let script = offline_script(&graph, Direction::Reverse, target, &config.version_table)?;
            out.write_all(script.as_bytes())?;
            Ok(())
        }
        Commands::Upgrade { target, sql: false } => {
            let backend = connect(&config).await?;
            migrate_upgrade(&graph, backend, target, &mut out).await
        }
        Commands::Downgrade { target, sql: false } => {
            let backend = connect(&config).await?;
            migrate_downgrade(&graph, backend, target, &mut out).await
        }
        Commands::Check => check_chain(&graph, &mut out).await,
    }
}

/// True when output failed because the reader went away
/// (`migrate history | head -3`). Such runs end quietly with status 0.
pub fn is_broken_pipe(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<io::Error>()
            .is_some_and(|e| e.kind() == io::ErrorKind::BrokenPipe)
    })
}

/// One-line message for an error that reached `main`. Every error message
/// already carries its cause, so only the outermost one is rendered.
pub fn render_error(err: &anyhow::Error) -> String {
    err.to_string()
}

/// Exit status for an error that reached `main`: `2` for configuration
/// problems (bad graph, config, missing URL), `1` otherwise.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<GraphError>().is_some()
        || err.downcast_ref::<ConfigError>().is_some()
        || err.downcast_ref::<PredictorError>().is_some()
    {
        return 2;
    }
    if let Some(e) = err.downcast_ref::<MigrateError>() {
        return e.exit_code();
    }
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BackendError, TargetError};

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "migrate",
            "-vv",
            "--version-table",
            "my_version",
            "upgrade",
            "head",
            "--sql",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.version_table.as_deref(), Some("my_version"));
        assert!(matches!(
            cli.command,
            Commands::Upgrade { ref target, sql: true } if target == "head"
        ));
    }

    #[test]
    fn test_history_json_flag() {
        let cli = Cli::try_parse_from(["migrate", "history", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::History { json: true }));
    }

    #[test]
    fn test_broken_pipe_is_not_a_failure() {
        let err = anyhow::Error::new(io::Error::from(io::ErrorKind::BrokenPipe));
        assert!(is_broken_pipe(&err));

        let err = anyhow::Error::new(io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(!is_broken_pipe(&err));
        assert!(!is_broken_pipe(&anyhow::Error::new(GraphError::Empty)));
    }

    #[test]
    fn test_rendered_error_names_cause_once() {
        let refused = io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused");
        let err = anyhow::Error::new(MigrateError::Execution {
            revision: "71999603561c".into(),
            direction: Direction::Forward,
            source: BackendError::Sqlx(sqlx::Error::Io(refused)),
        });
        let message = render_error(&err);
        assert!(message.contains("71999603561c"));
        assert_eq!(message.matches("connection refused").count(), 1);

        let err = anyhow::Error::new(MigrateError::Backend(BackendError::CorruptMarker {
            table: "alembic_version".into(),
            rows: 2,
        }));
        assert_eq!(
            render_error(&err),
            "Failed to read current revision: Marker table 'alembic_version' holds 2 rows; expected at most one"
        );
    }

    #[test]
    fn test_exit_codes() {
        let graph = anyhow::Error::new(GraphError::Empty);
        assert_eq!(exit_code(&graph), 2);

        let config = anyhow::Error::new(ConfigError::MissingUrl);
        assert_eq!(exit_code(&config), 2);

        let target = anyhow::Error::new(MigrateError::Target(TargetError::UnknownRevision(
            "dead".into(),
        )));
        assert_eq!(exit_code(&target), 1);

        let exec = anyhow::Error::new(MigrateError::Execution {
            revision: "71999603561c".into(),
            direction: Direction::Forward,
            source: BackendError::Injected { index: 0 },
        });
        assert_eq!(exit_code(&exec), 1);
    }
}
