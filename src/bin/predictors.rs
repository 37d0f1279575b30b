//! `predictors` binary: inspect the bundled predictor options.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;

use remarkable_migrate::cli::{exit_code, is_broken_pipe, render_error};
use remarkable_migrate::logging;
use remarkable_migrate::predictor::{PredictorStore, ProphetConfig};

#[derive(Debug, Parser)]
#[command(name = "predictors", version, about = "Bundled predictor option sets")]
struct Args {
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List bundle names with their option counts
    List,
    /// Print a bundle as JSON
    Show { name: String },
    /// Validate an external bundle file
    Validate { file: PathBuf },
}

fn run(args: Args) -> Result<()> {
    let mut out = io::stdout();
    match args.command {
        Command::List => {
            let store = PredictorStore::bundled()?;
            for name in store.names() {
                let config = store.get(name)?;
                writeln!(
                    out,
                    "{}  {} {}",
                    name,
                    config.predictor_options.len(),
                    "option(s)".dimmed()
                )?;
            }
        }
        Command::Show { name } => {
            let store = PredictorStore::bundled()?;
            writeln!(out, "{}", store.get(&name)?.to_json_pretty()?)?;
        }
        Command::Validate { file } => {
            let config = ProphetConfig::from_path(&file)?;
            writeln!(
                out,
                "{} {} ({} option(s))",
                "✓".green(),
                file.display(),
                config.predictor_options.len()
            )?;
        }
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    logging::init(args.verbose);

    if let Err(err) = run(args) {
        if is_broken_pipe(&err) {
            return;
        }
        eprintln!("{} {}", "error:".red().bold(), render_error(&err));
        std::process::exit(exit_code(&err));
    }
}
