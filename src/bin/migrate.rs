//! `migrate` binary.

use clap::Parser;
use colored::*;

use remarkable_migrate::cli::{self, Cli};
use remarkable_migrate::logging;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Cli::parse();
    logging::init(args.verbose);

    if let Err(err) = cli::run(args).await {
        if cli::is_broken_pipe(&err) {
            return;
        }
        eprintln!("{} {}", "error:".red().bold(), cli::render_error(&err));
        std::process::exit(cli::exit_code(&err));
    }
}
