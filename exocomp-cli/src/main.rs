//! Exocomp: maintenance bot for a Wikibase instance.
//!
//! # Usage
//!
//! ```text
//! exocomp [--dry-run] [--verbose] [--debug] [--config <path>] [--limit <n>]
//! ```
//!
//! Runs the sitelink/property sync module once and prints a statistics report.
//! Exit status is 0 when the run completes (even with per-item errors) and 1
//! when initialization or the run itself fails.

mod logging;
mod report;
mod sync;

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

use sync::SyncArgs;

#[derive(Parser, Debug)]
#[command(
    name = "exocomp",
    version,
    about = "Keep a Wikibase sitelink and item property in agreement",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    sync: SyncArgs,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            // --help and --version are not failures.
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    match cli.sync.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err:#}", "ERROR:".red().bold());
            ExitCode::FAILURE
        }
    }
}
