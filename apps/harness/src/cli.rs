//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "docdb-compat",
    version,
    about = "Compatibility test harness for document databases"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run suites against the target and flush records to the results store
    Run(RunArgs),
    /// Generate the compatibility report and run summary from every stored record
    Report(ReportArgs),
    /// Export stored records as newline-delimited JSON
    Export(ExportArgs),
    /// Serve the read-only results API
    Serve,
    /// List the built-in suites
    Suites,
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Suite to run (repeatable); all suites when omitted
    #[arg(long = "suite", value_name = "NAME")]
    pub suites: Vec<String>,

    /// Keep records in memory and print the report instead of persisting
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Directory for report artifacts (defaults to COMPAT_REPORT_DIR)
    #[arg(long, value_name = "DIR")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Destination file
    #[arg(long, value_name = "FILE")]
    pub output: PathBuf,
}
