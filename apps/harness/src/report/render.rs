//! Report rendering: tab-aligned text table, coloured console view, artifact files.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use colored::Colorize;
use tabwriter::TabWriter;

use crate::models::run_summary::round2;
use crate::models::{CompatibilityReport, RunSummary};

/// Paths of the files one report generation wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub report: PathBuf,
    pub summary: PathBuf,
}

fn percentage_line(report: &CompatibilityReport) -> String {
    format!(
        "Passing: {}/{} ({:.2}%)",
        report.passing,
        report.total,
        round2(report.passing_percentage)
    )
}

/// Render the compatibility table as plain, tab-aligned text.
pub fn render_table<W: Write>(report: &CompatibilityReport, writer: W) -> io::Result<()> {
    let mut w = TabWriter::new(writer).padding(2);

    writeln!(w, "Test Name\tStatus\tErrors")?;
    for row in &report.rows {
        writeln!(w, "{}\t{}\t{}", row.test_name, row.status, row.errors)?;
    }
    w.flush()?;

    let mut inner = w
        .into_inner()
        .map_err(|e| io::Error::other(e.to_string()))?;
    writeln!(inner)?;
    writeln!(inner, "{}", percentage_line(report))
}

/// Print the table with coloured PASS/FAIL markers.
pub fn render_console<W: Write>(report: &CompatibilityReport, writer: W) -> io::Result<()> {
    let mut w = TabWriter::new(writer).padding(2);

    for row in &report.rows {
        let marker = if row.passed {
            "PASS".green()
        } else {
            "FAIL".red()
        };
        writeln!(w, "{}\t{}\t{}", marker, row.test_name, row.errors)?;
    }
    writeln!(w, "{}", percentage_line(report).bold())?;
    w.flush()
}

/// Write `compatibility_report_run<N>.txt` and `run_summary_run<N>.json` under `dir`.
pub fn write_artifacts(
    dir: &Path,
    report: &CompatibilityReport,
    summary: &RunSummary,
) -> io::Result<Artifacts> {
    fs::create_dir_all(dir)?;

    let report_path = dir.join(format!("compatibility_report_run{}.txt", summary.run));
    render_table(report, fs::File::create(&report_path)?)?;

    let summary_path = dir.join(format!("run_summary_run{}.json", summary.run));
    let json = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    fs::write(&summary_path, json)?;

    Ok(Artifacts {
        report: report_path,
        summary: summary_path,
    })
}
