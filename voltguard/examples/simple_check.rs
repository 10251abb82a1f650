//! Minimal example: check a robot spec and print the findings.
//!
//! Run with: cargo run --example simple_check -- robot.yaml

use std::path::PathBuf;

use voltguard::{CheckOptions, SpecChecker};

fn main() -> anyhow::Result<()> {
    let path: PathBuf = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "robot.yaml".to_string())
        .into();

    let result = SpecChecker::check_file(&path, CheckOptions::default())?;

    for finding in &result.report.findings {
        match &finding.location {
            Some(loc) => println!(
                "{} {}: {}:{} {}",
                finding.severity, finding.code, loc.file, loc.line, finding.message
            ),
            None => println!("{} {}: {}", finding.severity, finding.code, finding.message),
        }
    }

    let summary = result.summary;
    println!(
        "\n{} error(s), {} warning(s), {} info(s)",
        summary.errors, summary.warnings, summary.infos
    );
    if result.has_errors() {
        std::process::exit(2);
    }
    Ok(())
}
