use std::path::PathBuf;

use colored::Colorize;

use shiftledger::error::Result;
use shiftledger::importer::{import_file, ImportSummary};
use shiftledger::settings::load_settings;

use super::{now, open_store};

pub(crate) fn print_issues(issues: &[shiftledger::ImportIssue]) {
    for issue in issues {
        if issue.is_error() {
            println!("  {} {issue}", "error:".red());
        } else {
            println!("  {} {issue}", "warning:".yellow());
        }
    }
}

fn print_summary(summary: &ImportSummary) {
    if summary.duplicate_file {
        println!("This statement has already been imported (duplicate checksum); re-matched only.");
    }
    println!("Statement: {}", summary.statement_period);
    println!(
        "{} parsed, {} imported, {} replaced from an earlier import",
        summary.parsed, summary.inserted, summary.superseded
    );
    println!(
        "{} matched, {} orphaned, {} delayed tip(s), {} need verification",
        summary.matched, summary.orphaned, summary.delayed_tips, summary.needs_verification
    );
    if !summary.issues.is_empty() {
        println!("{} error(s), {} warning(s):", summary.errors(), summary.warnings());
        print_issues(&summary.issues);
    }
}

pub fn run(file: &str, layout: Option<&str>) -> Result<()> {
    let mut settings = load_settings();
    if let Some(key) = layout {
        settings.parsing.layout = key.to_string();
    }
    let mut conn = open_store()?;
    let summary = import_file(&mut conn, &PathBuf::from(file), &settings, now())?;
    print_summary(&summary);
    Ok(())
}
