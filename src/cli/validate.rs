use std::path::PathBuf;

use colored::Colorize;
use comfy_table::{Cell, Color, Table};
use serde::Serialize;

use shiftledger::error::Result;
use shiftledger::fmt::{money, timestamp};
use shiftledger::importer::preview_file;
use shiftledger::settings::load_settings;
use shiftledger::Transaction;

use super::import::print_issues;
use super::now;

#[derive(Serialize)]
struct ValidateReport<'a> {
    document: &'a str,
    layout: &'a str,
    statement_period: &'a str,
    blocks: usize,
    transactions: &'a [Transaction],
    issues: Vec<String>,
}

pub fn run(file: &str, layout: Option<&str>, json: bool) -> Result<()> {
    let mut settings = load_settings();
    if let Some(key) = layout {
        settings.parsing.layout = key.to_string();
    }
    let preview = preview_file(&PathBuf::from(file), &settings, now())?;
    let output = &preview.output;

    if json {
        let report = ValidateReport {
            document: &preview.document,
            layout: preview.layout.key(),
            statement_period: &output.period.label,
            blocks: output.blocks,
            transactions: &output.transactions,
            issues: output.issues.iter().map(|i| i.to_string()).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} ({}, {} rows, {} blocks)",
        preview.document,
        preview.layout.name(),
        preview.rows,
        output.blocks
    );
    println!("Statement: {}", output.period.label);

    let mut table = Table::new();
    table.set_header(vec!["Row", "Date", "Event Date", "Event", "Category", "Amount", "Tolls"]);
    for txn in &output.transactions {
        let amount = if txn.needs_manual_verification {
            Cell::new(format!("{} ?", money(txn.amount))).fg(Color::Yellow)
        } else {
            Cell::new(money(txn.amount))
        };
        table.add_row(vec![
            Cell::new(txn.source_row),
            Cell::new(timestamp(txn.transaction_date)),
            Cell::new(txn.event_date.map(timestamp).unwrap_or_default()),
            Cell::new(&txn.event_type),
            Cell::new(txn.category().name()),
            amount,
            Cell::new(txn.tolls_reimbursed.map(money).unwrap_or_default()),
        ]);
    }
    println!("{table}");

    let errors = output.issues.iter().filter(|i| i.is_error()).count();
    if output.issues.is_empty() {
        println!("{}", "No issues found.".green());
    } else {
        println!(
            "{} error(s), {} warning(s):",
            errors,
            output.issues.len() - errors
        );
        print_issues(&output.issues);
    }
    Ok(())
}
