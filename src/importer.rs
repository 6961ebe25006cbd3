use std::path::Path;

use chrono::NaiveDateTime;
use rusqlite::{Connection, TransactionBehavior};

use crate::aggregator::totals_by_shift;
use crate::assembler::{AssembleOutput, Assembler};
use crate::db;
use crate::error::{ImportIssue, Result};
use crate::extractor::{extract_rows, load_document, Document};
use crate::layout::{self, LayoutFamily};
use crate::matcher::{apply_assignments, match_transactions};
use crate::settings::{MatchSettings, Settings};

// ---------------------------------------------------------------------------
// Parsing (no store access)
// ---------------------------------------------------------------------------

pub struct Preview {
    pub document: String,
    pub layout: LayoutFamily,
    pub rows: usize,
    pub output: AssembleOutput,
}

fn layout_for(doc: &Document, settings: &Settings) -> Result<LayoutFamily> {
    match &doc.layout {
        Some(key) => layout::resolve(key),
        None => settings.parsing.layout_family(),
    }
}

/// Extract, assemble and categorize one document without touching the store.
pub fn parse_document(doc: &Document, settings: &Settings, now: NaiveDateTime) -> Result<Preview> {
    let layout = layout_for(doc, settings)?;
    let rows = extract_rows(doc, settings.parsing.row_tolerance);
    let assembler = Assembler::new(layout, &settings.parsing, now)?;
    let output = assembler.assemble(&rows, &doc.name);
    Ok(Preview {
        document: doc.name.clone(),
        layout,
        rows: rows.len(),
        output,
    })
}

pub fn preview_file(path: &Path, settings: &Settings, now: NaiveDateTime) -> Result<Preview> {
    let doc = load_document(path)?;
    parse_document(&doc, settings, now)
}

// ---------------------------------------------------------------------------
// import
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct ImportSummary {
    pub document: String,
    pub statement_period: String,
    pub blocks: usize,
    pub parsed: usize,
    pub inserted: usize,
    /// Rows from an earlier import of the same statement period that this
    /// document replaced.
    pub superseded: usize,
    pub duplicate_file: bool,
    pub matched: usize,
    pub orphaned: usize,
    pub delayed_tips: usize,
    pub needs_verification: usize,
    pub issues: Vec<ImportIssue>,
}

impl ImportSummary {
    pub fn errors(&self) -> usize {
        self.issues.iter().filter(|i| i.is_error()).count()
    }

    pub fn warnings(&self) -> usize {
        self.issues.iter().filter(|i| !i.is_error()).count()
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct RematchSummary {
    pub shifts: usize,
    pub transactions: usize,
    pub matched: usize,
    pub orphaned: usize,
    pub reassigned: usize,
}

pub fn import_file(
    conn: &mut Connection,
    file_path: &Path,
    settings: &Settings,
    now: NaiveDateTime,
) -> Result<ImportSummary> {
    let doc = load_document(file_path)?;
    import_document(conn, &doc, settings, now)
}

/// Run the full pipeline for one document. Everything from insertion to the
/// shift totals happens under one exclusive store transaction; a failure
/// leaves the store untouched.
pub fn import_document(
    conn: &mut Connection,
    doc: &Document,
    settings: &Settings,
    now: NaiveDateTime,
) -> Result<ImportSummary> {
    settings.matching.validate()?;
    let preview = parse_document(doc, settings, now)?;
    let output = preview.output;
    let mut summary = ImportSummary {
        document: doc.name.clone(),
        statement_period: output.period.label.clone(),
        blocks: output.blocks,
        parsed: output.transactions.len(),
        needs_verification: output
            .transactions
            .iter()
            .filter(|t| t.needs_manual_verification)
            .count(),
        issues: output.issues,
        ..ImportSummary::default()
    };

    let tx = conn.transaction_with_behavior(TransactionBehavior::Exclusive)?;
    summary.duplicate_file = db::import_exists(&tx, &doc.checksum)?;
    if summary.duplicate_file {
        log::info!("{} was already imported; re-matching only", doc.name);
    } else {
        let import_id = db::record_import(
            &tx,
            &doc.name,
            &output.period.label,
            output.transactions.len(),
            &doc.checksum,
        )?;
        summary.superseded = db::delete_period_transactions(&tx, &output.period.label)?;
        if summary.superseded > 0 {
            log::info!(
                "{} replaces {} row(s) from an earlier import of {}",
                doc.name,
                summary.superseded,
                output.period.label
            );
        }
        for txn in &output.transactions {
            db::insert_transaction(&tx, txn, Some(import_id))?;
            summary.inserted += 1;
        }
    }

    rematch_in(&tx, &settings.matching)?;

    // Per-document view of the same deterministic match.
    let shifts = db::load_shifts(&tx)?;
    let result = match_transactions(&output.transactions, &shifts, &settings.matching);
    summary.matched = result.matched;
    summary.orphaned = result.orphaned;
    summary.delayed_tips = result.delayed_tips;
    summary.issues.extend(result.issues);

    tx.commit()?;
    log::info!(
        "imported {}: {} inserted, {} superseded, {} error(s), {} warning(s)",
        doc.name,
        summary.inserted,
        summary.superseded,
        summary.errors(),
        summary.warnings()
    );
    Ok(summary)
}

// ---------------------------------------------------------------------------
// rematch
// ---------------------------------------------------------------------------

/// Re-match every stored transaction against the current shifts and rewrite
/// shift totals. Safe to run any number of times.
pub fn rematch(conn: &mut Connection, settings: &MatchSettings) -> Result<RematchSummary> {
    settings.validate()?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Exclusive)?;
    let summary = rematch_in(&tx, settings)?;
    tx.commit()?;
    Ok(summary)
}

fn rematch_in(conn: &Connection, settings: &MatchSettings) -> Result<RematchSummary> {
    let shifts = db::load_shifts(conn)?;
    let mut transactions = db::load_transactions(conn)?;
    let result = match_transactions(&transactions, &shifts, settings);

    let mut reassigned = 0usize;
    for (txn, outcome) in transactions.iter().zip(&result.outcomes) {
        if txn.shift_id == outcome.shift_id {
            continue;
        }
        if let Some(id) = txn.id {
            db::set_assignment(conn, id, outcome.shift_id)?;
            reassigned += 1;
        }
    }
    apply_assignments(&mut transactions, &result);

    let totals = totals_by_shift(&transactions);
    for shift in &shifts {
        let shift_totals = totals.get(&shift.id).cloned().unwrap_or_default();
        db::write_shift_totals(conn, shift.id, &shift_totals)?;
    }

    log::debug!("re-matched {} transaction(s), {reassigned} changed", transactions.len());
    Ok(RematchSummary {
        shifts: shifts.len(),
        transactions: transactions.len(),
        matched: result.matched,
        orphaned: result.orphaned,
        reassigned,
    })
}
