//! Shift matching: assigns each transaction to at most one shift.
//!
//! A shift's window is `[start - offset, end + offset)`, where the offset is
//! the platform's operational-day boundary (4 AM by default). When windows
//! overlap the shortest shift wins, then the most recently created one
//! (highest id). Matching is a pure function of its inputs, so re-running it
//! over the same snapshot always yields the same assignments.

use std::cmp::Reverse;
use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

use crate::assembler::parse_statement_period;
use crate::categorizer::Category;
use crate::error::ImportIssue;
use crate::models::{Shift, StatementPeriod, Transaction};
use crate::settings::MatchSettings;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOutcome {
    pub shift_id: Option<i64>,
    pub is_delayed_tip: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    /// One entry per input transaction, in input order.
    pub outcomes: Vec<MatchOutcome>,
    pub matched: usize,
    pub orphaned: usize,
    pub delayed_tips: usize,
    pub issues: Vec<ImportIssue>,
}

/// The calendar day a timestamp belongs to once the day boundary is moved.
pub fn operational_day(ts: NaiveDateTime, offset: Duration) -> NaiveDate {
    (ts - offset).date()
}

/// Boundary-adjusted window of a shift, end exclusive.
pub fn shift_window(shift: &Shift, settings: &MatchSettings) -> (NaiveDateTime, NaiveDateTime) {
    let offset = settings.boundary_offset();
    let end = shift.end_date.unwrap_or_else(|| {
        shift
            .start_date
            .checked_add_signed(settings.open_shift_length())
            .unwrap_or(NaiveDateTime::MAX)
    });
    (
        shift.start_date.checked_sub_signed(offset).unwrap_or(NaiveDateTime::MIN),
        end.checked_add_signed(offset).unwrap_or(NaiveDateTime::MAX),
    )
}

/// The best shift for a timestamp, if any window contains it.
pub fn find_shift(ts: NaiveDateTime, shifts: &[Shift], settings: &MatchSettings) -> Option<i64> {
    shifts
        .iter()
        .filter_map(|shift| {
            let (start, end) = shift_window(shift, settings);
            (start <= ts && ts < end).then_some((end - start, shift.id))
        })
        .min_by_key(|(span, id)| (*span, Reverse(*id)))
        .map(|(_, id)| id)
}

fn iso_week(day: NaiveDate) -> (i32, u32) {
    let week = day.iso_week();
    (week.year(), week.week())
}

/// A tip is delayed when it happened in a different week than the statement
/// period it was paid in. Periods without a parsed start are never delayed.
pub fn is_delayed_tip(txn: &Transaction, period: &StatementPeriod, offset: Duration) -> bool {
    if txn.category() != Category::Tip {
        return false;
    }
    let Some(period_start) = period.start else {
        return false;
    };
    iso_week(operational_day(txn.effective_timestamp(), offset))
        != iso_week(operational_day(period_start, offset))
}

pub fn match_transactions(
    transactions: &[Transaction],
    shifts: &[Shift],
    settings: &MatchSettings,
) -> MatchResult {
    let offset = settings.boundary_offset();
    let mut periods: HashMap<&str, StatementPeriod> = HashMap::new();
    let mut outcomes = Vec::with_capacity(transactions.len());
    let mut issues = Vec::new();
    let (mut matched, mut orphaned, mut delayed_tips) = (0usize, 0usize, 0usize);

    for txn in transactions {
        let shift_id = find_shift(txn.effective_timestamp(), shifts, settings);
        let period = periods
            .entry(txn.statement_period.as_str())
            .or_insert_with(|| parse_statement_period(&txn.statement_period));
        let is_delayed_tip = is_delayed_tip(txn, period, offset);

        match shift_id {
            Some(_) => matched += 1,
            None => {
                orphaned += 1;
                issues.push(ImportIssue::NoMatch {
                    row: txn.source_row,
                    event_type: txn.event_type.clone(),
                });
            }
        }
        if is_delayed_tip {
            delayed_tips += 1;
        }
        outcomes.push(MatchOutcome {
            shift_id,
            is_delayed_tip,
        });
    }

    log::info!("matched {matched}, orphaned {orphaned}, delayed tips {delayed_tips}");
    MatchResult {
        outcomes,
        matched,
        orphaned,
        delayed_tips,
        issues,
    }
}

/// Write the outcome's shift assignments back onto the transactions.
pub fn apply_assignments(transactions: &mut [Transaction], result: &MatchResult) {
    for (txn, outcome) in transactions.iter_mut().zip(&result.outcomes) {
        txn.shift_id = outcome.shift_id;
    }
}
