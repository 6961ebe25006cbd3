use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::categorizer::{categorize, Category};

/// One piece of text at a position on a page. Coordinates grow right and down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedFragment {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

impl PositionedFragment {
    pub fn new(text: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            text: text.into(),
            x,
            y,
        }
    }
}

/// Fragments sharing a y-band, ordered left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRow {
    pub page: usize,
    pub y: f64,
    pub fragments: Vec<PositionedFragment>,
}

impl TransactionRow {
    /// Row text with fragments joined by single spaces.
    pub fn text(&self) -> String {
        let joined: Vec<&str> = self
            .fragments
            .iter()
            .map(|f| f.text.trim())
            .filter(|t| !t.is_empty())
            .collect();
        joined.join(" ")
    }

    pub fn leftmost(&self) -> Option<&PositionedFragment> {
        self.fragments.first()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Option<i64>,
    /// Time the platform recorded the line item.
    pub transaction_date: NaiveDateTime,
    /// Time of the underlying ride or session, when the statement shows one.
    pub event_date: Option<NaiveDateTime>,
    pub event_type: String,
    /// Zero when unresolved; `needs_manual_verification` is then set.
    pub amount: f64,
    pub tolls_reimbursed: Option<f64>,
    pub statement_period: String,
    pub shift_id: Option<i64>,
    pub import_date: NaiveDateTime,
    pub source_row: usize,
    pub needs_manual_verification: bool,
}

impl Transaction {
    /// The timestamp used for shift matching.
    pub fn effective_timestamp(&self) -> NaiveDateTime {
        self.event_date.unwrap_or(self.transaction_date)
    }

    /// Derived on every call and never stored.
    pub fn category(&self) -> Category {
        categorize(&self.event_type)
    }
}

/// A logged work session. Owned by the surrounding application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    pub id: i64,
    pub start_date: NaiveDateTime,
    /// `None` while the shift is still in progress.
    pub end_date: Option<NaiveDateTime>,
}

/// The reporting window printed at the top of a statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementPeriod {
    pub label: String,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl StatementPeriod {
    pub fn unparsed(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            start: None,
            end: None,
        }
    }
}
