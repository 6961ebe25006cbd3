//! Earnings statement ingestion and shift reconciliation for rideshare drivers.
//!
//! Pipeline: `extractor` (positioned text rows) → `assembler` (transaction
//! blocks) → `categorizer` → `matcher` (shift assignment) → `aggregator` and
//! `orphans`. `importer` runs the pipeline against the SQLite store in `db`.

pub mod aggregator;
pub mod assembler;
pub mod categorizer;
pub mod db;
pub mod error;
pub mod extractor;
pub mod fmt;
pub mod importer;
pub mod layout;
pub mod matcher;
pub mod models;
pub mod orphans;
pub mod settings;

pub use categorizer::{categorize, Category};
pub use error::{ImportIssue, LedgerError, Result};
pub use layout::LayoutFamily;
pub use models::{PositionedFragment, Shift, StatementPeriod, Transaction, TransactionRow};
